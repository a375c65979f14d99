//! SVG projection: parse a document into editable elements and write edits
//! back out, either as a full regeneration or as a live, in-place patch.

pub mod dom;
pub mod element;
pub mod live;
pub mod regenerate;
pub mod style;
pub mod transform;
pub mod visibility;
pub mod wrap;

pub use dom::Document;
pub use element::{Origin, SvgElement, parse_elements};
pub use live::LiveView;
pub use regenerate::{regenerate, regenerate_with, try_regenerate};

/// Errors raised while reading SVG text.
#[derive(Debug, thiserror::Error)]
pub enum SvgError {
    #[error("malformed svg: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("document root is <{0}>, expected <svg>")]
    NotSvg(String),
}
