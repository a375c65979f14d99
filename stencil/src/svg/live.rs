//! Live preview with in-place patching.
//!
//! The view is rendered once from the element list with every editable node
//! tagged by its internal id. After that, a single element edit touches only
//! its own node, so a preview stays cheap while the user types.

#[cfg(test)]
#[path = "live_test.rs"]
mod live_test;

use tracing::debug;

use super::SvgError;
use super::dom::Document;
use super::element::SvgElement;
use super::regenerate;
use super::style;
use super::wrap::{HeuristicMeasure, TextMeasure};
use crate::consts::{HIGHLIGHT_OFFSET, HIGHLIGHT_OUTLINE};

/// Attribute linking a preview node to its element.
pub const INTERNAL_ID_ATTRIBUTE: &str = "data-internal-id";

#[derive(Debug, Clone)]
pub struct LiveView {
    doc: Document,
}

impl LiveView {
    /// # Errors
    ///
    /// Returns the parse error of the original document.
    pub fn render(original: &str, elements: &[SvgElement]) -> Result<Self, SvgError> {
        Self::render_with(original, elements, &HeuristicMeasure::default())
    }

    /// # Errors
    ///
    /// Returns the parse error of the original document.
    pub fn render_with(original: &str, elements: &[SvgElement], measure: &dyn TextMeasure) -> Result<Self, SvgError> {
        let (mut doc, placed) = regenerate::project(original, elements, measure)?;
        for (element, node) in elements.iter().zip(placed) {
            if let Some(node) = node {
                doc.set_attribute(node, INTERNAL_ID_ATTRIBUTE, &element.internal_id);
            }
        }
        Ok(Self { doc })
    }

    /// Re-apply one element. Returns `false` when the preview has no node for
    /// it, which is not an error: the caller should re-render after
    /// structural edits.
    pub fn patch(&mut self, element: &SvgElement, highlight: bool) -> bool {
        self.patch_with(element, highlight, &HeuristicMeasure::default())
    }

    pub fn patch_with(&mut self, element: &SvgElement, highlight: bool, measure: &dyn TextMeasure) -> bool {
        let Some(node) = self.doc.find_by_attribute(INTERNAL_ID_ATTRIBUTE, &element.internal_id) else {
            debug!(internal_id = %element.internal_id, "no preview node to patch");
            return false;
        };

        let mut shown = element.clone();
        if highlight {
            style::set_property(&mut shown.attributes, "outline", Some(HIGHLIGHT_OUTLINE));
            style::set_property(&mut shown.attributes, "outline-offset", Some(HIGHLIGHT_OFFSET));
        }
        regenerate::apply_element(&mut self.doc, node, &shown, measure);
        self.doc.set_attribute(node, INTERNAL_ID_ATTRIBUTE, &element.internal_id);
        true
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    #[must_use]
    pub fn to_svg(&self) -> String {
        self.doc.to_string()
    }
}
