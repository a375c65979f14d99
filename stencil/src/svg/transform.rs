//! Transform consolidation.
//!
//! The editor positions elements with CSS `transform` inside `style`,
//! rotating around the element's center. Static renderers only read the
//! SVG `transform` attribute and ignore `transform-origin`, so before output
//! the CSS transform is moved into the attribute and every operation is
//! re-expressed around an explicit pivot.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use super::style;
use super::wrap::{self, HeuristicMeasure, TextMeasure};

fn function_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Za-z]+)\s*\(([^)]*)\)").expect("valid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate(f64, f64),
    Scale(f64, f64),
    /// Angle in degrees, optional pivot.
    Rotate(f64, Option<(f64, f64)>),
    SkewX(f64),
    SkewY(f64),
    Matrix([f64; 6]),
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Translate(x, y) => write!(f, "translate({}, {})", num(x), num(y)),
            Self::Scale(x, y) if (x - y).abs() < f64::EPSILON => write!(f, "scale({})", num(x)),
            Self::Scale(x, y) => write!(f, "scale({}, {})", num(x), num(y)),
            Self::Rotate(a, None) => write!(f, "rotate({})", num(a)),
            Self::Rotate(a, Some((cx, cy))) => write!(f, "rotate({}, {}, {})", num(a), num(cx), num(cy)),
            Self::SkewX(a) => write!(f, "skewX({})", num(a)),
            Self::SkewY(a) => write!(f, "skewY({})", num(a)),
            Self::Matrix(m) => write!(
                f,
                "matrix({}, {}, {}, {}, {}, {})",
                num(m[0]),
                num(m[1]),
                num(m[2]),
                num(m[3]),
                num(m[4]),
                num(m[5])
            ),
        }
    }
}

/// Format with at most three decimals and no trailing zeros.
pub(crate) fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.abs() < f64::EPSILON { "0".to_owned() } else { rounded.to_string() }
}

/// Parse an SVG or CSS transform list. Units (`px`, `deg`, `rad`, `turn`)
/// are converted to user units and degrees. Unknown functions are skipped.
#[must_use]
pub fn parse_transform(text: &str) -> Vec<TransformOp> {
    function_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let args: Vec<f64> = caps
                .get(2)?
                .as_str()
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .filter_map(parse_length)
                .collect();
            to_op(name, &args)
        })
        .collect()
}

fn to_op(name: &str, args: &[f64]) -> Option<TransformOp> {
    let arg = |i: usize| args.get(i).copied();
    let op = match name.to_ascii_lowercase().as_str() {
        "translate" => TransformOp::Translate(arg(0)?, arg(1).unwrap_or(0.0)),
        "translatex" => TransformOp::Translate(arg(0)?, 0.0),
        "translatey" => TransformOp::Translate(0.0, arg(0)?),
        "scale" => {
            let x = arg(0)?;
            TransformOp::Scale(x, arg(1).unwrap_or(x))
        }
        "scalex" => TransformOp::Scale(arg(0)?, 1.0),
        "scaley" => TransformOp::Scale(1.0, arg(0)?),
        "rotate" | "rotatez" => {
            let pivot = arg(1).zip(arg(2));
            TransformOp::Rotate(arg(0)?, pivot)
        }
        "skewx" => TransformOp::SkewX(arg(0)?),
        "skewy" => TransformOp::SkewY(arg(0)?),
        "matrix" if args.len() >= 6 => TransformOp::Matrix([args[0], args[1], args[2], args[3], args[4], args[5]]),
        _ => return None,
    };
    Some(op)
}

fn parse_length(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| c.is_ascii_alphabetic() || c == '%')
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let value: f64 = number.parse().ok()?;
    Some(match unit.to_ascii_lowercase().as_str() {
        "rad" => value.to_degrees(),
        "turn" => value * 360.0,
        "grad" => value * 0.9,
        _ => value,
    })
}

#[must_use]
pub fn format_transform(ops: &[TransformOp]) -> String {
    ops.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

/// Re-express `op` around `pivot`: `translate(p) op translate(-p)`.
fn about(op: TransformOp, (cx, cy): (f64, f64)) -> Vec<TransformOp> {
    match op {
        TransformOp::Translate(..) => vec![op],
        TransformOp::Rotate(angle, None) => vec![TransformOp::Rotate(angle, Some((cx, cy)))],
        _ => vec![TransformOp::Translate(cx, cy), op, TransformOp::Translate(-cx, -cy)],
    }
}

/// Move a CSS transform into the `transform` attribute.
///
/// The CSS transform replaces any existing attribute value, matching how
/// browsers resolve the two. `transform-origin` and `transform-box` are
/// removed from the style; a centered (or absent) origin becomes a pivot at
/// the element's estimated bounding-box center. Elements without a CSS
/// transform are left unchanged.
pub fn normalize(tag: &str, attributes: &mut IndexMap<String, String>, text: Option<&str>) {
    let Some(css) = style::take_property(attributes, "transform") else {
        return;
    };
    let origin = style::take_property(attributes, "transform-origin");
    style::take_property(attributes, "transform-box");

    let ops = parse_transform(&css);
    if ops.is_empty() {
        attributes.shift_remove("transform");
        return;
    }

    let pivot = match origin.as_deref().map(str::trim) {
        None => Some(center(tag, attributes, text)),
        Some(origin) if is_centered(origin) => Some(center(tag, attributes, text)),
        Some(origin) => explicit_origin(origin),
    };
    let ops: Vec<TransformOp> = match pivot {
        Some(pivot) => ops.into_iter().flat_map(|op| about(op, pivot)).collect(),
        None => ops,
    };
    attributes.insert("transform".to_owned(), format_transform(&ops));
}

fn is_centered(origin: &str) -> bool {
    origin.split_whitespace().all(|t| t == "center" || t == "50%")
}

fn explicit_origin(origin: &str) -> Option<(f64, f64)> {
    let mut tokens = origin.split_whitespace();
    let x = parse_keyword_length(tokens.next()?)?;
    let y = tokens.next().map_or(Some(0.0), parse_keyword_length)?;
    Some((x, y))
}

fn parse_keyword_length(token: &str) -> Option<f64> {
    match token {
        "left" | "top" => Some(0.0),
        t if t.ends_with('%') => None,
        t => parse_length(t),
    }
}

/// Estimated bounding-box center from geometry attributes. For `text`,
/// the width is estimated from its content.
#[must_use]
pub fn center(tag: &str, attributes: &IndexMap<String, String>, text: Option<&str>) -> (f64, f64) {
    let get = |name: &str| attributes.get(name).and_then(|v| wrap::leading_number(v));
    let or0 = |name: &str| get(name).unwrap_or(0.0);
    match tag {
        "circle" | "ellipse" => (or0("cx"), or0("cy")),
        "line" => ((or0("x1") + or0("x2")) / 2.0, (or0("y1") + or0("y2")) / 2.0),
        "polygon" | "polyline" => attributes
            .get("points")
            .and_then(|points| points_center(points))
            .unwrap_or((0.0, 0.0)),
        "path" => attributes
            .get("d")
            .and_then(|d| points_center(d))
            .unwrap_or((0.0, 0.0)),
        "text" => {
            let size = wrap::font_size(attributes);
            let widest = text
                .unwrap_or_default()
                .lines()
                .map(|line| HeuristicMeasure::default().width(line, size))
                .fold(0.0, f64::max);
            let width = wrap::max_width(attributes).map_or(widest, |limit| widest.min(limit));
            (or0("x") + width / 2.0, or0("y") - size / 2.0)
        }
        _ => (or0("x") + or0("width") / 2.0, or0("y") + or0("height") / 2.0),
    }
}

/// Center of the box around the coordinate pairs found in a point list or
/// path. Relative path commands make this an approximation.
fn points_center(text: &str) -> Option<(f64, f64)> {
    let numbers: Vec<f64> = text
        .split(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    let pairs: Vec<(f64, f64)> = numbers.chunks_exact(2).map(|p| (p[0], p[1])).collect();
    let first = pairs.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.0, first.1, first.0, first.1);
    for (x, y) in &pairs {
        min_x = min_x.min(*x);
        max_x = max_x.max(*x);
        min_y = min_y.min(*y);
        max_y = max_y.max(*y);
    }
    Some(((min_x + max_x) / 2.0, (min_y + max_y) / 2.0))
}
