//! Multi-line text layout.
//!
//! Explicit newlines always break; with a `data-max-width` attribute, lines
//! wider than the limit are word-wrapped, and words wider than the limit are
//! broken by character. Wrapping its own output changes nothing.

#[cfg(test)]
#[path = "wrap_test.rs"]
mod wrap_test;

use indexmap::IndexMap;
use unicode_width::UnicodeWidthStr;

use super::style;
use crate::consts::{DEFAULT_FONT_SIZE, LINE_HEIGHT, WIDTH_FACTOR};

/// Attribute holding the wrap width in user units.
pub const MAX_WIDTH_ATTRIBUTE: &str = "data-max-width";

/// Measures rendered text width.
pub trait TextMeasure {
    fn width(&self, text: &str, font_size: f64) -> f64;
}

/// Width estimate from display columns: `columns * font_size * factor`.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicMeasure {
    pub factor: f64,
}

impl Default for HeuristicMeasure {
    fn default() -> Self {
        Self { factor: WIDTH_FACTOR }
    }
}

impl TextMeasure for HeuristicMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn width(&self, text: &str, font_size: f64) -> f64 {
        text.width() as f64 * font_size * self.factor
    }
}

/// One output line and its baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub y: f64,
}

/// Break `text` into lines.
#[must_use]
pub fn wrap_lines(text: &str, max_width: Option<f64>, font_size: f64, measure: &dyn TextMeasure) -> Vec<String> {
    let mut out = Vec::new();
    for hard in text.split('\n') {
        let hard = hard.strip_suffix('\r').unwrap_or(hard);
        match max_width {
            Some(limit) if limit > 0.0 && measure.width(hard, font_size) > limit => {
                wrap_words(hard, limit, font_size, measure, &mut out);
            }
            _ => out.push(hard.to_owned()),
        }
    }
    out
}

fn wrap_words(line: &str, limit: f64, font_size: f64, measure: &dyn TextMeasure, out: &mut Vec<String>) {
    let start = out.len();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() { word.to_owned() } else { format!("{current} {word}") };
        if measure.width(&candidate, font_size) <= limit {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        if measure.width(word, font_size) <= limit {
            current = word.to_owned();
            continue;
        }
        for c in word.chars() {
            let mut next = current.clone();
            next.push(c);
            if !current.is_empty() && measure.width(&next, font_size) > limit {
                out.push(std::mem::take(&mut current));
                current.push(c);
            } else {
                current = next;
            }
        }
    }
    if !current.is_empty() || out.len() == start {
        out.push(current);
    }
}

/// Lay out lines starting at baseline `y`, each `LINE_HEIGHT` em below the
/// previous one.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn layout(lines: Vec<String>, y: f64, font_size: f64) -> Vec<Line> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| Line { text, y: y + i as f64 * LINE_HEIGHT * font_size })
        .collect()
}

/// Whether text needs `tspan` lines rather than a single text node.
#[must_use]
pub fn needs_lines(text: &str, attributes: &IndexMap<String, String>) -> bool {
    text.contains('\n') || max_width(attributes).is_some()
}

#[must_use]
pub fn max_width(attributes: &IndexMap<String, String>) -> Option<f64> {
    attributes
        .get(MAX_WIDTH_ATTRIBUTE)
        .and_then(|raw| leading_number(raw))
        .filter(|w| *w > 0.0)
}

/// Font size from the `font-size` attribute or style, in user units.
#[must_use]
pub fn font_size(attributes: &IndexMap<String, String>) -> f64 {
    style::get_property(attributes, "font-size")
        .or_else(|| attributes.get("font-size").cloned())
        .and_then(|raw| leading_number(&raw))
        .filter(|size| *size > 0.0)
        .unwrap_or(DEFAULT_FONT_SIZE)
}

/// First number of an attribute like `12px` or `10 20 30`.
#[must_use]
pub fn leading_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || ((*c == '-' || *c == '+') && *i == 0)))
        .map_or(raw.len(), |(i, _)| i);
    raw[..end].parse().ok()
}
