//! Generation-rule evaluation.
//!
//! Parts are evaluated left to right; a `fill` part is sized last, from what
//! is left of the length budget once every other part has produced its text.
//! All lengths count Unicode scalar values.

#[cfg(test)]
#[path = "generate_test.rs"]
mod generate_test;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_GENERATED_LEN;
use crate::extract::{self, DependencyRef};
use crate::field::FieldValues;
use crate::pattern::{PatternPart, Rule};
use crate::random::RandomSource;

/// Evaluate a rule string (with or without `AUTO:`) against field values.
#[must_use]
pub fn generate_value(
    rule: &str,
    values: &FieldValues,
    max_length: Option<usize>,
    rng: &mut dyn RandomSource,
) -> String {
    evaluate(&Rule::parse(rule).parts, values, max_length, rng)
}

/// Evaluate compiled parts.
#[must_use]
pub fn evaluate(
    parts: &[PatternPart],
    values: &FieldValues,
    max_length: Option<usize>,
    rng: &mut dyn RandomSource,
) -> String {
    let budget = max_length.map_or(MAX_GENERATED_LEN, |max| max.min(MAX_GENERATED_LEN));
    let mut segments: Vec<Option<String>> = Vec::with_capacity(parts.len());
    let mut fill_chars: Option<&str> = None;
    let mut used = 0usize;

    for part in parts {
        let text = match part {
            PatternPart::Fill { chars } => {
                fill_chars = Some(chars.as_str());
                segments.push(None);
                continue;
            }
            PatternPart::Static { text } => text.clone(),
            PatternPart::Dep { field, extraction } => {
                extract::resolve(&DependencyRef { field: field.clone(), extraction: extraction.clone() }, values)
            }
            PatternPart::Random { charset, count } => {
                let count = (*count).min(budget.saturating_sub(used));
                (0..count).map(|_| rng.char_from(*charset)).collect()
            }
            PatternPart::Repeat { chars, count } => repeat_to(chars, (*count).min(budget.saturating_sub(used))),
        };
        used += text.chars().count();
        segments.push(Some(text));
    }

    let fill = match (fill_chars, max_length) {
        (Some(chars), Some(_)) => repeat_to(chars, budget.saturating_sub(used)),
        _ => String::new(),
    };

    let mut out: String = segments
        .into_iter()
        .map(|segment| segment.unwrap_or_else(|| fill.clone()))
        .collect();

    truncate_chars(&mut out, budget);
    out
}

/// `chars` repeated and cut to exactly `count` characters.
#[must_use]
pub fn repeat_to(chars: &str, count: usize) -> String {
    if chars.is_empty() {
        return String::new();
    }
    chars.chars().cycle().take(count).collect()
}

fn truncate_chars(value: &mut String, max: usize) {
    if let Some((byte_index, _)) = value.char_indices().nth(max) {
        value.truncate(byte_index);
    }
}

// =============================================================================
// LEGACY PADDING
// =============================================================================

/// Length spec carried by a `max_<n>` or `max_<n>:<pad>` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxSpec {
    pub length: usize,
    /// Left-pad character; `None` only truncates.
    pub pad: Option<char>,
}

impl MaxSpec {
    /// Parse `12` or `12:0`.
    #[must_use]
    pub fn parse(spec: &str) -> Option<Self> {
        let (length, pad) = match spec.split_once(':') {
            Some((length, pad)) => {
                let mut chars = pad.chars();
                let pad = match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    (None, None) => None,
                    _ => return None,
                };
                (length, pad)
            }
            None => (spec, None),
        };
        Some(Self { length: length.trim().parse().ok()?, pad })
    }
}

/// Legacy post-processing: truncate to the spec length, then left-pad with
/// the spec's pad character when one is given.
///
/// Kept separate from `[fill]`: callers apply it only to rules without a
/// fill part, so a value is never padded twice.
#[must_use]
pub fn apply_max_generation(value: &str, spec: &MaxSpec) -> String {
    let length = spec.length.min(MAX_GENERATED_LEN);
    let mut out = value.to_owned();
    truncate_chars(&mut out, length);
    let len = out.chars().count();
    match spec.pad {
        Some(pad) if len < length => {
            let mut padded = repeat_to(&pad.to_string(), length - len);
            padded.push_str(&out);
            padded
        }
        _ => out,
    }
}
