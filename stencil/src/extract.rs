//! Dependency references and value extraction.
//!
//! A reference names another field and optionally a slice of its value:
//! `City`, `City[w1]`, `Code[ch3]`, `Code[ch1,3,5]`, `Code[ch1-4]`. Indices
//! are 1-based. Anything unresolvable (missing field, index out of range)
//! resolves to an empty string instead of an error.

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::{FieldValue, FieldValues};

/// Prefixes of values that carry binary payloads (images, signatures).
const BINARY_PREFIXES: [&str; 2] = ["data:image/", "blob:"];

/// Character selection inside an extraction suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CharSelection {
    Index { at: usize },
    List { at: Vec<usize> },
    Range { from: usize, to: usize },
}

/// The bracketed suffix of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    Word { at: usize },
    Chars { select: CharSelection },
}

impl Extraction {
    /// Parse the text between the brackets (`w1`, `ch1-4`, ...).
    #[must_use]
    pub fn parse(body: &str) -> Option<Self> {
        let body = body.trim();
        if let Some(rest) = body.strip_prefix("ch") {
            return parse_char_selection(rest).map(|select| Self::Chars { select });
        }
        let rest = body.strip_prefix('w')?;
        rest.trim().parse().ok().map(|at| Self::Word { at })
    }

    /// Apply the extraction to a plain value.
    #[must_use]
    pub fn apply(&self, value: &str) -> String {
        match self {
            Self::Word { at } => at
                .checked_sub(1)
                .and_then(|i| value.split_whitespace().nth(i))
                .unwrap_or_default()
                .to_owned(),
            Self::Chars { select } => {
                let chars: Vec<char> = value.chars().collect();
                let pick = |n: usize| n.checked_sub(1).and_then(|i| chars.get(i)).copied();
                match select {
                    CharSelection::Index { at } => pick(*at).map(String::from).unwrap_or_default(),
                    CharSelection::List { at } => at.iter().filter_map(|n| pick(*n)).collect(),
                    CharSelection::Range { from, to } => {
                        if from > to {
                            return String::new();
                        }
                        let start = from.saturating_sub(1).min(chars.len());
                        let end = (*to).min(chars.len());
                        chars[start..end].iter().collect()
                    }
                }
            }
        }
    }
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word { at } => write!(f, "w{at}"),
            Self::Chars { select: CharSelection::Index { at } } => write!(f, "ch{at}"),
            Self::Chars { select: CharSelection::List { at } } => {
                let list: Vec<String> = at.iter().map(ToString::to_string).collect();
                write!(f, "ch{}", list.join(","))
            }
            Self::Chars { select: CharSelection::Range { from, to } } => write!(f, "ch{from}-{to}"),
        }
    }
}

fn parse_char_selection(rest: &str) -> Option<CharSelection> {
    let rest = rest.trim();
    if let Some((from, to)) = rest.split_once('-') {
        return Some(CharSelection::Range { from: from.trim().parse().ok()?, to: to.trim().parse().ok()? });
    }
    if rest.contains(',') {
        let at = rest
            .split(',')
            .map(|n| n.trim().parse().ok())
            .collect::<Option<Vec<usize>>>()?;
        return Some(CharSelection::List { at });
    }
    rest.parse().ok().map(|at| CharSelection::Index { at })
}

/// A parsed dependency reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRef {
    pub field: String,
    pub extraction: Option<Extraction>,
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.extraction {
            Some(extraction) => write!(f, "{}[{extraction}]", self.field),
            None => f.write_str(&self.field),
        }
    }
}

/// Split `Field[suffix]` into name and extraction. An unparseable or
/// unterminated suffix leaves only the field name with no extraction.
#[must_use]
pub fn parse_reference(reference: &str) -> DependencyRef {
    let reference = reference.trim();
    let Some((field, rest)) = reference.split_once('[') else {
        return DependencyRef { field: reference.to_owned(), extraction: None };
    };
    let extraction = rest.strip_suffix(']').and_then(Extraction::parse);
    DependencyRef { field: field.trim().to_owned(), extraction }
}

/// True for values that must never be sliced: data-URL images and blob URLs.
#[must_use]
pub fn is_binary_value(value: &str) -> bool {
    BINARY_PREFIXES.iter().any(|prefix| value.starts_with(prefix))
}

/// Resolve a reference against the current field values.
#[must_use]
pub fn extract_from_dependency(reference: &str, values: &FieldValues) -> String {
    resolve(&parse_reference(reference), values)
}

/// Resolve an already-parsed reference.
#[must_use]
pub fn resolve(reference: &DependencyRef, values: &FieldValues) -> String {
    let Some(value) = values.get(&reference.field) else {
        return String::new();
    };
    let raw = match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Flag(flag) => flag.to_string(),
    };
    if is_binary_value(&raw) {
        return raw;
    }
    match &reference.extraction {
        Some(extraction) => extraction.apply(&raw),
        None => raw,
    }
}
