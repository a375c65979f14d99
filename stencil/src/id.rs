//! Id parsing, validation, and next-token suggestions.
//!
//! Validation never fails hard: an invalid id degrades to "no recognized
//! behavior" for its element and the caller decides whether to block a save.

#[cfg(test)]
#[path = "id_test.rs"]
mod id_test;

use serde::{Deserialize, Serialize};

use crate::grammar::{self, TokenDef, TokenKind};

/// An element id split into its base and dot-separated parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedId {
    pub base_id: String,
    pub parts: Vec<String>,
}

impl ParsedId {
    /// The first part naming a field type, if any.
    #[must_use]
    pub fn field_type_part(&self) -> Option<&str> {
        self.parts
            .iter()
            .map(String::as_str)
            .find(|part| grammar::is_field_type(grammar::token_base(part)))
    }

    /// Base key of the field-type part (`select` for `select_yes`).
    #[must_use]
    pub fn field_type_key(&self) -> Option<&str> {
        self.field_type_part().map(grammar::token_base)
    }

    /// Value of the first part whose base is `key` (`20` for `max_20`).
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|part| grammar::token_base(part).eq_ignore_ascii_case(key))
            .and_then(|part| grammar::token_value(part))
    }

    /// Values of every part whose base is `key`, in order.
    #[must_use]
    pub fn values_of(&self, key: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter(|part| grammar::token_base(part).eq_ignore_ascii_case(key))
            .filter_map(|part| grammar::token_value(part))
            .collect()
    }

    /// True if any part has base `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.parts
            .iter()
            .any(|part| grammar::token_base(part).eq_ignore_ascii_case(key))
    }

    /// Rebuild the raw id string.
    #[must_use]
    pub fn to_id(&self) -> String {
        let mut out = self.base_id.clone();
        for part in &self.parts {
            out.push('.');
            out.push_str(part);
        }
        out
    }
}

/// Split a raw id into base and parts. An id without a dot has no parts.
#[must_use]
pub fn parse_id(id: &str) -> ParsedId {
    match id.split_once('.') {
        Some((base, rest)) => ParsedId {
            base_id: base.to_owned(),
            parts: rest.split('.').map(str::to_owned).collect(),
        },
        None => ParsedId { base_id: id.to_owned(), parts: Vec::new() },
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// A single grammar problem found in an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdIssue {
    /// More than one field-type token.
    MultipleFieldTypes { tokens: Vec<String> },
    /// A non-repeatable token appears more than once.
    DuplicateToken { token: String },
    /// A terminal token is followed by other parts.
    NotLast { token: String },
    /// Part is not in the catalog.
    UnknownToken { token: String },
    /// Token requires a `_value` suffix and has none.
    MissingValue { token: String },
    /// Token is not allowed directly after its predecessor.
    Misplaced { token: String, previous: String },
}

impl IdIssue {
    /// Hard errors make the id invalid; the rest are advisory.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::MultipleFieldTypes { .. } | Self::DuplicateToken { .. } | Self::NotLast { .. })
    }

    fn describe(&self) -> String {
        match self {
            Self::MultipleFieldTypes { tokens } => format!("multiple field types: {}", tokens.join(", ")),
            Self::DuplicateToken { token } => format!("duplicate token: {token}"),
            Self::NotLast { token } => format!("{token} must be the last part"),
            Self::UnknownToken { token } => format!("unknown token: {token}"),
            Self::MissingValue { token } => format!("{token} needs a value ({token}_<value>)"),
            Self::Misplaced { token, previous } => format!("{token} cannot follow {previous}"),
        }
    }
}

/// Result of validating an id. Never an `Err`: invalid ids are data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub is_valid: bool,
    /// Human-readable list of the hard errors, `None` when valid.
    pub error: Option<String>,
    pub issues: Vec<IdIssue>,
}

impl Validation {
    /// Advisory issues (unknown tokens, ordering) that do not invalidate the id.
    #[must_use]
    pub fn warnings(&self) -> Vec<&IdIssue> {
        self.issues.iter().filter(|issue| !issue.is_error()).collect()
    }
}

/// Validate a raw id against the grammar.
#[must_use]
pub fn validate_id(id: &str) -> Validation {
    validate_parsed(&parse_id(id))
}

/// Validate an already-parsed id.
#[must_use]
pub fn validate_parsed(parsed: &ParsedId) -> Validation {
    let mut issues = Vec::new();

    let field_types: Vec<String> = parsed
        .parts
        .iter()
        .filter(|part| grammar::is_field_type(grammar::token_base(part)))
        .cloned()
        .collect();
    if field_types.len() > 1 {
        issues.push(IdIssue::MultipleFieldTypes { tokens: field_types });
    }

    let mut seen: Vec<&str> = Vec::new();
    let last = parsed.parts.len().saturating_sub(1);
    for (index, part) in parsed.parts.iter().enumerate() {
        let base = grammar::token_base(part);
        let Some(def) = grammar::lookup(base) else {
            issues.push(IdIssue::UnknownToken { token: part.clone() });
            continue;
        };

        if def.kind == TokenKind::Extension && !def.repeatable && seen.iter().any(|s| s.eq_ignore_ascii_case(base)) {
            issues.push(IdIssue::DuplicateToken { token: def.key.to_owned() });
        }
        seen.push(base);

        if def.must_be_last && index != last {
            issues.push(IdIssue::NotLast { token: part.clone() });
        }

        if def.requires_value && grammar::token_value(part).is_none_or(str::is_empty) {
            issues.push(IdIssue::MissingValue { token: def.key.to_owned() });
        }

        if def.kind == TokenKind::Extension {
            if let Some(previous) = index.checked_sub(1).map(|i| grammar::token_base(&parsed.parts[i])) {
                if grammar::lookup(previous).is_some() && !def.accepts_after(previous) {
                    issues.push(IdIssue::Misplaced { token: def.key.to_owned(), previous: previous.to_owned() });
                }
            }
        }
    }

    let errors: Vec<String> = issues
        .iter()
        .filter(|issue| issue.is_error())
        .map(IdIssue::describe)
        .collect();

    Validation {
        is_valid: errors.is_empty(),
        error: (!errors.is_empty()).then(|| errors.join("; ")),
        issues,
    }
}

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// Candidate tokens for the next part of an id.
///
/// `parts` are the parts typed so far; if the last one equals `partial` it is
/// the token still being typed and is ignored when picking the predecessor.
#[must_use]
pub fn suggest_next(_base_id: &str, parts: &[String], partial: &str) -> Vec<&'static TokenDef> {
    let complete = match parts.split_last() {
        Some((last, rest)) if !partial.is_empty() && last == partial => rest,
        _ => parts,
    };

    let has_field_type = complete
        .iter()
        .any(|part| grammar::is_field_type(grammar::token_base(part)));
    if !has_field_type {
        return grammar::field_types()
            .iter()
            .filter(|def| def.matches_prefix(partial))
            .collect();
    }

    if complete
        .iter()
        .any(|part| grammar::token_base(part).eq_ignore_ascii_case("track"))
    {
        return Vec::new();
    }

    let Some(previous) = complete.last().map(|part| grammar::token_base(part)) else {
        return Vec::new();
    };

    grammar::extensions()
        .iter()
        .filter(|def| def.accepts_after(previous))
        .filter(|def| {
            def.repeatable
                || !complete
                    .iter()
                    .any(|part| grammar::token_base(part).eq_ignore_ascii_case(def.key))
        })
        .filter(|def| def.matches_prefix(partial))
        .collect()
}

/// Suggestions for raw editor input with the cursor at the end.
///
/// Text after the last `.` is the partial token; an input without a dot is
/// still typing its base id and gets no suggestions.
#[must_use]
pub fn suggest_for_input(raw: &str) -> Vec<&'static TokenDef> {
    if !raw.contains('.') {
        return Vec::new();
    }
    let parsed = parse_id(raw);
    let partial = parsed.parts.last().map_or("", String::as_str);
    // The partial token is a prefix, never a finished part, so drop it.
    let complete = &parsed.parts[..parsed.parts.len().saturating_sub(1)];
    suggest_next(&parsed.base_id, complete, grammar::token_base(partial))
}
