//! Token catalog for the id-suffix grammar.
//!
//! An annotated element id looks like `Name.text.max_20.track_buyer`: a base
//! id followed by dot-separated parts. The first part that names a field type
//! selects the form control; every later part is an extension that refines
//! it. This module holds the static tables describing every recognized token
//! and the small predicates the parser and suggestion engine share.

#[cfg(test)]
#[path = "grammar_test.rs"]
mod grammar_test;

use serde::Serialize;

/// Whether a token selects the field type or refines an existing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    FieldType,
    Extension,
}

/// One entry of the grammar catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenDef {
    /// Token key as written in the id (before any `_value` suffix).
    pub key: &'static str,
    pub kind: TokenKind,
    /// The token must carry a `_<value>` suffix (`max_20`, `select_yes`).
    pub requires_value: bool,
    /// Tokens this one may directly follow. Empty for field types, which
    /// always come first.
    pub allowed_after: &'static [&'static str],
    /// Nothing may follow this token.
    pub must_be_last: bool,
    /// The token may appear more than once in one id.
    pub repeatable: bool,
    /// Short description shown by authoring tools.
    pub description: &'static str,
}

impl TokenDef {
    /// True if this token may directly follow a part whose base is `previous`.
    #[must_use]
    pub fn accepts_after(&self, previous: &str) -> bool {
        self.allowed_after
            .iter()
            .any(|key| key.eq_ignore_ascii_case(previous))
    }

    /// True if `prefix` is a case-insensitive prefix of the key.
    #[must_use]
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.key.len() >= prefix.len()
            && self.key.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    }
}

const TEXT_LIKE: [&str; 6] = ["text", "textarea", "number", "date", "email", "tel"];

const fn field_type(key: &'static str, requires_value: bool, description: &'static str) -> TokenDef {
    TokenDef {
        key,
        kind: TokenKind::FieldType,
        requires_value,
        allowed_after: &[],
        must_be_last: false,
        repeatable: false,
        description,
    }
}

static FIELD_TYPES: [TokenDef; 11] = [
    field_type("text", false, "Single-line text"),
    field_type("textarea", false, "Multi-line text, wrapped to the element width"),
    field_type("number", false, "Numeric text"),
    field_type("date", false, "Date text"),
    field_type("email", false, "Email address"),
    field_type("tel", false, "Phone number"),
    field_type("checkbox", false, "Element is shown only when checked"),
    field_type("select", true, "Option group member: select_<value>"),
    field_type("upload", false, "Uploaded image injected into the element"),
    field_type("sign", false, "Drawn signature injected into the element"),
    field_type("gen", false, "Value produced by a generation rule"),
];

static EXTENSIONS: [TokenDef; 7] = [
    TokenDef {
        key: "max",
        kind: TokenKind::Extension,
        requires_value: true,
        allowed_after: &["text", "textarea", "number", "date", "email", "tel", "gen", "min", "req", "depends", "editable"],
        must_be_last: false,
        repeatable: false,
        description: "Maximum length: max_<n> or max_<n>:<pad char>",
    },
    TokenDef {
        key: "min",
        kind: TokenKind::Extension,
        requires_value: true,
        allowed_after: &["text", "textarea", "number", "date", "email", "tel", "max", "req"],
        must_be_last: false,
        repeatable: false,
        description: "Minimum length: min_<n>",
    },
    TokenDef {
        key: "depends",
        kind: TokenKind::Extension,
        requires_value: true,
        allowed_after: &[
            "text", "textarea", "number", "date", "email", "tel", "upload", "sign", "gen", "max", "min", "editable",
            "req",
        ],
        must_be_last: false,
        repeatable: false,
        description: "Derive the value from another field: depends_<field>[w1]",
    },
    TokenDef {
        key: "editable",
        kind: TokenKind::Extension,
        requires_value: false,
        allowed_after: &["gen", "depends", "max", "req"],
        must_be_last: false,
        repeatable: false,
        description: "User may override a derived or generated value",
    },
    TokenDef {
        key: "req",
        kind: TokenKind::Extension,
        requires_value: false,
        allowed_after: &[
            "text", "textarea", "number", "date", "email", "tel", "checkbox", "select", "upload", "sign", "gen", "max",
            "min", "depends", "editable", "link",
        ],
        must_be_last: false,
        repeatable: false,
        description: "Field must be filled before export",
    },
    TokenDef {
        key: "link",
        kind: TokenKind::Extension,
        requires_value: true,
        allowed_after: &["text", "textarea", "number", "date", "email", "tel", "max", "min", "req", "link"],
        must_be_last: false,
        repeatable: true,
        description: "Copy this field's value into another field: link_<field>",
    },
    TokenDef {
        key: "track",
        kind: TokenKind::Extension,
        requires_value: true,
        allowed_after: &[
            "text", "textarea", "number", "date", "email", "tel", "checkbox", "select", "upload", "sign", "gen", "max",
            "min", "depends", "editable", "req", "link",
        ],
        must_be_last: true,
        repeatable: false,
        description: "Report the value under a tracking role: track_<role>",
    },
];

/// All field-type tokens in catalog order.
#[must_use]
pub fn field_types() -> &'static [TokenDef] {
    &FIELD_TYPES
}

/// All extension tokens in catalog order.
#[must_use]
pub fn extensions() -> &'static [TokenDef] {
    &EXTENSIONS
}

/// Look up a token by key (case-insensitive), in either table.
#[must_use]
pub fn lookup(key: &str) -> Option<&'static TokenDef> {
    FIELD_TYPES
        .iter()
        .chain(EXTENSIONS.iter())
        .find(|def| def.key.eq_ignore_ascii_case(key))
}

/// True if `base` names a field type.
#[must_use]
pub fn is_field_type(base: &str) -> bool {
    FIELD_TYPES.iter().any(|def| def.key.eq_ignore_ascii_case(base))
}

/// True if `base` names a field type whose values are plain text.
#[must_use]
pub fn is_text_like(base: &str) -> bool {
    TEXT_LIKE.iter().any(|key| key.eq_ignore_ascii_case(base))
}

/// The token key of an id part: everything before the first `_`.
///
/// `max_20` → `max`, `depends_First_Name` → `depends`, `text` → `text`.
#[must_use]
pub fn token_base(part: &str) -> &str {
    part.split_once('_').map_or(part, |(base, _)| base)
}

/// The value carried by an id part: everything after the first `_`.
#[must_use]
pub fn token_value(part: &str) -> Option<&str> {
    part.split_once('_').map(|(_, value)| value)
}
