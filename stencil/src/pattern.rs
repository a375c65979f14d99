//! Generation-rule syntax: tokenizer, AST, and printer.
//!
//! A rule is literal text with parenthesized directives:
//!
//! | Directive | Part |
//! |-----------|------|
//! | `(dep_Name)`, `(dep_Name[w1])` | [`PatternPart::Dep`] |
//! | `(rn[4])` | four random digits |
//! | `(rc[4])`, `(ru[4])`, `(rl[4])` | four random letters: mixed, upper, lower |
//! | `(ab[5])` | `ab` repeated then cut to five chars: `ababa` |
//! | `(0[fill])` | `0` repeated to fill the remaining length budget |
//!
//! Unrecognized or unterminated directives stay literal text. A rule may start
//! with `AUTO:`, which only controls when the rule is evaluated.

#[cfg(test)]
#[path = "pattern_test.rs"]
mod pattern_test;

use serde::{Deserialize, Serialize};

use crate::extract::{self, Extraction};

/// Marker prefix for rules evaluated automatically.
pub const AUTO_PREFIX: &str = "AUTO:";

/// Character pool of a random directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Charset {
    /// `rn`: 0-9.
    Digits,
    /// `rc`: a-z and A-Z.
    Letters,
    /// `ru`: A-Z.
    Upper,
    /// `rl`: a-z.
    Lower,
}

impl Charset {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "rn" => Some(Self::Digits),
            "rc" => Some(Self::Letters),
            "ru" => Some(Self::Upper),
            "rl" => Some(Self::Lower),
            _ => None,
        }
    }

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Digits => "rn",
            Self::Letters => "rc",
            Self::Upper => "ru",
            Self::Lower => "rl",
        }
    }
}

/// One compiled piece of a generation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternPart {
    Static { text: String },
    Dep { field: String, extraction: Option<Extraction> },
    Random { charset: Charset, count: usize },
    Repeat { chars: String, count: usize },
    Fill { chars: String },
}

/// A parsed rule: the `AUTO:` flag plus its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub auto: bool,
    pub parts: Vec<PatternPart>,
}

impl Rule {
    #[must_use]
    pub fn parse(rule: &str) -> Self {
        let (auto, body) = split_auto(rule);
        Self { auto, parts: parse_pattern(body) }
    }

    /// Field names this rule reads, in order of first appearance.
    #[must_use]
    pub fn dependencies(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for part in &self.parts {
            if let PatternPart::Dep { field, .. } = part {
                if !out.contains(&field.as_str()) {
                    out.push(field);
                }
            }
        }
        out
    }

    #[must_use]
    pub fn has_fill(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, PatternPart::Fill { .. }))
    }

    /// True if the rule produces the same output on every evaluation for
    /// the same inputs.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        !self.parts.iter().any(|p| matches!(p, PatternPart::Random { .. }))
    }
}

/// Strip the `AUTO:` marker. Returns whether it was present and the rest.
#[must_use]
pub fn split_auto(rule: &str) -> (bool, &str) {
    match rule.trim_start().strip_prefix(AUTO_PREFIX) {
        Some(rest) => (true, rest),
        None => (false, rule),
    }
}

/// Tokenize a rule body (without `AUTO:`) into parts.
///
/// Adjacent literal runs are merged. Only the first `[fill]` directive is
/// compiled; later ones stay literal.
#[must_use]
pub fn parse_pattern(rule: &str) -> Vec<PatternPart> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut has_fill = false;
    let mut rest = rule;

    while let Some(open) = rest.find('(') {
        literal.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(')') else {
            literal.push_str(&rest[open..]);
            rest = "";
            break;
        };

        let body = &after[..close];
        match compile_directive(body) {
            Some(PatternPart::Fill { .. }) if has_fill => {
                literal.push_str(&rest[open..=open + 1 + close]);
            }
            Some(part) => {
                has_fill |= matches!(part, PatternPart::Fill { .. });
                flush_literal(&mut literal, &mut parts);
                parts.push(part);
            }
            None => literal.push_str(&rest[open..=open + 1 + close]),
        }
        rest = &after[close + 1..];
    }
    literal.push_str(rest);
    flush_literal(&mut literal, &mut parts);
    parts
}

fn flush_literal(literal: &mut String, parts: &mut Vec<PatternPart>) {
    if !literal.is_empty() {
        parts.push(PatternPart::Static { text: std::mem::take(literal) });
    }
}

fn compile_directive(body: &str) -> Option<PatternPart> {
    if let Some(reference) = body.strip_prefix("dep_") {
        let dep = extract::parse_reference(reference);
        if dep.field.is_empty() {
            return None;
        }
        return Some(PatternPart::Dep { field: dep.field, extraction: dep.extraction });
    }

    let inner = body.strip_suffix(']')?;
    let (head, arg) = inner.rsplit_once('[')?;
    if head.is_empty() {
        return None;
    }
    if arg == "fill" {
        return Some(PatternPart::Fill { chars: head.to_owned() });
    }
    let count: usize = arg.parse().ok()?;
    Some(match Charset::from_keyword(head) {
        Some(charset) => PatternPart::Random { charset, count },
        None => PatternPart::Repeat { chars: head.to_owned(), count },
    })
}

/// Render parts back into rule text.
#[must_use]
pub fn build_pattern(parts: &[PatternPart]) -> String {
    let mut out = String::new();
    for part in parts {
        match part {
            PatternPart::Static { text } => out.push_str(text),
            PatternPart::Dep { field, extraction: Some(extraction) } => {
                out.push_str(&format!("(dep_{field}[{extraction}])"));
            }
            PatternPart::Dep { field, extraction: None } => out.push_str(&format!("(dep_{field})")),
            PatternPart::Random { charset, count } => out.push_str(&format!("({}[{count}])", charset.keyword())),
            PatternPart::Repeat { chars, count } => out.push_str(&format!("({chars}[{count}])")),
            PatternPart::Fill { chars } => out.push_str(&format!("({chars}[fill])")),
        }
    }
    out
}
