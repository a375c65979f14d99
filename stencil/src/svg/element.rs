//! Editable elements extracted from a document.
//!
//! Editable elements are the descendants of the root in document order,
//! minus resource containers (`defs`, gradients, filters, ...) and minus the
//! `tspan` children of `text`, which belong to their parent's text. The same
//! enumeration is used when regenerating, so an element's [`Origin`] always
//! points at the node it was read from.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::SvgError;
use super::dom::{Document, NodeId};
use crate::id::{self, ParsedId};

/// Subtrees never offered for editing: resource containers plus
/// `metadata` and gradient `stop`s. Filter primitives are matched by prefix
/// in `is_skipped`. Parsing and regeneration share this list, so changing it
/// shifts every `Origin` index.
const SKIPPED_TAGS: &[&str] = &[
    "defs",
    "style",
    "metadata",
    "linearGradient",
    "radialGradient",
    "pattern",
    "clipPath",
    "mask",
    "filter",
    "stop",
];

/// Where an element came from, used to line it up with the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Origin {
    /// The n-th editable node of the source document.
    Source(usize),
    /// A copy of the n-th editable node.
    Clone(usize),
}

impl Origin {
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Source(index) | Self::Clone(index) => index,
        }
    }
}

/// One editable element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvgElement {
    pub tag: String,
    /// Current `id` attribute.
    pub id: Option<String>,
    /// `id` attribute when the document was loaded.
    pub original_id: Option<String>,
    /// Stable key, unique within a document.
    pub internal_id: String,
    pub attributes: IndexMap<String, String>,
    /// Text of a `text` element; positioned `tspan` lines are joined by `\n`.
    pub inner_text: Option<String>,
    pub origin: Origin,
}

impl SvgElement {
    /// Image reference, from `href` or `xlink:href`.
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        self.attributes
            .get("href")
            .or_else(|| self.attributes.get("xlink:href"))
            .map(String::as_str)
    }

    /// Set the image reference, reusing whichever attribute is present.
    pub fn set_href(&mut self, value: &str) {
        let key = if self.attributes.contains_key("xlink:href") { "xlink:href" } else { "href" };
        self.attributes.insert(key.to_owned(), value.to_owned());
    }

    #[must_use]
    pub fn parsed_id(&self) -> Option<ParsedId> {
        self.id.as_deref().map(id::parse_id)
    }

    /// Set the id, keeping the `id` attribute in sync.
    pub fn set_id(&mut self, value: Option<String>) {
        match &value {
            Some(v) if !v.is_empty() => {
                self.attributes.insert("id".to_owned(), v.clone());
            }
            _ => {
                self.attributes.shift_remove("id");
            }
        }
        self.id = value.filter(|v| !v.is_empty());
    }

    /// Set one attribute. An `id` attribute also updates `id`; an empty value
    /// removes the attribute.
    pub fn set_attribute(&mut self, name: &str, value: Option<String>) {
        if name == "id" {
            self.set_id(value);
            return;
        }
        match value {
            Some(v) if !v.is_empty() => {
                self.attributes.insert(name.to_owned(), v);
            }
            _ => {
                self.attributes.shift_remove(name);
            }
        }
    }
}

/// Editable nodes of a document, in document order.
#[must_use]
pub fn editable_nodes(doc: &Document) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = doc.children(doc.root()).iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        let Some(tag) = doc.tag(node) else {
            continue;
        };
        if is_skipped(tag) {
            continue;
        }
        out.push(node);
        // Lines of a text element are part of its `inner_text`.
        if tag != "text" {
            stack.extend(doc.children(node).iter().rev().copied());
        }
    }
    out
}

fn is_skipped(tag: &str) -> bool {
    if SKIPPED_TAGS.contains(&tag) {
        return true;
    }
    // Filter primitives: feGaussianBlur, feOffset, ...
    tag.strip_prefix("fe").is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
}

/// Parse SVG text into its editable elements.
///
/// # Errors
///
/// Returns an error for malformed XML or a non-`svg` root.
pub fn parse_elements(text: &str) -> Result<Vec<SvgElement>, SvgError> {
    let doc = Document::parse(text)?;
    let nodes = editable_nodes(&doc);
    Ok(elements_from_nodes(&doc, &nodes))
}

/// Build elements for already enumerated nodes.
#[must_use]
pub fn elements_from_nodes(doc: &Document, nodes: &[NodeId]) -> Vec<SvgElement> {
    let mut taken = HashSet::new();
    nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let data = doc.element(*node)?;
            let tag = data.local_name().to_owned();
            let attributes: IndexMap<String, String> = data
                .attributes
                .iter()
                .map(|a| (a.name.clone(), a.value.clone()))
                .collect();
            let id = attributes.get("id").filter(|v| !v.is_empty()).cloned();
            let candidate = id.clone().unwrap_or_else(|| format!("{tag}_{index}"));
            let internal_id = unique_name(&candidate, &taken);
            taken.insert(internal_id.clone());
            let inner_text = (tag == "text").then(|| read_text(doc, *node));
            Some(SvgElement {
                tag,
                original_id: id.clone(),
                id,
                internal_id,
                attributes,
                inner_text,
                origin: Origin::Source(index),
            })
        })
        .collect()
}

/// Text of a `text` node. Positioned `tspan` children count as lines.
#[must_use]
pub fn read_text(doc: &Document, node: NodeId) -> String {
    let spans = doc.child_elements(node);
    let positioned = !spans.is_empty()
        && doc.own_text(node).trim().is_empty()
        && spans.iter().all(|span| {
            doc.tag(*span) == Some("tspan")
                && ["x", "y", "dy"].iter().any(|a| doc.attribute(*span, a).is_some())
        });
    if positioned {
        spans
            .iter()
            .map(|span| doc.text_content(*span))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        doc.text_content(node)
    }
}

/// `candidate`, or `candidate_2`, `candidate_3`, ... if already taken.
#[must_use]
pub fn unique_name(candidate: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(candidate) {
        return candidate.to_owned();
    }
    (2..)
        .map(|n| format!("{candidate}_{n}"))
        .find(|name| !taken.contains(name))
        .unwrap_or_else(|| candidate.to_owned())
}
