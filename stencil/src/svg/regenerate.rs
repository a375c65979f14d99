//! Full regeneration: write an edited element list back into the source
//! document.
//!
//! Elements are matched to source nodes through their [`Origin`]. Nodes
//! with no element are removed (their listed descendants move up into the
//! removed node's slot), clones are inserted next to their source, and
//! siblings are permuted into list order. Everything outside the
//! editable nodes (defs, styles, comments, whitespace) passes through.

#[cfg(test)]
#[path = "regenerate_test.rs"]
mod regenerate_test;

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::SvgError;
use super::dom::{Attribute, Document, NodeId, XLINK_NS, XML_NS};
use super::element::{self, Origin, SvgElement};
use super::transform::{self, num};
use super::wrap::{self, HeuristicMeasure, MAX_WIDTH_ATTRIBUTE, TextMeasure};

/// Regenerate with the default text measure. On a parse failure the
/// original text is returned unchanged.
#[must_use]
pub fn regenerate(original: &str, elements: &[SvgElement]) -> String {
    regenerate_with(original, elements, &HeuristicMeasure::default())
}

#[must_use]
pub fn regenerate_with(original: &str, elements: &[SvgElement], measure: &dyn TextMeasure) -> String {
    match try_regenerate(original, elements, measure) {
        Ok(svg) => svg,
        Err(err) => {
            warn!(%err, "regeneration failed; returning original svg");
            original.to_owned()
        }
    }
}

/// # Errors
///
/// Returns the parse error of the original document.
pub fn try_regenerate(original: &str, elements: &[SvgElement], measure: &dyn TextMeasure) -> Result<String, SvgError> {
    let (doc, _) = project(original, elements, measure)?;
    Ok(doc.to_string())
}

/// Build the edited document. Also returns, per element, the node it was
/// written to (`None` when its origin no longer exists).
pub(crate) fn project(
    original: &str,
    elements: &[SvgElement],
    measure: &dyn TextMeasure,
) -> Result<(Document, Vec<Option<NodeId>>), SvgError> {
    let mut doc = Document::parse(original)?;
    let nodes = element::editable_nodes(&doc);
    let mut used = vec![false; nodes.len()];

    let mut placed = Vec::with_capacity(elements.len());
    for element in elements {
        let index = element.origin.index();
        let Some(source) = nodes.get(index).copied() else {
            warn!(internal_id = %element.internal_id, index, "element origin is outside the document");
            placed.push(None);
            continue;
        };
        let node = match element.origin {
            Origin::Source(_) if !used[index] => {
                used[index] = true;
                source
            }
            _ => {
                let copy = doc.deep_clone(source);
                doc.insert_after(source, copy);
                copy
            }
        };
        placed.push(Some(node));
    }

    let kept: HashSet<NodeId> = placed.iter().flatten().copied().collect();
    for (index, node) in nodes.iter().enumerate() {
        if used[index] {
            continue;
        }
        if doc.descendant_elements(*node).iter().any(|d| kept.contains(d)) {
            doc.hoist_children(*node);
        } else {
            doc.detach(*node);
        }
    }

    reorder(&mut doc, &placed);

    for (element, node) in elements.iter().zip(&placed) {
        if let Some(node) = node {
            apply_element(&mut doc, *node, element, measure);
        }
    }
    Ok((doc, placed))
}

/// Permute sibling nodes into list order, reusing the slots they occupy.
fn reorder(doc: &mut Document, placed: &[Option<NodeId>]) {
    let mut by_parent: IndexMap<NodeId, Vec<NodeId>> = IndexMap::new();
    for node in placed.iter().flatten() {
        if let Some(parent) = doc.parent(*node) {
            by_parent.entry(parent).or_default().push(*node);
        }
    }
    for (parent, wanted) in by_parent {
        let mut children = doc.children(parent).to_vec();
        let mut slots: Vec<usize> = wanted
            .iter()
            .filter_map(|node| children.iter().position(|c| c == node))
            .collect();
        slots.sort_unstable();
        for (slot, node) in slots.into_iter().zip(wanted) {
            children[slot] = node;
        }
        doc.reorder_children(parent, children);
    }
}

/// Write one element onto its node: attributes replaced wholesale, CSS
/// transform consolidated, text rewritten when it changed.
pub(crate) fn apply_element(doc: &mut Document, node: NodeId, element: &SvgElement, measure: &dyn TextMeasure) {
    let previous_text = element.inner_text.as_ref().map(|_| element::read_text(doc, node));
    let previous_width = doc.attribute(node, MAX_WIDTH_ATTRIBUTE).map(str::to_owned);
    let namespaces: HashMap<String, Option<String>> = doc
        .element(node)
        .map(|data| {
            data.attributes
                .iter()
                .map(|a| (a.name.clone(), a.namespace.clone()))
                .collect()
        })
        .unwrap_or_default();

    let mut attributes = element.attributes.clone();
    transform::normalize(&element.tag, &mut attributes, element.inner_text.as_deref());

    doc.clear_attributes(node);
    for (name, value) in &attributes {
        if value.is_empty() {
            continue;
        }
        write_attribute(doc, node, &element.tag, name, value, &namespaces);
    }

    let Some(text) = &element.inner_text else {
        return;
    };
    let width_unchanged = previous_width.as_deref() == attributes.get(MAX_WIDTH_ATTRIBUTE).map(String::as_str);
    if previous_text.as_deref() == Some(text.as_str()) && width_unchanged {
        return;
    }
    write_text(doc, node, text, &attributes, measure);
}

fn write_attribute(
    doc: &mut Document,
    node: NodeId,
    tag: &str,
    name: &str,
    value: &str,
    namespaces: &HashMap<String, Option<String>>,
) {
    if name == "xlink:href" || (name == "href" && tag == "image") {
        doc.set_attribute_ns(node, Some(XLINK_NS), "xlink:href", value);
    } else if name.starts_with("xml:") {
        doc.set_attribute_ns(node, Some(XML_NS), name, value);
    } else if let Some(Some(uri)) = namespaces.get(name) {
        doc.set_attribute_ns(node, Some(uri.as_str()), name, value);
    } else {
        if name.contains(':') {
            debug!(attribute = name, "prefixed attribute without a known namespace");
        }
        doc.set_attribute(node, name, value);
    }
}

/// Replace a text node's content, as `tspan` lines when it has newlines or
/// a wrap width.
fn write_text(doc: &mut Document, node: NodeId, text: &str, attributes: &IndexMap<String, String>, measure: &dyn TextMeasure) {
    if !wrap::needs_lines(text, attributes) {
        doc.set_text(node, text);
        return;
    }

    let size = wrap::font_size(attributes);
    let lines = wrap::wrap_lines(text, wrap::max_width(attributes), size, measure);
    let x = attributes
        .get("x")
        .and_then(|raw| raw.split_whitespace().next())
        .unwrap_or("0")
        .to_owned();
    let y = attributes
        .get("y")
        .and_then(|raw| wrap::leading_number(raw))
        .unwrap_or(0.0);
    let span_name = match doc.element(node).and_then(|data| data.name.split_once(':')) {
        Some((prefix, _)) => format!("{prefix}:tspan"),
        None => "tspan".to_owned(),
    };

    doc.clear_children(node);
    for line in wrap::layout(lines, y, size) {
        let span = doc.append_element(
            node,
            &span_name,
            vec![
                Attribute { name: "x".to_owned(), namespace: None, value: x.clone() },
                Attribute { name: "y".to_owned(), namespace: None, value: num(line.y) },
            ],
        );
        if !line.text.is_empty() {
            doc.append_text(span, &line.text);
        }
    }
}
