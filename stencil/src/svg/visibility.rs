//! Show/hide state of elements and option groups.
//!
//! Hidden means `display: none`, `visibility: hidden` or `opacity: 0`, as an
//! attribute or inside `style`. Showing and hiding always write all three so
//! renderers that only honor one of them agree.

#[cfg(test)]
#[path = "visibility_test.rs"]
mod visibility_test;

use indexmap::IndexMap;

use super::element::SvgElement;
use super::style;
use crate::id;

#[must_use]
pub fn is_hidden(attributes: &IndexMap<String, String>) -> bool {
    let read = |name: &str| {
        style::get_property(attributes, name).or_else(|| attributes.get(name).cloned())
    };
    if read("display").is_some_and(|v| v.trim().eq_ignore_ascii_case("none")) {
        return true;
    }
    if read("visibility").is_some_and(|v| {
        let v = v.trim();
        v.eq_ignore_ascii_case("hidden") || v.eq_ignore_ascii_case("collapse")
    }) {
        return true;
    }
    read("opacity").is_some_and(|v| v.trim().parse::<f64>().is_ok_and(|o| o <= 0.0))
}

pub fn show(attributes: &mut IndexMap<String, String>) {
    for property in ["display", "visibility", "opacity"] {
        style::set_property(attributes, property, None);
    }
    attributes.shift_remove("display");
    attributes.insert("opacity".to_owned(), "1".to_owned());
    attributes.insert("visibility".to_owned(), "visible".to_owned());
}

pub fn hide(attributes: &mut IndexMap<String, String>) {
    for property in ["display", "visibility", "opacity"] {
        style::set_property(attributes, property, None);
    }
    attributes.insert("opacity".to_owned(), "0".to_owned());
    attributes.insert("visibility".to_owned(), "hidden".to_owned());
    attributes.insert("display".to_owned(), "none".to_owned());
}

pub fn set_visible(attributes: &mut IndexMap<String, String>, visible: bool) {
    if visible {
        show(attributes);
    } else {
        hide(attributes);
    }
}

/// Indices of the `select` elements belonging to `base_id`, with their
/// option values.
#[must_use]
pub fn option_group(elements: &[SvgElement], base_id: &str) -> Vec<(usize, String)> {
    elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| {
            let parsed = id::parse_id(element.id.as_deref()?);
            if parsed.base_id != base_id || parsed.field_type_key() != Some("select") {
                return None;
            }
            Some((index, parsed.value_of("select").unwrap_or_default().to_owned()))
        })
        .collect()
}

/// Make exactly one member of an option group visible.
///
/// An empty or unknown `selected` value shows the first member. Returns the
/// indices of members whose visibility changed.
pub fn apply_option_selection(elements: &mut [SvgElement], base_id: &str, selected: &str) -> Vec<usize> {
    let group = option_group(elements, base_id);
    let Some(first) = group.first().map(|(index, _)| *index) else {
        return Vec::new();
    };
    let visible = group
        .iter()
        .find(|(_, value)| !selected.is_empty() && value == selected)
        .map_or(first, |(index, _)| *index);

    let mut changed = Vec::new();
    for (index, _) in group {
        let attributes = &mut elements[index].attributes;
        let before = attributes.clone();
        set_visible(attributes, index == visible);
        if *attributes != before {
            changed.push(index);
        }
    }
    changed
}
