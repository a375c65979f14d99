//! Inline `style` attribute helpers.
//!
//! Declarations keep their order; property names are compared
//! case-insensitively.

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use indexmap::IndexMap;

/// Split `a: 1; b: 2` into ordered `(property, value)` pairs.
#[must_use]
pub fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            if property.is_empty() {
                return None;
            }
            Some((property.to_ascii_lowercase(), value.trim().to_owned()))
        })
        .collect()
}

#[must_use]
pub fn format_style(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(property, value)| format!("{property}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Value of a style property on an attribute map.
#[must_use]
pub fn get_property(attributes: &IndexMap<String, String>, property: &str) -> Option<String> {
    let style = attributes.get("style")?;
    parse_style(style)
        .into_iter()
        .find(|(p, _)| p.eq_ignore_ascii_case(property))
        .map(|(_, v)| v)
}

/// Set (or with `None`, remove) a style property. An empty style attribute
/// is dropped.
pub fn set_property(attributes: &mut IndexMap<String, String>, property: &str, value: Option<&str>) {
    let mut declarations = attributes.get("style").map(|s| parse_style(s)).unwrap_or_default();
    let position = declarations.iter().position(|(p, _)| p.eq_ignore_ascii_case(property));
    match (position, value) {
        (Some(i), Some(value)) => declarations[i].1 = value.to_owned(),
        (None, Some(value)) => declarations.push((property.to_ascii_lowercase(), value.to_owned())),
        (Some(i), None) => {
            declarations.remove(i);
        }
        (None, None) => return,
    }
    write_style(attributes, &declarations);
}

/// Remove a style property and return its value.
pub fn take_property(attributes: &mut IndexMap<String, String>, property: &str) -> Option<String> {
    let value = get_property(attributes, property)?;
    set_property(attributes, property, None);
    Some(value)
}

fn write_style(attributes: &mut IndexMap<String, String>, declarations: &[(String, String)]) {
    if declarations.is_empty() {
        attributes.shift_remove("style");
    } else {
        attributes.insert("style".to_owned(), format_style(declarations));
    }
}
