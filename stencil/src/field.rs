//! Form fields derived from annotated elements.
//!
//! Every element whose id carries a field-type token becomes (part of) a
//! [`FormField`]. Elements sharing a base id bind to the same field; for
//! `select` they are the options of one group.

#[cfg(test)]
#[path = "field_test.rs"]
mod field_test;

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generate::MaxSpec;
use crate::id::{self, ParsedId};
use crate::svg::element::SvgElement;
use crate::svg::visibility;

/// Element attribute carrying a generation rule for `gen` fields.
pub const GEN_RULE_ATTRIBUTE: &str = "data-gen-rule";

/// A resolved field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    /// Text form of the value; flags render as `true`/`false`.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Flag(flag) => flag.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Truthiness: flags as-is, text when it is `true`, `yes`, `on` or `1`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Text(text) => matches!(text.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "on" | "1"),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Field id → value.
pub type FieldValues = HashMap<String, FieldValue>;

/// One variant per recognized field-type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Date,
    Email,
    Tel,
    Checkbox,
    Select,
    Upload,
    Sign,
    Gen,
}

impl FieldType {
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "textarea" => Some(Self::Textarea),
            "number" => Some(Self::Number),
            "date" => Some(Self::Date),
            "email" => Some(Self::Email),
            "tel" => Some(Self::Tel),
            "checkbox" => Some(Self::Checkbox),
            "select" => Some(Self::Select),
            "upload" => Some(Self::Upload),
            "sign" => Some(Self::Sign),
            "gen" => Some(Self::Gen),
            _ => None,
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Date => "date",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Upload => "upload",
            Self::Sign => "sign",
            Self::Gen => "gen",
        }
    }

    /// Image-valued types whose values are data URLs.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Upload | Self::Sign)
    }

    /// Types whose value is written into the element's text.
    #[must_use]
    pub fn writes_text(self) -> bool {
        matches!(
            self,
            Self::Text | Self::Textarea | Self::Number | Self::Date | Self::Email | Self::Tel | Self::Gen
        )
    }
}

/// A form field as consumed by the form renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub current_value: FieldValue,
    pub default_value: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
    /// Legacy `max_<n>:<pad>` spec, present only when a pad char is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_spec: Option<MaxSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(default)]
    pub touched: bool,
    /// Internal ids of the elements bound to this field.
    #[serde(default)]
    pub element_ids: Vec<String>,
}

impl FormField {
    /// A bare field of the given type with empty values.
    #[must_use]
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        let empty = if field_type == FieldType::Checkbox { FieldValue::Flag(false) } else { FieldValue::default() };
        Self {
            id: id.into(),
            field_type,
            current_value: empty.clone(),
            default_value: empty,
            generation_rule: None,
            depends_on: None,
            max: None,
            max_spec: None,
            min: None,
            options: Vec::new(),
            editable: false,
            required: false,
            track: None,
            links: Vec::new(),
            touched: false,
            element_ids: Vec::new(),
        }
    }

    /// True if the user may type into this field directly.
    #[must_use]
    pub fn is_user_editable(&self) -> bool {
        let derived = self.field_type == FieldType::Gen || self.depends_on.is_some();
        !derived || self.editable
    }

    fn apply_tokens(&mut self, parsed: &ParsedId) {
        if let Some(raw) = parsed.value_of("max") {
            if let Some(spec) = MaxSpec::parse(raw) {
                self.max = Some(spec.length);
                self.max_spec = spec.pad.is_some().then_some(spec);
            }
        }
        self.min = parsed.value_of("min").and_then(|raw| raw.trim().parse().ok());
        self.depends_on = parsed
            .value_of("depends")
            .filter(|raw| !raw.is_empty())
            .map(str::to_owned);
        self.editable = parsed.has("editable");
        self.required = parsed.has("req");
        self.track = parsed
            .value_of("track")
            .filter(|raw| !raw.is_empty())
            .map(str::to_owned);
        self.links = parsed
            .values_of("link")
            .into_iter()
            .filter(|raw| !raw.is_empty())
            .map(str::to_owned)
            .collect();
    }
}

/// Derive the field catalog from a document's elements.
///
/// Elements with invalid ids or no field-type token are skipped. Fields keep
/// the order in which their first element appears.
#[must_use]
pub fn build_fields(elements: &[SvgElement]) -> Vec<FormField> {
    let mut fields: IndexMap<String, FormField> = IndexMap::new();
    let mut selected: HashMap<String, String> = HashMap::new();

    for element in elements {
        let Some(raw_id) = element.id.as_deref() else {
            continue;
        };
        let parsed = id::parse_id(raw_id);
        let validation = id::validate_parsed(&parsed);
        if !validation.is_valid {
            debug!(id = raw_id, error = ?validation.error, "skipping element with invalid id");
            continue;
        }
        let Some(field_type) = parsed.field_type_key().and_then(FieldType::from_key) else {
            continue;
        };

        if let Some(field) = fields.get_mut(&parsed.base_id) {
            if field.field_type != field_type {
                debug!(id = raw_id, field = %parsed.base_id, "element type conflicts with existing field");
                continue;
            }
            field.element_ids.push(element.internal_id.clone());
        } else {
            let mut field = FormField::new(parsed.base_id.clone(), field_type);
            field.apply_tokens(&parsed);
            if field_type == FieldType::Gen {
                field.generation_rule = element.attributes.get(GEN_RULE_ATTRIBUTE).cloned();
            }
            let initial = initial_value(field_type, element);
            field.default_value = initial.clone();
            field.current_value = initial;
            field.element_ids.push(element.internal_id.clone());
            fields.insert(parsed.base_id.clone(), field);
        }

        if field_type == FieldType::Select {
            let Some(option) = parsed.value_of("select").filter(|v| !v.is_empty()) else {
                continue;
            };
            let Some(field) = fields.get_mut(&parsed.base_id) else {
                continue;
            };
            if !field.options.iter().any(|o| o == option) {
                field.options.push(option.to_owned());
            }
            if !visibility::is_hidden(&element.attributes) {
                selected.entry(parsed.base_id.clone()).or_insert_with(|| option.to_owned());
            }
        }
    }

    for field in fields.values_mut() {
        if field.field_type != FieldType::Select {
            continue;
        }
        let choice = selected
            .get(&field.id)
            .cloned()
            .or_else(|| field.options.first().cloned())
            .unwrap_or_default();
        field.default_value = FieldValue::Text(choice.clone());
        field.current_value = FieldValue::Text(choice);
    }

    fields.into_values().collect()
}

fn initial_value(field_type: FieldType, element: &SvgElement) -> FieldValue {
    match field_type {
        FieldType::Checkbox => FieldValue::Flag(!visibility::is_hidden(&element.attributes)),
        FieldType::Upload | FieldType::Sign => FieldValue::Text(element.href().unwrap_or_default().to_owned()),
        FieldType::Select => FieldValue::default(),
        _ => FieldValue::Text(element.inner_text.clone().unwrap_or_default()),
    }
}
