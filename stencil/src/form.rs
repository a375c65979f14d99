//! Form session: field values, dependency propagation and projection.
//!
//! A [`FormState`] owns the field catalog of one template. Values flow
//! along three edges:
//!
//! - `depends_<ref>`: the field mirrors (part of) another field.
//! - generation rules: `(dep_<name>)` parts read other fields.
//! - `link_<field>`: the field pushes its own value into another field.
//!
//! Fields the user has typed into (`touched`) are never overwritten by
//! propagation or auto-generation.

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::extract;
use crate::field::{self, FieldType, FieldValue, FieldValues, FormField};
use crate::generate;
use crate::pattern::Rule;
use crate::random::RandomSource;
use crate::svg::element::SvgElement;
use crate::svg::{self, SvgError, visibility};

/// When `AUTO:` rules re-run on their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoPolicy {
    /// Only when the form is initialized.
    OnLoad,
    /// On initialization and whenever a dependency changes.
    #[default]
    OnDependencyChange,
}

impl FromStr for AutoPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on_load" | "onload" | "load" => Ok(Self::OnLoad),
            "on_dependency_change" | "ondependencychange" | "change" => Ok(Self::OnDependencyChange),
            other => Err(format!("unknown auto policy: {other}")),
        }
    }
}

/// Problems in a form's declarations or current values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormIssue {
    MissingDependency { field: String, reference: String },
    DependencyCycle { fields: Vec<String> },
    UnknownLinkTarget { field: String, target: String },
    Required { field: String },
    TooShort { field: String, min: usize, actual: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("field {field} has no option {value:?}")]
    UnknownOption { field: String, value: String },
    #[error("field {0} has no generation rule")]
    NoRule(String),
}

#[derive(Debug, Clone)]
pub struct FormState {
    fields: IndexMap<String, FormField>,
    policy: AutoPolicy,
}

impl FormState {
    #[must_use]
    pub fn new(fields: Vec<FormField>, policy: AutoPolicy) -> Self {
        let fields = fields.into_iter().map(|f| (f.id.clone(), f)).collect();
        Self { fields, policy }
    }

    /// Catalog of a parsed element list.
    #[must_use]
    pub fn from_elements(elements: &[SvgElement], policy: AutoPolicy) -> Self {
        Self::new(field::build_fields(elements), policy)
    }

    #[must_use]
    pub fn policy(&self) -> AutoPolicy {
        self.policy
    }

    #[must_use]
    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.get(id)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.values()
    }

    /// Current value of every field.
    #[must_use]
    pub fn values(&self) -> FieldValues {
        self.fields
            .values()
            .map(|f| (f.id.clone(), f.current_value.clone()))
            .collect()
    }

    /// Values of fields carrying a `track_<role>` token, keyed by role.
    #[must_use]
    pub fn tracked(&self) -> BTreeMap<String, FieldValue> {
        self.fields
            .values()
            .filter_map(|f| Some((f.track.clone()?, f.current_value.clone())))
            .collect()
    }

    /// Attach a generation rule to a field (for rules kept outside the
    /// template).
    ///
    /// # Errors
    ///
    /// Returns `FormError::UnknownField` for an unknown id.
    pub fn set_rule(&mut self, id: &str, rule: &str) -> Result<(), FormError> {
        let field = self
            .fields
            .get_mut(id)
            .ok_or_else(|| FormError::UnknownField(id.to_owned()))?;
        field.generation_rule = Some(rule.to_owned());
        Ok(())
    }

    // --- Evaluation ---

    /// Evaluate derived fields in dependency order: dependency mirrors always,
    /// generation rules only when marked `AUTO:`. Returns the ids whose value
    /// changed.
    pub fn initialize(&mut self, rng: &mut dyn RandomSource) -> Vec<String> {
        let (order, cycles) = self.dependency_order();
        for cycle in &cycles {
            warn!(fields = ?cycle, "dependency cycle; evaluating in declaration order");
        }
        let mut changed = Vec::new();
        for id in order.into_iter().chain(cycles.into_iter().flatten()) {
            if self.refresh(&id, true, rng) {
                changed.push(id);
            }
        }
        changed
    }

    /// Set a value typed by the user. The field becomes `touched`, text is
    /// cut to the field's `max`, links are pushed and dependents refreshed.
    /// Returns every field id whose value changed.
    ///
    /// # Errors
    ///
    /// Returns `FormError::UnknownField` for an unknown id and
    /// `FormError::UnknownOption` for a select value outside its options.
    pub fn set_value(&mut self, id: &str, value: FieldValue, rng: &mut dyn RandomSource) -> Result<Vec<String>, FormError> {
        let field = self
            .fields
            .get_mut(id)
            .ok_or_else(|| FormError::UnknownField(id.to_owned()))?;
        let value = coerce(field, value)?;
        field.touched = true;
        let mut changed = Vec::new();
        if field.current_value != value {
            field.current_value = value;
            changed.push(id.to_owned());
        }
        changed.extend(self.push_links(id));
        let seeds = changed.clone();
        changed.extend(self.propagate(seeds, rng));
        Ok(changed)
    }

    /// Run a field's generation rule now, regardless of `AUTO:`. The value
    /// replaces a touched value as well, since the user asked for it.
    ///
    /// # Errors
    ///
    /// Returns `FormError::UnknownField` or `FormError::NoRule`.
    pub fn generate(&mut self, id: &str, rng: &mut dyn RandomSource) -> Result<String, FormError> {
        let values = self.values();
        let field = self
            .fields
            .get_mut(id)
            .ok_or_else(|| FormError::UnknownField(id.to_owned()))?;
        let rule = field
            .generation_rule
            .clone()
            .ok_or_else(|| FormError::NoRule(id.to_owned()))?;
        let value = run_rule(field, &rule, &values, rng);
        field.current_value = FieldValue::Text(value.clone());
        field.touched = false;
        let mut seeds = vec![id.to_owned()];
        seeds.extend(self.push_links(id));
        self.propagate(seeds, rng);
        Ok(value)
    }

    /// Forget the user's input: restore the default and re-derive.
    ///
    /// # Errors
    ///
    /// Returns `FormError::UnknownField` for an unknown id.
    pub fn reset_field(&mut self, id: &str, rng: &mut dyn RandomSource) -> Result<(), FormError> {
        let field = self
            .fields
            .get_mut(id)
            .ok_or_else(|| FormError::UnknownField(id.to_owned()))?;
        field.touched = false;
        field.current_value = field.default_value.clone();
        self.refresh(id, true, rng);
        self.propagate(vec![id.to_owned()], rng);
        Ok(())
    }

    /// Recompute one untouched derived field. `initial` allows `AUTO:` rules
    /// under every policy. Returns whether the value changed.
    fn refresh(&mut self, id: &str, initial: bool, rng: &mut dyn RandomSource) -> bool {
        let values = self.values();
        let policy = self.policy;
        let Some(field) = self.fields.get_mut(id) else {
            return false;
        };
        if field.touched {
            return false;
        }
        let next = if let Some(rule) = field.generation_rule.clone() {
            let auto = Rule::parse(&rule).auto;
            if !auto || !(initial || policy == AutoPolicy::OnDependencyChange) {
                return false;
            }
            run_rule(field, &rule, &values, rng)
        } else if let Some(reference) = &field.depends_on {
            let mut value = extract::extract_from_dependency(reference, &values);
            if let (Some(max), false) = (field.max, extract::is_binary_value(&value)) {
                value = value.chars().take(max).collect();
            }
            value
        } else {
            return false;
        };

        let next = match field.field_type {
            FieldType::Checkbox => FieldValue::Flag(FieldValue::Text(next).is_truthy()),
            _ => FieldValue::Text(next),
        };
        if field.current_value == next {
            return false;
        }
        field.current_value = next;
        true
    }

    /// Copy `id`'s value into its untouched link targets.
    fn push_links(&mut self, id: &str) -> Vec<String> {
        let Some(source) = self.fields.get(id) else {
            return Vec::new();
        };
        let value = source.current_value.clone();
        let links = source.links.clone();
        let mut changed = Vec::new();
        for target in links {
            match self.fields.get_mut(&target) {
                Some(field) if !field.touched => {
                    let Ok(value) = coerce(field, value.clone()) else {
                        continue;
                    };
                    if field.current_value != value {
                        field.current_value = value;
                        changed.push(target);
                    }
                }
                Some(_) => {}
                None => debug!(field = id, target = %target, "link target does not exist"),
            }
        }
        changed
    }

    /// Refresh everything downstream of `seeds` in dependency order, so a
    /// field reading several paths from the same source sees all of them
    /// settled. Link targets changed on the way seed another round; rounds
    /// are capped by the field count, so link loops terminate.
    fn propagate(&mut self, seeds: Vec<String>, rng: &mut dyn RandomSource) -> Vec<String> {
        let (order, cycles) = self.dependency_order();
        let ranked: Vec<String> = order.into_iter().chain(cycles.into_iter().flatten()).collect();
        let mut changed: Vec<String> = Vec::new();
        let mut seeds = seeds;
        for _ in 0..=self.fields.len() {
            if seeds.is_empty() {
                break;
            }
            let reachable = self.downstream(&seeds);
            let mut linked = Vec::new();
            for id in ranked.iter().filter(|id| reachable.contains(*id)) {
                if !self.refresh(id, false, rng) {
                    continue;
                }
                if !changed.contains(id) {
                    changed.push(id.clone());
                }
                for target in self.push_links(id) {
                    if !changed.contains(&target) {
                        changed.push(target.clone());
                    }
                    linked.push(target);
                }
            }
            seeds = linked;
        }
        changed
    }

    /// Every field that reads one of `seeds`, directly or transitively,
    /// excluding the seeds themselves.
    fn downstream(&self, seeds: &[String]) -> HashSet<String> {
        let mut reached = HashSet::new();
        let mut queue: VecDeque<String> = seeds.iter().cloned().collect();
        while let Some(source) = queue.pop_front() {
            for dependent in self.dependents(&source) {
                if reached.insert(dependent.clone()) {
                    queue.push_back(dependent);
                }
            }
        }
        for seed in seeds {
            reached.remove(seed);
        }
        reached
    }

    /// Fields that read `id`.
    fn dependents(&self, id: &str) -> Vec<String> {
        self.fields
            .values()
            .filter(|f| dependencies_of(f).iter().any(|d| d == id))
            .map(|f| f.id.clone())
            .collect()
    }

    /// Topological order of the fields, plus the groups left over because
    /// they sit on a cycle.
    #[must_use]
    pub fn dependency_order(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let mut indegree: IndexMap<&str, usize> = self.fields.keys().map(|k| (k.as_str(), 0)).collect();
        let mut edges: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for field in self.fields.values() {
            for dep in dependencies_of(field) {
                let Some((dep, _)) = self.fields.get_key_value(dep.as_str()) else {
                    continue;
                };
                edges.entry(dep.as_str()).or_default().push(field.id.as_str());
                if let Some(n) = indegree.get_mut(field.id.as_str()) {
                    *n += 1;
                }
            }
        }

        let mut ready: VecDeque<&str> = indegree.iter().filter(|(_, n)| **n == 0).map(|(k, _)| *k).collect();
        let mut order = Vec::new();
        while let Some(id) = ready.pop_front() {
            order.push(id.to_owned());
            for next in edges.get(id).into_iter().flatten() {
                if let Some(n) = indegree.get_mut(next) {
                    *n -= 1;
                    if *n == 0 {
                        ready.push_back(*next);
                    }
                }
            }
        }

        let leftover: Vec<String> = indegree
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(k, _)| (*k).to_owned())
            .collect();
        let cycles = if leftover.is_empty() { Vec::new() } else { vec![leftover] };
        (order, cycles)
    }

    /// Declaration and value problems.
    #[must_use]
    pub fn issues(&self) -> Vec<FormIssue> {
        let mut issues = Vec::new();
        for field in self.fields.values() {
            if let Some(reference) = &field.depends_on {
                let target = extract::parse_reference(reference).field;
                if !self.fields.contains_key(&target) {
                    issues.push(FormIssue::MissingDependency { field: field.id.clone(), reference: reference.clone() });
                }
            }
            if let Some(rule) = &field.generation_rule {
                for dep in Rule::parse(rule).dependencies() {
                    if !self.fields.contains_key(dep) {
                        issues.push(FormIssue::MissingDependency { field: field.id.clone(), reference: dep.to_owned() });
                    }
                }
            }
            for target in &field.links {
                if !self.fields.contains_key(target) {
                    issues.push(FormIssue::UnknownLinkTarget { field: field.id.clone(), target: target.clone() });
                }
            }
            let actual = field.current_value.to_text().chars().count();
            if field.required && (field.current_value.is_empty() || field.current_value == FieldValue::Flag(false)) {
                issues.push(FormIssue::Required { field: field.id.clone() });
            } else if let Some(min) = field.min {
                if actual > 0 && actual < min {
                    issues.push(FormIssue::TooShort { field: field.id.clone(), min, actual });
                }
            }
        }
        let (_, cycles) = self.dependency_order();
        issues.extend(cycles.into_iter().map(|fields| FormIssue::DependencyCycle { fields }));
        issues
    }

    /// Clear every `touched` flag, e.g. after the form is submitted.
    pub fn mark_saved(&mut self) {
        for field in self.fields.values_mut() {
            field.touched = false;
        }
    }

    // --- Projection ---

    /// Write the current values onto the bound elements.
    pub fn project(&self, elements: &mut [SvgElement]) {
        for field in self.fields.values() {
            match field.field_type {
                FieldType::Select => {
                    visibility::apply_option_selection(elements, &field.id, &field.current_value.to_text());
                }
                FieldType::Checkbox => {
                    for element in bound(elements, field) {
                        visibility::set_visible(&mut element.attributes, field.current_value.is_truthy());
                    }
                }
                FieldType::Upload | FieldType::Sign => {
                    let href = field.current_value.to_text();
                    if href.is_empty() {
                        continue;
                    }
                    for element in bound(elements, field) {
                        if element.tag == "image" {
                            element.set_href(&href);
                        } else {
                            debug!(field = %field.id, tag = %element.tag, "image value bound to a non-image element");
                        }
                    }
                }
                _ => {
                    let text = field.current_value.to_text();
                    for element in bound(elements, field) {
                        if element.inner_text.is_some() {
                            element.inner_text = Some(text.clone());
                        }
                    }
                }
            }
        }
    }
}

fn bound<'a>(elements: &'a mut [SvgElement], field: &'a FormField) -> impl Iterator<Item = &'a mut SvgElement> {
    elements
        .iter_mut()
        .filter(move |e| field.element_ids.contains(&e.internal_id))
}

/// Field names `field` reads.
fn dependencies_of(field: &FormField) -> Vec<String> {
    if let Some(rule) = &field.generation_rule {
        return Rule::parse(rule)
            .dependencies()
            .into_iter()
            .map(str::to_owned)
            .collect();
    }
    field
        .depends_on
        .as_deref()
        .map(|reference| vec![extract::parse_reference(reference).field])
        .unwrap_or_default()
}

/// Evaluate a rule for a field, applying legacy padding to fill-less rules.
fn run_rule(field: &FormField, rule: &str, values: &FieldValues, rng: &mut dyn RandomSource) -> String {
    let parsed = Rule::parse(rule);
    let value = generate::evaluate(&parsed.parts, values, field.max, rng);
    match &field.max_spec {
        Some(spec) if !parsed.has_fill() => generate::apply_max_generation(&value, spec),
        _ => value,
    }
}

/// Check and normalize a value for a field's type.
fn coerce(field: &FormField, value: FieldValue) -> Result<FieldValue, FormError> {
    match field.field_type {
        FieldType::Checkbox => Ok(FieldValue::Flag(value.is_truthy())),
        FieldType::Select => {
            let text = value.to_text();
            if text.is_empty() || field.options.iter().any(|o| *o == text) {
                Ok(FieldValue::Text(text))
            } else {
                Err(FormError::UnknownOption { field: field.id.clone(), value: text })
            }
        }
        FieldType::Upload | FieldType::Sign => Ok(FieldValue::Text(value.to_text())),
        _ => {
            let text = value.to_text();
            Ok(FieldValue::Text(match field.max {
                Some(max) => text.chars().take(max).collect(),
                None => text,
            }))
        }
    }
}

// =============================================================================
// ONE-SHOT FILL
// =============================================================================

/// Result of filling a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilledTemplate {
    pub svg: String,
    pub values: BTreeMap<String, FieldValue>,
    pub tracked: BTreeMap<String, FieldValue>,
    pub issues: Vec<FormIssue>,
}

/// Fill a template in one pass: derive the form, initialize it, apply the
/// given values in declaration order, project and regenerate. Values for
/// unknown fields or rejected by their field are skipped with a log line.
///
/// # Errors
///
/// Returns `SvgError` when the template does not parse.
pub fn fill_template(
    svg_text: &str,
    input: &FieldValues,
    policy: AutoPolicy,
    rng: &mut dyn RandomSource,
) -> Result<FilledTemplate, SvgError> {
    let mut elements = svg::parse_elements(svg_text)?;
    let mut form = FormState::from_elements(&elements, policy);
    form.initialize(rng);

    let ids: Vec<String> = form.fields.keys().cloned().collect();
    for id in ids {
        let Some(value) = input.get(&id) else {
            continue;
        };
        if let Err(err) = form.set_value(&id, value.clone(), rng) {
            warn!(%err, "skipping value");
        }
    }
    for key in input.keys().filter(|k| !form.fields.contains_key(*k)) {
        debug!(field = %key, "value for unknown field ignored");
    }

    form.project(&mut elements);
    Ok(FilledTemplate {
        svg: svg::regenerate(svg_text, &elements),
        values: form.values().into_iter().collect(),
        tracked: form.tracked(),
        issues: form.issues(),
    })
}
