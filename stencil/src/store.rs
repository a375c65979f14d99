//! Editor document store.
//!
//! Holds the element map and its explicit order, the undo log and the
//! current selection. Every mutation can be recorded as one reversible
//! batch; `record = false` applies it without touching history (used while a
//! value is still being typed).
//!
//! DESIGN
//! ======
//! Elements are keyed by internal id, which never changes after load.
//! Structural edits (insert, remove, reorder) carry whole elements and id
//! lists in their patches so that undo is exact even after duplicates.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::field::{self, FormField};
use crate::history::{ElementField, History, Patch};
use crate::id;
use crate::svg::element::{self, Origin, SvgElement};
use crate::svg::{self, LiveView, SvgError, visibility};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Svg(#[from] SvgError),
    #[error("no document loaded")]
    NotLoaded,
    #[error("unknown element: {0}")]
    UnknownElement(String),
    #[error("new order must list every element exactly once")]
    InvalidOrder,
    #[error("no option group named {0}")]
    UnknownOptionGroup(String),
}

#[derive(Debug, Clone, Default)]
pub struct EditorStore {
    original: Option<String>,
    elements: HashMap<String, SvgElement>,
    order: Vec<String>,
    history: History,
    selected: Option<String>,
}

impl EditorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the store contents with a parsed document. Malformed SVG is
    /// rejected and leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Svg` when the text does not parse.
    pub fn load(&mut self, svg: &str) -> Result<usize, StoreError> {
        let parsed = element::parse_elements(svg)?;
        self.reset();
        self.original = Some(svg.to_owned());
        for element in parsed {
            self.order.push(element.internal_id.clone());
            self.elements.insert(element.internal_id.clone(), element);
        }
        Ok(self.order.len())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.original.is_some()
    }

    #[must_use]
    pub fn original_svg(&self) -> Option<&str> {
        self.original.as_deref()
    }

    #[must_use]
    pub fn element(&self, internal_id: &str) -> Option<&SvgElement> {
        self.elements.get(internal_id)
    }

    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Elements in document order.
    #[must_use]
    pub fn elements(&self) -> Vec<&SvgElement> {
        self.order.iter().filter_map(|id| self.elements.get(id)).collect()
    }

    /// Owned copy of the elements in document order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SvgElement> {
        self.elements().into_iter().cloned().collect()
    }

    // --- Mutations ---

    /// Apply field changes to one element. No-op changes are dropped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownElement` for an unknown internal id.
    pub fn update_element(
        &mut self,
        internal_id: &str,
        changes: Vec<(ElementField, Option<String>)>,
        record: bool,
    ) -> Result<Vec<Patch>, StoreError> {
        let batch = self.change_element(internal_id, changes)?;
        if record {
            self.history.record(batch.clone());
        }
        Ok(batch)
    }

    fn change_element(
        &mut self,
        internal_id: &str,
        changes: Vec<(ElementField, Option<String>)>,
    ) -> Result<Vec<Patch>, StoreError> {
        let element = self
            .elements
            .get_mut(internal_id)
            .ok_or_else(|| StoreError::UnknownElement(internal_id.to_owned()))?;
        let mut batch = Vec::new();
        for (field, value) in changes {
            let old = field.read(element);
            field.write(element, value);
            let new = field.read(element);
            if old != new {
                batch.push(Patch::Change { id: internal_id.to_owned(), field, old, new });
            }
        }
        Ok(batch)
    }

    /// # Errors
    ///
    /// Returns `StoreError::InvalidOrder` unless `new_order` is a permutation
    /// of the current order.
    pub fn reorder_elements(&mut self, new_order: Vec<String>, record: bool) -> Result<(), StoreError> {
        let current: HashSet<&String> = self.order.iter().collect();
        let proposed: HashSet<&String> = new_order.iter().collect();
        if new_order.len() != self.order.len() || proposed.len() != new_order.len() || current != proposed {
            return Err(StoreError::InvalidOrder);
        }
        if new_order == self.order {
            return Ok(());
        }
        let patch = Patch::Reorder { old: self.order.clone(), new: new_order };
        self.apply(&patch);
        if record {
            self.history.record(vec![patch]);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StoreError::UnknownElement` for an unknown internal id.
    pub fn delete_element(&mut self, internal_id: &str, record: bool) -> Result<SvgElement, StoreError> {
        let index = self.position(internal_id)?;
        let element = self.elements[internal_id].clone();
        let patch = Patch::Remove { index, element: element.clone() };
        self.apply(&patch);
        if record {
            self.history.record(vec![patch]);
        }
        Ok(element)
    }

    /// Copy an element and insert it right after the original. The copy gets
    /// a fresh base id (`Name` → `Name_2`, keeping the id's parts) and a
    /// fresh internal id. Returns the new internal id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownElement` for an unknown internal id.
    pub fn duplicate_element(&mut self, internal_id: &str, record: bool) -> Result<String, StoreError> {
        let index = self.position(internal_id)?;
        let source = &self.elements[internal_id];

        let new_id = source.parsed_id().map(|mut parsed| {
            let bases: HashSet<String> = self
                .elements
                .values()
                .filter_map(SvgElement::parsed_id)
                .map(|p| p.base_id)
                .collect();
            parsed.base_id = element::unique_name(&parsed.base_id, &bases);
            parsed.to_id()
        });
        let taken: HashSet<String> = self.elements.keys().cloned().collect();
        let new_internal = element::unique_name(new_id.as_deref().unwrap_or(&source.internal_id), &taken);

        let mut copy = source.clone();
        copy.internal_id = new_internal.clone();
        copy.original_id = None;
        copy.origin = Origin::Clone(source.origin.index());
        copy.set_id(new_id);

        let patch = Patch::Insert { index: index + 1, element: copy };
        self.apply(&patch);
        if record {
            self.history.record(vec![patch]);
        }
        Ok(new_internal)
    }

    /// Show the option `value` of the select group `base_id` and hide the
    /// rest, recorded as one batch.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownOptionGroup` when no element belongs to
    /// the group.
    pub fn set_option_selection(&mut self, base_id: &str, value: &str, record: bool) -> Result<usize, StoreError> {
        let before = self.snapshot();
        if visibility::option_group(&before, base_id).is_empty() {
            return Err(StoreError::UnknownOptionGroup(base_id.to_owned()));
        }
        let mut after = before.clone();
        let changed = visibility::apply_option_selection(&mut after, base_id, value);

        let mut batch = Vec::new();
        for index in &changed {
            let (old, new) = (&before[*index], &after[*index]);
            let mut names: Vec<&String> = old.attributes.keys().collect();
            names.extend(new.attributes.keys().filter(|k| !old.attributes.contains_key(*k)));
            let changes = names
                .into_iter()
                .filter(|name| old.attributes.get(*name) != new.attributes.get(*name))
                .map(|name| (ElementField::Attribute(name.clone()), new.attributes.get(name).cloned()))
                .collect();
            batch.extend(self.change_element(&new.internal_id, changes)?);
        }
        if record {
            self.history.record(batch);
        }
        Ok(changed.len())
    }

    fn position(&self, internal_id: &str) -> Result<usize, StoreError> {
        self.order
            .iter()
            .position(|id| id == internal_id)
            .ok_or_else(|| StoreError::UnknownElement(internal_id.to_owned()))
    }

    fn apply(&mut self, patch: &Patch) {
        match patch {
            Patch::Change { id, field, new, .. } => match self.elements.get_mut(id) {
                Some(element) => field.write(element, new.clone()),
                None => debug!(internal_id = %id, "change targets a missing element"),
            },
            Patch::Insert { index, element } => {
                let at = (*index).min(self.order.len());
                self.order.insert(at, element.internal_id.clone());
                self.elements.insert(element.internal_id.clone(), element.clone());
            }
            Patch::Remove { element, .. } => {
                self.order.retain(|id| *id != element.internal_id);
                self.elements.remove(&element.internal_id);
                if self.selected.as_deref() == Some(element.internal_id.as_str()) {
                    self.selected = None;
                }
            }
            Patch::Reorder { new, .. } => self.order.clone_from(new),
        }
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        let Some(batch) = self.history.undo() else {
            return false;
        };
        for patch in &batch {
            self.apply(patch);
        }
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(batch) = self.history.redo() else {
            return false;
        };
        for patch in &batch {
            self.apply(patch);
        }
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn history_index(&self) -> Option<usize> {
        self.history.index()
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // --- Selection ---

    /// # Errors
    ///
    /// Returns `StoreError::UnknownElement` when selecting an unknown id.
    pub fn select(&mut self, internal_id: Option<&str>) -> Result<(), StoreError> {
        if let Some(id) = internal_id {
            if !self.elements.contains_key(id) {
                return Err(StoreError::UnknownElement(id.to_owned()));
            }
        }
        self.selected = internal_id.map(str::to_owned);
        Ok(())
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    // --- Output ---

    /// # Errors
    ///
    /// Returns `StoreError::NotLoaded` before a document is loaded.
    pub fn regenerate(&self) -> Result<String, StoreError> {
        let original = self.original.as_deref().ok_or(StoreError::NotLoaded)?;
        Ok(svg::regenerate(original, &self.snapshot()))
    }

    /// Render a live preview. The selected element, if any, is highlighted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotLoaded` before a document is loaded.
    pub fn live_view(&self) -> Result<LiveView, StoreError> {
        self.live_view_with(self.selected.as_deref())
    }

    /// Render a live preview highlighting `highlight` instead of the
    /// selection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotLoaded` before a document is loaded and
    /// `StoreError::UnknownElement` for an unknown highlight id.
    pub fn live_view_with(&self, highlight: Option<&str>) -> Result<LiveView, StoreError> {
        let original = self.original.as_deref().ok_or(StoreError::NotLoaded)?;
        let target = highlight
            .map(|id| {
                self.elements
                    .get(id)
                    .ok_or_else(|| StoreError::UnknownElement(id.to_owned()))
            })
            .transpose()?;
        let mut view = LiveView::render(original, &self.snapshot())?;
        if let Some(element) = target {
            view.patch(element, true);
        }
        Ok(view)
    }

    /// Form fields declared by the current element ids.
    #[must_use]
    pub fn fields(&self) -> Vec<FormField> {
        field::build_fields(&self.snapshot())
    }

    /// Ids that fail grammar validation, with their error.
    #[must_use]
    pub fn invalid_ids(&self) -> Vec<(String, String)> {
        self.elements()
            .into_iter()
            .filter_map(|element| {
                let raw = element.id.as_deref()?;
                let validation = id::validate_id(raw);
                let error = validation.error.filter(|_| !validation.is_valid)?;
                Some((element.internal_id.clone(), error))
            })
            .collect()
    }
}
