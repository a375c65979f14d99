//! Reversible edits.
//!
//! Every recorded mutation is a batch of [`Patch`]es. A patch carries enough
//! state to be inverted, so undo applies the inverses of a batch in reverse
//! order and redo re-applies the batch as recorded.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use serde::{Deserialize, Serialize};

use crate::consts::HISTORY_LIMIT;
use crate::svg::element::SvgElement;
use crate::svg::style;

/// The part of an element a [`Patch::Change`] touches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ElementField {
    Id,
    Text,
    Attribute(String),
    Style(String),
}

impl ElementField {
    #[must_use]
    pub fn read(&self, element: &SvgElement) -> Option<String> {
        match self {
            Self::Id => element.id.clone(),
            Self::Text => element.inner_text.clone(),
            Self::Attribute(name) if name == "id" => element.id.clone(),
            Self::Attribute(name) => element.attributes.get(name).cloned(),
            Self::Style(property) => style::get_property(&element.attributes, property),
        }
    }

    pub fn write(&self, element: &mut SvgElement, value: Option<String>) {
        match self {
            Self::Id => element.set_id(value),
            Self::Text => element.inner_text = value,
            Self::Attribute(name) => element.set_attribute(name, value),
            Self::Style(property) => style::set_property(&mut element.attributes, property, value.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Patch {
    Change {
        id: String,
        field: ElementField,
        old: Option<String>,
        new: Option<String>,
    },
    Insert {
        index: usize,
        element: SvgElement,
    },
    Remove {
        index: usize,
        element: SvgElement,
    },
    Reorder {
        old: Vec<String>,
        new: Vec<String>,
    },
}

impl Patch {
    #[must_use]
    pub fn inverse(&self) -> Self {
        match self {
            Self::Change { id, field, old, new } => Self::Change {
                id: id.clone(),
                field: field.clone(),
                old: new.clone(),
                new: old.clone(),
            },
            Self::Insert { index, element } => Self::Remove { index: *index, element: element.clone() },
            Self::Remove { index, element } => Self::Insert { index: *index, element: element.clone() },
            Self::Reorder { old, new } => Self::Reorder { old: new.clone(), new: old.clone() },
        }
    }
}

/// Linear undo stack with a cursor. Recording after an undo drops the redo
/// tail.
#[derive(Debug, Clone, Default)]
pub struct History {
    batches: Vec<Vec<Patch>>,
    cursor: usize,
}

impl History {
    pub fn record(&mut self, batch: Vec<Patch>) {
        if batch.is_empty() {
            return;
        }
        self.batches.truncate(self.cursor);
        self.batches.push(batch);
        if self.batches.len() > HISTORY_LIMIT {
            self.batches.remove(0);
        }
        self.cursor = self.batches.len();
    }

    /// Inverse patches of the last applied batch, ready to apply in order.
    pub fn undo(&mut self) -> Option<Vec<Patch>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.batches[self.cursor].iter().rev().map(Patch::inverse).collect())
    }

    /// Patches of the next batch, to apply in order.
    pub fn redo(&mut self) -> Option<Vec<Patch>> {
        let batch = self.batches.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(batch)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.batches.len()
    }

    /// Index of the last applied batch, `None` at the bottom of the stack.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn clear(&mut self) {
        self.batches.clear();
        self.cursor = 0;
    }
}
