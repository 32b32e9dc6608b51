//! Undo history.
//!
//! Each user gesture (one cell edit, one bulk apply) becomes one atomic
//! entry on a linear LIFO stack, and undo restores every change in the
//! entry. "Undo all" does not replay the stack; it discards it and the
//! caller reloads from the last-saved snapshots.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::capability::InteractionType;

/// One (source, target) pair's transition within a history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionChange {
    /// Source visual id
    pub source: String,
    /// Target visual id
    pub target: String,
    /// Effective type before the change (`None` = Default)
    pub old: Option<InteractionType>,
    /// Effective type after the change
    pub new: Option<InteractionType>,
}

/// One undoable interaction edit (single cell or bulk)
#[derive(Debug, Clone, Serialize)]
pub struct InteractionEntry {
    /// Page the changes belong to
    pub page_id: String,
    /// Every pair that changed, with old and new values
    pub changes: Vec<InteractionChange>,
    /// When the edit happened
    pub timestamp: DateTime<Utc>,
}

impl InteractionEntry {
    /// Wrap a change set in a timestamped entry
    pub fn new(page_id: String, changes: Vec<InteractionChange>) -> Self {
        InteractionEntry {
            page_id,
            changes,
            timestamp: Utc::now(),
        }
    }
}

/// One filter card's visibility transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChange {
    /// `visual.json` path of the owning visual
    pub visual_path: PathBuf,
    /// Index of the filter card within the visual
    pub filter_index: usize,
    /// `isHiddenInViewMode` before the change
    pub old: Option<bool>,
    /// `isHiddenInViewMode` after the change
    pub new: Option<bool>,
}

/// One undoable filter-visibility edit
#[derive(Debug, Clone, Serialize)]
pub struct FilterEntry {
    /// Every filter card that changed
    pub changes: Vec<FilterChange>,
    /// When the edit happened
    pub timestamp: DateTime<Utc>,
}

impl FilterEntry {
    /// Wrap a change set in a timestamped entry
    pub fn new(changes: Vec<FilterChange>) -> Self {
        FilterEntry {
            changes,
            timestamp: Utc::now(),
        }
    }
}

/// One visual's `keepLayerOrder` transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerChange {
    /// `visual.json` path of the visual
    pub visual_path: PathBuf,
    /// Flag before the change
    pub old: Option<bool>,
    /// Flag after the change
    pub new: Option<bool>,
}

/// One undoable layer-order edit
#[derive(Debug, Clone, Serialize)]
pub struct LayerEntry {
    /// Every visual that changed
    pub changes: Vec<LayerChange>,
    /// When the edit happened
    pub timestamp: DateTime<Utc>,
}

impl LayerEntry {
    /// Wrap a change set in a timestamped entry
    pub fn new(changes: Vec<LayerChange>) -> Self {
        LayerEntry {
            changes,
            timestamp: Utc::now(),
        }
    }
}

/// A linear LIFO stack of history entries
#[derive(Debug, Clone)]
pub struct HistoryStack<E> {
    entries: Vec<E>,
}

impl<E> Default for HistoryStack<E> {
    fn default() -> Self {
        HistoryStack {
            entries: Vec::new(),
        }
    }
}

impl<E> HistoryStack<E> {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one entry
    pub fn push(&mut self, entry: E) {
        self.entries.push(entry);
    }

    /// Pop the most recent entry
    pub fn pop(&mut self) -> Option<E> {
        self.entries.pop()
    }

    /// Number of entries on the stack
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there is nothing to undo
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard all entries (save and undo-all both do this)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_is_lifo() {
        let mut stack = HistoryStack::new();
        stack.push(InteractionEntry::new("p1".to_string(), Vec::new()));
        stack.push(InteractionEntry::new("p2".to_string(), Vec::new()));

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop().unwrap().page_id, "p2");
        assert_eq!(stack.pop().unwrap().page_id, "p1");
        assert!(stack.pop().is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut stack = HistoryStack::new();
        stack.push(FilterEntry::new(Vec::new()));
        stack.push(FilterEntry::new(Vec::new()));
        stack.clear();
        assert!(stack.is_empty());
    }
}
