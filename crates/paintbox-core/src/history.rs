//! Bounded linear undo/redo history.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of snapshots to keep.
pub const MAX_HISTORY: usize = 50;

/// Position within the history, as reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryStatus {
    /// Current entry, `None` while the history is empty.
    pub index: Option<usize>,
    /// Number of entries held.
    pub len: usize,
}

impl HistoryStatus {
    pub fn can_undo(&self) -> bool {
        matches!(self.index, Some(i) if i > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.index, Some(i) if i + 1 < self.len)
    }
}

/// An ordered list of entries plus a cursor.
///
/// Pushing while the cursor is not at the tail discards everything after it.
/// Once full, the oldest entry is evicted and the cursor shifts down.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    index: Option<usize>,
    capacity: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> History<T> {
    /// Create an empty history with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    /// Create an empty history holding at most `capacity` entries (min 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: None,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            index: self.index,
            len: self.entries.len(),
        }
    }

    /// Entry at the cursor.
    pub fn current(&self) -> Option<&T> {
        self.index.and_then(|i| self.entries.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    /// Append an entry after the cursor, dropping any redo tail.
    pub fn push(&mut self, entry: T) {
        let keep = self.index.map_or(0, |i| i + 1);
        self.entries.truncate(keep);
        self.entries.push_back(entry);

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.index = Some(self.entries.len() - 1);
    }

    /// Move the cursor back one step and return the entry now current.
    pub fn undo(&mut self) -> Option<&T> {
        match self.index {
            Some(i) if i > 0 => {
                self.index = Some(i - 1);
                self.entries.get(i - 1)
            }
            _ => None,
        }
    }

    /// Move the cursor forward one step and return the entry now current.
    pub fn redo(&mut self) -> Option<&T> {
        match self.index {
            Some(i) if i + 1 < self.entries.len() => {
                self.index = Some(i + 1);
                self.entries.get(i + 1)
            }
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.status().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.status().can_redo()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }
}
