//! Linear undo/redo history with a movable cursor.

use super::operation::EditOperation;
use crate::document::Document;
use std::collections::VecDeque;

/// Smallest accepted history capacity.
pub const MIN_CAPACITY: usize = 1;

/// Largest accepted history capacity.
pub const MAX_CAPACITY: usize = 10240;

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 32;

/// Label of the synthetic row before the first entry.
pub const BEGINNING_LABEL: &str = "Beginning";

/// One row of the history list shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntryView {
    /// Cursor value that [`CommandHistory::jump_to`] needs to land on this row.
    pub position: usize,
    pub description: String,
    /// Whether the document currently reflects exactly this row.
    pub is_current: bool,
}

/// Ordered operations plus a cursor separating applied from undone ones.
///
/// Entries below `cursor` are applied and reachable by undo; entries at or
/// above it are only reachable by redo. Storing new work discards the redo
/// tail, and the oldest entry is evicted once the capacity is exceeded.
pub struct CommandHistory {
    entries: VecDeque<EditOperation>,
    cursor: usize,
    capacity: usize,
    disposed: u64,
}

impl CommandHistory {
    /// Create an empty history. `capacity` is clamped to
    /// `MIN_CAPACITY..=MAX_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            capacity: clamp_capacity(capacity),
            disposed: 0,
        }
    }

    /// Record an operation that has already been applied to the document.
    pub fn store(&mut self, op: EditOperation) {
        if self.cursor < self.entries.len() {
            let discarded = self.entries.len() - self.cursor;
            for mut stale in self.entries.drain(self.cursor..) {
                stale.dispose();
            }
            self.disposed += discarded as u64;
            tracing::debug!(discarded, "discarded redo branch");
        }

        self.entries.push_back(op);
        self.cursor += 1;

        // The cursor sits at the end here, so every evicted entry is an
        // applied one and the document itself is unaffected.
        while self.entries.len() > self.capacity {
            self.evict_oldest();
        }
    }

    /// Undo up to `count` operations. Returns how many were undone.
    pub fn undo(&mut self, count: usize, doc: &mut dyn Document) -> usize {
        let mut undone = 0;
        while undone < count && self.cursor > 0 {
            self.cursor -= 1;
            self.entries[self.cursor].unapply(doc);
            undone += 1;
        }
        undone
    }

    /// Redo up to `count` operations. Returns how many were redone.
    pub fn redo(&mut self, count: usize, doc: &mut dyn Document) -> usize {
        let mut redone = 0;
        while redone < count && self.cursor < self.entries.len() {
            self.entries[self.cursor].apply(doc);
            self.cursor += 1;
            redone += 1;
        }
        redone
    }

    /// Move the cursor to `position` by undoing or redoing. Positions past
    /// the end land on the end. Returns the number of steps taken.
    pub fn jump_to(&mut self, position: usize, doc: &mut dyn Document) -> usize {
        let target = position.min(self.entries.len());
        if target >= self.cursor {
            self.redo(target - self.cursor, doc)
        } else {
            self.undo(self.cursor - target, doc)
        }
    }

    /// Dispose every entry and reset the cursor.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        for mut op in self.entries.drain(..) {
            op.dispose();
        }
        self.disposed += count as u64;
        self.cursor = 0;
        if count > 0 {
            tracing::debug!(count, "cleared command history");
        }
    }

    /// Change the capacity, trimming immediately if needed.
    ///
    /// Applied entries are evicted from the front first. Only when the
    /// remaining entries are all redo-only is the redo tail cut instead, so
    /// the visible document state never changes.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = clamp_capacity(capacity);
        while self.entries.len() > self.capacity && self.cursor > 0 {
            self.evict_oldest();
        }
        while self.entries.len() > self.capacity {
            if let Some(mut op) = self.entries.pop_back() {
                op.dispose();
                self.disposed += 1;
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Total number of operations disposed over the history's lifetime.
    pub fn disposed_count(&self) -> u64 {
        self.disposed
    }

    /// Operations in storage order, oldest first.
    pub fn operations(&self) -> impl Iterator<Item = &EditOperation> {
        self.entries.iter()
    }

    /// Rows for a "jump to this point" list, beginning row first.
    pub fn entries(&self) -> Vec<HistoryEntryView> {
        let mut rows = Vec::with_capacity(self.entries.len() + 1);
        rows.push(HistoryEntryView {
            position: 0,
            description: BEGINNING_LABEL.to_string(),
            is_current: self.cursor == 0,
        });
        for (i, op) in self.entries.iter().enumerate() {
            let position = i + 1;
            rows.push(HistoryEntryView {
                position,
                description: op.description(),
                is_current: self.cursor == position,
            });
        }
        rows
    }

    fn evict_oldest(&mut self) {
        if let Some(mut oldest) = self.entries.pop_front() {
            tracing::debug!(kind = %oldest.kind(), "evicting oldest history entry");
            oldest.dispose();
            self.disposed += 1;
            self.cursor = self.cursor.saturating_sub(1);
        }
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

fn clamp_capacity(capacity: usize) -> usize {
    capacity.clamp(MIN_CAPACITY, MAX_CAPACITY)
}
