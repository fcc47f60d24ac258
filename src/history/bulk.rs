//! Gesture-scoped batching of operations into a single history entry.

use super::command_history::CommandHistory;
use super::operation::{EditOperation, MergeOutcome};
use std::fmt;

/// Identifies one continuous user gesture (for example a mouse-held drag).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GestureToken(pub u64);

impl fmt::Debug for GestureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gesture({})", self.0)
    }
}

/// Collects the operations produced during a gesture and stores them as
/// one history entry when the gesture ends.
///
/// Operations added here have already been applied to the document; the
/// session only decides how they show up in the history.
#[derive(Default)]
pub struct BulkMergeSession {
    owner: Option<GestureToken>,
    pending: Vec<EditOperation>,
}

impl BulkMergeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start accumulating under `token`. A session still open under a
    /// different token is committed first.
    pub fn begin(&mut self, token: GestureToken, history: &mut CommandHistory) {
        match self.owner {
            Some(current) if current == token => {}
            Some(_) => {
                self.commit(history);
                self.owner = Some(token);
            }
            None => self.owner = Some(token),
        }
    }

    /// Buffer an operation for the active gesture.
    pub fn add(&mut self, op: EditOperation) {
        self.pending.push(op);
    }

    /// Fold the pending operations into the first one and store the result.
    ///
    /// Operations that refuse to merge are stored as their own entries
    /// right after the merged one, in the order they were added.
    pub fn commit(&mut self, history: &mut CommandHistory) {
        let owner = self.owner.take();
        let mut pending = std::mem::take(&mut self.pending).into_iter();
        let Some(mut target) = pending.next() else {
            return;
        };

        let mut merged = 1usize;
        let mut rejected = Vec::new();
        for op in pending {
            match op.try_merge_into(&mut target) {
                MergeOutcome::Merged => merged += 1,
                MergeOutcome::Rejected(op) => rejected.push(op),
            }
        }

        tracing::debug!(
            gesture = ?owner,
            merged,
            rejected = rejected.len(),
            "committing gesture"
        );

        history.store(target);
        for op in rejected {
            history.store(op);
        }
    }

    pub fn is_active(&self) -> bool {
        self.owner.is_some()
    }

    pub fn active_token(&self) -> Option<GestureToken> {
        self.owner
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop everything buffered without storing it.
    pub fn discard(&mut self) {
        for mut op in self.pending.drain(..) {
            op.dispose();
        }
        self.owner = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Scene};
    use crate::history::operation::{AddOrDelete, InventoryMove};
    use crate::types::{Entity, EntityId};

    fn place(scene: &mut Scene, id: u64) -> EditOperation {
        let op = EditOperation::from(AddOrDelete::added(vec![Entity::new(EntityId(id), "Crate")]));
        op.apply(scene);
        op
    }

    #[test]
    fn test_gesture_collapses_to_one_entry() {
        let mut scene = Scene::new("Dugong");
        let mut history = CommandHistory::new(10);
        let mut bulk = BulkMergeSession::new();

        bulk.begin(GestureToken(1), &mut history);
        for id in 1..=5 {
            let op = place(&mut scene, id);
            bulk.add(op);
        }
        assert_eq!(history.len(), 0);
        assert_eq!(bulk.pending_len(), 5);

        bulk.commit(&mut history);
        assert_eq!(history.len(), 1);
        assert!(!bulk.is_active());
        assert_eq!(bulk.pending_len(), 0);

        history.undo(1, &mut scene);
        assert!(scene.is_empty());
        history.redo(1, &mut scene);
        assert_eq!(scene.len(), 5);
    }

    #[test]
    fn test_commit_empty_is_noop() {
        let mut history = CommandHistory::new(10);
        let mut bulk = BulkMergeSession::new();

        bulk.begin(GestureToken(1), &mut history);
        bulk.commit(&mut history);

        assert!(history.is_empty());
        assert!(!bulk.is_active());
    }

    #[test]
    fn test_new_token_commits_previous_gesture() {
        let mut scene = Scene::new("Dugong");
        let mut history = CommandHistory::new(10);
        let mut bulk = BulkMergeSession::new();

        bulk.begin(GestureToken(1), &mut history);
        let op = place(&mut scene, 1);
        bulk.add(op);

        bulk.begin(GestureToken(1), &mut history);
        assert!(history.is_empty());

        bulk.begin(GestureToken(2), &mut history);
        assert_eq!(history.len(), 1);
        assert_eq!(bulk.active_token(), Some(GestureToken(2)));
    }

    #[test]
    fn test_foreign_kind_stored_separately() {
        let mut scene = Scene::new("Dugong");
        let mut history = CommandHistory::new(10);
        let mut bulk = BulkMergeSession::new();

        bulk.begin(GestureToken(7), &mut history);
        let first = place(&mut scene, 1);
        bulk.add(first);
        let moved = EditOperation::from(InventoryMove::capture(&scene, EntityId(1), None));
        bulk.add(moved);
        let second = place(&mut scene, 2);
        bulk.add(second);
        bulk.commit(&mut history);

        let descriptions: Vec<String> = history.operations().map(|op| op.description()).collect();
        assert_eq!(descriptions, vec!["Added 2 items", "Moved Crate"]);
    }

    #[test]
    fn test_discard() {
        let mut scene = Scene::new("Dugong");
        let mut history = CommandHistory::new(10);
        let mut bulk = BulkMergeSession::new();

        bulk.begin(GestureToken(1), &mut history);
        let op = place(&mut scene, 1);
        bulk.add(op);
        bulk.discard();
        bulk.commit(&mut history);

        assert!(history.is_empty());
        assert!(scene.entity(EntityId(1)).is_some());
    }
}
