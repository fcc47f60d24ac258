//! Undo/redo history.
//!
//! - [`EditOperation`]: closed set of reversible operations with merge rules
//! - [`CommandHistory`]: bounded linear history with a cursor
//! - [`BulkMergeSession`]: folds a gesture's operations into one entry

mod bulk;
mod command_history;
mod operation;

pub use bulk::{BulkMergeSession, GestureToken};
pub use command_history::{
    CommandHistory, HistoryEntryView, BEGINNING_LABEL, DEFAULT_CAPACITY, MAX_CAPACITY,
    MIN_CAPACITY,
};
pub use operation::{
    AddOrDelete, EditOperation, InventoryMove, MergeOutcome, OperationKind, PropertyChange,
    Transform,
};
