//! # Logbook
//!
//! Undo/redo history and periodic autosave for an interactive editor.
//!
//! ## Core Concepts
//!
//! - **Operations**: Reversible edits (add/delete, property, transform,
//!   inventory move) that know how to merge with their neighbours
//! - **History**: A bounded linear list of operations with a cursor
//! - **Gestures**: Every edit made during one drag becomes one history entry
//! - **Autosave**: Timer-driven snapshots written off the main thread and
//!   kept in a small retention catalog
//!
//! ## Example
//!
//! ```ignore
//! use logbook::{AddOrDelete, EditorConfig, EditorSession, Entity, EntityId, Scene};
//! use std::time::Instant;
//!
//! let mut session = EditorSession::open(EditorConfig::default(), Scene::new("Dugong"));
//! session.select(Instant::now());
//!
//! session.perform(AddOrDelete::added(vec![Entity::new(EntityId(1), "Pump")]));
//! session.undo(1);
//!
//! // Once per frame:
//! session.tick(Instant::now(), false, true);
//! ```

pub mod autosave;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod history;
pub mod notices;
pub mod session;
pub mod types;

// Re-exports
pub use autosave::{
    AutoSaveHandle, AutoSaveMenuEntry, AutoSaveRecord, AutoSaveScheduler, RetentionIndex,
    SaveReason, SchedulerState, Tick, CATALOG_FILE,
};
pub use config::{AutoSaveConfig, EditorConfig, HistoryConfig};
pub use dispatch::{DispatchHandle, MainLoopDispatcher, MainThreadJob};
pub use document::{Document, Scene};
pub use error::{EditorError, Result};
pub use history::{
    AddOrDelete, BulkMergeSession, CommandHistory, EditOperation, GestureToken,
    HistoryEntryView, InventoryMove, MergeOutcome, OperationKind, PropertyChange, Transform,
};
pub use notices::{
    ClearReason, DropReason, Notice, NoticeBroadcaster, NoticeConfig, NoticeFilter, NoticeHandle,
    SubscriberId,
};
pub use session::{EditorMode, EditorSession};
pub use types::*;
