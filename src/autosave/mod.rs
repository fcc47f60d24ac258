//! Periodic background autosaves with bounded retention.
//!
//! - [`AutoSaveScheduler`]: decides when to save, pause-aware
//! - [`RetentionIndex`]: persisted catalog, evicts the oldest saves
//! - [`payload`]: compressed, checksummed snapshot files

pub mod payload;
mod retention;
mod scheduler;

pub use retention::{
    AutoSaveHandle, AutoSaveMenuEntry, AutoSaveRecord, RetentionIndex, CATALOG_FILE,
    DEFAULT_MAX_RETAINED,
};
pub use scheduler::{AutoSaveScheduler, SaveReason, SchedulerState, Tick, DEFAULT_INTERVAL};
