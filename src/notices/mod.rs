//! Notifications from the editor session to the UI layer.
//!
//! The UI subscribes once and polls its handle every frame:
//! - Autosave completed (drives the transient "saved" label)
//! - Autosave failed
//! - History cleared (document replaced, mode switched)
//!
//! Buffers are bounded; a subscriber that stops draining is dropped rather
//! than stalling the main loop.
//!
//! # Example
//!
//! ```ignore
//! let handle = session.subscribe_notices(NoticeConfig::default());
//!
//! // Once per frame
//! while let Ok(notice) = handle.try_recv() {
//!     match notice {
//!         Notice::AutoSaved { record, .. } => show_saved_label(&record),
//!         Notice::Dropped { .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::NoticeBroadcaster;
pub use types::{
    ClearReason, DropReason, Notice, NoticeConfig, NoticeFilter, NoticeHandle, SubscriberId,
};
