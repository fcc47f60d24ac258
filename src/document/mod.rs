//! The editable document collaborator.
//!
//! History operations and autosaves only touch a document through the
//! [`Document`] trait, so the engine works with any entity model that can
//! look entities up by id and serialize itself synchronously. [`Scene`] is
//! the in-memory implementation used by the editor session and the tests.

mod scene;

pub use scene::Scene;

use crate::error::Result;
use crate::types::{Entity, EntityId};

/// An editable document as seen by the history engine and the autosaver.
pub trait Document {
    /// Name shown in the autosave menu.
    fn display_name(&self) -> &str;

    /// Whether the document has nothing worth autosaving.
    fn is_empty(&self) -> bool;

    fn entity(&self, id: EntityId) -> Option<&Entity>;

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity>;

    /// Insert an entity. Returns false and leaves the document untouched
    /// if an entity with the same id is already present.
    fn insert(&mut self, entity: Entity) -> bool;

    /// Remove an entity, returning it if it was present.
    fn remove(&mut self, id: EntityId) -> Option<Entity>;

    /// Serialize the whole document. Runs on the main thread and must not
    /// block on I/O.
    fn snapshot(&self) -> Result<Vec<u8>>;

    /// Rebuild a document from bytes produced by [`Document::snapshot`].
    fn restore(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized;
}
