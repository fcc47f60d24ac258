//! In-memory scene document.

use super::Document;
use crate::error::Result;
use crate::types::{Entity, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named collection of placed entities.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    name: String,
    entities: BTreeMap<EntityId, Entity>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: BTreeMap::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Smallest id not used by any entity yet.
    pub fn next_id(&self) -> EntityId {
        self.entities
            .keys()
            .next_back()
            .map(|id| EntityId(id.0 + 1))
            .unwrap_or(EntityId(1))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Entities stored inside `container`, ordered by slot.
    pub fn contents_of(&self, container: EntityId) -> Vec<&Entity> {
        let mut contents: Vec<&Entity> = self
            .entities
            .values()
            .filter(|e| e.container.map(|c| c.container) == Some(container))
            .collect();
        contents.sort_by_key(|e| e.container.map(|c| c.slot));
        contents
    }
}

impl Document for Scene {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    fn insert(&mut self, entity: Entity) -> bool {
        if self.entities.contains_key(&entity.id) {
            return false;
        }
        self.entities.insert(entity.id, entity);
        true
    }

    fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    fn snapshot(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    fn restore(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditorError;
    use crate::types::{PropertyValue, Rect};

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut scene = Scene::new("Dugong");
        assert!(scene.insert(Entity::new(EntityId(1), "Hull")));
        assert!(!scene.insert(Entity::new(EntityId(1), "Other")));
        assert_eq!(scene.entity(EntityId(1)).unwrap().name, "Hull");
    }

    #[test]
    fn test_next_id() {
        let mut scene = Scene::new("Dugong");
        assert_eq!(scene.next_id(), EntityId(1));
        scene.insert(Entity::new(EntityId(9), "Hull"));
        assert_eq!(scene.next_id(), EntityId(10));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut scene = Scene::new("Dugong");
        scene.insert(
            Entity::new(EntityId(1), "Pump")
                .with_rect(Rect::new(10, 20, 32, 32))
                .with_property("speed", PropertyValue::Float(0.5)),
        );
        scene.insert(Entity::new(EntityId(2), "Battery").in_container(EntityId(1), 0));

        let bytes = scene.snapshot().unwrap();
        let restored = Scene::restore(&bytes).unwrap();
        assert_eq!(restored, scene);
    }

    #[test]
    fn test_restore_garbage_fails() {
        let result = Scene::restore(b"definitely not msgpack");
        assert!(matches!(result, Err(EditorError::Deserialization(_))));
    }

    #[test]
    fn test_contents_of_sorted_by_slot() {
        let mut scene = Scene::new("Dugong");
        scene.insert(Entity::new(EntityId(1), "Cabinet"));
        scene.insert(Entity::new(EntityId(2), "Wrench").in_container(EntityId(1), 3));
        scene.insert(Entity::new(EntityId(3), "Welder").in_container(EntityId(1), 0));

        let names: Vec<&str> = scene
            .contents_of(EntityId(1))
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Welder", "Wrench"]);
    }
}
