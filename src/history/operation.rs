//! Reversible edit operations.
//!
//! Every undoable change is one variant of [`EditOperation`]. Each variant
//! keeps enough state to redo and undo itself against any [`Document`],
//! and both directions tolerate a document that is already in the target
//! state (an entity already removed, a property already set).

use crate::document::Document;
use crate::types::{ContainerSlot, Entity, EntityId, PropertyValue, Rect};
use std::fmt;

/// Kind tag of an operation, used for logging and merge checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    AddOrDelete,
    Property,
    Transform,
    InventoryMove,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::AddOrDelete => "add_or_delete",
            OperationKind::Property => "property",
            OperationKind::Transform => "transform",
            OperationKind::InventoryMove => "inventory_move",
        };
        f.write_str(name)
    }
}

/// Result of folding one operation into another.
#[derive(Debug)]
pub enum MergeOutcome {
    /// The operation's effect now lives in the target.
    Merged,
    /// The kinds (or receivers) were incompatible; the operation is handed back.
    Rejected(EditOperation),
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged)
    }
}

/// One undoable unit of work.
#[derive(Clone, Debug, PartialEq)]
pub enum EditOperation {
    AddOrDelete(AddOrDelete),
    Property(PropertyChange),
    Transform(Transform),
    InventoryMove(InventoryMove),
}

impl EditOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            EditOperation::AddOrDelete(_) => OperationKind::AddOrDelete,
            EditOperation::Property(_) => OperationKind::Property,
            EditOperation::Transform(_) => OperationKind::Transform,
            EditOperation::InventoryMove(_) => OperationKind::InventoryMove,
        }
    }

    /// Perform (or redo) the change.
    pub fn apply(&self, doc: &mut dyn Document) {
        match self {
            EditOperation::AddOrDelete(op) => op.set_present(doc, !op.was_deleted),
            EditOperation::Property(op) => op.apply(doc),
            EditOperation::Transform(op) => op.set_rects(doc, &op.new_rects),
            EditOperation::InventoryMove(op) => op.place(doc, op.to),
        }
    }

    /// Revert the change.
    pub fn unapply(&self, doc: &mut dyn Document) {
        match self {
            EditOperation::AddOrDelete(op) => op.set_present(doc, op.was_deleted),
            EditOperation::Property(op) => op.unapply(doc),
            EditOperation::Transform(op) => op.set_rects(doc, &op.old_rects),
            EditOperation::InventoryMove(op) => op.place(doc, op.from),
        }
    }

    /// Label shown in the history list.
    pub fn description(&self) -> String {
        match self {
            EditOperation::AddOrDelete(op) => op.description(),
            EditOperation::Property(op) => op.description(),
            EditOperation::Transform(op) => op.description(),
            EditOperation::InventoryMove(op) => format!("Moved {}", op.item_name),
        }
    }

    /// Fold this operation into `target`, so that applying `target` alone
    /// has the effect of applying `target` and then `self`.
    pub fn try_merge_into(self, target: &mut EditOperation) -> MergeOutcome {
        match (self, target) {
            (EditOperation::AddOrDelete(op), EditOperation::AddOrDelete(master))
                if op.was_deleted == master.was_deleted =>
            {
                master.entities.extend(op.entities);
                MergeOutcome::Merged
            }
            (EditOperation::Property(op), EditOperation::Property(master))
                if op.receivers == master.receivers && op.property == master.property =>
            {
                master.new_value = op.new_value;
                MergeOutcome::Merged
            }
            (EditOperation::Transform(op), EditOperation::Transform(master))
                if op.receivers == master.receivers && op.resized == master.resized =>
            {
                master.new_rects = op.new_rects;
                MergeOutcome::Merged
            }
            (op, _) => MergeOutcome::Rejected(op),
        }
    }

    /// Release state retained for undo. Called once the operation can no
    /// longer be reached from the history.
    pub fn dispose(&mut self) {
        match self {
            EditOperation::AddOrDelete(op) => op.entities.clear(),
            EditOperation::Property(op) => {
                op.receivers.clear();
                op.old_values.clear();
            }
            EditOperation::Transform(op) => {
                op.receivers.clear();
                op.old_rects.clear();
                op.new_rects.clear();
            }
            EditOperation::InventoryMove(_) => {}
        }
    }
}

/// Entities added to or removed from the document.
///
/// Full copies of the entities are retained so a deletion can be undone.
#[derive(Clone, Debug, PartialEq)]
pub struct AddOrDelete {
    pub entities: Vec<Entity>,
    pub was_deleted: bool,
}

impl AddOrDelete {
    pub fn added(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            was_deleted: false,
        }
    }

    pub fn deleted(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            was_deleted: true,
        }
    }

    fn set_present(&self, doc: &mut dyn Document, present: bool) {
        for entity in &self.entities {
            if present {
                doc.insert(entity.clone());
            } else {
                doc.remove(entity.id);
            }
        }
    }

    fn description(&self) -> String {
        let verb = if self.was_deleted { "Removed" } else { "Added" };
        match self.entities.as_slice() {
            [single] => format!("{verb} {}", single.name),
            many => format!("{verb} {} items", many.len()),
        }
    }
}

impl From<AddOrDelete> for EditOperation {
    fn from(op: AddOrDelete) -> Self {
        EditOperation::AddOrDelete(op)
    }
}

/// A property set to one value on one or more entities.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyChange {
    pub receivers: Vec<EntityId>,
    pub property: String,
    pub new_value: PropertyValue,
    /// Value before the change, per receiver. `None` if the property was unset.
    pub old_values: Vec<Option<PropertyValue>>,
    label: String,
}

impl PropertyChange {
    /// Capture the current values of `property` on `receivers` before
    /// setting it to `new_value`.
    pub fn capture(
        doc: &dyn Document,
        receivers: Vec<EntityId>,
        property: impl Into<String>,
        new_value: PropertyValue,
    ) -> Self {
        let property = property.into();
        let old_values = receivers
            .iter()
            .map(|id| {
                doc.entity(*id)
                    .and_then(|e| e.properties.get(&property).cloned())
            })
            .collect();
        let label = receivers
            .first()
            .and_then(|id| doc.entity(*id))
            .map(|e| e.name.clone())
            .unwrap_or_default();

        Self {
            receivers,
            property,
            new_value,
            old_values,
            label,
        }
    }

    fn apply(&self, doc: &mut dyn Document) {
        for id in &self.receivers {
            if let Some(entity) = doc.entity_mut(*id) {
                entity
                    .properties
                    .insert(self.property.clone(), self.new_value.clone());
            }
        }
    }

    fn unapply(&self, doc: &mut dyn Document) {
        for (id, old) in self.receivers.iter().zip(&self.old_values) {
            if let Some(entity) = doc.entity_mut(*id) {
                match old {
                    Some(value) => {
                        entity.properties.insert(self.property.clone(), value.clone());
                    }
                    None => {
                        entity.properties.remove(&self.property);
                    }
                }
            }
        }
    }

    fn description(&self) -> String {
        if self.receivers.len() > 1 {
            format!(
                "Changed {} of {} items to {}",
                self.property,
                self.receivers.len(),
                self.new_value
            )
        } else {
            format!(
                "Changed {} of {} to {}",
                self.property, self.label, self.new_value
            )
        }
    }
}

impl From<PropertyChange> for EditOperation {
    fn from(op: PropertyChange) -> Self {
        EditOperation::Property(op)
    }
}

/// Entities moved or resized.
///
/// `receivers`, `old_rects` and `new_rects` are parallel lists.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub receivers: Vec<EntityId>,
    pub old_rects: Vec<Rect>,
    pub new_rects: Vec<Rect>,
    pub resized: bool,
    label: String,
}

impl Transform {
    /// Capture the current rectangles of `receivers` before they change to
    /// `new_rects`.
    pub fn capture(
        doc: &dyn Document,
        receivers: Vec<EntityId>,
        new_rects: Vec<Rect>,
        resized: bool,
    ) -> Self {
        let old_rects = receivers
            .iter()
            .zip(&new_rects)
            .map(|(id, new)| doc.entity(*id).map(|e| e.rect).unwrap_or(*new))
            .collect();
        let label = receivers
            .first()
            .and_then(|id| doc.entity(*id))
            .map(|e| e.name.clone())
            .unwrap_or_default();

        Self {
            receivers,
            old_rects,
            new_rects,
            resized,
            label,
        }
    }

    fn set_rects(&self, doc: &mut dyn Document, rects: &[Rect]) {
        if self.receivers.len() != rects.len() {
            tracing::warn!(
                receivers = self.receivers.len(),
                rects = rects.len(),
                "transform receiver count does not match rect count, skipping"
            );
            return;
        }
        for (id, rect) in self.receivers.iter().zip(rects) {
            if let Some(entity) = doc.entity_mut(*id) {
                entity.rect = *rect;
            }
        }
    }

    fn description(&self) -> String {
        if self.resized {
            format!("Resized {}", self.label)
        } else if self.receivers.len() > 1 {
            format!("Moved {} items", self.receivers.len())
        } else {
            format!("Moved {}", self.label)
        }
    }
}

impl From<Transform> for EditOperation {
    fn from(op: Transform) -> Self {
        EditOperation::Transform(op)
    }
}

/// An item moved between container slots, or in or out of a container.
#[derive(Clone, Debug, PartialEq)]
pub struct InventoryMove {
    pub item: EntityId,
    pub item_name: String,
    pub from: Option<ContainerSlot>,
    pub to: Option<ContainerSlot>,
}

impl InventoryMove {
    /// Capture the item's current slot before it moves to `to`.
    pub fn capture(doc: &dyn Document, item: EntityId, to: Option<ContainerSlot>) -> Self {
        let (item_name, from) = doc
            .entity(item)
            .map(|e| (e.name.clone(), e.container))
            .unwrap_or_default();
        Self {
            item,
            item_name,
            from,
            to,
        }
    }

    fn place(&self, doc: &mut dyn Document, slot: Option<ContainerSlot>) {
        if let Some(entity) = doc.entity_mut(self.item) {
            entity.container = slot;
        }
    }
}

impl From<InventoryMove> for EditOperation {
    fn from(op: InventoryMove) -> Self {
        EditOperation::InventoryMove(op)
    }
}
