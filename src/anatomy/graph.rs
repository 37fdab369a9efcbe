//! Body tree traversal and queries
//!
//! All queries walk the tree in pre-order, children in slot insertion
//! order, so two walks of an unchanged tree always agree.

use crate::anatomy::attach::AttachError;
use crate::anatomy::part::PartKind;
use crate::core::types::EntityId;
use crate::ecs::world::World;

/// Read-only view of one body's part tree
pub struct BodyGraph<'a> {
    world: &'a World,
    body: EntityId,
    root: EntityId,
}

impl<'a> BodyGraph<'a> {
    /// Fails with `NoBody` when the entity has no body component or the
    /// body has no root part yet.
    pub fn new(world: &'a World, body: EntityId) -> Result<Self, AttachError> {
        let root = world
            .body(body)
            .and_then(|b| b.root)
            .ok_or(AttachError::NoBody(body))?;
        Ok(Self { world, body, root })
    }

    pub fn body(&self) -> EntityId {
        self.body
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    /// All parts reachable from the root, pre-order
    pub fn parts(&self) -> PartsIter<'a> {
        PartsIter {
            world: self.world,
            stack: vec![self.root],
        }
    }

    /// Parts of one kind, tree order
    pub fn parts_of_kind(&self, kind: PartKind) -> impl Iterator<Item = EntityId> + 'a {
        let world = self.world;
        self.parts()
            .filter(move |&e| world.part(e).map_or(false, |p| p.kind == kind))
    }

    /// Number of parts of one kind reachable from the root
    pub fn count_of_kind(&self, kind: PartKind) -> usize {
        self.parts_of_kind(kind).count()
    }

    /// Whether a part is reachable from this body's root
    pub fn contains(&self, part: EntityId) -> bool {
        self.parts().any(|e| e == part)
    }
}

/// Depth-first pre-order iterator over a part tree
pub struct PartsIter<'a> {
    world: &'a World,
    stack: Vec<EntityId>,
}

impl<'a> Iterator for PartsIter<'a> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        let current = self.stack.pop()?;
        if let Some(part) = self.world.part(current) {
            // Reversed so the first slot's child is visited first.
            for slot in part.slots.iter().rev() {
                if let Some(child) = slot.child {
                    self.stack.push(child);
                }
            }
        }
        Some(current)
    }
}
