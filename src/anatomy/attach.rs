//! Structural mutation of body part trees
//!
//! Every operation here validates before it mutates: on any `Err` the
//! tree is exactly as it was. The host serializes calls per body (all
//! functions take `&mut World`), so no locking is involved.

use thiserror::Error;

use crate::anatomy::graph::BodyGraph;
use crate::anatomy::part::{ParentLink, PartKind};
use crate::core::types::EntityId;
use crate::ecs::world::World;

/// Typed rejection of an attach/graft request
///
/// All variants are routine, recoverable refusals; user-facing wording
/// is the caller's business.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttachError {
    #[error("Entity {0:?} has no body")]
    NoBody(EntityId),

    #[error("Body already carries {count} {kind} parts (ceiling {ceiling})")]
    LimitExceeded {
        kind: PartKind,
        count: usize,
        ceiling: usize,
    },

    #[error("Slot '{slot_id}' on part {parent:?} is already occupied")]
    SlotOccupied { parent: EntityId, slot_id: String },

    #[error("Part {0:?} is not in the target body")]
    ParentNotInBody(EntityId),

    #[error("Part {0:?} is already attached")]
    ChildAlreadyAttached(EntityId),

    #[error("Entity {0:?} is not a body part")]
    NotAPart(EntityId),

    #[error("Body {0:?} already has a root part")]
    RootOccupied(EntityId),
}

/// Install a part as the root of an empty body
pub fn mount_root(world: &mut World, body: EntityId, part: EntityId) -> Result<(), AttachError> {
    let body_comp = world.body(body).ok_or(AttachError::NoBody(body))?;
    if body_comp.root.is_some() {
        return Err(AttachError::RootOccupied(body));
    }
    let part_comp = world.part(part).ok_or(AttachError::NotAPart(part))?;
    if part_comp.is_attached() {
        return Err(AttachError::ChildAlreadyAttached(part));
    }

    set_body_recursive(world, part, Some(body));
    if let Some(b) = world.body_mut(body) {
        b.root = Some(part);
    }
    tracing::debug!(
        "Mounted {} as root of {}",
        world.describe(part),
        world.describe(body)
    );
    Ok(())
}

/// Bind a detached part into a parent's slot
///
/// The slot is created empty when `slot_id` does not exist yet on the
/// parent. The child keeps a back-reference to parent and slot; the
/// relation is non-owning in both directions.
pub fn attach(
    world: &mut World,
    body: EntityId,
    parent: EntityId,
    slot_id: &str,
    child: EntityId,
) -> Result<(), AttachError> {
    let graph = BodyGraph::new(world, body)?;
    if !graph.contains(parent) {
        return Err(AttachError::ParentNotInBody(parent));
    }

    let child_comp = world.part(child).ok_or(AttachError::NotAPart(child))?;
    if child_comp.is_attached() {
        return Err(AttachError::ChildAlreadyAttached(child));
    }

    let parent_comp = world.part(parent).ok_or(AttachError::NotAPart(parent))?;
    match parent_comp.slot(slot_id) {
        Some(slot) if slot.is_occupied() => {
            return Err(AttachError::SlotOccupied {
                parent,
                slot_id: slot_id.to_string(),
            });
        }
        Some(_) => {}
        None => {
            tracing::debug!("Creating slot '{}' on {}", slot_id, world.describe(parent));
        }
    }

    // Checks done, mutate.
    if let Some(parent_comp) = world.part_mut(parent) {
        parent_comp.ensure_slot(slot_id).child = Some(child);
    }
    if let Some(child_comp) = world.part_mut(child) {
        child_comp.parent = Some(ParentLink {
            parent,
            slot_id: slot_id.to_string(),
        });
    }
    set_body_recursive(world, child, Some(body));

    tracing::debug!(
        "Attached {} to {} at slot '{}'",
        world.describe(child),
        world.describe(parent),
        slot_id
    );
    Ok(())
}

/// Release a part from its owner
///
/// Clears the parent slot (root reference for a root part) and the
/// subtree's body references. The emptied slot survives. Returns false
/// when the part was not attached to anything.
pub fn detach(world: &mut World, part: EntityId) -> bool {
    let Some(part_comp) = world.part(part) else {
        return false;
    };
    if !part_comp.is_attached() {
        return false;
    }

    match part_comp.parent.clone() {
        Some(link) => {
            if let Some(parent_comp) = world.part_mut(link.parent) {
                if let Some(slot) = parent_comp.slot_mut(&link.slot_id) {
                    if slot.child == Some(part) {
                        slot.child = None;
                    }
                }
            }
            if let Some(part_comp) = world.part_mut(part) {
                part_comp.parent = None;
            }
        }
        None => {
            // A root part: clear the body's root reference.
            if let Some(body) = part_comp.body {
                if let Some(body_comp) = world.body_mut(body) {
                    if body_comp.root == Some(part) {
                        body_comp.root = None;
                    }
                }
            }
        }
    }

    set_body_recursive(world, part, None);
    tracing::debug!("Detached {}", world.describe(part));
    true
}

/// Propagate a body reference through a part's subtree
fn set_body_recursive(world: &mut World, part: EntityId, body: Option<EntityId>) {
    let mut pending = vec![part];
    while let Some(current) = pending.pop() {
        if let Some(comp) = world.part_mut(current) {
            comp.body = body;
            pending.extend(comp.children());
        }
    }
}
