//! Attachment resolution - picks anchors and slots, grafts parts, builds bodies

use crate::anatomy::attach::{self, AttachError};
use crate::anatomy::graph::BodyGraph;
use crate::anatomy::part::PartKind;
use crate::anatomy::templates::{BodyPlan, PartTemplate, TemplateRegistry};
use crate::core::config::{self, AnatomyConfig};
use crate::core::error::{AnatomyError, Result};
use crate::core::types::{EntityId, Vec2};
use crate::ecs::world::World;

/// Fixed seeds so derived slot ids survive process restarts
const SLOT_SEEDS: (u64, u64, u64, u64) = (
    0x6c69_6d62_7772_6967,
    0x6874_5f73_6c6f_7473,
    0x9e37_79b9_7f4a_7c15,
    0x2545_f491_4f6c_dd1d,
);

/// Derive the slot id for a grafted part from its template identity
///
/// Depends only on the template id string, never on the part instance,
/// so the same template grafted to the same parent lands in the same
/// slot on every run.
pub fn derive_slot_id(template_id: &str) -> String {
    let state = ahash::RandomState::with_seeds(SLOT_SEEDS.0, SLOT_SEEDS.1, SLOT_SEEDS.2, SLOT_SEEDS.3);
    format!("graft_{:016x}", state.hash_one(template_id))
}

/// Pick the part a new limb of `kind` should attach to
///
/// Walks the configured anchor preferences in order and returns the
/// first matching part in tree order; with no preferred match the first
/// part of the traversal (the root) is used. Deterministic for an
/// unchanged tree.
pub fn find_attachment_point(
    world: &World,
    config: &AnatomyConfig,
    body: EntityId,
    kind: PartKind,
) -> std::result::Result<EntityId, AttachError> {
    let graph = BodyGraph::new(world, body)?;
    for &anchor_kind in config.anchors_for(kind) {
        if let Some(part) = graph.parts_of_kind(anchor_kind).next() {
            return Ok(part);
        }
    }
    graph.parts().next().ok_or(AttachError::NoBody(body))
}

/// Outcome of a successful graft
#[derive(Debug, Clone, PartialEq)]
pub struct Graft {
    pub part: EntityId,
    pub anchor: EntityId,
    pub slot_id: String,
}

/// Resolves and performs limb attachment against a template registry
pub struct AttachmentResolver<'a> {
    registry: &'a TemplateRegistry,
    config: &'a AnatomyConfig,
}

impl<'a> AttachmentResolver<'a> {
    /// Resolver over the global config
    pub fn new(registry: &'a TemplateRegistry) -> Self {
        Self {
            registry,
            config: config::config(),
        }
    }

    pub fn with_config(registry: &'a TemplateRegistry, config: &'a AnatomyConfig) -> Self {
        Self { registry, config }
    }

    /// Spawn a part from a template and attach it to a body
    ///
    /// The whole flow of an attachment request: validate the body, gate
    /// on the kind ceiling, resolve the anchor, derive the slot id,
    /// spawn at the body's position, attach. All-or-nothing: when the
    /// attach itself is refused the spawned part is despawned again.
    pub fn graft(&self, world: &mut World, body: EntityId, template_id: &str) -> Result<Graft> {
        let template = self
            .registry
            .get(template_id)
            .ok_or_else(|| AnatomyError::TemplateNotFound(template_id.to_string()))?
            .clone();

        let graph = BodyGraph::new(world, body)?;
        if let Some(ceiling) = self.config.ceiling_for(template.kind) {
            let count = graph.count_of_kind(template.kind);
            if count > ceiling {
                tracing::warn!(
                    "Refusing graft of '{}': {} already carries {} {} parts (ceiling {})",
                    template.id,
                    world.describe(body),
                    count,
                    template.kind,
                    ceiling
                );
                return Err(AttachError::LimitExceeded {
                    kind: template.kind,
                    count,
                    ceiling,
                }
                .into());
            }
        }

        let anchor = find_attachment_point(world, self.config, body, template.kind)?;
        let slot_id = derive_slot_id(&template.id);
        let position = world.position(body).unwrap_or_default();
        let part = world.spawn_part(&template, position);

        if let Err(err) = attach::attach(world, body, anchor, &slot_id, part) {
            world.despawn(part);
            return Err(err.into());
        }

        tracing::info!(
            "Grafted {} onto {} at slot '{}'",
            world.describe(part),
            world.describe(anchor),
            slot_id
        );
        Ok(Graft {
            part,
            anchor,
            slot_id,
        })
    }

    /// Assemble a complete body from a registered plan
    ///
    /// Cleans up every spawned entity when assembly fails partway.
    pub fn build_body(
        &self,
        world: &mut World,
        name: &str,
        plan_id: &str,
        position: Vec2,
    ) -> Result<EntityId> {
        let plan = self
            .registry
            .get_plan(plan_id)
            .ok_or_else(|| AnatomyError::PlanNotFound(plan_id.to_string()))?
            .clone();

        let body = world.spawn_body(name, position);
        let mut spawned = Vec::with_capacity(plan.parts.len());
        match self.assemble(world, body, &plan, position, &mut spawned) {
            Ok(()) => {
                tracing::info!(
                    "Assembled {} from plan '{}' ({} parts)",
                    world.describe(body),
                    plan.id,
                    spawned.len()
                );
                Ok(body)
            }
            Err(err) => {
                for part in spawned {
                    world.despawn(part);
                }
                world.despawn(body);
                Err(err)
            }
        }
    }

    fn assemble(
        &self,
        world: &mut World,
        body: EntityId,
        plan: &BodyPlan,
        position: Vec2,
        spawned: &mut Vec<EntityId>,
    ) -> Result<()> {
        for (index, entry) in plan.parts.iter().enumerate() {
            let template: PartTemplate = self
                .registry
                .get(&entry.template)
                .ok_or_else(|| AnatomyError::TemplateNotFound(entry.template.clone()))?
                .clone();
            let part = world.spawn_part(&template, position);
            spawned.push(part);

            if index == 0 {
                attach::mount_root(world, body, part)?;
                continue;
            }

            // Registration validated that every non-root entry names an
            // earlier parent.
            let parent = entry
                .parent
                .and_then(|p| spawned.get(p).copied())
                .ok_or_else(|| AnatomyError::InvalidPlan {
                    plan: plan.id.clone(),
                    reason: format!("part {} has no valid parent", index),
                })?;
            let slot_id = match &entry.slot {
                Some(slot) => slot.clone(),
                None => derive_slot_id(&template.id),
            };
            attach::attach(world, body, parent, &slot_id, part)?;
        }
        Ok(())
    }
}
