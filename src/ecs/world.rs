//! World - entity storage for bodies and parts
//!
//! A hand-rolled component store, not a general ECS: just enough
//! registry surface (spawn, despawn, component lookup) for the anatomy
//! subsystem and its callers.

use ahash::AHashMap;

use crate::anatomy::attach;
use crate::anatomy::part::{BodyComponent, PartComponent};
use crate::anatomy::templates::PartTemplate;
use crate::core::types::{EntityId, Tick, Vec2};

#[derive(Debug, Clone)]
struct EntityMeta {
    name: String,
    spawned_tick: Tick,
}

/// The world containing all entities
pub struct World {
    pub current_tick: Tick,
    meta: AHashMap<EntityId, EntityMeta>,
    parts: AHashMap<EntityId, PartComponent>,
    bodies: AHashMap<EntityId, BodyComponent>,
    positions: AHashMap<EntityId, Vec2>,
}

impl World {
    pub fn new() -> Self {
        Self {
            current_tick: 0,
            meta: AHashMap::new(),
            parts: AHashMap::new(),
            bodies: AHashMap::new(),
            positions: AHashMap::new(),
        }
    }

    /// Spawn an entity with an empty body component (no root part yet)
    pub fn spawn_body(&mut self, name: &str, position: Vec2) -> EntityId {
        let id = EntityId::new();
        self.meta.insert(
            id,
            EntityMeta {
                name: name.to_string(),
                spawned_tick: self.current_tick,
            },
        );
        self.positions.insert(id, position);
        self.bodies.insert(id, BodyComponent::new());
        id
    }

    /// Spawn a detached part entity from a template
    pub fn spawn_part(&mut self, template: &PartTemplate, position: Vec2) -> EntityId {
        let id = EntityId::new();
        self.meta.insert(
            id,
            EntityMeta {
                name: template.name.clone(),
                spawned_tick: self.current_tick,
            },
        );
        self.positions.insert(id, position);
        self.parts.insert(id, template.instantiate());
        id
    }

    /// Remove an entity and all its components
    ///
    /// A part is detached from its owner first and its children are
    /// detached from it; they survive as loose parts (the slot relation
    /// is non-owning). Despawning a body likewise only orphans its tree.
    pub fn despawn(&mut self, entity: EntityId) {
        if self.parts.contains_key(&entity) {
            attach::detach(self, entity);
            let children: Vec<EntityId> = self
                .parts
                .get(&entity)
                .map(|p| p.children().collect())
                .unwrap_or_default();
            for child in children {
                attach::detach(self, child);
            }
        }
        if let Some(root) = self.bodies.get(&entity).and_then(|b| b.root) {
            attach::detach(self, root);
        }
        self.meta.remove(&entity);
        self.parts.remove(&entity);
        self.bodies.remove(&entity);
        self.positions.remove(&entity);
    }

    pub fn part(&self, entity: EntityId) -> Option<&PartComponent> {
        self.parts.get(&entity)
    }

    pub fn part_mut(&mut self, entity: EntityId) -> Option<&mut PartComponent> {
        self.parts.get_mut(&entity)
    }

    pub fn body(&self, entity: EntityId) -> Option<&BodyComponent> {
        self.bodies.get(&entity)
    }

    pub fn body_mut(&mut self, entity: EntityId) -> Option<&mut BodyComponent> {
        self.bodies.get_mut(&entity)
    }

    pub fn position(&self, entity: EntityId) -> Option<Vec2> {
        self.positions.get(&entity).copied()
    }

    pub fn name(&self, entity: EntityId) -> Option<&str> {
        self.meta.get(&entity).map(|m| m.name.as_str())
    }

    pub fn spawned_tick(&self, entity: EntityId) -> Option<Tick> {
        self.meta.get(&entity).map(|m| m.spawned_tick)
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.meta.contains_key(&entity)
    }

    pub fn entity_count(&self) -> usize {
        self.meta.len()
    }

    /// Human-readable entity reference for log lines and messages
    pub fn describe(&self, entity: EntityId) -> String {
        match self.name(entity) {
            Some(name) => format!("{} ({})", name, entity.short()),
            None => format!("unknown ({})", entity.short()),
        }
    }

    pub fn tick(&mut self) {
        self.current_tick += 1;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anatomy::part::PartKind;
    use crate::anatomy::templates::TemplateRegistry;

    #[test]
    fn test_spawn_part_carries_template_slots() {
        let registry = TemplateRegistry::builtin_humanoid();
        let mut world = World::new();
        let torso_template = registry.get("human_torso").expect("torso").clone();
        let torso = world.spawn_part(&torso_template, Vec2::new(2.0, 3.0));

        let part = world.part(torso).expect("part component");
        assert_eq!(part.kind, PartKind::Torso);
        assert_eq!(part.slots.len(), 5);
        assert_eq!(world.position(torso), Some(Vec2::new(2.0, 3.0)));
        assert_eq!(world.name(torso), Some("Torso"));
    }

    #[test]
    fn test_despawn_detaches_but_keeps_children() {
        let registry = TemplateRegistry::builtin_humanoid();
        let mut world = World::new();
        let body = world.spawn_body("Subject", Vec2::default());
        let torso_template = registry.get("human_torso").expect("torso").clone();
        let arm_template = registry.get("human_left_arm").expect("arm").clone();
        let hand_template = registry.get("human_left_hand").expect("hand").clone();
        let torso = world.spawn_part(&torso_template, Vec2::default());
        let arm = world.spawn_part(&arm_template, Vec2::default());
        let hand = world.spawn_part(&hand_template, Vec2::default());
        attach::mount_root(&mut world, body, torso).expect("mount root");
        attach::attach(&mut world, body, torso, "left_shoulder", arm).expect("attach arm");
        attach::attach(&mut world, body, arm, "hand", hand).expect("attach hand");

        world.despawn(arm);

        assert!(!world.is_alive(arm));
        // The hand survives as a loose part.
        assert!(world.is_alive(hand));
        assert!(world.part(hand).map_or(false, |p| !p.is_attached()));
        // The torso's shoulder slot is empty again.
        assert!(world
            .part(torso)
            .and_then(|p| p.slot("left_shoulder"))
            .map_or(false, |s| !s.is_occupied()));
    }

    #[test]
    fn test_despawn_body_orphans_tree() {
        let registry = TemplateRegistry::builtin_humanoid();
        let mut world = World::new();
        let body = world.spawn_body("Subject", Vec2::default());
        let torso_template = registry.get("human_torso").expect("torso").clone();
        let torso = world.spawn_part(&torso_template, Vec2::default());
        attach::mount_root(&mut world, body, torso).expect("mount root");

        world.despawn(body);

        assert!(!world.is_alive(body));
        assert!(world.is_alive(torso));
        assert_eq!(world.part(torso).and_then(|p| p.body), None);
    }

    #[test]
    fn test_describe_names_entities() {
        let mut world = World::new();
        let body = world.spawn_body("Subject", Vec2::default());
        assert!(world.describe(body).starts_with("Subject ("));
        assert!(world.describe(EntityId::new()).starts_with("unknown ("));
    }

    #[test]
    fn test_tick_advances() {
        let mut world = World::new();
        world.tick();
        world.tick();
        let late = world.spawn_body("Late", Vec2::default());
        assert_eq!(world.current_tick, 2);
        assert_eq!(world.spawned_tick(late), Some(2));
    }
}
