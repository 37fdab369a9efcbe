//! Part templates and body plans
//!
//! This module provides the `TemplateRegistry` which manages part
//! definitions and declarative body plans, handles TOML file loading,
//! and carries the built-in humanoid set used by tests and demos.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::anatomy::part::{PartComponent, PartKind, PartSlot};
use crate::core::error::{AnatomyError, Result};

/// Definition a part entity is spawned from
///
/// The template id is the stable identity used for slot-id derivation,
/// so it must not change between releases once data ships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartTemplate {
    pub id: String,
    pub name: String,
    pub kind: PartKind,
    /// Slots the part offers from the start; more may appear lazily
    #[serde(default)]
    pub slots: Vec<String>,
}

impl PartTemplate {
    /// Create the runtime component for a fresh, detached part
    pub fn instantiate(&self) -> PartComponent {
        let mut component = PartComponent::new(self.id.clone(), self.kind);
        component.slots = self.slots.iter().map(PartSlot::empty).collect();
        component
    }
}

/// One entry of a body plan; `parent` indexes an earlier entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPart {
    pub template: String,
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub slot: Option<String>,
}

/// Declarative assembly order for a whole body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPlan {
    pub id: String,
    pub name: String,
    pub parts: Vec<PlanPart>,
}

/// Registry for part templates and body plans
pub struct TemplateRegistry {
    templates: AHashMap<String, PartTemplate>,
    by_kind: AHashMap<PartKind, Vec<String>>,
    plans: AHashMap<String, BodyPlan>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            templates: AHashMap::new(),
            by_kind: AHashMap::new(),
            plans: AHashMap::new(),
        }
    }

    /// Register a template, replacing any previous one with the same id
    pub fn register(&mut self, template: PartTemplate) {
        if let Some(old) = self.templates.insert(template.id.clone(), template.clone()) {
            if let Some(ids) = self.by_kind.get_mut(&old.kind) {
                ids.retain(|id| id != &old.id);
            }
        }
        self.by_kind
            .entry(template.kind)
            .or_default()
            .push(template.id);
    }

    /// Register a body plan after validating it
    pub fn register_plan(&mut self, plan: BodyPlan) -> Result<()> {
        if let Err(reason) = validate_plan(&plan) {
            return Err(AnatomyError::InvalidPlan {
                plan: plan.id,
                reason,
            });
        }
        self.plans.insert(plan.id.clone(), plan);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&PartTemplate> {
        self.templates.get(id)
    }

    pub fn get_plan(&self, id: &str) -> Option<&BodyPlan> {
        self.plans.get(id)
    }

    /// Template ids of one kind, registration order
    pub fn ids_of_kind(&self, kind: PartKind) -> &[String] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Load one part template from a TOML file
    pub fn load_parts_file(&mut self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path)?;
        let template: PartTemplate = toml::from_str(&content)?;
        let id = template.id.clone();
        self.register(template);
        Ok(id)
    }

    /// Load all .toml part templates from a directory
    pub fn load_parts_dir(&mut self, path: &Path) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.extension().map_or(false, |ext| ext == "toml") {
                ids.push(self.load_parts_file(&entry_path)?);
            }
        }
        Ok(ids)
    }

    /// Load one body plan from a TOML file
    pub fn load_plans_file(&mut self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path)?;
        let plan: BodyPlan = toml::from_str(&content)?;
        let id = plan.id.clone();
        self.register_plan(plan)?;
        Ok(id)
    }

    /// Load all .toml body plans from a directory
    pub fn load_plans_dir(&mut self, path: &Path) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.extension().map_or(false, |ext| ext == "toml") {
                ids.push(self.load_plans_file(&entry_path)?);
            }
        }
        Ok(ids)
    }

    /// Built-in humanoid template set and assembly plan
    ///
    /// Mirrors the shipped `data/` files so tests and demos work without
    /// a data directory.
    pub fn builtin_humanoid() -> Self {
        let mut registry = Self::new();

        let templates = [
            (
                "human_torso",
                "Torso",
                PartKind::Torso,
                vec![
                    "neck",
                    "left_shoulder",
                    "right_shoulder",
                    "left_hip",
                    "right_hip",
                ],
            ),
            ("human_head", "Head", PartKind::Head, vec![]),
            ("human_left_arm", "Left Arm", PartKind::Arm, vec!["hand"]),
            ("human_right_arm", "Right Arm", PartKind::Arm, vec!["hand"]),
            ("human_left_hand", "Left Hand", PartKind::Hand, vec![]),
            ("human_right_hand", "Right Hand", PartKind::Hand, vec![]),
            ("human_left_leg", "Left Leg", PartKind::Leg, vec!["foot"]),
            ("human_right_leg", "Right Leg", PartKind::Leg, vec!["foot"]),
            ("human_left_foot", "Left Foot", PartKind::Foot, vec![]),
            ("human_right_foot", "Right Foot", PartKind::Foot, vec![]),
        ];
        for (id, name, kind, slots) in templates {
            registry.register(PartTemplate {
                id: id.to_string(),
                name: name.to_string(),
                kind,
                slots: slots.into_iter().map(str::to_string).collect(),
            });
        }

        let plan = BodyPlan {
            id: "humanoid".to_string(),
            name: "Humanoid".to_string(),
            parts: vec![
                plan_part("human_torso", None, None),
                plan_part("human_head", Some(0), Some("neck")),
                plan_part("human_left_arm", Some(0), Some("left_shoulder")),
                plan_part("human_left_hand", Some(2), Some("hand")),
                plan_part("human_right_arm", Some(0), Some("right_shoulder")),
                plan_part("human_right_hand", Some(4), Some("hand")),
                plan_part("human_left_leg", Some(0), Some("left_hip")),
                plan_part("human_left_foot", Some(6), Some("foot")),
                plan_part("human_right_leg", Some(0), Some("right_hip")),
                plan_part("human_right_foot", Some(8), Some("foot")),
            ],
        };
        // The built-in plan is well-formed by construction.
        let _ = registry.register_plan(plan);

        registry
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn plan_part(template: &str, parent: Option<usize>, slot: Option<&str>) -> PlanPart {
    PlanPart {
        template: template.to_string(),
        parent,
        slot: slot.map(str::to_string),
    }
}

/// Structural checks a plan must pass before registration
fn validate_plan(plan: &BodyPlan) -> std::result::Result<(), String> {
    if plan.parts.is_empty() {
        return Err("plan has no parts".to_string());
    }
    if plan.parts[0].parent.is_some() {
        return Err("first part is the root and must not name a parent".to_string());
    }
    for (index, part) in plan.parts.iter().enumerate().skip(1) {
        match part.parent {
            None => return Err(format!("part {} has no parent", index)),
            Some(parent) if parent >= index => {
                return Err(format!(
                    "part {} names parent {} which is not an earlier entry",
                    index, parent
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_template() -> PartTemplate {
        PartTemplate {
            id: "test_hand".to_string(),
            name: "Test Hand".to_string(),
            kind: PartKind::Hand,
            slots: vec![],
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = TemplateRegistry::new();
        registry.register(hand_template());

        let retrieved = registry.get("test_hand");
        assert!(retrieved.is_some());
        assert_eq!(retrieved.map(|t| t.kind), Some(PartKind::Hand));
        assert_eq!(registry.ids_of_kind(PartKind::Hand), &["test_hand"]);
    }

    #[test]
    fn test_reregister_changes_kind_index() {
        let mut registry = TemplateRegistry::new();
        registry.register(hand_template());
        registry.register(PartTemplate {
            kind: PartKind::Other,
            ..hand_template()
        });

        assert!(registry.ids_of_kind(PartKind::Hand).is_empty());
        assert_eq!(registry.ids_of_kind(PartKind::Other), &["test_hand"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_instantiate_declares_slots() {
        let template = PartTemplate {
            id: "test_torso".to_string(),
            name: "Test Torso".to_string(),
            kind: PartKind::Torso,
            slots: vec!["neck".to_string(), "left_shoulder".to_string()],
        };
        let component = template.instantiate();
        assert_eq!(component.template, "test_torso");
        assert_eq!(component.slots.len(), 2);
        assert!(component.slots.iter().all(|s| !s.is_occupied()));
        assert!(!component.is_attached());
    }

    #[test]
    fn test_parse_template_toml() {
        let template: PartTemplate = toml::from_str(
            r#"
            id = "human_left_hand"
            name = "Left Hand"
            kind = "hand"
            "#,
        )
        .expect("template should parse");
        assert_eq!(template.kind, PartKind::Hand);
        assert!(template.slots.is_empty());
    }

    #[test]
    fn test_parse_plan_toml() {
        let plan: BodyPlan = toml::from_str(
            r#"
            id = "stub"
            name = "Stub"

            [[parts]]
            template = "human_torso"

            [[parts]]
            template = "human_head"
            parent = 0
            slot = "neck"
            "#,
        )
        .expect("plan should parse");
        assert_eq!(plan.parts.len(), 2);
        assert_eq!(plan.parts[1].parent, Some(0));
        assert!(validate_plan(&plan).is_ok());
    }

    #[test]
    fn test_plan_validation_rejects_forward_parent() {
        let plan = BodyPlan {
            id: "bad".to_string(),
            name: "Bad".to_string(),
            parts: vec![
                plan_part("human_torso", None, None),
                plan_part("human_head", Some(2), Some("neck")),
            ],
        };
        let mut registry = TemplateRegistry::new();
        assert!(matches!(
            registry.register_plan(plan),
            Err(AnatomyError::InvalidPlan { .. })
        ));
    }

    #[test]
    fn test_plan_validation_rejects_rooted_parent() {
        let plan = BodyPlan {
            id: "bad".to_string(),
            name: "Bad".to_string(),
            parts: vec![plan_part("human_torso", Some(0), None)],
        };
        assert!(validate_plan(&plan).is_err());
    }

    #[test]
    fn test_builtin_humanoid_is_complete() {
        let registry = TemplateRegistry::builtin_humanoid();
        assert_eq!(registry.len(), 10);
        assert_eq!(registry.ids_of_kind(PartKind::Hand).len(), 2);
        let plan = registry.get_plan("humanoid").expect("humanoid plan");
        assert_eq!(plan.parts.len(), 10);
        for part in &plan.parts {
            assert!(registry.get(&part.template).is_some());
        }
    }
}
