//! Body part components, kinds, and slots

use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;

/// Classification of a body part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Other,
    Torso,
    Head,
    Arm,
    Hand,
    Leg,
    Foot,
    Tail,
}

impl PartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartKind::Other => "other",
            PartKind::Torso => "torso",
            PartKind::Head => "head",
            PartKind::Arm => "arm",
            PartKind::Hand => "hand",
            PartKind::Leg => "leg",
            PartKind::Foot => "foot",
            PartKind::Tail => "tail",
        }
    }
}

impl std::fmt::Display for PartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named attachment point on a part, holds at most one child
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSlot {
    pub id: String,
    pub child: Option<EntityId>,
}

impl PartSlot {
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            child: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.child.is_some()
    }
}

/// Back-reference from an attached part to its owner
///
/// Non-owning: despawning the parent detaches the child, it does not
/// destroy it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentLink {
    pub parent: EntityId,
    pub slot_id: String,
}

/// A node in a body's part tree
///
/// Slots keep insertion order, which fixes the traversal order of the
/// whole tree. `body` is Some exactly while the part is reachable from
/// that body's root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartComponent {
    /// Id of the template this part was spawned from
    pub template: String,
    pub kind: PartKind,
    pub slots: Vec<PartSlot>,
    pub parent: Option<ParentLink>,
    pub body: Option<EntityId>,
}

impl PartComponent {
    pub fn new(template: impl Into<String>, kind: PartKind) -> Self {
        Self {
            template: template.into(),
            kind,
            slots: Vec::new(),
            parent: None,
            body: None,
        }
    }

    pub fn slot(&self, id: &str) -> Option<&PartSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn slot_mut(&mut self, id: &str) -> Option<&mut PartSlot> {
        self.slots.iter_mut().find(|s| s.id == id)
    }

    /// Get a slot, creating it empty if it does not exist yet
    pub fn ensure_slot(&mut self, id: &str) -> &mut PartSlot {
        if let Some(index) = self.slots.iter().position(|s| s.id == id) {
            return &mut self.slots[index];
        }
        self.slots.push(PartSlot::empty(id));
        let last = self.slots.len() - 1;
        &mut self.slots[last]
    }

    /// Attached either under a parent slot or as a body root
    pub fn is_attached(&self) -> bool {
        self.parent.is_some() || self.body.is_some()
    }

    /// Child parts in slot insertion order
    pub fn children(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().filter_map(|s| s.child)
    }
}

/// Root reference of an anatomical part tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyComponent {
    pub root: Option<EntityId>,
}

impl BodyComponent {
    pub fn new() -> Self {
        Self::default()
    }
}
