//! Anatomy configuration with documented constants
//!
//! The limb limits and anchor preferences are collected here so that
//! body-plan policy can change without touching the resolver.

use ahash::AHashMap;

use crate::anatomy::part::PartKind;

/// Configuration for body-part attachment policy
#[derive(Debug, Clone)]
pub struct AnatomyConfig {
    /// Ceiling on how many parts of a given kind one body may carry.
    ///
    /// A graft request is refused once the existing count exceeds the
    /// ceiling, so a ceiling of 5 tolerates a sixth part but never a
    /// seventh. Kinds without an entry are unlimited.
    pub kind_ceilings: AHashMap<PartKind, usize>,

    /// Ordered anchor preferences per attached kind.
    ///
    /// When grafting a Hand the resolver first looks for an Arm anywhere
    /// in the body tree; only when no preferred kind matches does it fall
    /// back to the first part of the traversal. Kinds without an entry go
    /// straight to the fallback.
    pub preferred_anchors: AHashMap<PartKind, Vec<PartKind>>,
}

impl Default for AnatomyConfig {
    fn default() -> Self {
        let mut kind_ceilings = AHashMap::new();
        kind_ceilings.insert(PartKind::Hand, 5);

        let mut preferred_anchors = AHashMap::new();
        preferred_anchors.insert(PartKind::Hand, vec![PartKind::Arm]);
        preferred_anchors.insert(PartKind::Foot, vec![PartKind::Leg]);
        preferred_anchors.insert(PartKind::Arm, vec![PartKind::Torso]);
        preferred_anchors.insert(PartKind::Leg, vec![PartKind::Torso]);
        preferred_anchors.insert(PartKind::Head, vec![PartKind::Torso]);
        preferred_anchors.insert(PartKind::Tail, vec![PartKind::Torso]);

        Self {
            kind_ceilings,
            preferred_anchors,
        }
    }
}

impl AnatomyConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Ceiling for a kind, or None when unlimited
    pub fn ceiling_for(&self, kind: PartKind) -> Option<usize> {
        self.kind_ceilings.get(&kind).copied()
    }

    /// Ordered anchor preferences for a kind (empty = fallback only)
    pub fn anchors_for(&self, kind: PartKind) -> &[PartKind] {
        self.preferred_anchors
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        for (kind, ceiling) in &self.kind_ceilings {
            if *ceiling == 0 {
                return Err(format!("ceiling for {} must be at least 1", kind));
            }
        }

        // A part anchored to its own kind would let grafts chain off each
        // other indefinitely.
        for (kind, anchors) in &self.preferred_anchors {
            if anchors.contains(kind) {
                return Err(format!("{} lists itself as a preferred anchor", kind));
            }
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<AnatomyConfig> = OnceLock::new();

/// Get the global anatomy config (initializes with defaults if not set)
pub fn config() -> &'static AnatomyConfig {
    CONFIG.get_or_init(AnatomyConfig::default)
}

/// Set the global anatomy config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: AnatomyConfig) -> Result<(), AnatomyConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_validation() {
        assert!(AnatomyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_hand_policy() {
        let config = AnatomyConfig::default();
        assert_eq!(config.ceiling_for(PartKind::Hand), Some(5));
        assert_eq!(config.anchors_for(PartKind::Hand), &[PartKind::Arm]);
    }

    #[test]
    fn test_unlisted_kind_is_unlimited() {
        let config = AnatomyConfig::default();
        assert_eq!(config.ceiling_for(PartKind::Torso), None);
        assert!(config.anchors_for(PartKind::Torso).is_empty());
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let mut config = AnatomyConfig::default();
        config.kind_ceilings.insert(PartKind::Tail, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_self_anchor_rejected() {
        let mut config = AnatomyConfig::default();
        config
            .preferred_anchors
            .insert(PartKind::Arm, vec![PartKind::Arm]);
        assert!(config.validate().is_err());
    }
}
