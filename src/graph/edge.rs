//! Interaction edges of the social graph
//!
//! The graph is undirected: `source` and `target` keep the orientation of the
//! first record seen for a pair, but lookups go through `EdgeKey`.

use super::property::{PropertyMap, PropertyValue};
use super::types::{parse_timestamp, EdgeKey, InteractionType, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One collapsed interaction between two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub source: UserId,

    pub target: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_type: Option<InteractionType>,

    /// Summed strength of every collapsed record
    pub weight: u64,

    /// Number of records collapsed onto this edge
    #[serde(default = "default_count")]
    pub interaction_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub shared_interests: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_proximity: Option<bool>,

    /// Extension attributes (interaction_id, platform, post_id, ...)
    #[serde(flatten)]
    pub properties: PropertyMap,
}

fn default_count() -> u32 {
    1
}

impl Interaction {
    /// Create a single untyped interaction with weight 1
    pub fn new(source: impl Into<UserId>, target: impl Into<UserId>) -> Self {
        Interaction {
            source: source.into(),
            target: target.into(),
            interaction_type: None,
            weight: 1,
            interaction_count: 1,
            timestamp: None,
            shared_interests: BTreeSet::new(),
            geographic_proximity: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_type(mut self, interaction_type: InteractionType) -> Self {
        self.interaction_type = Some(interaction_type);
        self.weight = interaction_type.default_weight();
        self
    }

    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Orientation-agnostic key of this edge
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.source.clone(), self.target.clone())
    }

    pub fn connects(&self, user: &UserId) -> bool {
        &self.source == user || &self.target == user
    }

    /// The endpoint opposite `user`, if `user` is an endpoint
    pub fn other(&self, user: &UserId) -> Option<&UserId> {
        if &self.source == user {
            Some(&self.target)
        } else if &self.target == user {
            Some(&self.source)
        } else {
            None
        }
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Collapse a newer record for the same pair onto this edge.
    ///
    /// Weights and counts add up. The latest parseable timestamp wins; an
    /// unparseable one only replaces a missing one. Type, shared interests,
    /// proximity and extension attributes come from the newer record.
    pub fn absorb(&mut self, newer: Interaction) {
        self.weight = self.weight.saturating_add(newer.weight);
        self.interaction_count = self
            .interaction_count
            .saturating_add(newer.interaction_count);

        self.timestamp = match (self.timestamp.take(), newer.timestamp) {
            (Some(old), Some(new)) => match (parse_timestamp(&old), parse_timestamp(&new)) {
                (Some(o), Some(n)) if n > o => Some(new),
                (Some(_), _) => Some(old),
                (None, _) => Some(new),
            },
            (old, new) => old.or(new),
        };

        self.interaction_type = newer.interaction_type;
        self.shared_interests = newer.shared_interests;
        self.geographic_proximity = newer.geographic_proximity;
        self.properties.extend(newer.properties);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_orientation_agnostic() {
        let ab = Interaction::new("A", "B");
        let ba = Interaction::new("B", "A");
        assert_eq!(ab.key(), ba.key());
        assert_eq!(ab.other(&"A".into()), Some(&UserId::from("B")));
        assert_eq!(ab.other(&"C".into()), None);
        assert!(ba.connects(&"A".into()));
    }

    #[test]
    fn test_absorb_sums_and_keeps_latest_timestamp() {
        let mut edge = Interaction::new("A", "B")
            .with_type(InteractionType::Like)
            .with_timestamp("2024-03-02T10:00:00");
        let older = Interaction::new("B", "A")
            .with_type(InteractionType::Message)
            .with_timestamp("2024-03-01");

        edge.absorb(older);

        assert_eq!(edge.weight, 1 + 4);
        assert_eq!(edge.interaction_count, 2);
        assert_eq!(edge.timestamp.as_deref(), Some("2024-03-02T10:00:00"));
        assert_eq!(edge.interaction_type, Some(InteractionType::Message));
        assert_eq!(edge.source.as_str(), "A");
    }

    #[test]
    fn test_absorb_fills_missing_timestamp() {
        let mut edge = Interaction::new("A", "B");
        edge.absorb(Interaction::new("A", "B").with_timestamp("not a date"));
        assert_eq!(edge.timestamp.as_deref(), Some("not a date"));

        edge.absorb(Interaction::new("A", "B").with_timestamp("2024-01-01"));
        assert_eq!(edge.timestamp.as_deref(), Some("2024-01-01"));
        assert_eq!(edge.interaction_count, 3);
    }
}
