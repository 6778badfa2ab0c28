//! User nodes of the social graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{ActivityLevel, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A user in the social graph
///
/// Every attribute besides the id is optional. `interests` and `location`
/// feed recommendations and aggregates; everything else rides along for
/// callers and node-link export. Unknown input columns land in `properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,

    /// Interest tags, trimmed and deduplicated
    #[serde(default)]
    pub interests: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_creation_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<String>,

    /// Extension attributes (email, bio, ...)
    #[serde(flatten)]
    pub properties: PropertyMap,
}

impl User {
    /// Create a user with only an id
    pub fn new(id: impl Into<UserId>) -> Self {
        User {
            id: id.into(),
            name: None,
            username: None,
            age: None,
            location: None,
            occupation: None,
            interests: BTreeSet::new(),
            follower_count: None,
            following_count: None,
            activity_level: None,
            account_creation_date: None,
            last_active: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn has_interest(&self, tag: &str) -> bool {
        self.interests.contains(tag)
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    /// Display name, falling back to the username and then the id
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or_else(|| self.id.as_str())
    }
}

impl PartialEq<UserId> for User {
    fn eq(&self, other: &UserId) -> bool {
        &self.id == other
    }
}
