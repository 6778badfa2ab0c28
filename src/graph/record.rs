//! Raw input records and their validation
//!
//! Records arrive in the snapshot schema produced by the ingestion layer.
//! Columns are read leniently: numbers may come as integral floats or numeric
//! strings, tag lists as arrays or as string-encoded lists (`"['music', 'tech']"`),
//! text columns as any scalar. A value that still cannot be read is kept as
//! it arrived and `validate` reports it, so one malformed record never fails a
//! whole snapshot. Only a snapshot that is not made of user and interaction
//! objects is rejected by `Dataset::from_json`.

use super::edge::Interaction;
use super::node::User;
use super::property::{PropertyMap, PropertyValue};
use super::types::{ActivityLevel, InteractionType, UserId};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use thiserror::Error;

/// Why a single record was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("user record has no id")]
    MissingUserId,

    #[error("user {user}: invalid age {value}")]
    InvalidAge { user: UserId, value: i64 },

    #[error("user {user}: invalid {field} {value}")]
    InvalidCount {
        user: UserId,
        field: &'static str,
        value: i64,
    },

    #[error("user {user}: unknown activity level '{value}'")]
    InvalidActivityLevel { user: UserId, value: String },

    #[error("malformed {field}: {value}")]
    MalformedField { field: &'static str, value: String },

    #[error("interaction is missing its {0} user")]
    MissingEndpoint(&'static str),

    #[error("interaction references unknown user {0}")]
    UnknownEndpoint(UserId),

    #[error("interaction of user {0} with itself")]
    SelfInteraction(UserId),

    #[error("interaction {source_user}->{target_user}: weight must be positive, got {weight}")]
    InvalidWeight {
        source_user: UserId,
        target_user: UserId,
        weight: i64,
    },

    #[error("unknown interaction type '{0}'")]
    UnknownInteractionType(String),
}

/// A user as it appears in a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(
        default,
        alias = "user_id",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<PropertyValue>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<PropertyValue>,
    #[serde(default, alias = "followers", skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<PropertyValue>,
    #[serde(default, alias = "following", skip_serializing_if = "Option::is_none")]
    pub following_count: Option<PropertyValue>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(
        default,
        alias = "created_at",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_creation_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub last_active: Option<String>,
    /// Any other column of the snapshot
    #[serde(flatten)]
    pub extra: PropertyMap,
}

impl UserRecord {
    /// Minimal record with an id and interests, mostly for tests and fixtures
    pub fn new(id: impl Into<String>) -> Self {
        UserRecord {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = interests
            .into_iter()
            .map(|tag| PropertyValue::String(tag.into()))
            .collect();
        self.interests = Some(PropertyValue::Array(tags));
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(PropertyValue::Integer(age));
        self
    }

    /// Trimmed, non-empty id
    pub fn user_id(&self) -> Option<UserId> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(UserId::from)
    }

    /// Trimmed, non-empty interest tags as a set
    pub fn interest_set(&self) -> Result<BTreeSet<String>, ValidationError> {
        tag_list("interests", self.interests.as_ref())
    }

    /// Turn the record into a user node
    pub fn validate(&self) -> Result<User, ValidationError> {
        let id = self.user_id().ok_or(ValidationError::MissingUserId)?;

        let age = match integer("age", self.age.as_ref())? {
            Some(value) if !(0..=i64::from(u32::MAX)).contains(&value) => {
                return Err(ValidationError::InvalidAge { user: id, value })
            }
            Some(value) => Some(value as u32),
            None => None,
        };
        let follower_count = non_negative(&id, "follower_count", self.follower_count.as_ref())?;
        let following_count = non_negative(&id, "following_count", self.following_count.as_ref())?;

        let activity_level = match self.activity_level.as_deref() {
            Some(raw) => Some(raw.parse::<ActivityLevel>().map_err(|value| {
                ValidationError::InvalidActivityLevel {
                    user: id.clone(),
                    value,
                }
            })?),
            None => None,
        };

        Ok(User {
            interests: self.interest_set()?,
            id,
            name: self.name.clone(),
            username: self.username.clone(),
            age,
            location: self.location.clone(),
            occupation: self.occupation.clone(),
            follower_count,
            following_count,
            activity_level,
            account_creation_date: self.account_creation_date.clone(),
            last_active: self.last_active.clone(),
            properties: self.extra.clone(),
        })
    }
}

/// An interaction as it appears in a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    #[serde(
        default,
        alias = "source",
        alias = "user1",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_user: Option<String>,
    #[serde(
        default,
        alias = "target",
        alias = "user2",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_user: Option<String>,
    #[serde(
        default,
        alias = "type",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub interaction_type: Option<String>,
    #[serde(default, alias = "interaction_weight", skip_serializing_if = "Option::is_none")]
    pub weight: Option<PropertyValue>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_interests: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_proximity: Option<PropertyValue>,
    /// Any other column of the snapshot
    #[serde(flatten)]
    pub extra: PropertyMap,
}

impl InteractionRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        InteractionRecord {
            source_user: Some(source.into()),
            target_user: Some(target.into()),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, interaction_type: InteractionType) -> Self {
        self.interaction_type = Some(interaction_type.as_str().to_string());
        self
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = Some(PropertyValue::Integer(weight));
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_shared_interests<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = tags
            .into_iter()
            .map(|tag| PropertyValue::String(tag.into()))
            .collect();
        self.shared_interests = Some(PropertyValue::Array(tags));
        self
    }

    pub fn with_geographic_proximity(mut self, near: bool) -> Self {
        self.geographic_proximity = Some(PropertyValue::Boolean(near));
        self
    }

    /// Turn the record into an edge between two distinct, non-empty ids.
    ///
    /// Whether the endpoints exist is checked by the graph, not here.
    pub fn validate(&self) -> Result<Interaction, ValidationError> {
        let source = endpoint(self.source_user.as_deref(), "source")?;
        let target = endpoint(self.target_user.as_deref(), "target")?;
        if source == target {
            return Err(ValidationError::SelfInteraction(source));
        }

        let interaction_type = match self.interaction_type.as_deref() {
            Some(raw) => Some(
                raw.parse::<InteractionType>()
                    .map_err(ValidationError::UnknownInteractionType)?,
            ),
            None => None,
        };

        let weight = match integer("weight", self.weight.as_ref())? {
            Some(w) if w > 0 => w as u64,
            Some(w) => {
                return Err(ValidationError::InvalidWeight {
                    source_user: source,
                    target_user: target,
                    weight: w,
                })
            }
            None => interaction_type.map_or(1, |t| t.default_weight()),
        };

        Ok(Interaction {
            shared_interests: tag_list("shared_interests", self.shared_interests.as_ref())?,
            geographic_proximity: flag("geographic_proximity", self.geographic_proximity.as_ref())?,
            source,
            target,
            interaction_type,
            weight,
            interaction_count: 1,
            timestamp: self.timestamp.clone(),
            properties: self.extra.clone(),
        })
    }
}

/// A snapshot of the record set the graph is built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
}

impl Dataset {
    pub fn new(users: Vec<UserRecord>, interactions: Vec<InteractionRecord>) -> Self {
        Dataset { users, interactions }
    }

    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.interactions.is_empty()
    }

    /// SHA-256 over the serialized snapshot, hex encoded.
    ///
    /// Extension maps are serialized with sorted keys so equal snapshots hash
    /// equally regardless of map iteration order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for user in &self.users {
            hash_record(&mut hasher, b'u', user);
        }
        for interaction in &self.interactions {
            hash_record(&mut hasher, b'i', interaction);
        }
        format!("{:x}", hasher.finalize())
    }
}

fn hash_record<T: Serialize>(hasher: &mut Sha256, tag: u8, record: &T) {
    // serde_json::Value keeps object keys sorted
    let canonical = serde_json::to_value(record)
        .map(|v| v.to_string())
        .unwrap_or_default();
    hasher.update([tag]);
    hasher.update((canonical.len() as u64).to_le_bytes());
    hasher.update(canonical.as_bytes());
}

fn endpoint(raw: Option<&str>, which: &'static str) -> Result<UserId, ValidationError> {
    raw.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(UserId::from)
        .ok_or(ValidationError::MissingEndpoint(which))
}

fn non_negative(
    user: &UserId,
    field: &'static str,
    value: Option<&PropertyValue>,
) -> Result<Option<u64>, ValidationError> {
    match integer(field, value)? {
        Some(v) if v < 0 => Err(ValidationError::InvalidCount {
            user: user.clone(),
            field,
            value: v,
        }),
        Some(v) => Ok(Some(v as u64)),
        None => Ok(None),
    }
}

fn malformed(field: &'static str, value: &PropertyValue) -> ValidationError {
    ValidationError::MalformedField {
        field,
        value: value.to_display_string(),
    }
}

/// Integers, integral floats and numeric strings. Null and blank mean absent.
fn integer(
    field: &'static str,
    value: Option<&PropertyValue>,
) -> Result<Option<i64>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let parsed = match value {
        PropertyValue::Null => return Ok(None),
        PropertyValue::Integer(i) => Some(*i),
        PropertyValue::Float(f) => integral(*f),
        PropertyValue::String(s) if s.trim().is_empty() => return Ok(None),
        PropertyValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| malformed(field, value))
}

fn integral(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    (f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64)
        .then_some(f as i64)
}

fn flag(
    field: &'static str,
    value: Option<&PropertyValue>,
) -> Result<Option<bool>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value {
        PropertyValue::Null => Ok(None),
        PropertyValue::Boolean(b) => Ok(Some(*b)),
        PropertyValue::Integer(0) => Ok(Some(false)),
        PropertyValue::Integer(1) => Ok(Some(true)),
        PropertyValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            _ => Err(malformed(field, value)),
        },
        other => Err(malformed(field, other)),
    }
}

/// Tags from an array of scalars or a string-encoded list
fn tag_list(
    field: &'static str,
    value: Option<&PropertyValue>,
) -> Result<BTreeSet<String>, ValidationError> {
    let Some(value) = value else {
        return Ok(BTreeSet::new());
    };
    let tags = match value {
        PropertyValue::Null => Vec::new(),
        PropertyValue::String(raw) => split_encoded_list(raw),
        PropertyValue::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| scalar_text(item).ok_or_else(|| malformed(field, value)))
            .collect::<Result<Vec<_>, _>>()?,
        other => return Err(malformed(field, other)),
    };
    Ok(normalize_tags(tags.iter().map(String::as_str)))
}

/// `['a', 'b']`, `["a","b"]` or plain `a, b`
fn split_encoded_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed);
    inner
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .collect()
}

fn scalar_text(value: &PropertyValue) -> Option<String> {
    match value {
        PropertyValue::String(s) => Some(s.clone()),
        PropertyValue::Integer(i) => Some(i.to_string()),
        PropertyValue::Float(f) => Some(f.to_string()),
        PropertyValue::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text columns accept any JSON value. Scalars become their text, arrays and
/// objects keep their JSON form.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PropertyValue>::deserialize(deserializer)?
        .filter(|value| !value.is_null())
        .map(|value| scalar_text(&value).unwrap_or_else(|| value.to_display_string())))
}

fn normalize_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    tags.into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
