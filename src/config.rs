//! Engine configuration
//!
//! Every section has defaults, so an empty YAML document (or no file at all)
//! yields a usable configuration.

use crate::algo::{CommunityConfig, RecommendationConfig, SegmentationConfig, TrendGranularity};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Interaction trend settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub granularity: TrendGranularity,
}

/// Analytics cache settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of snapshots kept
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 4 }
    }
}

/// Influence ranking settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceConfig {
    /// Users returned by `top_influencers` when no limit is given
    pub top_k: usize,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self { top_k: 10 }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub community: CommunityConfig,
    pub recommendation: RecommendationConfig,
    pub trends: TrendConfig,
    pub cache: CacheConfig,
    pub influence: InfluenceConfig,
    pub segmentation: SegmentationConfig,
}

impl EngineConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: EngineConfig = if yaml.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading engine config");
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.cache.capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache.capacity must be greater than 0".to_string(),
            ));
        }
        let strength = self.recommendation.min_connection_strength;
        if !(0.0..=1.0).contains(&strength) {
            return Err(ConfigError::Invalid(format!(
                "recommendation.min_connection_strength must be within [0, 1], got {}",
                strength
            )));
        }
        if self.influence.top_k == 0 {
            return Err(ConfigError::Invalid(
                "influence.top_k must be greater than 0".to_string(),
            ));
        }
        if self.segmentation.clusters == 0 {
            return Err(ConfigError::Invalid(
                "segmentation.clusters must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
