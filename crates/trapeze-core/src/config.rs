//! Configuration for trapeze-core
//!
//! Engine parameters grouped by concern. Every field has a default, so a
//! config file only needs the values it changes.

use crate::error::TrapezeResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use trapeze_cluster::{
    ClusterCount, ClusterParams, DensityParams, Linkage, Method, ParameterError,
};

/// Default upper bound for the cluster count
pub const DEFAULT_MAX_K: usize = trapeze_cluster::strategy::DEFAULT_MAX_K;

/// Default minimum cluster size for density clustering
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = trapeze_cluster::hdbscan::DEFAULT_MIN_CLUSTER_SIZE;

/// Engine-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Clustering strategy and its parameters
    pub clustering: ClusteringConfig,
    /// Transformations applied before splitting
    pub preprocess: PreprocessConfig,
}

/// Clustering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Strategy used for every direction group
    pub method: Method,
    /// Upper bound for the elbow search, or the fixed k when `auto_k` is off
    pub max_k: usize,
    /// Linkage for hierarchical clustering
    pub linkage: Linkage,
    /// Select k per group with the elbow heuristic
    pub auto_k: bool,
    /// Smallest density cluster
    pub min_cluster_size: usize,
    /// Neighbour rank for core distances (defaults to `min_cluster_size`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_samples: Option<usize>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            method: Method::Hierarchical,
            max_k: DEFAULT_MAX_K,
            linkage: Linkage::Ward,
            auto_k: true,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            min_samples: None,
        }
    }
}

impl ClusteringConfig {
    /// Parameters handed to the clustering crate
    pub fn params(&self) -> ClusterParams {
        ClusterParams {
            method: self.method,
            count: ClusterCount {
                max_k: self.max_k,
                auto_k: self.auto_k,
            },
            linkage: self.linkage,
            density: DensityParams {
                min_cluster_size: self.min_cluster_size,
                min_samples: self.min_samples,
            },
        }
    }
}

/// Preprocessing configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Replace X and Y by their base-2 logarithm before splitting
    pub log2_transform: bool,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> TrapezeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&text)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ParameterError> {
        self.clustering.params().validate()
    }
}
