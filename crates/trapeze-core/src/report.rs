//! Run report: what the engine decided and why
//!
//! Serialized to `summary.json` next to the output tables.

use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use trapeze_cluster::{Direction, DirectionCounts};

/// Pipeline stage, used to locate errors and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Loading and parsing the input table
    Read,
    /// Clustering a direction group
    Cluster,
    /// Writing result files
    Write,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::Cluster => "cluster",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Non-fatal condition the engine worked around
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(direction) => write!(f, "[{}/{}] {}", self.stage, direction, self.message),
            None => write!(f, "[{}] {}", self.stage, self.message),
        }
    }
}

/// Outcome for one direction group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionReport {
    pub direction: Direction,
    pub points: usize,
    /// k the strategy aimed for (k-based strategies only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_k: Option<usize>,
    pub clusters: usize,
    pub noise: usize,
    /// Global ids assigned to this group's clusters
    pub cluster_ids: Vec<usize>,
}

/// Box-plot extent of one axis over all observations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisExtent {
    /// Smallest and largest values inside the whiskers
    pub whisker_range: (f64, f64),
    /// Outliers stretch the axis by more than a third of its range
    pub outliers_dominate: bool,
}

/// Summary of a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub config: EngineConfig,
    pub log2_transformed: bool,
    pub counts: DirectionCounts,
    pub groups: Vec<DirectionReport>,
    pub total_clusters: usize,
    pub noise: usize,
    /// Clusters whose median point lies outside the X or Y whiskers
    pub outlier_clusters: Vec<usize>,
    /// Observations inside both whiskers
    pub inlier_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_extent: Option<AxisExtent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_extent: Option<AxisExtent>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
