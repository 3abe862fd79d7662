//! Clustering strategies for a single direction group
//!
//! A [`Method`] picks one of three mutually exclusive strategies. Each one
//! implements [`GroupClusterer`] and returns compact labels plus any
//! degenerate-group warnings; the caller attaches direction context.

use crate::elbow::select_k;
use crate::error::{ClusterError, ClusterResult, ParameterError};
use crate::hdbscan::{DensityClusterer, DensityParams};
use crate::hierarchical::{Dendrogram, Linkage};
use crate::kmeans::KMeans;
use crate::labeler::{cluster_count, compact_labels, noise_count};
use crate::types::{Label, Observation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Default upper bound for the cluster count
pub const DEFAULT_MAX_K: usize = 7;

/// Which strategy clusters each direction group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    #[default]
    #[serde(rename = "hierarchical")]
    Hierarchical,
    #[serde(rename = "hdbscan")]
    Hdbscan,
    #[serde(rename = "kmeans-elbow", alias = "kmeans")]
    KMeansElbow,
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::Hierarchical => "hierarchical",
            Method::Hdbscan => "hdbscan",
            Method::KMeansElbow => "kmeans-elbow",
        }
    }
}

impl FromStr for Method {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hierarchical" => Ok(Method::Hierarchical),
            "hdbscan" => Ok(Method::Hdbscan),
            "kmeans-elbow" | "kmeans" => Ok(Method::KMeansElbow),
            _ => Err(ParameterError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cluster count policy for the k-based strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCount {
    pub max_k: usize,
    /// Choose k with the elbow search instead of using `max_k` directly
    pub auto_k: bool,
}

impl ClusterCount {
    /// Target k for a group of `n` points, plus a warning when a fixed
    /// request had to be clamped
    fn resolve(&self, points: &[Observation]) -> (usize, Option<String>) {
        let n = points.len();
        if self.auto_k {
            return (select_k(points, self.max_k), None);
        }
        if self.max_k > n {
            let clamped = n.max(1);
            let warning = format!(
                "requested {} clusters but group has {} points, using k={}",
                self.max_k, n, clamped
            );
            return (clamped, Some(warning));
        }
        (self.max_k, None)
    }
}

/// Result of clustering one group
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupClustering {
    /// Label per point, clusters numbered by first appearance
    pub labels: Vec<Label>,
    /// Cluster count the strategy aimed for (k-based strategies only)
    pub target_k: Option<usize>,
    /// Clusters actually produced
    pub clusters: usize,
    /// Noise points (density strategy only)
    pub noise: usize,
    /// Degenerate-group warnings
    pub warnings: Vec<String>,
}

impl GroupClustering {
    fn from_labels(labels: Vec<Label>, target_k: Option<usize>, warnings: Vec<String>) -> Self {
        Self {
            clusters: cluster_count(&labels),
            noise: noise_count(&labels),
            labels,
            target_k,
            warnings,
        }
    }
}

/// A strategy that labels the points of one direction group
pub trait GroupClusterer: Send + Sync {
    fn method(&self) -> Method;

    /// Label `points`; inputs must be finite
    fn cluster(&self, points: &[Observation]) -> GroupClustering;
}

/// Lloyd's k-means with k from the elbow search (or fixed)
#[derive(Debug, Clone, Copy)]
pub struct ElbowKMeans {
    pub count: ClusterCount,
}

impl GroupClusterer for ElbowKMeans {
    fn method(&self) -> Method {
        Method::KMeansElbow
    }

    fn cluster(&self, points: &[Observation]) -> GroupClustering {
        let (k, warning) = self.count.resolve(points);
        let fit = KMeans::new(k).fit(points);
        debug!(k, wss = fit.wss, iterations = fit.iterations, "k-means fitted");

        let labels: Vec<Label> = fit.labels.into_iter().map(Label::Cluster).collect();
        GroupClustering::from_labels(compact_labels(&labels), Some(k), warning.into_iter().collect())
    }
}

/// Agglomerative clustering cut to the elbow-selected (or fixed) k
#[derive(Debug, Clone, Copy)]
pub struct Agglomerative {
    pub linkage: Linkage,
    pub count: ClusterCount,
}

impl GroupClusterer for Agglomerative {
    fn method(&self) -> Method {
        Method::Hierarchical
    }

    fn cluster(&self, points: &[Observation]) -> GroupClustering {
        let (k, warning) = self.count.resolve(points);
        let dendrogram = Dendrogram::build(points, self.linkage);
        debug!(k, linkage = %self.linkage, merges = dendrogram.merges().len(), "Dendrogram built");

        let labels: Vec<Label> = dendrogram.cut(k).into_iter().map(Label::Cluster).collect();
        GroupClustering::from_labels(labels, Some(k), warning.into_iter().collect())
    }
}

/// HDBSCAN with noise
pub struct Density {
    clusterer: DensityClusterer,
}

impl Density {
    pub fn new(params: DensityParams) -> Self {
        Self {
            clusterer: DensityClusterer::new(params),
        }
    }
}

impl GroupClusterer for Density {
    fn method(&self) -> Method {
        Method::Hdbscan
    }

    fn cluster(&self, points: &[Observation]) -> GroupClustering {
        let mut warnings = Vec::new();
        let min_cluster_size = self.clusterer.params().min_cluster_size;
        if !points.is_empty() && points.len() < min_cluster_size {
            warnings.push(format!(
                "group has {} points, fewer than min_cluster_size={}",
                points.len(),
                min_cluster_size
            ));
        }

        let fit = self.clusterer.fit(points);
        GroupClustering::from_labels(fit.labels, None, warnings)
    }
}

/// Everything needed to build a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterParams {
    pub method: Method,
    pub count: ClusterCount,
    pub linkage: Linkage,
    pub density: DensityParams,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            method: Method::default(),
            count: ClusterCount {
                max_k: DEFAULT_MAX_K,
                auto_k: true,
            },
            linkage: Linkage::default(),
            density: DensityParams::default(),
        }
    }
}

impl ClusterParams {
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.count.max_k < 1 {
            return Err(ParameterError::InvalidMaxK(self.count.max_k));
        }
        self.density.validate()
    }

    /// Strategy for `method`
    pub fn clusterer(&self) -> Box<dyn GroupClusterer> {
        match self.method {
            Method::KMeansElbow => Box::new(ElbowKMeans { count: self.count }),
            Method::Hierarchical => Box::new(Agglomerative {
                linkage: self.linkage,
                count: self.count,
            }),
            Method::Hdbscan => Box::new(Density::new(self.density)),
        }
    }
}

/// Validate parameters and points, then cluster one group
pub fn cluster_group(points: &[Observation], params: &ClusterParams) -> ClusterResult<GroupClustering> {
    params.validate()?;
    if let Some(index) = points
        .iter()
        .position(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(ClusterError::NonFinite { index });
    }

    if points.is_empty() {
        return Ok(GroupClustering {
            warnings: vec!["group is empty".to_string()],
            ..GroupClustering::default()
        });
    }

    Ok(params.clusterer().cluster(points))
}
