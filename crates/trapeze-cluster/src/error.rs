//! Error types for trapeze-cluster
//!
//! Parameter problems are fatal and reported before any clustering starts.
//! Degenerate groups are not errors: strategies clamp and report them as
//! diagnostics instead.

use thiserror::Error;

/// Invalid engine parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("max_k must be at least 1, got {0}")]
    InvalidMaxK(usize),

    #[error("min_cluster_size must be at least 1, got {0}")]
    InvalidMinClusterSize(usize),

    #[error("min_samples must be at least 1, got {0}")]
    InvalidMinSamples(usize),

    #[error("Unknown linkage method: '{0}' (expected ward, complete, average or single)")]
    UnknownLinkage(String),

    #[error("Unknown clustering method: '{0}' (expected hierarchical, hdbscan or kmeans-elbow)")]
    UnknownMethod(String),
}

/// Errors raised while clustering a group
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("Non-finite coordinate at index {index}")]
    NonFinite { index: usize },
}

/// Result type for clustering operations
pub type ClusterResult<T> = Result<T, ClusterError>;
