//! trapeze-cluster: direction-aware clustering of paired observations
//!
//! Observations are split by the sign of `y - x`, each group is clustered
//! independently with one of three strategies, and the per-group labels are
//! merged into a single disjoint id space.
//!
//! - [`direction`]: ascending / descending partition
//! - [`kmeans`] + [`elbow`]: Lloyd's k-means and automatic k selection
//! - [`hierarchical`]: agglomerative clustering (ward, complete, average, single)
//! - [`hdbscan`]: density clustering with noise
//! - [`labeler`]: first-appearance numbering and the group merge
//! - [`strategy`]: method selection and degenerate-group handling
//!
//! Every algorithm is deterministic: identical input and parameters give
//! identical labels.

pub mod direction;
pub mod distance;
pub mod elbow;
pub mod error;
pub mod hdbscan;
pub mod hierarchical;
pub mod kmeans;
pub mod labeler;
pub mod strategy;
pub mod types;
pub mod union_find;

pub use direction::{split_by_direction, DirectionCounts, DirectionGroup, DirectionSplit};
pub use distance::CondensedMatrix;
pub use elbow::{elbow, select_k, ElbowSelection};
pub use error::{ClusterError, ClusterResult, ParameterError};
pub use hdbscan::{hdbscan, DensityClusterer, DensityFit, DensityParams};
pub use hierarchical::{hierarchical_labels, Dendrogram, Linkage, Merge};
pub use kmeans::{KMeans, KMeansFit};
pub use labeler::{compact_labels, merge_group_labels, GroupLabels};
pub use strategy::{
    cluster_group, Agglomerative, ClusterCount, ClusterParams, Density, ElbowKMeans,
    GroupClusterer, GroupClustering, Method,
};
pub use types::{Direction, Label, Observation};
pub use union_find::UnionFind;
