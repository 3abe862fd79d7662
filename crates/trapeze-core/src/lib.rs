//! trapeze-core - Clustering-and-statistics engine
//!
//! Ties the workspace together into one deterministic run:
//!
//! - **Config**: [`EngineConfig`] with TOML/JSON loading and validation
//! - **Preprocess**: optional floored log2 transform of both axes
//! - **Pipeline**: direction split, per-group clustering, label merge,
//!   per-cluster statistics and the outlier gate ([`Engine`])
//! - **Report**: decisions and diagnostics of a run ([`RunReport`])
//! - **Output**: the files consumed by downstream renderers
//!
//! # Example
//!
//! ```
//! use trapeze_core::{Engine, EngineConfig};
//! use trapeze_cluster::{Method, Observation};
//!
//! let mut config = EngineConfig::default();
//! config.clustering.method = Method::KMeansElbow;
//!
//! let points: Vec<Observation> = [(1.0, 1.0), (2.0, 4.0), (3.0, 2.0), (10.0, 1.0)]
//!     .into_iter()
//!     .map(Observation::from)
//!     .collect();
//! let out = Engine::new(config).unwrap().run(&points).unwrap();
//! assert_eq!(out.statistics.len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod preprocess;
pub mod report;

pub use config::{ClusteringConfig, EngineConfig, PreprocessConfig};
pub use error::{TrapezeError, TrapezeResult};
pub use output::{write_outputs, OutputFiles};
pub use pipeline::{cluster_statistics, Engine, RunOutput};
pub use preprocess::{floored_log2, log2_transform, LOG2_FLOOR};
pub use report::{AxisExtent, Diagnostic, DirectionReport, RunReport, Stage};
