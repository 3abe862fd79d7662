//! Error types for trapeze-core
//!
//! Covers the fatal failures of a run:
//! - Input errors (missing, unreadable or empty input)
//! - Parameter errors (reported before any clustering)
//! - Clustering failures, tagged with stage and direction group
//! - Output and configuration errors
//!
//! Degenerate groups are not errors; see [`crate::report::Diagnostic`].

use crate::report::Stage;
use thiserror::Error;
use trapeze_cluster::{ClusterError, Direction, ParameterError};
use trapeze_io::IoError;

/// Main error type for trapeze runs
#[derive(Error, Debug)]
pub enum TrapezeError {
    /// Input could not be read or held no usable rows
    #[error("Input error: {0}")]
    Input(#[from] IoError),

    /// Invalid engine parameters
    #[error("Invalid parameter: {0}")]
    Parameter(#[from] ParameterError),

    /// A clustering stage failed on one direction group
    #[error("{stage} failed on the {direction} group: {source}")]
    Cluster {
        stage: Stage,
        direction: Direction,
        source: ClusterError,
    },

    /// Result tables could not be written
    #[error("Output error: {0}")]
    Output(IoError),

    /// Config file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Report or config could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors while writing results
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrapezeError {
    /// Stage the failure belongs to; `None` for failures before a run starts
    pub fn stage(&self) -> Option<Stage> {
        match self {
            TrapezeError::Input(_) => Some(Stage::Read),
            TrapezeError::Cluster { stage, .. } => Some(*stage),
            TrapezeError::Output(_) | TrapezeError::Serialization(_) | TrapezeError::Io(_) => {
                Some(Stage::Write)
            }
            TrapezeError::Parameter(_) | TrapezeError::Config(_) => None,
        }
    }

    /// Direction group the failure belongs to, if any
    pub fn direction(&self) -> Option<Direction> {
        match self {
            TrapezeError::Cluster { direction, .. } => Some(*direction),
            _ => None,
        }
    }
}

/// Result type for trapeze operations
pub type TrapezeResult<T> = Result<T, TrapezeError>;

impl From<toml::de::Error> for TrapezeError {
    fn from(err: toml::de::Error) -> Self {
        TrapezeError::Config(err.to_string())
    }
}
