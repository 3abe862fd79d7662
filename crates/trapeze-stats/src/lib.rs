//! trapeze-stats - Statistical functions for direction-aware cluster summaries
//!
//! This crate provides the statistical primitives used to turn clustered
//! (X, Y) pairs into the geometry drawn by trapezoid, arrow and slope plots:
//!
//! - **Quartiles**: nearest-rank quartiles with fixed `floor(n/4)`,
//!   `floor(n/2)`, `floor(3n/4)` indices
//! - **ClusterStatistics**: per-cluster X/Y/slope/shift quartiles plus the
//!   fitted mean and median points
//! - **OutlierGate**: 1.5×IQR whisker classification of clusters and points
//!
//! # Design Philosophy
//!
//! Quantiles are nearest-rank rather than interpolated so that every value
//! reported is an observed value and results reproduce exactly across runs.

pub mod outlier;
pub mod quartile;
pub mod summary;

pub use outlier::*;
pub use quartile::*;
pub use summary::*;
