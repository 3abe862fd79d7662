//! trapeze-io - Data I/O for paired observations
//!
//! This crate provides the thin I/O layer around the clustering engine:
//!
//! - **Reader**: two numeric columns from comma-, tab- or whitespace-separated
//!   text, with delimiter and header auto-detection
//! - **Tables**: the clustered-data table, the calculated-points table and
//!   the per-cluster statistics report
//!
//! # Design
//!
//! Input is fully materialised before clustering starts. Writers are generic
//! over `std::io::Write` so the same code serves files and in-memory buffers.

pub mod reader;
pub mod table;

pub use reader::*;
pub use table::*;
