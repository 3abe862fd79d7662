//! Per-cluster summary statistics
//!
//! Turns the members of one cluster into the quartile summaries and the two
//! representative points that renderers draw trapezoids and arrows from:
//! - X, Y and shift (Y - X) quartiles
//! - Pairwise-slope quartiles
//! - Mean and median points evaluated on a fitted line

use crate::quartile::{sort_values, Quartiles};
use serde::{Deserialize, Serialize};

/// A fitted 2D point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitPoint {
    pub x: f64,
    pub y: f64,
}

/// Statistics for a single cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatistics {
    /// Number of members
    pub n: usize,
    /// X quartiles
    pub x: Quartiles,
    /// Y quartiles
    pub y: Quartiles,
    /// Quartiles of pairwise slopes, or the Y - X fallback
    pub slope: Quartiles,
    /// Quartiles of the per-point shift Y - X
    pub shift: Quartiles,
    /// Shift quartiles taken from the shifts sorted descending
    pub shift_trapezoid: Quartiles,
    /// Whether `slope` came from the Y - X fallback
    pub slope_fallback: bool,
    /// Intercept of the line through the mean point with the mean slope
    pub intercept: f64,
    /// (x mean, fitted y at x mean)
    pub mean_point: FitPoint,
    /// (x median, fitted y at x median)
    pub median_point: FitPoint,
}

impl ClusterStatistics {
    /// Compute statistics from paired X and Y columns
    ///
    /// Returns `None` when the cluster is empty or the columns differ in
    /// length.
    pub fn from_columns(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.is_empty() || xs.len() != ys.len() {
            return None;
        }

        let x = Quartiles::from_data(xs)?;
        let y = Quartiles::from_data(ys)?;
        let shifts: Vec<f64> = xs.iter().zip(ys).map(|(x, y)| y - x).collect();
        let shift = Quartiles::from_data(&shifts)?;
        let shift_trapezoid = Quartiles::from_data_descending(&shifts)?;

        let mut slopes = pairwise_slopes(xs, ys);
        let (slope, slope_fallback) = if slopes.len() < 2 {
            (y.minus(&x), true)
        } else {
            sort_values(&mut slopes);
            (Quartiles::from_sorted(&slopes)?, false)
        };

        let intercept = y.mean - slope.mean * x.mean;
        let fit = |at: f64| FitPoint {
            x: at,
            y: intercept + slope.mean * at,
        };

        Some(Self {
            n: xs.len(),
            x,
            y,
            slope,
            shift,
            shift_trapezoid,
            slope_fallback,
            intercept,
            mean_point: fit(x.mean),
            median_point: fit(x.q2),
        })
    }

    /// Compute statistics from (x, y) pairs
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Option<Self> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
        Self::from_columns(&xs, &ys)
    }

    /// Fitted y at an arbitrary x
    pub fn fitted_y(&self, x: f64) -> f64 {
        self.intercept + self.slope.mean * x
    }
}

/// Slopes `(y2 - y1) / (x2 - x1)` over every unordered pair with `x1 != x2`
///
/// Pairs are visited in index order (i < j), so the output order is stable.
pub fn pairwise_slopes(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len().min(ys.len());
    let mut slopes = Vec::with_capacity(n.saturating_sub(1) * n / 2);

    for i in 0..n {
        for j in (i + 1)..n {
            let dx = xs[j] - xs[i];
            if dx != 0.0 {
                slopes.push((ys[j] - ys[i]) / dx);
            }
        }
    }

    slopes
}
