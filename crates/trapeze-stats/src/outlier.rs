//! Box-plot whiskers and outlier gating
//!
//! Whiskers span `[Q1 - 1.5 * IQR, Q3 + 1.5 * IQR]`. A value on the
//! boundary is inside. Gating only decides what is drawn; sample counts
//! are never filtered.

use crate::quartile::{sort_values, QuartileIndices, Quartiles};
use crate::summary::ClusterStatistics;
use serde::{Deserialize, Serialize};

/// Multiplier applied to the IQR to place the whisker fences
pub const WHISKER_FACTOR: f64 = 1.5;

/// Closed whisker interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Whiskers {
    /// Lower fence (Q1 - 1.5 * IQR)
    pub lower: f64,
    /// Upper fence (Q3 + 1.5 * IQR)
    pub upper: f64,
}

impl Whiskers {
    /// Fences from first and third quartiles
    pub fn from_quartiles(q1: f64, q3: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            lower: q1 - WHISKER_FACTOR * iqr,
            upper: q3 + WHISKER_FACTOR * iqr,
        }
    }

    /// Fences of a sample using nearest-rank quartiles
    pub fn from_data(data: &[f64]) -> Option<Self> {
        Quartiles::from_data(data).map(|q| Self::from_quartiles(q.q1, q.q3))
    }

    /// Whether `value` lies inside the fences (boundaries included)
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Per-axis outcome of gating one cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierFlag {
    /// Representative X outside the X whiskers
    pub x_outside: bool,
    /// Representative Y outside the Y whiskers
    pub y_outside: bool,
}

impl OutlierFlag {
    /// Whether either axis is outside
    pub fn is_outlier(&self) -> bool {
        self.x_outside || self.y_outside
    }
}

/// Classifies clusters and points against the X and Y whiskers of a
/// reference population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierGate {
    pub x: Whiskers,
    pub y: Whiskers,
}

impl OutlierGate {
    /// Build a gate from explicit whiskers
    pub fn new(x: Whiskers, y: Whiskers) -> Self {
        Self { x, y }
    }

    /// Build a gate from the reference X and Y columns
    ///
    /// Returns `None` if either column is empty.
    pub fn from_columns(xs: &[f64], ys: &[f64]) -> Option<Self> {
        Some(Self {
            x: Whiskers::from_data(xs)?,
            y: Whiskers::from_data(ys)?,
        })
    }

    /// Gate a cluster on its median point
    pub fn classify(&self, stats: &ClusterStatistics) -> OutlierFlag {
        self.classify_point(stats.median_point.x, stats.median_point.y)
    }

    /// Gate a single coordinate pair
    pub fn classify_point(&self, x: f64, y: f64) -> OutlierFlag {
        OutlierFlag {
            x_outside: !self.x.contains(x),
            y_outside: !self.y.contains(y),
        }
    }

    /// Keep only the points inside both the X and Y whiskers
    pub fn retain_points(&self, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        points
            .iter()
            .copied()
            .filter(|&(x, y)| !self.classify_point(x, y).is_outlier())
            .collect()
    }
}

/// Observed whisker ends: the smallest and largest values inside the fences
pub fn whisker_range(data: &[f64]) -> Option<(f64, f64)> {
    let whiskers = Whiskers::from_data(data)?;
    let inside = data.iter().copied().filter(|&v| whiskers.contains(v));

    let (min, max) = inside.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    // q1 and q3 always fall inside their own fences
    Some((min, max))
}

/// Whether values beyond the whiskers stretch further than a third of the
/// total data range
///
/// Used to decide whether drawing outliers would squash the plot. Samples
/// of four or fewer values never qualify.
pub fn outliers_dominate(data: &[f64]) -> bool {
    if data.len() <= 4 {
        return false;
    }

    let mut sorted = data.to_vec();
    sort_values(&mut sorted);

    let Some(idx) = QuartileIndices::for_len(sorted.len()) else {
        return false;
    };
    let whiskers = Whiskers::from_quartiles(sorted[idx.q1], sorted[idx.q3]);

    let (outliers, inliers): (Vec<f64>, Vec<f64>) =
        sorted.iter().copied().partition(|&v| !whiskers.contains(v));
    if outliers.is_empty() {
        return false;
    }

    let data_min = sorted[0];
    let data_max = sorted[sorted.len() - 1];
    let inlier_min = inliers.first().copied().unwrap_or(data_min);
    let inlier_max = inliers.last().copied().unwrap_or(data_max);

    let mut extent = 0.0;
    if data_min < inlier_min {
        extent += inlier_min - data_min;
    }
    if data_max > inlier_max {
        extent += data_max - inlier_max;
    }

    extent > (data_max - data_min) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whiskers_boundaries_are_inside() {
        let w = Whiskers::from_quartiles(2.0, 4.0);
        assert_eq!(w.lower, -1.0);
        assert_eq!(w.upper, 7.0);
        assert!(w.contains(-1.0));
        assert!(w.contains(7.0));
        assert!(!w.contains(7.000001));
        assert!(!w.contains(-1.000001));
    }

    #[test]
    fn test_zero_iqr() {
        let w = Whiskers::from_data(&[3.0, 3.0, 3.0, 3.0]).unwrap();
        assert!(w.contains(3.0));
        assert!(!w.contains(3.5));
    }

    #[test]
    fn test_gate_classifies_median_point() {
        let xs: Vec<f64> = (1..=8).map(|v| v as f64).collect();
        let gate = OutlierGate::from_columns(&xs, &xs).unwrap();
        // q1 = 3, q3 = 7, iqr = 4, fences [-3, 13]

        let inside = ClusterStatistics::from_pairs(&[(5.0, 5.0), (6.0, 6.0)]).unwrap();
        assert!(!gate.classify(&inside).is_outlier());

        let far = ClusterStatistics::from_pairs(&[(20.0, 5.0), (21.0, 6.0)]).unwrap();
        let flag = gate.classify(&far);
        assert!(flag.x_outside);
        assert!(!flag.y_outside);
        assert!(flag.is_outlier());
    }

    #[test]
    fn test_gate_boundary_is_not_outlier() {
        let gate = OutlierGate::new(
            Whiskers { lower: 0.0, upper: 10.0 },
            Whiskers { lower: 0.0, upper: 10.0 },
        );
        assert!(!gate.classify_point(10.0, 0.0).is_outlier());
        assert!(gate.classify_point(10.5, 0.0).is_outlier());
    }

    #[test]
    fn test_retain_points() {
        let gate = OutlierGate::new(
            Whiskers { lower: 0.0, upper: 10.0 },
            Whiskers { lower: 0.0, upper: 5.0 },
        );
        let kept = gate.retain_points(&[(1.0, 1.0), (11.0, 1.0), (2.0, 6.0), (3.0, 5.0)]);
        assert_eq!(kept, vec![(1.0, 1.0), (3.0, 5.0)]);
    }

    #[test]
    fn test_whisker_range() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 100.0];
        // q1 = 3, q3 = 7, fences [-3, 13]
        assert_eq!(whisker_range(&data), Some((1.0, 7.0)));
        assert_eq!(whisker_range(&[]), None);
    }

    #[test]
    fn test_outliers_dominate() {
        assert!(!outliers_dominate(&[1.0, 2.0, 100.0]));
        assert!(!outliers_dominate(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        assert!(outliers_dominate(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 100.0]));
    }
}
