//! Automatic cluster-count selection
//!
//! Evaluates k-means WSS for `k = 1..=min(max_k, n)` and picks the k where
//! the WSS curve bends hardest. The bend at interior point `k` is
//!
//! ```text
//! |atan2(WSS[k-1] - WSS[k], 1) - atan2(WSS[k] - WSS[k+1], 1)|
//! ```
//!
//! The first interior point is k = 2, so the chosen k is the argmax offset
//! by two.

use crate::kmeans::KMeans;
use crate::types::Observation;
use serde::{Deserialize, Serialize};

/// Groups with at most this many points always get a single cluster
pub const MAX_UNCLUSTERED_SIZE: usize = 3;

/// Fallback when no bend is found
pub const DEFAULT_K: usize = 2;

/// Full record of an elbow search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElbowSelection {
    /// Chosen cluster count
    pub k: usize,
    /// WSS for k = 1, 2, ... (index k - 1)
    pub wss: Vec<f64>,
    /// Bend angle for k = 2, 3, ... (index k - 2)
    pub angles: Vec<f64>,
}

/// Choose k for a group of points
pub fn select_k(points: &[Observation], max_k: usize) -> usize {
    elbow(points, max_k).k
}

/// Run the elbow search and keep the intermediate curve
pub fn elbow(points: &[Observation], max_k: usize) -> ElbowSelection {
    let n = points.len();
    if n <= MAX_UNCLUSTERED_SIZE {
        return ElbowSelection {
            k: 1,
            wss: Vec::new(),
            angles: Vec::new(),
        };
    }

    let upper = max_k.clamp(1, n);
    let wss = wss_curve(points, upper);

    // Zero spread: every point coincides with the single centroid
    if wss.first().is_some_and(|&w| w == 0.0) {
        return ElbowSelection {
            k: 1,
            wss,
            angles: Vec::new(),
        };
    }

    let angles = bend_angles(&wss);
    let k = match argmax(&angles) {
        Some((i, angle)) if angle > 0.0 => i + 2,
        _ => DEFAULT_K,
    };

    ElbowSelection {
        k: k.min(upper),
        wss,
        angles,
    }
}

/// WSS of k-means for k = 1..=upper
pub fn wss_curve(points: &[Observation], upper: usize) -> Vec<f64> {
    (1..=upper).map(|k| KMeans::new(k).fit(points).wss).collect()
}

/// Bend angle at every interior point of a WSS curve
pub fn bend_angles(wss: &[f64]) -> Vec<f64> {
    wss.windows(3)
        .map(|w| {
            let before = (w[0] - w[1]).atan2(1.0);
            let after = (w[1] - w[2]).atan2(1.0);
            (before - after).abs()
        })
        .collect()
}

/// First index of the maximum value
fn argmax(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best
}
