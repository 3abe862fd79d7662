//! Fixed-k centroid clustering (Lloyd's algorithm)
//!
//! Deterministic by construction:
//! - Centroids start at the first `k` observations in input order
//! - Distance ties go to the lowest centroid index
//! - A centroid that loses all members keeps its previous position

use crate::types::Observation;
use serde::{Deserialize, Serialize};

/// Upper bound on assignment/update passes
pub const MAX_ITERATIONS: usize = 100;

/// Result of one k-means run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansFit {
    /// Effective cluster count after clamping to the group size
    pub k: usize,
    /// Centroid index per observation
    pub labels: Vec<usize>,
    /// Final centroids
    pub centroids: Vec<Observation>,
    /// Within-cluster sum of squared distances of the final state
    pub wss: f64,
    /// Assignment passes performed
    pub iterations: usize,
    /// Whether assignments stopped changing before the iteration cap
    pub converged: bool,
}

/// Lloyd's k-means with deterministic initialisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    k: usize,
    max_iterations: usize,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Cluster `points`; `k` is clamped to `1..=points.len()`
    pub fn fit(&self, points: &[Observation]) -> KMeansFit {
        let n = points.len();
        if n == 0 {
            return KMeansFit {
                k: 0,
                labels: Vec::new(),
                centroids: Vec::new(),
                wss: 0.0,
                iterations: 0,
                converged: true,
            };
        }

        let k = self.k.clamp(1, n);
        let mut centroids: Vec<Observation> = points[..k].to_vec();
        let mut labels = vec![usize::MAX; n];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;
            if !assign(points, &centroids, &mut labels) {
                converged = true;
                break;
            }
            update_centroids(points, &labels, &mut centroids);
        }

        let wss = within_sum_of_squares(points, &labels, &centroids);

        KMeansFit {
            k,
            labels,
            centroids,
            wss,
            iterations,
            converged,
        }
    }
}

/// Index of the nearest centroid, lowest index on ties
pub fn nearest_centroid(point: &Observation, centroids: &[Observation]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (j, c) in centroids.iter().enumerate() {
        let d = point.distance_sq(c);
        if d < best_dist {
            best = j;
            best_dist = d;
        }
    }
    best
}

/// Reassign every point; returns whether any label changed
fn assign(points: &[Observation], centroids: &[Observation], labels: &mut [usize]) -> bool {
    let mut changed = false;
    for (point, label) in points.iter().zip(labels.iter_mut()) {
        let nearest = nearest_centroid(point, centroids);
        if *label != nearest {
            *label = nearest;
            changed = true;
        }
    }
    changed
}

fn update_centroids(points: &[Observation], labels: &[usize], centroids: &mut [Observation]) {
    let k = centroids.len();
    let mut sums = vec![(0.0, 0.0); k];
    let mut counts = vec![0usize; k];

    for (point, &label) in points.iter().zip(labels) {
        sums[label].0 += point.x;
        sums[label].1 += point.y;
        counts[label] += 1;
    }

    for j in 0..k {
        if counts[j] > 0 {
            let c = counts[j] as f64;
            centroids[j] = Observation::new(sums[j].0 / c, sums[j].1 / c);
        }
    }
}

/// Sum of squared distances from each point to its assigned centroid
pub fn within_sum_of_squares(
    points: &[Observation],
    labels: &[usize],
    centroids: &[Observation],
) -> f64 {
    points
        .iter()
        .zip(labels)
        .map(|(p, &label)| p.distance_sq(&centroids[label]))
        .sum()
}
