//! Agglomerative clustering
//!
//! Builds the full dendrogram with the nearest-neighbour-chain algorithm and
//! Lance-Williams distance updates, then cuts it to a target cluster count.
//!
//! # Determinism
//!
//! - Nearest-neighbour search prefers the previous chain element on equal
//!   distances, then the lowest cluster index
//! - A merged cluster keeps the lower of the two slot indices
//! - Merges are ordered by height with a stable sort, so equal heights keep
//!   discovery order

use crate::distance::CondensedMatrix;
use crate::error::ParameterError;
use crate::labeler::first_appearance_labels;
use crate::types::Observation;
use crate::union_find::UnionFind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inter-cluster distance rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Minimise the increase in within-cluster variance
    #[default]
    Ward,
    /// Maximum pairwise distance
    Complete,
    /// Mean pairwise distance
    Average,
    /// Minimum pairwise distance
    Single,
}

impl Linkage {
    pub const ALL: [Linkage; 4] = [
        Linkage::Ward,
        Linkage::Complete,
        Linkage::Average,
        Linkage::Single,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Linkage::Ward => "ward",
            Linkage::Complete => "complete",
            Linkage::Average => "average",
            Linkage::Single => "single",
        }
    }

    /// Lance-Williams update: distance from `k` to the union of `i` and `j`
    fn update(&self, d_ki: f64, d_kj: f64, d_ij: f64, n_i: usize, n_j: usize, n_k: usize) -> f64 {
        let (n_i, n_j, n_k) = (n_i as f64, n_j as f64, n_k as f64);
        match self {
            Linkage::Single => d_ki.min(d_kj),
            Linkage::Complete => d_ki.max(d_kj),
            Linkage::Average => (n_i * d_ki + n_j * d_kj) / (n_i + n_j),
            Linkage::Ward => {
                let total = n_i + n_j + n_k;
                let sq = ((n_i + n_k) * d_ki * d_ki + (n_j + n_k) * d_kj * d_kj
                    - n_k * d_ij * d_ij)
                    / total;
                sq.max(0.0).sqrt()
            }
        }
    }
}

impl FromStr for Linkage {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ward" => Ok(Linkage::Ward),
            "complete" => Ok(Linkage::Complete),
            "average" => Ok(Linkage::Average),
            "single" => Ok(Linkage::Single),
            _ => Err(ParameterError::UnknownLinkage(s.to_string())),
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One agglomeration step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    /// Lowest point index of the surviving cluster
    pub a: usize,
    /// Lowest point index of the absorbed cluster
    pub b: usize,
    /// Linkage distance at which the merge happened
    pub distance: f64,
    /// Size of the merged cluster
    pub size: usize,
}

/// Merge history of a point set, ordered by merge height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    n: usize,
    merges: Vec<Merge>,
}

impl Dendrogram {
    /// Agglomerate `points` under `linkage`
    pub fn build(points: &[Observation], linkage: Linkage) -> Self {
        let n = points.len();
        let mut dist = CondensedMatrix::euclidean(points);
        let mut size = vec![1usize; n];
        let mut active = vec![true; n];
        let mut chain: Vec<usize> = Vec::with_capacity(n);
        let mut merges = Vec::with_capacity(n.saturating_sub(1));

        for _ in 1..n {
            if chain.is_empty() {
                if let Some(first) = active.iter().position(|&alive| alive) {
                    chain.push(first);
                }
            }

            let (a, b, height) = loop {
                let a = chain[chain.len() - 1];
                let prev = chain.len().checked_sub(2).map(|i| chain[i]);
                let (b, d) = nearest_active(&dist, &active, a, prev);

                if Some(b) == prev {
                    chain.truncate(chain.len() - 2);
                    break (a, b, d);
                }
                chain.push(b);
            };

            let (keep, gone) = (a.min(b), a.max(b));
            let (n_keep, n_gone) = (size[keep], size[gone]);
            for k in 0..n {
                if !active[k] || k == keep || k == gone {
                    continue;
                }
                let updated = linkage.update(
                    dist.get(k, keep),
                    dist.get(k, gone),
                    height,
                    n_keep,
                    n_gone,
                    size[k],
                );
                dist.set(k, keep, updated);
            }

            active[gone] = false;
            size[keep] = n_keep + n_gone;
            merges.push(Merge {
                a: keep,
                b: gone,
                distance: height,
                size: size[keep],
            });
        }

        merges.sort_by(|x, y| x.distance.total_cmp(&y.distance));
        Self { n, merges }
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Cut into `k` clusters (clamped to `1..=n`)
    ///
    /// Labels are numbered by first appearance in input order.
    pub fn cut(&self, k: usize) -> Vec<usize> {
        if self.n == 0 {
            return Vec::new();
        }

        let k = k.clamp(1, self.n);
        let mut uf = UnionFind::new(self.n);
        for merge in self.merges.iter().take(self.n - k) {
            uf.union(merge.a, merge.b);
        }

        let roots: Vec<usize> = (0..self.n).map(|i| uf.find(i)).collect();
        first_appearance_labels(&roots)
    }
}

/// Nearest active cluster to `a`, preferring `prev` on equal distance and
/// then the lowest index
fn nearest_active(
    dist: &CondensedMatrix,
    active: &[bool],
    a: usize,
    prev: Option<usize>,
) -> (usize, f64) {
    let mut best = prev.map(|p| (p, dist.get(a, p)));

    for (j, &alive) in active.iter().enumerate() {
        if !alive || j == a {
            continue;
        }
        let d = dist.get(a, j);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((j, d)),
        }
    }

    // `a` always has at least one active partner while merges remain
    best.unwrap_or((a, f64::INFINITY))
}

/// Agglomerate and cut in one step
pub fn hierarchical_labels(points: &[Observation], linkage: Linkage, k: usize) -> Vec<usize> {
    Dendrogram::build(points, linkage).cut(k)
}
