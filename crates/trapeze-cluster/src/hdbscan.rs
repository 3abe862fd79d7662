//! Density-based clustering (HDBSCAN)
//!
//! 1. Core distance of every point: distance to its `min_samples`-th nearest
//!    neighbour
//! 2. Mutual reachability: `max(core_a, core_b, d(a, b))`
//! 3. Minimum spanning tree over mutual reachability (Prim)
//! 4. Single-linkage hierarchy from the MST edges in ascending weight
//! 5. Condensed tree: splits where both sides reach `min_cluster_size`
//!    create clusters, smaller sides fall out as points
//! 6. Excess-of-mass selection of the most stable clusters
//!
//! Points not claimed by a selected cluster are noise. If nothing is
//! selected the whole group becomes a single cluster.

use crate::distance::CondensedMatrix;
use crate::error::ParameterError;
use crate::labeler::compact_labels;
use crate::types::{Label, Observation};
use crate::union_find::UnionFind;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default minimum cluster size
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 5;

/// Density for zero-length edges
const LAMBDA_CEILING: f64 = 1e12;

/// Density clustering parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensityParams {
    /// Smallest group that counts as a cluster
    pub min_cluster_size: usize,
    /// Neighbour rank for core distances; `None` uses `min_cluster_size`
    pub min_samples: Option<usize>,
}

impl Default for DensityParams {
    fn default() -> Self {
        Self {
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            min_samples: None,
        }
    }
}

impl DensityParams {
    pub fn new(min_cluster_size: usize) -> Self {
        Self {
            min_cluster_size,
            min_samples: None,
        }
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = Some(min_samples);
        self
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.min_cluster_size < 1 {
            return Err(ParameterError::InvalidMinClusterSize(self.min_cluster_size));
        }
        if let Some(ms) = self.min_samples {
            if ms < 1 {
                return Err(ParameterError::InvalidMinSamples(ms));
            }
        }
        Ok(())
    }

    /// Parameters clamped to a group of `n >= 3` points
    ///
    /// `min_cluster_size` lands in `2..=max(2, n / 2)` and `min_samples` in
    /// `1..=n - 1`.
    pub fn effective(&self, n: usize) -> (usize, usize) {
        let min_cluster_size = self.min_cluster_size.min(n / 2).max(2);
        let min_samples = self
            .min_samples
            .unwrap_or(self.min_cluster_size)
            .min(n.saturating_sub(1))
            .max(1);
        (min_cluster_size, min_samples)
    }
}

/// Density clustering of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityFit {
    /// Label per point, clusters numbered by first appearance
    pub labels: Vec<Label>,
    /// Number of selected clusters
    pub clusters: usize,
    /// Number of noise points
    pub noise: usize,
}

pub struct DensityClusterer {
    params: DensityParams,
}

impl DensityClusterer {
    pub fn new(params: DensityParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DensityParams {
        &self.params
    }

    pub fn fit(&self, points: &[Observation]) -> DensityFit {
        let labels = self.labels(points);
        let clusters = crate::labeler::cluster_count(&labels);
        let noise = crate::labeler::noise_count(&labels);
        DensityFit {
            labels,
            clusters,
            noise,
        }
    }

    fn labels(&self, points: &[Observation]) -> Vec<Label> {
        let n = points.len();
        if n < 3 {
            return vec![Label::Cluster(0); n];
        }

        let (min_cluster_size, min_samples) = self.params.effective(n);
        let distances = CondensedMatrix::euclidean(points);
        let core: Vec<f64> = (0..n)
            .map(|i| distances.sorted_row(i)[min_samples])
            .collect();
        let reachability = CondensedMatrix::from_fn(n, |i, j| {
            distances.get(i, j).max(core[i]).max(core[j])
        });

        let mst = minimum_spanning_tree(&reachability);
        let hierarchy = SingleLinkageTree::from_edges(n, &mst);
        let condensed = CondensedTree::build(&hierarchy, min_cluster_size);
        let selected = condensed.select_clusters();
        let assigned = condensed.assign_points(n, &selected);

        debug!(
            points = n,
            min_cluster_size,
            min_samples,
            candidates = condensed.clusters,
            "Density hierarchy condensed"
        );

        if assigned.iter().all(Label::is_noise) {
            return vec![Label::Cluster(0); n];
        }
        compact_labels(&assigned)
    }
}

/// Prim's algorithm on a dense matrix; edges returned in ascending weight
///
/// Ties pick the lowest vertex index, and the final sort is stable.
fn minimum_spanning_tree(m: &CondensedMatrix) -> Vec<(usize, usize, f64)> {
    let n = m.len();
    if n < 2 {
        return Vec::new();
    }

    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut from = vec![0usize; n];
    let mut edges = Vec::with_capacity(n - 1);

    let mut current = 0;
    in_tree[current] = true;

    for _ in 1..n {
        let mut next: Option<(usize, f64)> = None;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            let d = m.get(current, j);
            if d < best[j] {
                best[j] = d;
                from[j] = current;
            }
            match next {
                Some((_, nd)) if best[j] >= nd => {}
                _ => next = Some((j, best[j])),
            }
        }

        let Some((j, d)) = next else { break };
        in_tree[j] = true;
        edges.push((from[j], j, d));
        current = j;
    }

    edges.sort_by(|a, b| a.2.total_cmp(&b.2));
    edges
}

#[derive(Debug, Clone, Copy)]
struct LinkageNode {
    left: usize,
    right: usize,
    distance: f64,
    size: usize,
}

/// Binary merge tree: ids `0..n` are points, `n + i` is the i-th merge
struct SingleLinkageTree {
    n: usize,
    nodes: Vec<LinkageNode>,
}

impl SingleLinkageTree {
    fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut uf = UnionFind::new(n);
        let mut node_of: Vec<usize> = (0..n).collect();
        let mut tree = Self {
            n,
            nodes: Vec::with_capacity(n.saturating_sub(1)),
        };

        for &(a, b, distance) in edges {
            let (root_a, root_b) = (uf.find(a), uf.find(b));
            if root_a == root_b {
                continue;
            }
            let (left, right) = (node_of[root_a], node_of[root_b]);
            let size = tree.size(left) + tree.size(right);

            uf.union(root_a, root_b);
            let root = uf.find(root_a);
            node_of[root] = n + tree.nodes.len();
            tree.nodes.push(LinkageNode {
                left,
                right,
                distance,
                size,
            });
        }
        tree
    }

    fn root(&self) -> Option<usize> {
        self.nodes.len().checked_sub(1).map(|i| self.n + i)
    }

    fn node(&self, id: usize) -> Option<&LinkageNode> {
        id.checked_sub(self.n).and_then(|i| self.nodes.get(i))
    }

    fn size(&self, id: usize) -> usize {
        self.node(id).map_or(1, |node| node.size)
    }

    /// Points under `id`, left subtree first
    fn leaves(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(top) = stack.pop() {
            match self.node(top) {
                Some(node) => {
                    stack.push(node.right);
                    stack.push(node.left);
                }
                None => out.push(top),
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Child {
    Point(usize),
    Cluster(usize),
}

#[derive(Debug, Clone, Copy)]
struct CondensedEdge {
    parent: usize,
    child: Child,
    lambda: f64,
    size: usize,
}

/// Hierarchy of candidate clusters; cluster 0 is the root and every child
/// has a larger id than its parent
struct CondensedTree {
    edges: Vec<CondensedEdge>,
    clusters: usize,
}

fn lambda_of(distance: f64) -> f64 {
    if distance > 0.0 {
        (1.0 / distance).min(LAMBDA_CEILING)
    } else {
        LAMBDA_CEILING
    }
}

impl CondensedTree {
    fn build(tree: &SingleLinkageTree, min_cluster_size: usize) -> Self {
        let mut condensed = Self {
            edges: Vec::new(),
            clusters: 1,
        };
        let Some(root) = tree.root() else {
            return condensed;
        };

        let mut stack = vec![(root, 0usize)];
        while let Some((id, label)) = stack.pop() {
            let Some(node) = tree.node(id) else { continue };
            let lambda = lambda_of(node.distance);
            let left_big = tree.size(node.left) >= min_cluster_size;
            let right_big = tree.size(node.right) >= min_cluster_size;

            match (left_big, right_big) {
                (true, true) => {
                    for child in [node.left, node.right] {
                        let child_label = condensed.clusters;
                        condensed.clusters += 1;
                        condensed.edges.push(CondensedEdge {
                            parent: label,
                            child: Child::Cluster(child_label),
                            lambda,
                            size: tree.size(child),
                        });
                        stack.push((child, child_label));
                    }
                }
                (true, false) => {
                    condensed.fall_out(tree, node.right, label, lambda);
                    stack.push((node.left, label));
                }
                (false, true) => {
                    condensed.fall_out(tree, node.left, label, lambda);
                    stack.push((node.right, label));
                }
                (false, false) => {
                    condensed.fall_out(tree, node.left, label, lambda);
                    condensed.fall_out(tree, node.right, label, lambda);
                }
            }
        }
        condensed
    }

    fn fall_out(&mut self, tree: &SingleLinkageTree, id: usize, parent: usize, lambda: f64) {
        for point in tree.leaves(id) {
            self.edges.push(CondensedEdge {
                parent,
                child: Child::Point(point),
                lambda,
                size: 1,
            });
        }
    }

    fn parents(&self) -> Vec<Option<usize>> {
        let mut parent = vec![None; self.clusters];
        for edge in &self.edges {
            if let Child::Cluster(c) = edge.child {
                parent[c] = Some(edge.parent);
            }
        }
        parent
    }

    /// Excess-of-mass selection; the root is never selected
    fn select_clusters(&self) -> Vec<bool> {
        let k = self.clusters;
        let mut birth = vec![0.0; k];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); k];
        for edge in &self.edges {
            if let Child::Cluster(c) = edge.child {
                birth[c] = edge.lambda;
                children[edge.parent].push(c);
            }
        }

        let mut stability = vec![0.0; k];
        for edge in &self.edges {
            stability[edge.parent] += (edge.lambda - birth[edge.parent]) * edge.size as f64;
        }

        let mut selected = vec![true; k];
        selected[0] = false;

        for c in (1..k).rev() {
            let subtree: f64 = children[c].iter().map(|&child| stability[child]).sum();
            if subtree > stability[c] {
                selected[c] = false;
                stability[c] = subtree;
            } else {
                let mut stack = children[c].clone();
                while let Some(d) = stack.pop() {
                    selected[d] = false;
                    stack.extend_from_slice(&children[d]);
                }
            }
        }
        selected
    }

    /// Each point takes the nearest selected ancestor of the cluster it fell
    /// out of, or noise
    fn assign_points(&self, n: usize, selected: &[bool]) -> Vec<Label> {
        let parent = self.parents();
        let mut fell_from = vec![0usize; n];
        for edge in &self.edges {
            if let Child::Point(p) = edge.child {
                fell_from[p] = edge.parent;
            }
        }

        fell_from
            .into_iter()
            .map(|start| {
                let mut cursor = Some(start);
                while let Some(c) = cursor {
                    if selected[c] {
                        return Label::Cluster(c);
                    }
                    cursor = parent[c];
                }
                Label::Noise
            })
            .collect()
    }
}

/// Cluster a group with density parameters
pub fn hdbscan(points: &[Observation], params: DensityParams) -> Vec<Label> {
    DensityClusterer::new(params).fit(points).labels
}
