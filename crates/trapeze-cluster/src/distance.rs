//! Condensed pairwise distance matrix
//!
//! Stores the strict upper triangle row by row, `n * (n - 1) / 2` entries.
//! Shared by agglomerative and density clustering.

use crate::types::Observation;

/// Symmetric distance matrix with an implicit zero diagonal
#[derive(Debug, Clone, PartialEq)]
pub struct CondensedMatrix {
    n: usize,
    data: Vec<f64>,
}

impl CondensedMatrix {
    /// Euclidean distances between all pairs of points
    pub fn euclidean(points: &[Observation]) -> Self {
        let n = points.len();
        let mut data = Vec::with_capacity(n.saturating_sub(1) * n / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                data.push(points[i].distance(&points[j]));
            }
        }
        Self { n, data }
    }

    /// Build from a symmetric function of index pairs
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(n.saturating_sub(1) * n / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                data.push(f(i, j));
            }
        }
        Self { n, data }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    fn offset(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        // rows 0..i hold (n-1) + (n-2) + ... + (n-i) entries
        i * (2 * self.n - i - 1) / 2 + (j - i - 1)
    }

    /// Distance between `i` and `j` (zero on the diagonal)
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            0.0
        } else {
            self.data[self.offset(i, j)]
        }
    }

    /// Overwrite the distance between distinct `i` and `j`
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        debug_assert!(i != j, "diagonal is implicit");
        let offset = self.offset(i, j);
        self.data[offset] = value;
    }

    /// Distances from `i` to every point, including itself, sorted ascending
    pub fn sorted_row(&self, i: usize) -> Vec<f64> {
        let mut row: Vec<f64> = (0..self.n).map(|j| self.get(i, j)).collect();
        row.sort_by(|a, b| a.total_cmp(b));
        row
    }
}
