//! Nearest-rank quartiles
//!
//! Every quartile is an element of the sorted sample, picked at a fixed
//! index. No interpolation is performed.

use serde::{Deserialize, Serialize};

/// Sorted-sample indices of the three quartiles for a sample of size `n`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuartileIndices {
    pub q1: usize,
    pub q2: usize,
    pub q3: usize,
}

impl QuartileIndices {
    /// Indices `floor(n/4)`, `floor(n/2)` and `floor(3n/4)`
    ///
    /// Returns `None` for an empty sample.
    pub fn for_len(n: usize) -> Option<Self> {
        if n == 0 {
            return None;
        }
        Some(Self {
            q1: n / 4,
            q2: n / 2,
            q3: 3 * n / 4,
        })
    }
}

/// Mean and nearest-rank quartiles of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    /// Arithmetic mean
    pub mean: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub q2: f64,
    /// Third quartile
    pub q3: f64,
}

impl Quartiles {
    /// Compute quartiles from unsorted data
    ///
    /// Returns `None` for an empty slice.
    pub fn from_data(data: &[f64]) -> Option<Self> {
        let mut sorted = data.to_vec();
        sort_values(&mut sorted);
        Self::from_sorted(&sorted)
    }

    /// Compute quartiles from data already sorted ascending
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let idx = QuartileIndices::for_len(sorted.len())?;
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

        Some(Self {
            mean,
            q1: sorted[idx.q1],
            q2: sorted[idx.q2],
            q3: sorted[idx.q3],
        })
    }

    /// Quartile indices applied to the sample sorted descending
    ///
    /// Trapezoid plots walk clusters from the largest value down, so `q1`
    /// here is the upper-quarter value. The mean is unchanged.
    pub fn from_data_descending(data: &[f64]) -> Option<Self> {
        let mut sorted = data.to_vec();
        sorted.sort_by(|a, b| b.total_cmp(a));
        Self::from_sorted(&sorted)
    }

    /// Interquartile range (Q3 - Q1)
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Component-wise difference `self - other`
    pub fn minus(&self, other: &Quartiles) -> Quartiles {
        Quartiles {
            mean: self.mean - other.mean,
            q1: self.q1 - other.q1,
            q2: self.q2 - other.q2,
            q3: self.q3 - other.q3,
        }
    }
}

/// Sort floats ascending with a total order (NaN sorts last)
pub fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_indices_small_samples() {
        assert_eq!(QuartileIndices::for_len(0), None);
        assert_eq!(
            QuartileIndices::for_len(1),
            Some(QuartileIndices { q1: 0, q2: 0, q3: 0 })
        );
        assert_eq!(
            QuartileIndices::for_len(4),
            Some(QuartileIndices { q1: 1, q2: 2, q3: 3 })
        );
        assert_eq!(
            QuartileIndices::for_len(7),
            Some(QuartileIndices { q1: 1, q2: 3, q3: 5 })
        );
    }

    #[test]
    fn test_quartiles_nearest_rank() {
        let q = Quartiles::from_data(&[8.0, 1.0, 4.0, 2.0, 6.0, 3.0, 7.0, 5.0]).unwrap();
        // sorted: 1..=8, indices 2, 4, 6
        assert_eq!(q.q1, 3.0);
        assert_eq!(q.q2, 5.0);
        assert_eq!(q.q3, 7.0);
        assert!((q.mean - 4.5).abs() < 1e-12);
        assert_eq!(q.iqr(), 4.0);
    }

    #[test]
    fn test_quartiles_single_value() {
        let q = Quartiles::from_data(&[2.5]).unwrap();
        assert_eq!(q.q1, 2.5);
        assert_eq!(q.q2, 2.5);
        assert_eq!(q.q3, 2.5);
        assert_eq!(q.mean, 2.5);
    }

    #[test]
    fn test_quartiles_empty() {
        assert!(Quartiles::from_data(&[]).is_none());
    }

    #[test]
    fn test_descending_order_picks_mirrored_ranks() {
        let data = [8.0, 1.0, 4.0, 2.0, 6.0, 3.0, 7.0, 5.0];
        let q = Quartiles::from_data_descending(&data).unwrap();
        // sorted: 8..=1, indices 2, 4, 6
        assert_eq!(q.q1, 6.0);
        assert_eq!(q.q2, 4.0);
        assert_eq!(q.q3, 2.0);
        assert!((q.mean - 4.5).abs() < 1e-12);
        assert_ne!(q.q2, Quartiles::from_data(&data).unwrap().q2);
    }

    #[test]
    fn test_minus() {
        let a = Quartiles { mean: 5.0, q1: 4.0, q2: 5.0, q3: 6.0 };
        let b = Quartiles { mean: 1.0, q1: 1.0, q2: 2.0, q3: 3.0 };
        let d = a.minus(&b);
        assert_eq!(d, Quartiles { mean: 4.0, q1: 3.0, q2: 3.0, q3: 3.0 });
    }

    proptest! {
        #[test]
        fn prop_indices_ordered_and_in_bounds(n in 1usize..10_000) {
            let idx = QuartileIndices::for_len(n).unwrap();
            prop_assert!(idx.q1 <= idx.q2);
            prop_assert!(idx.q2 <= idx.q3);
            prop_assert!(idx.q3 < n);
        }

        #[test]
        fn prop_quartiles_are_observed_values(data in prop::collection::vec(-1e6f64..1e6, 1..200)) {
            let q = Quartiles::from_data(&data).unwrap();
            prop_assert!(data.contains(&q.q1));
            prop_assert!(data.contains(&q.q2));
            prop_assert!(data.contains(&q.q3));
            prop_assert!(q.q1 <= q.q2 && q.q2 <= q.q3);
        }
    }
}
