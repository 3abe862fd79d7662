//! Core types shared by every clustering strategy

use serde::{Deserialize, Serialize};
use std::fmt;

/// A paired measurement (X before, Y after)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
}

impl Observation {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Signed change `y - x`
    pub fn diff(&self) -> f64 {
        self.y - self.x
    }

    /// Squared Euclidean distance in (X, Y) space
    pub fn distance_sq(&self, other: &Observation) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance in (X, Y) space
    pub fn distance(&self, other: &Observation) -> f64 {
        self.distance_sq(other).sqrt()
    }
}

impl From<(f64, f64)> for Observation {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Sign of `y - x` for a group of observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// `y >= x` (ties included)
    Ascending,
    /// `y < x`
    Descending,
}

impl Direction {
    /// Classify a single observation
    pub fn of(obs: &Observation) -> Self {
        if obs.diff() >= 0.0 {
            Direction::Ascending
        } else {
            Direction::Descending
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::Ascending => "ascending",
            Direction::Descending => "descending",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cluster assignment of one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    /// Member of the cluster with this id
    Cluster(usize),
    /// Not claimed by any cluster (density clustering only)
    Noise,
}

impl Label {
    /// Numeric id as written to output tables (`-1` for noise)
    pub fn as_i64(&self) -> i64 {
        match self {
            Label::Cluster(id) => *id as i64,
            Label::Noise => -1,
        }
    }

    /// Cluster id, or `None` for noise
    pub fn cluster(&self) -> Option<usize> {
        match self {
            Label::Cluster(id) => Some(*id),
            Label::Noise => None,
        }
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, Label::Noise)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_tie_is_ascending() {
        assert_eq!(Direction::of(&Observation::new(1.0, 1.0)), Direction::Ascending);
        assert_eq!(Direction::of(&Observation::new(1.0, 4.0)), Direction::Ascending);
        assert_eq!(Direction::of(&Observation::new(3.0, 2.0)), Direction::Descending);
    }

    #[test]
    fn test_label_ids() {
        assert_eq!(Label::Cluster(3).as_i64(), 3);
        assert_eq!(Label::Noise.as_i64(), -1);
        assert_eq!(Label::Noise.cluster(), None);
        assert_eq!(Label::Cluster(2).to_string(), "2");
    }

    #[test]
    fn test_distance() {
        let a = Observation::new(0.0, 0.0);
        let b = Observation::new(3.0, 4.0);
        assert_eq!(a.distance_sq(&b), 25.0);
        assert_eq!(a.distance(&b), 5.0);
    }
}
