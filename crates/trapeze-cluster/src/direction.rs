//! Direction partitioning
//!
//! Observations are split by the sign of `y - x`. Each group keeps the
//! original input positions of its members so labels can be scattered back
//! in input order after clustering.

use crate::types::{Direction, Observation};
use serde::{Deserialize, Serialize};

/// Observations sharing one direction, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionGroup {
    pub direction: Direction,
    /// Input positions of the members
    pub indices: Vec<usize>,
    /// Members, parallel to `indices`
    pub points: Vec<Observation>,
}

impl DirectionGroup {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            indices: Vec::new(),
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn push(&mut self, index: usize, obs: Observation) {
        self.indices.push(index);
        self.points.push(obs);
    }
}

/// Both direction groups of one input
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionSplit {
    pub ascending: DirectionGroup,
    pub descending: DirectionGroup,
}

impl DirectionSplit {
    /// Groups in labelling order: ascending first
    pub fn groups(&self) -> [&DirectionGroup; 2] {
        [&self.ascending, &self.descending]
    }
}

/// Partition observations into ascending (`y >= x`) and descending (`y < x`)
pub fn split_by_direction(observations: &[Observation]) -> DirectionSplit {
    let mut ascending = DirectionGroup::new(Direction::Ascending);
    let mut descending = DirectionGroup::new(Direction::Descending);

    for (i, obs) in observations.iter().enumerate() {
        match Direction::of(obs) {
            Direction::Ascending => ascending.push(i, *obs),
            Direction::Descending => descending.push(i, *obs),
        }
    }

    DirectionSplit {
        ascending,
        descending,
    }
}

/// Counts of each direction, with ties broken out for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionCounts {
    pub total: usize,
    /// `y >= x`, ties included
    pub ascending: usize,
    /// `y < x`
    pub descending: usize,
    /// `y == x`
    pub ties: usize,
}

impl DirectionCounts {
    pub fn from_observations(observations: &[Observation]) -> Self {
        let mut counts = Self {
            total: observations.len(),
            ..Self::default()
        };
        for obs in observations {
            match Direction::of(obs) {
                Direction::Ascending => counts.ascending += 1,
                Direction::Descending => counts.descending += 1,
            }
            if obs.diff() == 0.0 {
                counts.ties += 1;
            }
        }
        counts
    }

    fn pct(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * count as f64 / self.total as f64
        }
    }

    pub fn ascending_pct(&self) -> f64 {
        self.pct(self.ascending)
    }

    pub fn descending_pct(&self) -> f64 {
        self.pct(self.descending)
    }

    pub fn ties_pct(&self) -> f64 {
        self.pct(self.ties)
    }
}
