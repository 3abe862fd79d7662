//! Shared fixtures for clustering integration tests

use trapeze_cluster::Observation;

pub fn observations(pairs: &[(f64, f64)]) -> Vec<Observation> {
    pairs.iter().copied().map(Observation::from).collect()
}

/// Two tight blobs above the diagonal and two below, interleaved in input
/// order
pub fn four_blobs() -> Vec<Observation> {
    let centres = [(1.0, 6.0), (8.0, 4.0), (2.0, 9.0), (9.0, 1.0)];
    let offsets = [(0.0, 0.0), (0.2, 0.0), (0.0, 0.2), (0.2, 0.2), (0.1, 0.1)];

    let mut pairs = Vec::new();
    for (dx, dy) in offsets {
        for (cx, cy) in centres {
            pairs.push((cx + dx, cy + dy));
        }
    }
    observations(&pairs)
}
