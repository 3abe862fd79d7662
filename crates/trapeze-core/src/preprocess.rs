//! Coordinate preprocessing applied before direction splitting

use tracing::info;
use trapeze_cluster::Observation;

/// Substitute for non-positive values before taking the logarithm
pub const LOG2_FLOOR: f64 = 1e-10;

/// Base-2 logarithm with non-positive inputs floored to [`LOG2_FLOOR`]
pub fn floored_log2(value: f64) -> f64 {
    if value > 0.0 {
        value.log2()
    } else {
        LOG2_FLOOR.log2()
    }
}

/// Replace both coordinates of every observation by their floored log2
pub fn log2_transform(observations: &[Observation]) -> Vec<Observation> {
    let floored = observations
        .iter()
        .map(|o| usize::from(o.x <= 0.0) + usize::from(o.y <= 0.0))
        .sum::<usize>();

    info!(
        observations = observations.len(),
        floored, "Applying log2 transform (floor {:e})", LOG2_FLOOR
    );

    observations
        .iter()
        .map(|o| Observation::new(floored_log2(o.x), floored_log2(o.y)))
        .collect()
}
