//! Line-of-sight tracing with terrain occlusion.
//!
//! Uses stepped ray traversal with Earth curvature correction
//! and standard atmospheric refraction (4/3 Earth radius model).
//! The sea surface (elevation 0) blocks rays like terrain does.

use skywatch_core::constants::TERRAIN_LOS_SAMPLE_INTERVAL;
use skywatch_core::types::Position;

use crate::grid::TerrainGrid;

/// Effective Earth radius accounting for standard atmospheric refraction (4/3 model).
const EFFECTIVE_EARTH_RADIUS: f64 = 6_371_000.0 * 4.0 / 3.0;

/// Fraction of the segment `from -> to` travelled before terrain blocks it.
///
/// Returns 1.0 when the whole segment is clear. Otherwise returns the
/// position of the last clear sample, so the result underestimates the
/// obstruction point by at most one sample interval.
pub fn trace_fraction(grid: &TerrainGrid, from: &Position, to: &Position) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dz = to.z - from.z;
    let length = (dx * dx + dy * dy + dz * dz).sqrt();

    if length < TERRAIN_LOS_SAMPLE_INTERVAL {
        return 1.0; // Too close for terrain to matter
    }

    let horiz_dist = (dx * dx + dy * dy).sqrt();
    let num_samples = ((length / TERRAIN_LOS_SAMPLE_INTERVAL).ceil() as usize).max(2);
    let mut last_clear = 0.0;

    for i in 1..num_samples {
        let t = i as f64 / num_samples as f64;

        let sample = Position::new(from.x + dx * t, from.y + dy * t, 0.0);
        let ray_height = from.z + dz * t;

        // Ground drops away from the straight ray between the two endpoints.
        let d_from = horiz_dist * t;
        let d_to = horiz_dist * (1.0 - t);
        let earth_drop = (d_from * d_to) / (2.0 * EFFECTIVE_EARTH_RADIUS);

        let terrain_elev = grid.elevation_at(&sample).unwrap_or(0.0).max(0.0) as f64;
        let effective_terrain = terrain_elev - earth_drop;

        if effective_terrain > ray_height {
            return last_clear;
        }
        last_clear = t;
    }

    1.0
}

/// Check line-of-sight between two sim-space points.
pub fn has_line_of_sight(grid: &TerrainGrid, from: &Position, to: &Position) -> bool {
    trace_fraction(grid, from, to) >= 1.0
}
