//! Terrain system for SKYWATCH.
//!
//! Heightmap grid in local simulation meters and ray-march occlusion
//! tracing against it.

pub use skywatch_core as core;

pub mod grid;
pub mod los;

// Re-export key types for convenience.
pub use grid::{TerrainGrid, TerrainHeader};
pub use los::{has_line_of_sight, trace_fraction};
