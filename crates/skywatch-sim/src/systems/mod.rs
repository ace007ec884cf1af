//! Systems that operate on the simulation world.
//!
//! Systems are functions (or, for coverage, a small registry) that take the
//! `World`. Entity state lives in components; sensor state lives in the
//! `SensorComponent`.

pub mod contacts;
pub mod coverage;
pub mod movement;
pub mod snapshot;
