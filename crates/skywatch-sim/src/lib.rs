//! Radar simulation for SKYWATCH.
//!
//! Owns the hecs ECS world, runs the coverage and contact-refresh loops on
//! a cooperative scheduler, and produces `CoverageSnapshot`s.

pub mod collaborators;
pub mod contact;
pub mod engine;
pub mod query;
pub mod scenario;
pub mod scheduler;
pub mod sensor;
pub mod systems;
pub mod world_setup;

pub use skywatch_core as core;
pub use engine::RadarEngine;

#[cfg(test)]
mod tests;
