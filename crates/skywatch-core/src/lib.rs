//! Core types and definitions for the SKYWATCH radar coverage simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, sensor configuration, commands, state snapshots, events,
//! and constants. It has no dependency on the ECS or any runtime.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod geometry;
pub mod state;
pub mod types;
