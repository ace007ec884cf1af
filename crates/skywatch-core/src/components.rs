//! Plain-data ECS components for hecs entities.
//!
//! The radar sensor itself carries behaviour and lives in `skywatch-sim`;
//! these are the host-side tags and attributes it reads.

use serde::{Deserialize, Serialize};

/// Marks an entity as a candidate radar target (a vehicle).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vehicle;

/// Marks an entity as destroyed. Destroyed entities are never candidates
/// and are treated as lost by any sensor holding a contact on them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Destroyed;

/// Bounding sphere used when tracing line of sight through entities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CollisionRadius {
    /// Radius in meters.
    pub meters: f64,
}

/// Human-readable entity name used in logs and snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);
