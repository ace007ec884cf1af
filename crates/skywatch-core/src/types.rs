//! Fundamental geometric and simulation types.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// 3D position in simulation space (meters, Cartesian).
/// x = East, y = North, z = Up (altitude).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 3D velocity in simulation space (m/s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Body orientation of an entity.
///
/// Roll is not modelled: the right axis always stays horizontal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Heading in radians (0 = North, clockwise).
    pub heading: f64,
    /// Pitch in radians (positive = nose up).
    #[serde(default)]
    pub pitch: f64,
}

/// Position plus orientation, copied out of the world for geometry queries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub position: Position,
    pub orientation: Orientation,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds. Monotonic.
    pub elapsed_secs: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Range to another position in meters (3D distance).
    pub fn range_to(&self, other: &Position) -> f64 {
        self.vector_to(other).length()
    }

    /// Horizontal range (ignoring altitude).
    pub fn horizontal_range_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Vector from this position to `other`.
    pub fn vector_to(&self, other: &Position) -> DVec3 {
        DVec3::from(*other) - DVec3::from(*self)
    }
}

impl From<Position> for DVec3 {
    fn from(p: Position) -> Self {
        DVec3::new(p.x, p.y, p.z)
    }
}

impl From<DVec3> for Position {
    fn from(v: DVec3) -> Self {
        Position::new(v.x, v.y, v.z)
    }
}

impl Velocity {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Orientation {
    pub fn new(heading: f64, pitch: f64) -> Self {
        Self { heading, pitch }
    }

    /// Orientation facing a compass heading given in degrees.
    pub fn from_heading_degrees(degrees: f64) -> Self {
        Self::new(degrees.to_radians(), 0.0)
    }

    /// Unit forward (boresight) axis.
    pub fn forward(&self) -> DVec3 {
        let (sh, ch) = self.heading.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        DVec3::new(sh * cp, ch * cp, sp)
    }

    /// Unit right axis (always horizontal).
    pub fn right(&self) -> DVec3 {
        let (sh, ch) = self.heading.sin_cos();
        DVec3::new(ch, -sh, 0.0)
    }
}

impl Pose {
    pub fn new(position: Position, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        // Derived from the tick count so repeated additions cannot drift.
        self.elapsed_secs = self.tick as f64 * self.dt();
    }

    /// Current monotonic time in seconds.
    pub fn now_secs(&self) -> f64 {
        self.elapsed_secs
    }
}
