//! Coverage snapshot: the externally visible state of every sensor,
//! suitable for a HUD or for logging as JSON.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::RadarEvent;
use crate::types::{Position, SimTime};

/// Complete radar network state after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageSnapshot {
    pub time: SimTime,
    pub sensors: Vec<SensorView>,
    /// Events emitted since the previous snapshot.
    pub events: Vec<RadarEvent>,
}

/// One sensor as seen by consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorView {
    pub entity: u64,
    pub name: Option<String>,
    pub position: Position,
    pub mode: RadarMode,
    pub fov_degrees: u16,
    pub emitting: bool,
    pub iff_key: i32,
    pub painted: Option<PaintView>,
    /// Only contacts that have passed their display time.
    pub contacts: Vec<ContactView>,
}

/// Last paint received by a sensor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaintView {
    /// Bearing of the painted sensor as seen by the emitter (degrees).
    pub angle: f64,
    pub strength: f64,
    pub iff_key: i32,
}

/// A displayable contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactView {
    pub target: u64,
    pub distance: f64,
    pub azimuth: f64,
    pub elevation: f64,
    pub last_detected_secs: f64,
}
