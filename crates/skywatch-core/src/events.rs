//! Structured diagnostic events emitted on sensor state transitions.
//!
//! Entities are referenced by their stable `u64` handle bits so the events
//! can be serialized without the ECS.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// A state change observed in the radar network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RadarEvent {
    /// Effective threshold fixed at sensor construction.
    ThresholdComputed {
        sensor: u64,
        threshold: f64,
        max_range: f64,
        detection_range: f64,
        radar_strength: f64,
    },
    /// Refresh interval derived from a (new) field of view.
    UpdateIntervalChanged {
        sensor: u64,
        fov_degrees: u16,
        interval_secs: f64,
    },
    /// Emission switched on or off.
    EmissionChanged { sensor: u64, emitting: bool },
    /// A mode-gated action was refused; state is unchanged.
    ActionRejected {
        sensor: u64,
        action: SensorAction,
        mode: RadarMode,
    },
    /// First detection of a target by a sensor.
    ContactAcquired {
        sensor: u64,
        target: u64,
        azimuth: f64,
        elevation: f64,
        distance: f64,
    },
    /// Contact passed its display time.
    ContactDisplayable { sensor: u64, target: u64 },
    /// Contact removed from the sensor's table.
    ContactExpired {
        sensor: u64,
        target: u64,
        reason: ExpiryReason,
    },
    /// The sensor was painted by another radar.
    Painted {
        sensor: u64,
        angle: f64,
        strength: f64,
        iff_key: i32,
    },
    /// The paint state was cleared.
    PaintCleared { sensor: u64 },
}
