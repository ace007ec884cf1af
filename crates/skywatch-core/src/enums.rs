//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Radar operating mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadarMode {
    /// Transmits only; cannot be painted.
    EmitOnly,
    /// Passive receiver; can be painted but never transmits.
    DetectOnly,
    /// Transmits and receives.
    #[default]
    EmitAndDetect,
}

impl RadarMode {
    pub fn can_emit(self) -> bool {
        matches!(self, RadarMode::EmitOnly | RadarMode::EmitAndDetect)
    }

    pub fn can_detect(self) -> bool {
        matches!(self, RadarMode::DetectOnly | RadarMode::EmitAndDetect)
    }
}

/// Radar field of view. Serialized as whole degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum FieldOfView {
    Deg30,
    Deg90,
    #[default]
    Deg360,
}

impl FieldOfView {
    pub fn degrees(self) -> f64 {
        match self {
            FieldOfView::Deg30 => 30.0,
            FieldOfView::Deg90 => 90.0,
            FieldOfView::Deg360 => 360.0,
        }
    }

    /// Half-angle of the detection cone in degrees.
    pub fn half_angle_degrees(self) -> f64 {
        self.degrees() / 2.0
    }
}

impl TryFrom<u16> for FieldOfView {
    type Error = ConfigError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            30 => Ok(FieldOfView::Deg30),
            90 => Ok(FieldOfView::Deg90),
            360 => Ok(FieldOfView::Deg360),
            other => Err(ConfigError::InvalidFieldOfView(other)),
        }
    }
}

impl From<FieldOfView> for u16 {
    fn from(fov: FieldOfView) -> Self {
        match fov {
            FieldOfView::Deg30 => 30,
            FieldOfView::Deg90 => 90,
            FieldOfView::Deg360 => 360,
        }
    }
}

/// Display lifecycle of a contact. Expiry removes the contact outright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactState {
    /// Detected, but the echo has not "arrived" yet.
    #[default]
    Pending,
    /// Past its display time and visible to consumers.
    Displayable,
}

/// Why a contact was dropped from a sensor's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryReason {
    /// Not re-detected within the contact memory window.
    Stale,
    /// Target entity no longer exists or was destroyed.
    TargetLost,
}

/// Mode-gated sensor actions that can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorAction {
    SetEmitting,
    SetPainted,
}
