//! Commands a host can queue against sensors.
//!
//! Processed by the engine at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::FieldOfView;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SensorCommand {
    /// Switch emission on or off. Ignored by detect-only sensors.
    SetEmitting { sensor: u64, emitting: bool },
    /// Change the field of view; reschedules the sensor's refresh task.
    SetFieldOfView { sensor: u64, fov: FieldOfView },
    /// Assign the identity/faction tag used in paint notifications.
    SetIffKey { sensor: u64, key: i32 },
    /// Clear the sensor's painted state.
    ClearPaint { sensor: u64 },
}

impl SensorCommand {
    /// Handle bits of the sensor the command addresses.
    pub fn sensor(&self) -> u64 {
        match *self {
            SensorCommand::SetEmitting { sensor, .. }
            | SensorCommand::SetFieldOfView { sensor, .. }
            | SensorCommand::SetIffKey { sensor, .. }
            | SensorCommand::ClearPaint { sensor } => sensor,
        }
    }
}
