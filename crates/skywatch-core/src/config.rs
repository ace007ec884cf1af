//! Sensor configuration and validation.
//!
//! Every field has a default so scenario files only need to name what they
//! change.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::enums::{FieldOfView, RadarMode};

/// Errors raised while validating configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("field of view must be 30, 90 or 360 degrees, got {0}")]
    InvalidFieldOfView(u16),
    #[error("max range must be positive, got {0} m")]
    NonPositiveRange(f64),
    #[error("radar strength must be positive, got {0}")]
    NonPositiveStrength(f64),
    #[error("detection range fraction must lie in (0, 1], got {0}")]
    RangeFractionOutOfBounds(f64),
    #[error("base update interval must be positive, got {0} s")]
    NonPositiveInterval(f64),
    #[error("effective detection threshold must be positive and finite, got {0}")]
    InvalidThreshold(f64),
}

/// Static configuration of one radar sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Maximum range of the radar in meters.
    pub max_range: f64,
    /// Radar strength (1.0 is standard).
    pub radar_strength: f64,
    /// Threshold used when auto-calculation is disabled.
    pub base_detection_threshold: f64,
    /// Detection range as a fraction of max range.
    pub detection_range_fraction: f64,
    /// Derive the threshold from the detection range.
    pub auto_calculate_threshold: bool,
    pub mode: RadarMode,
    pub field_of_view: FieldOfView,
    /// Refresh interval in seconds for a 360° sensor.
    pub base_update_interval: f64,
    /// Identity/faction tag carried in paint notifications.
    pub iff_key: i32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            max_range: DEFAULT_MAX_RANGE,
            radar_strength: DEFAULT_RADAR_STRENGTH,
            base_detection_threshold: DEFAULT_BASE_DETECTION_THRESHOLD,
            detection_range_fraction: DEFAULT_DETECTION_RANGE_FRACTION,
            auto_calculate_threshold: true,
            mode: RadarMode::default(),
            field_of_view: FieldOfView::default(),
            base_update_interval: DEFAULT_BASE_UPDATE_INTERVAL_SECS,
            iff_key: IFF_KEY_UNSET,
        }
    }
}

impl SensorConfig {
    /// Range at which a target returns exactly the auto-calculated threshold.
    pub fn detection_range(&self) -> f64 {
        self.max_range * self.detection_range_fraction
    }

    /// Threshold derived by the inverse-square law at the detection range.
    pub fn auto_threshold(&self) -> f64 {
        let detection_range = self.detection_range();
        self.radar_strength / (detection_range * detection_range)
    }

    /// Threshold the sensor will actually compare against.
    pub fn effective_threshold(&self) -> f64 {
        if self.auto_calculate_threshold {
            self.auto_threshold()
        } else {
            self.base_detection_threshold
        }
    }

    /// Refresh interval after scaling by field of view.
    /// Narrower sectors refresh proportionally faster.
    pub fn update_interval_for(&self, fov: FieldOfView) -> f64 {
        let fov_multiplier = FULL_CIRCLE_DEGREES / fov.degrees();
        self.base_update_interval / fov_multiplier
    }

    /// Check every invariant the detection model relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_range > 0.0) {
            return Err(ConfigError::NonPositiveRange(self.max_range));
        }
        if !(self.radar_strength > 0.0) {
            return Err(ConfigError::NonPositiveStrength(self.radar_strength));
        }
        if self.auto_calculate_threshold
            && !(self.detection_range_fraction > 0.0 && self.detection_range_fraction <= 1.0)
        {
            return Err(ConfigError::RangeFractionOutOfBounds(
                self.detection_range_fraction,
            ));
        }
        if !(self.base_update_interval > 0.0) {
            return Err(ConfigError::NonPositiveInterval(self.base_update_interval));
        }
        let threshold = self.effective_threshold();
        if !(threshold > 0.0 && threshold.is_finite()) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        Ok(())
    }
}
