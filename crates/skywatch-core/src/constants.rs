//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 20;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Propagation ---

/// Speed of light in meters per second.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Minimum delay between detection and display of a contact (seconds).
pub const MIN_DISPLAY_DELAY_SECS: f64 = 0.1;

// --- Contacts ---

/// Time a contact is remembered after its last detection (seconds).
pub const CONTACT_MEMORY_SECS: f64 = 30.0;

// --- Detection ---

/// Distances below this are clamped in the strength model and skipped by
/// the coverage pass (meters).
pub const MIN_DETECTION_DISTANCE: f64 = 0.01;

/// Tolerance for line-of-sight traces. A trace that stops within this
/// fraction of the full segment, or this many meters short of the target,
/// counts as clear.
pub const LOS_EPSILON: f64 = 0.035;

/// Default coverage pass interval (seconds).
pub const COVERAGE_UPDATE_INTERVAL_SECS: f64 = 1.0;

/// Field of view that every narrower sector is scaled against.
pub const FULL_CIRCLE_DEGREES: f64 = 360.0;

// --- Sensor defaults ---

/// Default maximum radar range (meters).
pub const DEFAULT_MAX_RANGE: f64 = 100.0;

/// Default radar strength (unitless gain).
pub const DEFAULT_RADAR_STRENGTH: f64 = 1.0;

/// Default base detection threshold, used when auto-calculation is off.
pub const DEFAULT_BASE_DETECTION_THRESHOLD: f64 = 0.1;

/// Default detection range as a fraction of max range.
pub const DEFAULT_DETECTION_RANGE_FRACTION: f64 = 0.75;

/// Default base refresh interval for a 360° sensor (seconds).
pub const DEFAULT_BASE_UPDATE_INTERVAL_SECS: f64 = 1.0;

/// IFF key of a sensor that has not been assigned one.
pub const IFF_KEY_UNSET: i32 = -1;

// --- Terrain ---

/// Line-of-sight sampling interval over terrain in meters.
pub const TERRAIN_LOS_SAMPLE_INTERVAL: f64 = 10.0;
