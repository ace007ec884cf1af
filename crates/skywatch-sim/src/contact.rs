//! A sensor's decaying record of one detected target.
//!
//! Contacts start `Pending` and become `Displayable` once the simulated
//! echo has had time to return. They never go back to `Pending`; the
//! owning sensor removes them once they have gone unrefreshed for longer
//! than the contact memory window.

use glam::DVec3;
use hecs::Entity;

use skywatch_core::constants::{CONTACT_MEMORY_SECS, MIN_DISPLAY_DELAY_SECS, SPEED_OF_LIGHT};
use skywatch_core::enums::ContactState;

/// Slack for comparing timestamps produced by repeated interval arithmetic.
const TIMER_TOLERANCE_SECS: f64 = 1e-9;

/// Delay between detection and display for a target at `distance` meters:
/// the round-trip travel time of the signal, floored at the minimum delay.
pub fn display_delay(distance: f64) -> f64 {
    let travel_time = (2.0 * distance) / SPEED_OF_LIGHT;
    travel_time.max(MIN_DISPLAY_DELAY_SECS)
}

#[derive(Debug, Clone)]
pub struct Contact {
    target: Entity,
    /// Target position relative to the sensor (meters).
    relative_position: DVec3,
    distance: f64,
    /// Horizontal bearing from the sensor's forward axis (degrees, [0, 360)).
    azimuth: f64,
    /// Degrees above the sensor's horizontal plane.
    elevation: f64,
    last_detected_time: f64,
    last_update_time: f64,
    state: ContactState,
    display_time: f64,
}

impl Contact {
    pub fn new(
        target: Entity,
        relative_position: DVec3,
        azimuth: f64,
        elevation: f64,
        now: f64,
    ) -> Self {
        let mut contact = Self {
            target,
            relative_position: DVec3::ZERO,
            distance: 0.0,
            azimuth: 0.0,
            elevation: 0.0,
            last_detected_time: now,
            last_update_time: now,
            state: ContactState::Pending,
            display_time: now,
        };
        contact.update_detection(relative_position, azimuth, elevation, now);
        contact
    }

    /// Overwrite the geometry with a fresh detection and restart the
    /// display timer. Does not change the display state.
    pub fn update_detection(
        &mut self,
        relative_position: DVec3,
        azimuth: f64,
        elevation: f64,
        now: f64,
    ) {
        self.last_detected_time = now;
        self.relative_position = relative_position;
        self.distance = relative_position.length();
        self.azimuth = azimuth;
        self.elevation = elevation;
        self.display_time = now + display_delay(self.distance);
    }

    pub fn target(&self) -> Entity {
        self.target
    }

    pub fn relative_position(&self) -> DVec3 {
        self.relative_position
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn last_detected_time(&self) -> f64 {
        self.last_detected_time
    }

    pub fn last_update_time(&self) -> f64 {
        self.last_update_time
    }

    pub fn display_time(&self) -> f64 {
        self.display_time
    }

    pub fn state(&self) -> ContactState {
        self.state
    }

    pub fn is_displayable(&self) -> bool {
        self.state == ContactState::Displayable
    }

    pub fn should_display(&self, now: f64) -> bool {
        now >= self.display_time
    }

    /// Promote to `Displayable`. Returns true on the transition.
    pub fn mark_displayable(&mut self) -> bool {
        let promoted = self.state == ContactState::Pending;
        self.state = ContactState::Displayable;
        promoted
    }

    pub fn mark_updated(&mut self, now: f64) {
        self.last_update_time = now;
    }

    /// Whether the per-contact refresh timer has run out.
    pub fn should_update(&self, now: f64, update_interval: f64) -> bool {
        now - self.last_update_time >= update_interval - TIMER_TOLERANCE_SECS
    }

    /// Not detected within the contact memory window.
    pub fn is_stale(&self, now: f64) -> bool {
        now - self.last_detected_time > CONTACT_MEMORY_SECS
    }
}
