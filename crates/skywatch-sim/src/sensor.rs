//! Per-entity radar node.
//!
//! A `SensorComponent` is attached to a host entity and owns the contact
//! table for every target it has detected. Cross-entity detection is driven
//! by the `CoverageSystem`; the sensor's own repeating task keeps contacts
//! fresh, promotes them for display and expires them.
//!
//! The host's position and orientation live in separate components, so the
//! geometry helpers take the host `Pose` explicitly.

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec3;
use hecs::{Entity, World};
use tracing::{debug, info, warn};

use skywatch_core::config::{ConfigError, SensorConfig};
use skywatch_core::constants::{LOS_EPSILON, MIN_DETECTION_DISTANCE};
use skywatch_core::enums::{ExpiryReason, FieldOfView, RadarMode, SensorAction};
use skywatch_core::events::RadarEvent;
use skywatch_core::geometry;
use skywatch_core::types::{Pose, Position};

use crate::collaborators::OcclusionTracer;
use crate::contact::Contact;
use crate::query::entity_id;
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::systems::coverage::CoverageSystem;

/// Last radar paint received by a detect-capable sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Paint {
    /// Bearing of this sensor as seen from the emitter (degrees).
    pub angle: f64,
    pub strength: f64,
    /// IFF key of the emitting sensor.
    pub iff_key: i32,
}

#[derive(Debug)]
pub struct SensorComponent {
    owner: Entity,
    config: SensorConfig,
    effective_threshold: f64,
    current_update_interval: f64,
    emitting: bool,
    iff_key: i32,
    painted: bool,
    last_paint: Paint,
    /// Targets detected during the most recent coverage pass.
    detected_entities: BTreeSet<Entity>,
    contacts: BTreeMap<Entity, Contact>,
    refresh_task: Option<TaskHandle>,
}

impl SensorComponent {
    /// Build a sensor for `owner`. The threshold is fixed here.
    pub fn new(
        owner: Entity,
        config: SensorConfig,
        events: &mut Vec<RadarEvent>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut sensor = Self {
            owner,
            effective_threshold: config.base_detection_threshold,
            current_update_interval: config.update_interval_for(config.field_of_view),
            emitting: false,
            iff_key: config.iff_key,
            painted: false,
            last_paint: Paint::default(),
            detected_entities: BTreeSet::new(),
            contacts: BTreeMap::new(),
            refresh_task: None,
            config,
        };
        if sensor.config.auto_calculate_threshold {
            sensor.compute_effective_threshold(events);
        }
        info!(
            sensor = sensor.id(),
            mode = ?sensor.config.mode,
            threshold = sensor.effective_threshold,
            "radar sensor initialized"
        );
        Ok(sensor)
    }

    /// Register with the coverage system and start the refresh task.
    pub fn activate(
        &mut self,
        coverage: &mut CoverageSystem,
        scheduler: &mut Scheduler,
        now: f64,
        events: &mut Vec<RadarEvent>,
    ) {
        coverage.register_sensor(self.owner);
        self.reschedule(scheduler, now, events);
    }

    /// Cancel the refresh task and leave the coverage system.
    pub fn deactivate(&mut self, coverage: &mut CoverageSystem, scheduler: &mut Scheduler) {
        if let Some(handle) = self.refresh_task.take() {
            scheduler.cancel(handle);
        }
        coverage.unregister_sensor(self.owner);
        debug!(sensor = self.id(), "radar sensor deactivated");
    }

    fn reschedule(&mut self, scheduler: &mut Scheduler, now: f64, events: &mut Vec<RadarEvent>) {
        if let Some(handle) = self.refresh_task.take() {
            scheduler.cancel(handle);
        }
        let handle = scheduler.schedule_repeating(
            Task::RefreshContacts(self.owner),
            self.current_update_interval,
            now,
        );
        self.refresh_task = Some(handle);
        debug!(
            sensor = self.id(),
            interval_secs = self.current_update_interval,
            "radar update interval set"
        );
        events.push(RadarEvent::UpdateIntervalChanged {
            sensor: self.id(),
            fov_degrees: self.config.field_of_view.into(),
            interval_secs: self.current_update_interval,
        });
    }

    fn id(&self) -> u64 {
        entity_id(self.owner)
    }

    // ---- Configuration ----

    pub fn owner(&self) -> Entity {
        self.owner
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn mode(&self) -> RadarMode {
        self.config.mode
    }

    pub fn max_range(&self) -> f64 {
        self.config.max_range
    }

    pub fn effective_detection_threshold(&self) -> f64 {
        self.effective_threshold
    }

    pub fn field_of_view(&self) -> FieldOfView {
        self.config.field_of_view
    }

    pub fn current_update_interval(&self) -> f64 {
        self.current_update_interval
    }

    pub fn refresh_task(&self) -> Option<TaskHandle> {
        self.refresh_task
    }

    /// Derive the threshold so a target exactly at the detection range
    /// returns a signal equal to it.
    pub fn compute_effective_threshold(&mut self, events: &mut Vec<RadarEvent>) -> f64 {
        self.effective_threshold = self.config.auto_threshold();
        info!(
            sensor = self.id(),
            threshold = self.effective_threshold,
            max_range = self.config.max_range,
            detection_range = self.config.detection_range(),
            radar_strength = self.config.radar_strength,
            "auto-calculated detection threshold"
        );
        events.push(RadarEvent::ThresholdComputed {
            sensor: self.id(),
            threshold: self.effective_threshold,
            max_range: self.config.max_range,
            detection_range: self.config.detection_range(),
            radar_strength: self.config.radar_strength,
        });
        self.effective_threshold
    }

    /// Change the field of view. The refresh task is replaced with one at
    /// the new interval. Returns false if the value was unchanged.
    pub fn set_field_of_view(
        &mut self,
        fov: FieldOfView,
        scheduler: &mut Scheduler,
        now: f64,
        events: &mut Vec<RadarEvent>,
    ) -> bool {
        if self.config.field_of_view == fov {
            return false;
        }
        self.config.field_of_view = fov;
        self.current_update_interval = self.config.update_interval_for(fov);
        info!(sensor = self.id(), fov_degrees = fov.degrees(), "radar field of view changed");
        if self.refresh_task.is_some() {
            self.reschedule(scheduler, now, events);
        }
        true
    }

    // ---- Capabilities ----

    pub fn can_emit(&self) -> bool {
        self.config.mode.can_emit()
    }

    pub fn can_detect(&self) -> bool {
        self.config.mode.can_detect()
    }

    /// Switch emission. Refused for sensors that cannot emit.
    /// Returns whether the request took effect.
    pub fn set_emitting(&mut self, emitting: bool, events: &mut Vec<RadarEvent>) -> bool {
        if !self.can_emit() {
            self.reject(SensorAction::SetEmitting, events);
            return false;
        }
        self.emitting = emitting;
        info!(sensor = self.id(), emitting, "radar emission set");
        events.push(RadarEvent::EmissionChanged {
            sensor: self.id(),
            emitting,
        });
        true
    }

    pub fn is_emitting(&self) -> bool {
        self.emitting && self.can_emit()
    }

    pub fn set_iff_key(&mut self, key: i32) {
        self.iff_key = key;
    }

    pub fn iff_key(&self) -> i32 {
        self.iff_key
    }

    /// Record (or clear) a paint from another radar. Refused for sensors
    /// that cannot detect. Returns whether the request took effect.
    pub fn set_painted(
        &mut self,
        is_painted: bool,
        angle: f64,
        strength: f64,
        iff_key: i32,
        events: &mut Vec<RadarEvent>,
    ) -> bool {
        if !self.can_detect() {
            self.reject(SensorAction::SetPainted, events);
            return false;
        }
        self.painted = is_painted;
        if is_painted {
            self.last_paint = Paint {
                angle,
                strength,
                iff_key,
            };
            debug!(sensor = self.id(), angle, strength, iff_key, "painted by radar");
            events.push(RadarEvent::Painted {
                sensor: self.id(),
                angle,
                strength,
                iff_key,
            });
        } else {
            debug!(sensor = self.id(), "no longer painted by radar");
            events.push(RadarEvent::PaintCleared { sensor: self.id() });
        }
        true
    }

    /// The current paint, if painted.
    pub fn paint(&self) -> Option<Paint> {
        self.painted.then_some(self.last_paint)
    }

    pub fn is_painted(&self) -> bool {
        self.painted
    }

    fn reject(&self, action: SensorAction, events: &mut Vec<RadarEvent>) {
        warn!(sensor = self.id(), ?action, mode = ?self.config.mode, "sensor action rejected");
        events.push(RadarEvent::ActionRejected {
            sensor: self.id(),
            action,
            mode: self.config.mode,
        });
    }

    // ---- Geometry ----

    /// Azimuth of `relative` from the host's forward axis, in [0, 360).
    pub fn bearing_of(&self, own: &Pose, relative: DVec3) -> f64 {
        geometry::bearing_of(&own.orientation, relative)
    }

    /// Elevation of `relative` above the horizontal plane, in degrees.
    pub fn elevation_of(&self, relative: DVec3) -> f64 {
        geometry::elevation_of(relative)
    }

    pub fn is_in_field_of_view(&self, own: &Pose, target: &Position) -> bool {
        let off_boresight =
            geometry::angle_off_boresight(&own.orientation, own.position.vector_to(target));
        off_boresight <= self.config.field_of_view.half_angle_degrees()
    }

    /// Bearing of `target` relative to the host's orientation.
    pub fn relative_angle_to(&self, own: &Pose, target: &Position) -> f64 {
        geometry::relative_angle(own, target)
    }

    /// Bearing of the host relative to `target`'s orientation.
    pub fn relative_angle_from(&self, own: &Position, target: &Pose) -> f64 {
        geometry::relative_angle(target, own)
    }

    /// Inverse-square signal strength at `distance`.
    pub fn detection_strength(&self, distance: f64) -> f64 {
        let distance = if distance < MIN_DETECTION_DISTANCE {
            debug!(sensor = self.id(), distance, "clamping very small detection distance");
            MIN_DETECTION_DISTANCE
        } else {
            distance
        };
        self.config.radar_strength / (distance * distance)
    }

    /// Whether a trace from the host to `target` is clear. A trace that
    /// stops just short (for instance on the target's own hull) still counts.
    pub fn line_of_sight_clear(
        &self,
        world: &World,
        tracer: &dyn OcclusionTracer,
        own: &Position,
        target: &Position,
    ) -> bool {
        let distance = own.range_to(target);
        let fraction = tracer
            .trace_clear(world, own, target, self.owner)
            .clamp(0.0, 1.0);
        let clear = fraction >= 1.0 - LOS_EPSILON || distance * (1.0 - fraction) < LOS_EPSILON;
        if !clear {
            debug!(
                sensor = self.id(),
                obstructed_at = fraction,
                "line of sight obstructed"
            );
        }
        clear
    }

    // ---- Contacts ----

    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values()
    }

    pub fn contact(&self, target: Entity) -> Option<&Contact> {
        self.contacts.get(&target)
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Contacts past their display time.
    pub fn displayable_contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values().filter(|c| c.is_displayable())
    }

    pub fn detected_entities(&self) -> &BTreeSet<Entity> {
        &self.detected_entities
    }

    /// Forget the previous coverage pass's detections.
    pub fn begin_coverage_pass(&mut self) {
        self.detected_entities.clear();
    }

    /// Create or refresh the contact for `target`. Returns true for a new
    /// contact.
    pub fn record_detection(
        &mut self,
        target: Entity,
        relative: DVec3,
        own: &Pose,
        now: f64,
        events: &mut Vec<RadarEvent>,
    ) -> bool {
        let azimuth = self.bearing_of(own, relative);
        let elevation = self.elevation_of(relative);
        self.detected_entities.insert(target);

        if let Some(contact) = self.contacts.get_mut(&target) {
            contact.update_detection(relative, azimuth, elevation, now);
            return false;
        }

        let contact = Contact::new(target, relative, azimuth, elevation, now);
        debug!(
            sensor = self.id(),
            target = entity_id(target),
            azimuth,
            distance = contact.distance(),
            "contact acquired"
        );
        events.push(RadarEvent::ContactAcquired {
            sensor: self.id(),
            target: entity_id(target),
            azimuth,
            elevation,
            distance: contact.distance(),
        });
        self.contacts.insert(target, contact);
        true
    }

    /// Periodic refresh of the contact table.
    ///
    /// Stale contacts and contacts whose target can no longer be resolved
    /// are removed. Contacts still inside the field of view are promoted
    /// once their display time has passed, and have their geometry
    /// refreshed when their own update timer runs out.
    pub fn refresh_contacts<F>(
        &mut self,
        own: &Pose,
        now: f64,
        locate: F,
        events: &mut Vec<RadarEvent>,
    ) where
        F: Fn(Entity) -> Option<Position>,
    {
        let sensor = self.id();
        let half_fov = self.config.field_of_view.half_angle_degrees();
        let update_interval = self.current_update_interval;
        let mut expired = Vec::new();

        for (&target, contact) in self.contacts.iter_mut() {
            if contact.is_stale(now) {
                expired.push((target, ExpiryReason::Stale));
                continue;
            }
            let Some(position) = locate(target) else {
                expired.push((target, ExpiryReason::TargetLost));
                continue;
            };

            let relative = own.position.vector_to(&position);
            if geometry::angle_off_boresight(&own.orientation, relative) > half_fov {
                continue;
            }

            if !contact.is_displayable() && contact.should_display(now) {
                contact.mark_displayable();
                debug!(sensor, target = entity_id(target), "contact displayable");
                events.push(RadarEvent::ContactDisplayable {
                    sensor,
                    target: entity_id(target),
                });
            }

            if contact.should_update(now, update_interval) {
                let azimuth = geometry::bearing_of(&own.orientation, relative);
                let elevation = geometry::elevation_of(relative);
                contact.update_detection(relative, azimuth, elevation, now);
                contact.mark_updated(now);
            }
        }

        for (target, reason) in expired {
            self.contacts.remove(&target);
            self.detected_entities.remove(&target);
            debug!(sensor, target = entity_id(target), ?reason, "contact expired");
            events.push(RadarEvent::ContactExpired {
                sensor,
                target: entity_id(target),
                reason,
            });
        }
    }
}
