//! Radar coverage system.
//!
//! On every coverage tick, matches each emitting sensor against each
//! candidate target: field of view, then range and line of sight, then the
//! inverse-square strength threshold. Hits update the sensor's contact
//! table and paint the target if it carries a detect-capable sensor.
//!
//! Every (sensor, target) pair is evaluated independently, so the order of
//! sensors and candidates does not affect the outcome.

use std::collections::BTreeSet;

use hecs::{Entity, World};
use tracing::{debug, trace};

use skywatch_core::constants::MIN_DETECTION_DISTANCE;
use skywatch_core::events::RadarEvent;

use crate::collaborators::{OcclusionTracer, TargetEnumerator};
use crate::query::{is_live, live_pose, live_position};
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::sensor::SensorComponent;

/// Paint notification collected during a pass and delivered afterwards.
#[derive(Debug, Clone, Copy)]
struct PendingPaint {
    target: Entity,
    angle: f64,
    strength: f64,
    iff_key: i32,
}

/// Registry of participating sensors plus the master coverage task.
/// One per simulated world.
#[derive(Debug)]
pub struct CoverageSystem {
    sensors: BTreeSet<Entity>,
    candidates: Vec<Entity>,
    paints: Vec<PendingPaint>,
    interval_secs: f64,
    task: Option<TaskHandle>,
}

impl CoverageSystem {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            sensors: BTreeSet::new(),
            candidates: Vec::new(),
            paints: Vec::new(),
            interval_secs,
            task: None,
        }
    }

    /// Start the repeating coverage task. No-op if already running.
    pub fn start(&mut self, scheduler: &mut Scheduler, now: f64) {
        if self.task.is_none() {
            self.task = Some(scheduler.schedule_repeating(Task::Coverage, self.interval_secs, now));
            debug!(interval_secs = self.interval_secs, "coverage system started");
        }
    }

    /// Cancel the coverage task.
    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        if let Some(handle) = self.task.take() {
            scheduler.cancel(handle);
            debug!("coverage system stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }

    /// Returns false if the sensor was already registered.
    pub fn register_sensor(&mut self, sensor: Entity) -> bool {
        self.sensors.insert(sensor)
    }

    /// Returns false if the sensor was not registered.
    pub fn unregister_sensor(&mut self, sensor: Entity) -> bool {
        self.sensors.remove(&sensor)
    }

    pub fn is_registered(&self, sensor: Entity) -> bool {
        self.sensors.contains(&sensor)
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    pub fn sensors(&self) -> impl Iterator<Item = Entity> + '_ {
        self.sensors.iter().copied()
    }

    /// Candidate targets used by the most recent pass.
    pub fn candidates(&self) -> &[Entity] {
        &self.candidates
    }

    /// Run one coverage pass. Returns the number of successful detections.
    pub fn tick(
        &mut self,
        world: &World,
        enumerator: Option<&dyn TargetEnumerator>,
        tracer: &dyn OcclusionTracer,
        now: f64,
        events: &mut Vec<RadarEvent>,
    ) -> usize {
        self.refresh_candidates(world, enumerator);
        self.paints.clear();
        let mut detections = 0;

        for &sensor_entity in &self.sensors {
            let Some(own) = live_pose(world, sensor_entity) else {
                continue;
            };
            let Ok(mut sensor) = world.get::<&mut SensorComponent>(sensor_entity) else {
                continue;
            };
            if !sensor.is_emitting() {
                continue;
            }
            sensor.begin_coverage_pass();

            for &target in &self.candidates {
                let Some(target_pos) = live_position(world, target) else {
                    continue;
                };
                let relative = own.position.vector_to(&target_pos);
                let distance = relative.length();

                if distance < MIN_DETECTION_DISTANCE {
                    trace!(distance, "skipping degenerate sensor/target distance");
                    continue;
                }
                if !sensor.is_in_field_of_view(&own, &target_pos) {
                    continue;
                }
                if distance > sensor.max_range()
                    || !sensor.line_of_sight_clear(world, tracer, &own.position, &target_pos)
                {
                    continue;
                }

                let strength = sensor.detection_strength(distance);
                if strength <= sensor.effective_detection_threshold() {
                    continue;
                }

                sensor.record_detection(target, relative, &own, now, events);
                self.paints.push(PendingPaint {
                    target,
                    angle: sensor.relative_angle_to(&own, &target_pos),
                    strength,
                    iff_key: sensor.iff_key(),
                });
                detections += 1;
            }
        }

        // Delivered after the pass so no two sensors are borrowed at once.
        for paint in self.paints.drain(..) {
            notify_detected_entity(world, paint, events);
        }

        debug!(
            sensors = self.sensors.len(),
            candidates = self.candidates.len(),
            detections,
            "coverage pass complete"
        );
        detections
    }

    fn refresh_candidates(&mut self, world: &World, enumerator: Option<&dyn TargetEnumerator>) {
        self.candidates.clear();
        if let Some(enumerator) = enumerator {
            self.candidates.extend(
                enumerator
                    .candidate_targets(world)
                    .into_iter()
                    .filter(|&e| is_live(world, e)),
            );
        }
    }
}

impl Default for CoverageSystem {
    fn default() -> Self {
        Self::new(skywatch_core::constants::COVERAGE_UPDATE_INTERVAL_SECS)
    }
}

/// Paint the target if it hosts a sensor that can detect.
fn notify_detected_entity(world: &World, paint: PendingPaint, events: &mut Vec<RadarEvent>) {
    let Ok(mut receiver) = world.get::<&mut SensorComponent>(paint.target) else {
        return;
    };
    if receiver.can_detect() {
        receiver.set_painted(true, paint.angle, paint.strength, paint.iff_key, events);
    }
}
