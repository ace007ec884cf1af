//! Radar engine: owns the world and drives both detection loops.
//!
//! `RadarEngine` owns the hecs ECS world, the cooperative scheduler and the
//! world's `CoverageSystem`. Each tick it applies queued commands, moves
//! entities, advances simulated time and runs every task that came due:
//! coverage passes at a fixed cadence and each sensor's contact refresh at
//! its field-of-view-derived cadence. Completely headless, so whole runs
//! are deterministic and testable.

use std::collections::VecDeque;

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use skywatch_core::commands::SensorCommand;
use skywatch_core::components::Name;
use skywatch_core::config::{ConfigError, SensorConfig};
use skywatch_core::constants::{COVERAGE_UPDATE_INTERVAL_SECS, DT};
use skywatch_core::events::RadarEvent;
use skywatch_core::state::CoverageSnapshot;
use skywatch_core::types::SimTime;

use crate::collaborators::{OcclusionTracer, OpenSky, TargetEnumerator, VehicleEnumerator};
use crate::scheduler::{Scheduler, Task};
use crate::sensor::SensorComponent;
use crate::systems;
use crate::systems::coverage::CoverageSystem;

/// Errors from engine operations on entities.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("entity {0:?} does not exist")]
    NoSuchEntity(Entity),
    #[error("entity {0:?} already hosts a radar sensor")]
    SensorAlreadyAttached(Entity),
    #[error("invalid sensor configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration for starting a new engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between coverage passes.
    pub coverage_interval_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            coverage_interval_secs: COVERAGE_UPDATE_INTERVAL_SECS,
        }
    }
}

/// The radar engine. Owns the ECS world and all scheduling state.
pub struct RadarEngine {
    world: World,
    time: SimTime,
    scheduler: Scheduler,
    coverage: CoverageSystem,
    enumerator: Option<Box<dyn TargetEnumerator>>,
    tracer: Box<dyn OcclusionTracer>,
    command_queue: VecDeque<SensorCommand>,
    events: Vec<RadarEvent>,
}

impl RadarEngine {
    /// Create an engine with the coverage task already running. Targets
    /// default to every `Vehicle`; nothing occludes until a tracer is set.
    pub fn new(config: EngineConfig) -> Self {
        let mut scheduler = Scheduler::new();
        let mut coverage = CoverageSystem::new(config.coverage_interval_secs);
        coverage.start(&mut scheduler, 0.0);
        Self {
            world: World::new(),
            time: SimTime::default(),
            scheduler,
            coverage,
            enumerator: Some(Box::new(VehicleEnumerator)),
            tracer: Box::new(OpenSky),
            command_queue: VecDeque::new(),
            events: Vec::new(),
        }
    }

    /// Replace the target source. `None` makes every coverage pass empty.
    pub fn set_target_enumerator(&mut self, enumerator: Option<Box<dyn TargetEnumerator>>) {
        self.enumerator = enumerator;
    }

    pub fn set_occlusion_tracer(&mut self, tracer: Box<dyn OcclusionTracer>) {
        self.tracer = tracer;
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for the host (spawning, moving, destroying).
    /// Use `attach_sensor` and `despawn` for anything carrying a sensor.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn now(&self) -> f64 {
        self.time.now_secs()
    }

    pub fn coverage(&self) -> &CoverageSystem {
        &self.coverage
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Attach a radar sensor to an existing entity, register it for
    /// coverage and start its refresh task.
    pub fn attach_sensor(&mut self, entity: Entity, config: SensorConfig) -> Result<(), EngineError> {
        if !self.world.contains(entity) {
            return Err(EngineError::NoSuchEntity(entity));
        }
        if self.world.get::<&SensorComponent>(entity).is_ok() {
            return Err(EngineError::SensorAlreadyAttached(entity));
        }
        let now = self.now();
        let mut sensor = SensorComponent::new(entity, config, &mut self.events)?;
        sensor.activate(&mut self.coverage, &mut self.scheduler, now, &mut self.events);
        self.world
            .insert_one(entity, sensor)
            .map_err(|_| EngineError::NoSuchEntity(entity))
    }

    /// First entity carrying the given `Name`, lowest handle first.
    pub fn entity_named(&self, name: &str) -> Option<Entity> {
        self.world
            .query::<&Name>()
            .iter()
            .filter(|(_, n)| n.0 == name)
            .map(|(entity, _)| entity)
            .min()
    }

    /// Read access to an entity's sensor.
    pub fn sensor(&self, entity: Entity) -> Option<hecs::Ref<'_, SensorComponent>> {
        self.world.get::<&SensorComponent>(entity).ok()
    }

    /// Tear an entity down. Its sensor, if any, is unregistered and its
    /// refresh task cancelled first.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if let Ok(mut sensor) = self.world.get::<&mut SensorComponent>(entity) {
            sensor.deactivate(&mut self.coverage, &mut self.scheduler);
        }
        self.world.despawn(entity).is_ok()
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SensorCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SensorCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> CoverageSnapshot {
        self.process_commands();
        systems::movement::run(&mut self.world);
        self.time.advance();
        self.run_due_tasks();

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, events)
    }

    /// Tick for `secs` of simulated time and return every event emitted.
    pub fn run_for(&mut self, secs: f64) -> Vec<RadarEvent> {
        let ticks = (secs / DT).round() as u64;
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.tick().events);
        }
        events
    }

    /// Current state without advancing time. Pending events stay queued.
    pub fn snapshot(&self) -> CoverageSnapshot {
        systems::snapshot::build_snapshot(&self.world, &self.time, Vec::new())
    }

    /// Stop the coverage task and deactivate every sensor.
    pub fn shutdown(&mut self) {
        self.coverage.stop(&mut self.scheduler);
        let sensors: Vec<Entity> = self.coverage.sensors().collect();
        for entity in sensors {
            if let Ok(mut sensor) = self.world.get::<&mut SensorComponent>(entity) {
                sensor.deactivate(&mut self.coverage, &mut self.scheduler);
            }
        }
        debug!(remaining_tasks = self.scheduler.len(), "radar engine shut down");
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: SensorCommand) {
        let id = command.sensor();
        let Some(entity) = Entity::from_bits(id) else {
            warn!(sensor = id, "command for invalid entity handle");
            return;
        };
        let Ok(mut sensor) = self.world.get::<&mut SensorComponent>(entity) else {
            warn!(sensor = id, "command for entity without a radar sensor");
            return;
        };
        let now = self.time.now_secs();

        match command {
            SensorCommand::SetEmitting { emitting, .. } => {
                sensor.set_emitting(emitting, &mut self.events);
            }
            SensorCommand::SetFieldOfView { fov, .. } => {
                sensor.set_field_of_view(fov, &mut self.scheduler, now, &mut self.events);
            }
            SensorCommand::SetIffKey { key, .. } => {
                sensor.set_iff_key(key);
            }
            SensorCommand::ClearPaint { .. } => {
                sensor.set_painted(false, 0.0, 0.0, -1, &mut self.events);
            }
        }
    }

    /// Run every scheduled task due at the current time, earliest first.
    fn run_due_tasks(&mut self) {
        let now = self.time.now_secs();
        while let Some((handle, task)) = self.scheduler.pop_due(now) {
            match task {
                Task::Coverage => {
                    self.coverage.tick(
                        &self.world,
                        self.enumerator.as_deref(),
                        self.tracer.as_ref(),
                        now,
                        &mut self.events,
                    );
                }
                Task::RefreshContacts(entity) => {
                    if !systems::contacts::refresh(&self.world, entity, now, &mut self.events) {
                        // Host vanished without going through `despawn`.
                        self.scheduler.cancel(handle);
                        self.coverage.unregister_sensor(entity);
                    }
                }
            }
        }
    }
}

impl Default for RadarEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
