//! Scenario files: JSON descriptions of a radar world.
//!
//! A scenario lists entities (vehicles, fixed sites, obstacles), the
//! sensors they carry, optional terrain, and how long to run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use skywatch_core::commands::SensorCommand;
use skywatch_core::components::CollisionRadius;
use skywatch_core::config::SensorConfig;
use skywatch_core::types::{Orientation, Position, Velocity};
use skywatch_terrain::TerrainGrid;

use crate::collaborators::WorldTracer;
use crate::engine::{EngineConfig, EngineError, RadarEngine};
use crate::query::entity_id;
use crate::world_setup;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entity `{name}`: {source}")]
    Sensor {
        name: String,
        #[source]
        source: EngineError,
    },
    #[error("failed to spawn entity `{name}`: {source}")]
    Spawn {
        name: String,
        #[source]
        source: hecs::NoSuchEntity,
    },
    #[error("terrain grid dimensions do not match its elevation data")]
    InvalidTerrain,
    #[error("scenario duration must be positive, got {0}")]
    InvalidDuration(f64),
}

fn default_duration() -> f64 {
    60.0
}

fn default_true() -> bool {
    true
}

/// One entity in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub velocity: Velocity,
    /// Vehicles are candidate targets; sites are not.
    #[serde(default = "default_true")]
    pub vehicle: bool,
    /// Bounding sphere radius for line-of-sight occlusion.
    #[serde(default)]
    pub collision_radius: Option<f64>,
    #[serde(default)]
    pub sensor: Option<SensorConfig>,
    /// Switch the sensor on at the first tick.
    #[serde(default)]
    pub emitting: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub terrain: Option<TerrainGrid>,
    #[serde(default = "default_duration")]
    pub duration_secs: f64,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.duration_secs > 0.0) {
            return Err(ScenarioError::InvalidDuration(self.duration_secs));
        }
        if let Some(terrain) = &self.terrain {
            if !terrain.is_consistent() {
                return Err(ScenarioError::InvalidTerrain);
            }
        }
        Ok(())
    }

    /// Populate a fresh engine. Emission requests are queued and take
    /// effect on the first tick.
    pub fn build(&self) -> Result<RadarEngine, ScenarioError> {
        self.validate()?;
        let mut engine = RadarEngine::new(self.engine.clone());
        engine.set_occlusion_tracer(Box::new(WorldTracer::new(self.terrain.clone())));

        for entry in &self.entities {
            let world = engine.world_mut();
            let entity = if entry.vehicle {
                world_setup::spawn_vehicle(world, &entry.name, entry.position, entry.orientation, entry.velocity)
            } else {
                world_setup::spawn_site(world, &entry.name, entry.position, entry.orientation)
            };
            if let Some(radius) = entry.collision_radius {
                world
                    .insert_one(entity, CollisionRadius { meters: radius })
                    .map_err(|source| ScenarioError::Spawn {
                        name: entry.name.clone(),
                        source,
                    })?;
            }

            if let Some(config) = &entry.sensor {
                engine
                    .attach_sensor(entity, config.clone())
                    .map_err(|source| ScenarioError::Sensor {
                        name: entry.name.clone(),
                        source,
                    })?;
                if entry.emitting {
                    engine.queue_command(SensorCommand::SetEmitting {
                        sensor: entity_id(entity),
                        emitting: true,
                    });
                }
            }
        }

        info!(
            scenario = %self.name,
            entities = self.entities.len(),
            sensors = engine.coverage().sensor_count(),
            terrain = self.terrain.is_some(),
            "scenario loaded"
        );
        Ok(engine)
    }
}
