//! Narrow interfaces to the host simulation, with default implementations.

use hecs::{Entity, World};

use skywatch_core::components::{CollisionRadius, Destroyed, Vehicle};
use skywatch_core::types::Position;
use skywatch_terrain::{trace_fraction, TerrainGrid};

use crate::query::is_live;

/// Supplies the entities a coverage pass should consider as targets.
pub trait TargetEnumerator {
    /// Live candidate targets. Must not include destroyed entities.
    fn candidate_targets(&self, world: &World) -> Vec<Entity>;
}

/// Traces a straight segment through the world.
///
/// Implementations may read any component except `SensorComponent`, which
/// is mutably borrowed by the coverage pass while tracing.
pub trait OcclusionTracer {
    /// Fraction of `origin -> destination` travelled before the first
    /// obstruction, in [0, 1]. `exclude` never obstructs.
    fn trace_clear(
        &self,
        world: &World,
        origin: &Position,
        destination: &Position,
        exclude: Entity,
    ) -> f64;
}

/// Every live entity tagged `Vehicle`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VehicleEnumerator;

impl TargetEnumerator for VehicleEnumerator {
    fn candidate_targets(&self, world: &World) -> Vec<Entity> {
        world
            .query::<&Vehicle>()
            .without::<&Destroyed>()
            .iter()
            .map(|(entity, _)| entity)
            .collect()
    }
}

/// Nothing ever obstructs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSky;

impl OcclusionTracer for OpenSky {
    fn trace_clear(&self, _: &World, _: &Position, _: &Position, _: Entity) -> f64 {
        1.0
    }
}

impl OcclusionTracer for TerrainGrid {
    fn trace_clear(
        &self,
        _world: &World,
        origin: &Position,
        destination: &Position,
        _exclude: Entity,
    ) -> f64 {
        trace_fraction(self, origin, destination)
    }
}

/// Terrain (if any) plus the bounding spheres of every live entity with a
/// `CollisionRadius`. Spheres enclosing the destination never obstruct, so
/// a target is not hidden by its own hull.
#[derive(Debug, Clone, Default)]
pub struct WorldTracer {
    pub terrain: Option<TerrainGrid>,
}

impl WorldTracer {
    pub fn new(terrain: Option<TerrainGrid>) -> Self {
        Self { terrain }
    }
}

impl OcclusionTracer for WorldTracer {
    fn trace_clear(
        &self,
        world: &World,
        origin: &Position,
        destination: &Position,
        exclude: Entity,
    ) -> f64 {
        let mut fraction = self
            .terrain
            .as_ref()
            .map_or(1.0, |grid| trace_fraction(grid, origin, destination));

        let segment = origin.vector_to(destination);
        let length = segment.length();
        if length == 0.0 {
            return fraction;
        }
        let direction = segment / length;

        for (entity, (center, radius)) in world.query::<(&Position, &CollisionRadius)>().iter() {
            if entity == exclude || !is_live(world, entity) {
                continue;
            }
            let radius_sq = radius.meters * radius.meters;
            // The target's own hull encloses the destination.
            if center.vector_to(destination).length_squared() <= radius_sq {
                continue;
            }
            // Ray/sphere entry point along the segment.
            let oc = center.vector_to(origin);
            let b = oc.dot(direction);
            let c = oc.length_squared() - radius_sq;
            if c <= 0.0 {
                return 0.0; // Origin is inside the obstacle
            }
            let discriminant = b * b - c;
            if discriminant < 0.0 {
                continue;
            }
            let t = -b - discriminant.sqrt();
            if (0.0..=length).contains(&t) {
                fraction = fraction.min(t / length);
            }
        }

        fraction
    }
}
