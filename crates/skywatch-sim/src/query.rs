//! Liveness-checked reads of entity state.
//!
//! Entity handles are generation-checked by hecs, so a despawned entity
//! simply fails to resolve. Entities tagged `Destroyed` are treated the
//! same way.

use hecs::{Entity, World};

use skywatch_core::components::Destroyed;
use skywatch_core::types::{Orientation, Pose, Position};

/// Whether the entity exists and has not been destroyed.
pub fn is_live(world: &World, entity: Entity) -> bool {
    world.contains(entity) && world.get::<&Destroyed>(entity).is_err()
}

/// Position of a live entity.
pub fn live_position(world: &World, entity: Entity) -> Option<Position> {
    if !is_live(world, entity) {
        return None;
    }
    world.get::<&Position>(entity).ok().map(|p| *p)
}

/// Position and orientation of a live entity. Entities without an
/// `Orientation` face North.
pub fn live_pose(world: &World, entity: Entity) -> Option<Pose> {
    let position = live_position(world, entity)?;
    let orientation = world
        .get::<&Orientation>(entity)
        .map(|o| *o)
        .unwrap_or_default();
    Some(Pose::new(position, orientation))
}

/// Stable numeric id for events and snapshots.
pub fn entity_id(entity: Entity) -> u64 {
    entity.to_bits().get()
}
