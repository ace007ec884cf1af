//! Entity spawn factories for setting up the simulation world.
//!
//! Sensors are attached separately through `RadarEngine::attach_sensor`,
//! which also registers them for coverage and schedules their refresh.

use hecs::{Entity, World};

use skywatch_core::components::*;
use skywatch_core::types::{Orientation, Position, Velocity};

/// Spawn a vehicle: a candidate radar target that may also host a sensor.
pub fn spawn_vehicle(
    world: &mut World,
    name: &str,
    position: Position,
    orientation: Orientation,
    velocity: Velocity,
) -> Entity {
    world.spawn((
        Vehicle,
        Name(name.to_string()),
        position,
        orientation,
        velocity,
    ))
}

/// Spawn a fixed site (not a target) such as a ground radar station.
pub fn spawn_site(world: &mut World, name: &str, position: Position, orientation: Orientation) -> Entity {
    world.spawn((Name(name.to_string()), position, orientation))
}

/// Spawn a static obstacle that blocks line of sight.
pub fn spawn_obstacle(world: &mut World, position: Position, radius_m: f64) -> Entity {
    world.spawn((position, CollisionRadius { meters: radius_m }))
}

/// Tag an entity as destroyed. It stops being a candidate target and any
/// contact on it is dropped at the holder's next refresh.
pub fn mark_destroyed(world: &mut World, entity: Entity) -> bool {
    world.insert_one(entity, Destroyed).is_ok()
}
