//! Kinematic integration system.
//!
//! Updates Position from Velocity each tick: position += velocity * dt.
//! Destroyed entities stay where they are.

use hecs::World;

use skywatch_core::components::Destroyed;
use skywatch_core::constants::DT;
use skywatch_core::types::{Position, Velocity};

/// Run kinematic integration for all live entities with Position + Velocity.
pub fn run(world: &mut World) {
    for (_entity, (pos, vel)) in world
        .query_mut::<(&mut Position, &Velocity)>()
        .without::<&Destroyed>()
    {
        pos.x += vel.x * DT;
        pos.y += vel.y * DT;
        pos.z += vel.z * DT;
    }
}
