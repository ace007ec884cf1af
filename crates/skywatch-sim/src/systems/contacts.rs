//! Per-sensor contact refresh, run from each sensor's own repeating task.

use hecs::{Entity, World};

use skywatch_core::events::RadarEvent;

use crate::query::{live_pose, live_position};
use crate::sensor::SensorComponent;

/// Refresh one sensor's contact table against current target positions.
///
/// Returns false if the sensor no longer exists, so the caller can drop
/// its task. A sensor on a destroyed host keeps its task but does nothing.
pub fn refresh(world: &World, sensor_entity: Entity, now: f64, events: &mut Vec<RadarEvent>) -> bool {
    let Ok(mut sensor) = world.get::<&mut SensorComponent>(sensor_entity) else {
        return false;
    };
    let Some(own) = live_pose(world, sensor_entity) else {
        return true;
    };
    sensor.refresh_contacts(&own, now, |target| live_position(world, target), events);
    true
}
