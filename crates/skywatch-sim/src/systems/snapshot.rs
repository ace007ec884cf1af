//! Snapshot system: queries the ECS world and builds a CoverageSnapshot.
//!
//! This system is read-only. It never modifies the world.

use hecs::World;

use skywatch_core::components::Name;
use skywatch_core::events::RadarEvent;
use skywatch_core::state::*;
use skywatch_core::types::{Position, SimTime};

use crate::query::entity_id;
use crate::sensor::SensorComponent;

/// Build a CoverageSnapshot from the current world state.
pub fn build_snapshot(world: &World, time: &SimTime, events: Vec<RadarEvent>) -> CoverageSnapshot {
    let mut sensors: Vec<SensorView> = world
        .query::<(&SensorComponent, &Position, Option<&Name>)>()
        .iter()
        .map(|(entity, (sensor, pos, name))| build_sensor(entity_id(entity), sensor, pos, name))
        .collect();
    sensors.sort_by_key(|s| s.entity);

    CoverageSnapshot {
        time: *time,
        sensors,
        events,
    }
}

fn build_sensor(entity: u64, sensor: &SensorComponent, pos: &Position, name: Option<&Name>) -> SensorView {
    let contacts = sensor
        .displayable_contacts()
        .map(|c| ContactView {
            target: entity_id(c.target()),
            distance: c.distance(),
            azimuth: c.azimuth(),
            elevation: c.elevation(),
            last_detected_secs: c.last_detected_time(),
        })
        .collect();

    SensorView {
        entity,
        name: name.map(|n| n.0.clone()),
        position: *pos,
        mode: sensor.mode(),
        fov_degrees: sensor.field_of_view().into(),
        emitting: sensor.is_emitting(),
        iff_key: sensor.iff_key(),
        painted: sensor.paint().map(|p| PaintView {
            angle: p.angle,
            strength: p.strength,
            iff_key: p.iff_key,
        }),
        contacts,
    }
}
