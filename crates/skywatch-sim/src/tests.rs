//! Tests for the radar engine: coverage, contact tracking, painting and scheduling.

use hecs::Entity;

use skywatch_core::commands::SensorCommand;
use skywatch_core::components::CollisionRadius;
use skywatch_core::config::SensorConfig;
use skywatch_core::enums::*;
use skywatch_core::events::RadarEvent;
use skywatch_core::types::{Orientation, Position, Velocity};
use skywatch_terrain::TerrainGrid;

use crate::collaborators::WorldTracer;
use crate::engine::RadarEngine;
use crate::query::entity_id;
use crate::scenario::Scenario;
use crate::world_setup;

/// Engine with one emitting radar site at the origin facing north.
fn engine_with_radar(config: SensorConfig) -> (RadarEngine, Entity) {
    let mut engine = RadarEngine::default();
    let radar = world_setup::spawn_site(
        engine.world_mut(),
        "radar",
        Position::default(),
        Orientation::default(),
    );
    engine.attach_sensor(radar, config).unwrap();
    engine.queue_command(SensorCommand::SetEmitting {
        sensor: entity_id(radar),
        emitting: true,
    });
    (engine, radar)
}

fn spawn_target(engine: &mut RadarEngine, name: &str, position: Position) -> Entity {
    world_setup::spawn_vehicle(
        engine.world_mut(),
        name,
        position,
        Orientation::default(),
        Velocity::default(),
    )
}

fn has_contact(engine: &RadarEngine, radar: Entity, target: Entity) -> bool {
    engine.sensor(radar).unwrap().contact(target).is_some()
}

fn move_to(engine: &mut RadarEngine, entity: Entity, position: Position) {
    *engine.world_mut().get::<&mut Position>(entity).unwrap() = position;
}

// ---- Coverage ----

#[test]
fn test_detected_exactly_at_max_range() {
    let (mut engine, radar) = engine_with_radar(SensorConfig {
        auto_calculate_threshold: false,
        // Strength at 100 m is 1e-4.
        base_detection_threshold: 0.99e-4,
        ..Default::default()
    });
    let target = spawn_target(&mut engine, "edge", Position::new(0.0, 100.0, 0.0));

    let events = engine.run_for(1.0);
    assert!(has_contact(&engine, radar, target), "target at max range should be detected");
    assert!(events
        .iter()
        .any(|e| matches!(e, RadarEvent::ContactAcquired { distance, .. } if (*distance - 100.0).abs() < 1e-9)));
}

#[test]
fn test_never_detected_beyond_max_range() {
    let (mut engine, radar) = engine_with_radar(SensorConfig {
        radar_strength: 1e6,
        auto_calculate_threshold: false,
        ..Default::default()
    });
    let target = spawn_target(&mut engine, "far", Position::new(0.0, 101.0, 0.0));

    engine.run_for(3.0);
    assert!(!has_contact(&engine, radar, target));
    assert_eq!(engine.sensor(radar).unwrap().contact_count(), 0);
}

#[test]
fn test_default_threshold_limits_detection_range() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    let near = spawn_target(&mut engine, "near", Position::new(0.0, 74.0, 0.0));
    let far = spawn_target(&mut engine, "far", Position::new(0.0, 76.0, 0.0));

    engine.run_for(1.0);
    assert!(has_contact(&engine, radar, near), "inside the 75 m detection range");
    assert!(!has_contact(&engine, radar, far), "outside the 75 m detection range");
}

#[test]
fn test_field_of_view_excludes_targets_behind() {
    let (mut engine, radar) = engine_with_radar(SensorConfig {
        field_of_view: FieldOfView::Deg30,
        ..Default::default()
    });
    let ahead = spawn_target(&mut engine, "ahead", Position::new(0.0, 50.0, 0.0));
    let behind = spawn_target(&mut engine, "behind", Position::new(0.0, -50.0, 0.0));
    let abeam = spawn_target(&mut engine, "abeam", Position::new(50.0, 0.0, 0.0));

    engine.run_for(2.0);
    assert!(has_contact(&engine, radar, ahead));
    assert!(!has_contact(&engine, radar, behind));
    assert!(!has_contact(&engine, radar, abeam));
}

#[test]
fn test_silent_radar_detects_nothing() {
    let mut engine = RadarEngine::default();
    let radar = world_setup::spawn_site(
        engine.world_mut(),
        "radar",
        Position::default(),
        Orientation::default(),
    );
    engine.attach_sensor(radar, SensorConfig::default()).unwrap();
    spawn_target(&mut engine, "target", Position::new(0.0, 50.0, 0.0));

    engine.run_for(3.0);
    assert_eq!(engine.sensor(radar).unwrap().contact_count(), 0);
}

#[test]
fn test_missing_enumerator_yields_no_candidates() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    spawn_target(&mut engine, "target", Position::new(0.0, 50.0, 0.0));
    engine.set_target_enumerator(None);

    engine.run_for(3.0);
    assert!(engine.coverage().candidates().is_empty());
    assert_eq!(engine.sensor(radar).unwrap().contact_count(), 0);
}

#[test]
fn test_obstacle_blocks_detection() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    engine.set_occlusion_tracer(Box::new(WorldTracer::new(None)));
    let hidden = spawn_target(&mut engine, "hidden", Position::new(0.0, 50.0, 0.0));
    let visible = spawn_target(&mut engine, "visible", Position::new(50.0, 0.0, 0.0));
    world_setup::spawn_obstacle(engine.world_mut(), Position::new(0.0, 25.0, 0.0), 5.0);

    engine.run_for(2.0);
    assert!(!has_contact(&engine, radar, hidden), "obstacle sits between radar and target");
    assert!(has_contact(&engine, radar, visible));
}

#[test]
fn test_target_hull_does_not_hide_target() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    engine.set_occlusion_tracer(Box::new(WorldTracer::new(None)));
    let hulled = spawn_target(&mut engine, "hulled", Position::new(0.0, 40.0, 0.0));
    engine
        .world_mut()
        .insert_one(hulled, CollisionRadius { meters: 2.0 })
        .unwrap();
    // Directly behind the hulled target, so its sphere covers the ray.
    let shadowed = spawn_target(&mut engine, "shadowed", Position::new(0.0, 60.0, 0.0));

    engine.run_for(3.0);
    assert!(has_contact(&engine, radar, hulled), "own hull must not block line of sight");
    assert!(!has_contact(&engine, radar, shadowed), "hull still shadows what lies behind it");
}

#[test]
fn test_terrain_ridge_blocks_detection() {
    let config = SensorConfig {
        max_range: 2000.0,
        auto_calculate_threshold: false,
        base_detection_threshold: 1e-9,
        ..Default::default()
    };
    let mut ridge = TerrainGrid::flat(100, 100, 20.0);
    for r in 48..52 {
        for c in 0..100 {
            if let Some(cell) = ridge.cell_mut(r, c) {
                *cell = 500;
            }
        }
    }

    for (terrain, expect_contact) in [(TerrainGrid::flat(100, 100, 20.0), true), (ridge, false)] {
        let mut engine = RadarEngine::default();
        engine.set_occlusion_tracer(Box::new(terrain));
        let radar = world_setup::spawn_site(
            engine.world_mut(),
            "radar",
            Position::new(0.0, -800.0, 10.0),
            Orientation::default(),
        );
        engine.attach_sensor(radar, config.clone()).unwrap();
        engine.queue_command(SensorCommand::SetEmitting {
            sensor: entity_id(radar),
            emitting: true,
        });
        let target = spawn_target(&mut engine, "target", Position::new(0.0, 800.0, 10.0));

        engine.run_for(2.0);
        assert_eq!(
            has_contact(&engine, radar, target),
            expect_contact,
            "terrain occlusion mismatch (expected contact: {expect_contact})"
        );
    }
}

// ---- Contact lifecycle ----

#[test]
fn test_contact_becomes_displayable_after_delay() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    let target = spawn_target(&mut engine, "target", Position::new(0.0, 50.0, 0.0));

    // First coverage pass at t=1 creates a pending contact.
    let snapshot = {
        engine.run_for(0.95);
        engine.tick()
    };
    assert!(has_contact(&engine, radar, target));
    assert!(snapshot.sensors[0].contacts.is_empty(), "pending contacts are not displayed");

    // The refresh at t=2 promotes it.
    engine.run_for(1.0);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.sensors[0].contacts.len(), 1);
    assert_eq!(snapshot.sensors[0].contacts[0].target, entity_id(target));
}

#[test]
fn test_displayable_never_regresses() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    let target = spawn_target(&mut engine, "target", Position::new(0.0, 50.0, 0.0));

    engine.run_for(2.0);
    assert!(engine.sensor(radar).unwrap().contact(target).unwrap().is_displayable());

    for _ in 0..200 {
        let events = engine.tick().events;
        let sensor = engine.sensor(radar).unwrap();
        assert!(
            sensor.contact(target).unwrap().is_displayable(),
            "contact regressed to pending at t={}",
            engine.now()
        );
        assert!(!events
            .iter()
            .any(|e| matches!(e, RadarEvent::ContactDisplayable { .. })));
    }
}

#[test]
fn test_contact_expires_thirty_seconds_after_leaving_view() {
    let (mut engine, radar) = engine_with_radar(SensorConfig {
        field_of_view: FieldOfView::Deg90,
        ..Default::default()
    });
    let target = spawn_target(&mut engine, "target", Position::new(0.0, 50.0, 0.0));

    // Detected at t=1, last refreshed in view at t=1.5.
    engine.run_for(1.5);
    assert_eq!(engine.sensor(radar).unwrap().displayable_contacts().count(), 1);
    move_to(&mut engine, target, Position::new(0.0, -50.0, 0.0));

    engine.run_for(29.5);
    assert!(has_contact(&engine, radar, target), "still remembered at t=31");
    assert_eq!(engine.sensor(radar).unwrap().displayable_contacts().count(), 1);

    let events = engine.run_for(1.0);
    let sensor = engine.sensor(radar).unwrap();
    assert!(sensor.contact(target).is_none(), "expired after 30 s");
    assert_eq!(sensor.displayable_contacts().count(), 0);
    assert!(events.iter().any(|e| matches!(
        e,
        RadarEvent::ContactExpired {
            reason: ExpiryReason::Stale,
            ..
        }
    )));
}

#[test]
fn test_destroyed_target_is_dropped() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    let target = spawn_target(&mut engine, "target", Position::new(0.0, 50.0, 0.0));

    engine.run_for(1.0);
    assert!(has_contact(&engine, radar, target));

    assert!(world_setup::mark_destroyed(engine.world_mut(), target));
    let events = engine.run_for(1.0);
    assert!(!has_contact(&engine, radar, target));
    assert!(events.iter().any(|e| matches!(
        e,
        RadarEvent::ContactExpired {
            reason: ExpiryReason::TargetLost,
            ..
        }
    )));
}

#[test]
fn test_moving_target_geometry_refreshed() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    let target = world_setup::spawn_vehicle(
        engine.world_mut(),
        "mover",
        Position::new(0.0, 20.0, 0.0),
        Orientation::default(),
        Velocity::new(10.0, 0.0, 0.0),
    );

    engine.run_for(1.0);
    let first = engine.sensor(radar).unwrap().contact(target).unwrap().azimuth();
    engine.run_for(2.0);
    let later = engine.sensor(radar).unwrap().contact(target).unwrap().azimuth();
    assert!(later > first, "target moving east should swing right: {first} -> {later}");

    let pos = *engine.world().get::<&Position>(target).unwrap();
    assert!((pos.x - 30.0).abs() < 1e-6, "moved 10 m/s for 3 s, got {}", pos.x);
}

// ---- Painting ----

fn radar_and_receiver(receiver_mode: RadarMode) -> (RadarEngine, Entity, Entity) {
    let (mut engine, radar) = engine_with_radar(SensorConfig {
        iff_key: 7,
        ..Default::default()
    });
    let receiver = spawn_target(&mut engine, "receiver", Position::new(0.0, 50.0, 0.0));
    engine
        .attach_sensor(
            receiver,
            SensorConfig {
                mode: receiver_mode,
                ..Default::default()
            },
        )
        .unwrap();
    (engine, radar, receiver)
}

#[test]
fn test_paint_carries_emitter_iff() {
    let (mut engine, radar, receiver) = radar_and_receiver(RadarMode::DetectOnly);

    let events = engine.run_for(1.0);
    let paint = engine.sensor(receiver).unwrap().paint().expect("receiver should be painted");
    assert_eq!(paint.iff_key, 7);
    assert!((paint.strength - 1.0 / 2500.0).abs() < 1e-12);
    assert!(paint.angle.abs() < 1e-9, "receiver is dead ahead of the radar");
    assert!(events.iter().any(|e| matches!(
        e,
        RadarEvent::Painted { sensor, iff_key: 7, .. } if *sensor == entity_id(receiver)
    )));
    assert!(has_contact(&engine, radar, receiver));
}

#[test]
fn test_emit_only_target_not_painted() {
    let (mut engine, radar, receiver) = radar_and_receiver(RadarMode::EmitOnly);

    let events = engine.run_for(1.0);
    assert!(has_contact(&engine, radar, receiver), "still a valid target");
    assert_eq!(engine.sensor(receiver).unwrap().paint(), None);
    assert!(!events.iter().any(|e| matches!(
        e,
        RadarEvent::Painted { .. } | RadarEvent::ActionRejected { .. }
    )));
}

#[test]
fn test_clear_paint_command() {
    let (mut engine, _, receiver) = radar_and_receiver(RadarMode::EmitAndDetect);
    engine.run_for(1.0);
    assert!(engine.sensor(receiver).unwrap().is_painted());

    engine.queue_command(SensorCommand::ClearPaint {
        sensor: entity_id(receiver),
    });
    let events = engine.tick().events;
    assert!(!engine.sensor(receiver).unwrap().is_painted());
    assert!(events
        .iter()
        .any(|e| matches!(e, RadarEvent::PaintCleared { .. })));
}

// ---- Commands and scheduling ----

#[test]
fn test_detect_only_cannot_be_switched_on() {
    let (mut engine, radar) = engine_with_radar(SensorConfig {
        mode: RadarMode::DetectOnly,
        ..Default::default()
    });
    let events = engine.tick().events;
    assert!(!engine.sensor(radar).unwrap().is_emitting());
    assert!(events.iter().any(|e| matches!(
        e,
        RadarEvent::ActionRejected {
            action: SensorAction::SetEmitting,
            mode: RadarMode::DetectOnly,
            ..
        }
    )));
}

#[test]
fn test_field_of_view_command_reschedules_refresh() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    let old_task = engine.sensor(radar).unwrap().refresh_task().unwrap();
    assert_eq!(engine.scheduler().interval(old_task), Some(1.0));

    engine.queue_command(SensorCommand::SetFieldOfView {
        sensor: entity_id(radar),
        fov: FieldOfView::Deg90,
    });
    let events = engine.tick().events;

    let sensor = engine.sensor(radar).unwrap();
    let new_task = sensor.refresh_task().unwrap();
    assert_ne!(old_task, new_task);
    assert!(!engine.scheduler().is_scheduled(old_task));
    assert_eq!(engine.scheduler().interval(new_task), Some(0.25));
    assert_eq!(sensor.current_update_interval(), 0.25);
    assert!(events.iter().any(|e| matches!(
        e,
        RadarEvent::UpdateIntervalChanged { fov_degrees: 90, interval_secs, .. } if *interval_secs == 0.25
    )));
}

#[test]
fn test_set_iff_key_command() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    engine.queue_command(SensorCommand::SetIffKey {
        sensor: entity_id(radar),
        key: 42,
    });
    engine.tick();
    assert_eq!(engine.sensor(radar).unwrap().iff_key(), 42);
}

#[test]
fn test_command_for_non_sensor_ignored() {
    let mut engine = RadarEngine::default();
    let plain = spawn_target(&mut engine, "plain", Position::default());
    engine.queue_command(SensorCommand::SetEmitting {
        sensor: entity_id(plain),
        emitting: true,
    });
    engine.queue_command(SensorCommand::ClearPaint { sensor: 0 });
    let snapshot = engine.tick();
    assert!(snapshot.events.is_empty());
}

#[test]
fn test_attach_twice_rejected() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    let err = engine.attach_sensor(radar, SensorConfig::default()).unwrap_err();
    assert!(matches!(err, crate::engine::EngineError::SensorAlreadyAttached(_)));
    assert_eq!(engine.coverage().sensor_count(), 1);
}

#[test]
fn test_despawn_cancels_refresh_and_unregisters() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    let task = engine.sensor(radar).unwrap().refresh_task().unwrap();
    assert!(engine.coverage().is_registered(radar));

    assert!(engine.despawn(radar));
    assert!(!engine.scheduler().is_scheduled(task));
    assert!(!engine.coverage().is_registered(radar));
    assert_eq!(engine.scheduler().len(), 1, "only the coverage task remains");

    engine.run_for(2.0);
}

#[test]
fn test_despawn_outside_engine_drops_task() {
    let (mut engine, radar) = engine_with_radar(SensorConfig::default());
    let task = engine.sensor(radar).unwrap().refresh_task().unwrap();

    engine.world_mut().despawn(radar).unwrap();
    engine.run_for(1.0);
    assert!(!engine.scheduler().is_scheduled(task));
    assert!(!engine.coverage().is_registered(radar));
}

#[test]
fn test_shutdown_cancels_everything() {
    let (mut engine, _) = engine_with_radar(SensorConfig::default());
    spawn_target(&mut engine, "target", Position::new(0.0, 50.0, 0.0));
    engine.run_for(1.0);

    engine.shutdown();
    assert!(engine.scheduler().is_empty());
    assert!(!engine.coverage().is_running());
    assert_eq!(engine.coverage().sensor_count(), 0);
}

#[test]
fn test_tick_timing_twenty_ticks_one_second() {
    let mut engine = RadarEngine::default();
    engine.run_for(1.0);
    assert_eq!(engine.time().tick, 20);
    assert!((engine.now() - 1.0).abs() < 1e-12);
}

// ---- Scenarios ----

const CROSSING: &str = r#"{
    "name": "crossing",
    "duration_secs": 10.0,
    "entities": [
        {
            "name": "picket",
            "vehicle": false,
            "sensor": { "field_of_view": 90, "iff_key": 1 },
            "emitting": true
        },
        {
            "name": "intruder",
            "position": { "x": -40.0, "y": 50.0, "z": 5.0 },
            "velocity": { "x": 8.0, "y": 0.0, "z": 0.0 },
            "sensor": { "mode": "DetectOnly" }
        },
        {
            "name": "rock",
            "vehicle": false,
            "position": { "x": 0.0, "y": -30.0, "z": 0.0 },
            "collision_radius": 3.0
        }
    ]
}"#;

#[test]
fn test_scenario_runs() {
    let scenario = Scenario::from_json(CROSSING).unwrap();
    let mut engine = scenario.build().unwrap();
    let picket = engine.entity_named("picket").unwrap();
    let intruder = engine.entity_named("intruder").unwrap();

    let events = engine.run_for(scenario.duration_secs);
    assert!(events
        .iter()
        .any(|e| matches!(e, RadarEvent::ContactAcquired { target, .. } if *target == entity_id(intruder))));
    assert!(has_contact(&engine, picket, intruder));
    assert_eq!(engine.sensor(intruder).unwrap().paint().map(|p| p.iff_key), Some(1));
}

#[test]
fn test_determinism_same_scenario() {
    let scenario = Scenario::from_json(CROSSING).unwrap();
    let mut engine_a = scenario.build().unwrap();
    let mut engine_b = scenario.build().unwrap();

    for _ in 0..400 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "snapshots diverged for identical scenarios");
    }
}
