//! Headless симуляция Hollow
//!
//! Запускает Bevy App без рендера: игрок, стена, по одному врагу каждого archetype.
//! Опционально: путь к JSON конфигу первым аргументом.

use std::time::Duration;

use bevy::prelude::*;
use hollow_simulation::ai::enemy_bundle;
use hollow_simulation::{
    create_headless_app, init_logger, log_error, log_info, Archetype, EnemyState, HeadlessNavigationPlugin,
    Heartbeat, PatrolRoute, Player, Sanity, SightCollider, SimulationConfig, SimulationPlugin,
};

const TICKS: u32 = 3600;

fn load_config() -> SimulationConfig {
    let Some(path) = std::env::args().nth(1) else {
        return SimulationConfig::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(json) => match SimulationConfig::from_json(&json) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("❌ Config {} is invalid: {}, using defaults", path, err));
                SimulationConfig::default()
            }
        },
        Err(err) => {
            log_error(&format!("❌ Cannot read config {}: {}, using defaults", path, err));
            SimulationConfig::default()
        }
    }
}

fn main() {
    init_logger();
    let config = load_config();
    let mut app = create_headless_app(config.seed);
    let tick = Duration::from_secs_f64(1.0 / config.tick_hz.max(1.0));

    log_info(&format!("Starting Hollow headless simulation (seed: {})", config.seed));

    app.insert_resource(config)
        .add_plugins((SimulationPlugin, HeadlessNavigationPlugin));

    let world = app.world_mut();
    world.spawn((
        Player,
        Heartbeat::default(),
        Transform::from_xyz(0.0, 0.0, 0.0),
        SightCollider::ball(0.4),
    ));
    world.spawn((
        Transform::from_xyz(0.0, 0.0, -6.0),
        SightCollider::cuboid(Vec3::new(3.0, 2.0, 0.2)),
    ));

    for (i, archetype) in Archetype::ALL.iter().enumerate() {
        let angle = i as f32 / Archetype::ALL.len() as f32 * std::f32::consts::TAU;
        let spawn = Vec3::new(angle.cos() * 18.0, 0.0, angle.sin() * 18.0);
        let route = PatrolRoute::new(vec![
            spawn,
            spawn + Vec3::new(4.0, 0.0, 0.0),
            spawn + Vec3::new(4.0, 0.0, 4.0),
        ]);

        world.spawn((
            enemy_bundle(archetype.profile(), Transform::from_translation(spawn)),
            route,
        ));
    }

    for n in 0..TICKS {
        app.world_mut().resource_mut::<Time<Fixed>>().advance_by(tick);
        app.world_mut().run_schedule(FixedUpdate);

        if n % 600 == 0 {
            let world = app.world_mut();
            let mut enemies = world.query::<(&Name, &EnemyState)>();
            let states: Vec<String> = enemies
                .iter(world)
                .map(|(name, state)| format!("{}={}", name, state.as_str()))
                .collect();
            log_info(&format!("Tick {}: {}", n, states.join(", ")));
        }
    }

    let world = app.world_mut();
    let mut players = world.query_filtered::<&Sanity, With<Player>>();
    for sanity in players.iter(world) {
        log_info(&format!(
            "Simulation complete! Sanity {}/{}",
            sanity.current, sanity.max_lives
        ));
    }
}
