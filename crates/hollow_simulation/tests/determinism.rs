//! Тесты детерминизма
//!
//! Проверяем что симуляция с одинаковым seed даёт идентичные результаты:
//! патрули, погони, captures, Twin voice выбор (DeterministicRng), distortion seed.

use std::time::Duration;

use bevy::prelude::*;
use hollow_simulation::ai::enemy_bundle;
use hollow_simulation::{
    create_headless_app, world_snapshot, Archetype, EnemyState, HeadlessNavigationPlugin,
    PatrolRoute, Player, PlayerView, Sanity, SightCollider, SimulationPlugin,
};

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 1200;

    // Первый прогон
    let snapshot1 = run_simulation(SEED, TICK_COUNT);

    // Второй прогон с тем же seed
    let snapshot2 = run_simulation(SEED, TICK_COUNT);

    // Снепшоты должны быть идентичны
    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 900;

    // Запускаем 3 раза — все должны быть идентичны
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    // Все снепшоты должны совпадать с первым
    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

/// Запускает симуляцию и возвращает snapshot мира
fn run_simulation(seed: u64, tick_count: usize) -> Vec<u8> {
    let mut app = create_headless_app(seed);
    app.add_plugins((SimulationPlugin, HeadlessNavigationPlugin));

    let world = app.world_mut();
    world.spawn((Player, Transform::from_xyz(0.0, 0.0, 0.0), SightCollider::ball(0.4)));
    world.spawn((
        Transform::from_xyz(2.0, 0.0, -4.0),
        SightCollider::cuboid(Vec3::new(1.5, 2.0, 0.2)),
    ));

    // Враги патрулируют кольцом и по очереди натыкаются на игрока
    for (i, archetype) in Archetype::ALL.iter().enumerate() {
        let offset = i as f32 * 3.0;
        let spawn = Vec3::new(-6.0 + offset, 0.0, -9.0);
        world.spawn((
            enemy_bundle(archetype.profile(), Transform::from_translation(spawn)),
            PatrolRoute::new(vec![spawn, Vec3::new(offset - 6.0, 0.0, 3.0), Vec3::ZERO]),
        ));
    }

    // Прогоняем симуляцию
    for _ in 0..tick_count {
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(Duration::from_secs_f64(1.0 / 60.0));
        app.world_mut().run_schedule(FixedUpdate);
    }

    // Возвращаем snapshot
    let world = app.world_mut();
    let mut snapshot = world_snapshot::<EnemyState>(world);
    snapshot.extend(world_snapshot::<Transform>(world));
    snapshot.extend(world_snapshot::<Sanity>(world));
    snapshot.extend(world_snapshot::<PlayerView>(world));
    snapshot
}
