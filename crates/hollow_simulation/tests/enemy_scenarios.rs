//! Integration тесты: FSM + stun + capture в полном headless App
//!
//! Тик = advance Time<Fixed> на 1/60 + один прогон FixedUpdate.

use std::time::Duration;

use bevy::prelude::*;
use hollow_simulation::ai::enemy_bundle;
use hollow_simulation::capture::SharedEffect;
use hollow_simulation::{
    create_headless_app, Archetype, AttackClock, BridgeCommand, CaptureRequest, EnemyState,
    EnemyStateChanged, HeadlessNavigationPlugin, Heartbeat, NavAgent, Player, SharedEffects,
    SightCollider, SimulationPlugin, StunRequest,
};

fn app() -> App {
    let mut app = create_headless_app(42);
    app.add_plugins((SimulationPlugin, HeadlessNavigationPlugin));
    app
}

fn tick(app: &mut App) {
    app.world_mut()
        .resource_mut::<Time<Fixed>>()
        .advance_by(Duration::from_secs_f64(1.0 / 60.0));
    app.world_mut().run_schedule(FixedUpdate);
}

fn drain<E: Event>(app: &mut App) -> Vec<E> {
    app.world_mut().resource_mut::<Events<E>>().drain().collect()
}

fn state(app: &App, enemy: Entity) -> Option<EnemyState> {
    app.world().get::<EnemyState>(enemy).copied()
}

fn translation(app: &App, entity: Entity) -> Vec3 {
    app.world()
        .get::<Transform>(entity)
        .map(|t| t.translation)
        .unwrap_or(Vec3::NAN)
}

/// Враг в origin смотрит в -Z, игрок перед ним на `distance`
fn spawn_facing(app: &mut App, archetype: Archetype, distance: f32) -> (Entity, Entity) {
    let world = app.world_mut();
    let player = world
        .spawn((
            Player,
            Transform::from_xyz(0.0, 0.0, -distance),
            SightCollider::ball(0.4),
        ))
        .id();
    let enemy = world
        .spawn(enemy_bundle(archetype.profile(), Transform::from_xyz(0.0, 0.0, 0.0)))
        .id();
    (player, enemy)
}

#[test]
fn test_scenario_chase_attack_capture_once() {
    let mut app = app();
    let (player, enemy) = spawn_facing(&mut app, Archetype::Stalker, 5.0);
    app.world_mut()
        .entity_mut(enemy)
        .insert(AttackClock::with_last_attack(-100.0));

    // distance 5 < aggro 8, LOS чистый → Chasing в том же тике
    tick(&mut app);
    assert_eq!(state(&app, enemy), Some(EnemyState::Chasing));
    assert!(drain::<CaptureRequest>(&mut app).is_empty());

    // Игрок подходит на 1.5 → Attacking
    let enemy_pos = translation(&app, enemy);
    if let Some(mut transform) = app.world_mut().get_mut::<Transform>(player) {
        transform.translation = enemy_pos + Vec3::new(0.0, 0.0, -1.5);
    }
    tick(&mut app);
    assert_eq!(state(&app, enemy), Some(EnemyState::Attacking));
    assert!(drain::<CaptureRequest>(&mut app).is_empty());

    // Первый тик в Attacking: cooldown давно прошёл → ровно один capture
    tick(&mut app);
    assert_eq!(drain::<CaptureRequest>(&mut app), vec![CaptureRequest { enemy, target: player }]);

    // Пока идёт sequence — новых captures нет
    for _ in 0..60 {
        tick(&mut app);
    }
    assert!(drain::<CaptureRequest>(&mut app).is_empty());
}

#[test]
fn test_scenario_stun_from_chasing() {
    let mut app = app();
    let (_player, enemy) = spawn_facing(&mut app, Archetype::Stalker, 5.0);

    tick(&mut app);
    assert_eq!(state(&app, enemy), Some(EnemyState::Chasing));
    drain::<EnemyStateChanged>(&mut app);

    app.world_mut().send_event(StunRequest { enemy, duration: 3.0 });
    tick(&mut app);
    assert_eq!(state(&app, enemy), Some(EnemyState::Stunned));
    assert!(app.world().get::<NavAgent>(enemy).is_some_and(|nav| nav.is_suspended()));

    let frozen_at = translation(&app, enemy);

    // 3.0s = 180 тиков; до этого стоим и не атакуем
    for _ in 0..178 {
        tick(&mut app);
        assert_eq!(state(&app, enemy), Some(EnemyState::Stunned));
    }
    assert_eq!(translation(&app, enemy), frozen_at);
    assert!(drain::<CaptureRequest>(&mut app).is_empty());

    let mut recovered = false;
    for _ in 0..3 {
        tick(&mut app);
        let changes = drain::<EnemyStateChanged>(&mut app);
        if changes.iter().any(|c| {
            c.enemy == enemy && c.from == EnemyState::Stunned && c.to == EnemyState::Idle
        }) {
            recovered = true;
            break;
        }
    }
    assert!(recovered, "enemy never left Stunned");
    assert!(app.world().get::<NavAgent>(enemy).is_some_and(|nav| !nav.is_suspended()));

    // Игрок всё ещё рядом → в том же тике снова Chasing
    assert_eq!(state(&app, enemy), Some(EnemyState::Chasing));
}

#[test]
fn test_restun_rearms_timer() {
    let mut app = app();
    let (_player, enemy) = spawn_facing(&mut app, Archetype::Stalker, 30.0);
    tick(&mut app);

    app.world_mut().send_event(StunRequest { enemy, duration: 1.0 });
    tick(&mut app);
    for _ in 0..50 {
        tick(&mut app);
    }
    // Перевзвод на полную секунду, а не +1s к остатку
    app.world_mut().send_event(StunRequest { enemy, duration: 1.0 });
    tick(&mut app);
    for _ in 0..55 {
        tick(&mut app);
        assert_eq!(state(&app, enemy), Some(EnemyState::Stunned));
    }
    for _ in 0..10 {
        tick(&mut app);
    }
    assert_eq!(state(&app, enemy), Some(EnemyState::Idle));
}

#[test]
fn test_attacking_on_cooldown_still_faces_target() {
    let mut app = app();
    let (player, enemy) = spawn_facing(&mut app, Archetype::Stalker, 30.0);
    tick(&mut app);
    assert_eq!(state(&app, enemy), Some(EnemyState::Idle));

    // Игрок сбоку в attack range, cooldown ещё не прошёл
    if let Some(mut transform) = app.world_mut().get_mut::<Transform>(player) {
        transform.translation = Vec3::new(1.0, 0.0, 0.0);
    }
    app.world_mut()
        .entity_mut(enemy)
        .insert((EnemyState::Attacking, AttackClock::with_last_attack(1000.0)));
    tick(&mut app);

    assert_eq!(state(&app, enemy), Some(EnemyState::Chasing));
    assert!(drain::<CaptureRequest>(&mut app).is_empty());
    let forward = app
        .world()
        .get::<Transform>(enemy)
        .map(|t| *t.forward())
        .unwrap_or(Vec3::NAN);
    assert!(forward.distance(Vec3::X) < 1e-3, "forward = {:?}", forward);
}

#[test]
fn test_state_change_plays_profile_clip() {
    let mut app = app();
    let (_player, enemy) = spawn_facing(&mut app, Archetype::Reeper, 5.0);

    tick(&mut app);
    let commands = drain::<BridgeCommand>(&mut app);
    assert!(commands.contains(&BridgeCommand::PlayAnimation {
        enemy,
        clip: "ReeperRun".to_string(),
    }));
}

#[test]
fn test_capture_of_stunned_enemy_cancels_recovery() {
    let mut app = app();
    let (player, enemy) = spawn_facing(&mut app, Archetype::Stalker, 30.0);
    tick(&mut app);

    app.world_mut().send_event(StunRequest { enemy, duration: 1.0 });
    tick(&mut app);
    assert_eq!(state(&app, enemy), Some(EnemyState::Stunned));

    app.world_mut().send_event(CaptureRequest { enemy, target: player });
    tick(&mut app);
    drain::<EnemyStateChanged>(&mut app);

    // Jumpscare 2.5s длиннее stun 1.0s: recovery не должен сработать внутри sequence
    for _ in 0..70 {
        tick(&mut app);
    }
    assert!(app.world().get::<hollow_simulation::capture::CaptureSequence>(enemy).is_some());
    assert_eq!(state(&app, enemy), Some(EnemyState::Stunned));
    assert!(drain::<EnemyStateChanged>(&mut app).is_empty());
    assert!(app.world().get::<NavAgent>(enemy).is_some_and(|nav| nav.is_suspended()));
    assert!(app
        .world()
        .resource::<hollow_simulation::ai::ScheduledEvents>()
        .is_empty());

    // Cleanup возвращает врага в Idle с движением
    for _ in 0..120 {
        tick(&mut app);
    }
    assert!(app.world().get::<hollow_simulation::capture::CaptureSequence>(enemy).is_none());
    assert!(app.world().get::<NavAgent>(enemy).is_some_and(|nav| !nav.is_suspended()));
}

#[test]
fn test_zero_duration_stun_is_rejected() {
    let mut app = app();
    let (_player, enemy) = spawn_facing(&mut app, Archetype::Stalker, 30.0);
    tick(&mut app);

    app.world_mut().send_event(StunRequest { enemy, duration: 0.0 });
    app.world_mut().send_event(StunRequest { enemy, duration: -1.0 });
    tick(&mut app);

    assert_eq!(state(&app, enemy), Some(EnemyState::Idle));
    assert!(app.world().get::<NavAgent>(enemy).is_some_and(|nav| !nav.is_suspended()));
}

#[test]
fn test_enemy_without_navigation_is_inert() {
    let mut app = app();
    let world = app.world_mut();
    world.spawn((Player, Transform::from_xyz(0.0, 0.0, -1.0)));
    let enemy = world
        .spawn((
            hollow_simulation::Enemy::new(Archetype::Stalker.profile()),
            Transform::default(),
        ))
        .id();

    for _ in 0..10 {
        tick(&mut app);
    }

    assert!(app.world().get::<hollow_simulation::Inert>(enemy).is_some());
    assert_eq!(state(&app, enemy), Some(EnemyState::Idle));
    assert!(drain::<CaptureRequest>(&mut app).is_empty());
}

#[test]
fn test_concurrent_twins_balance_shared_effects() {
    let mut app = app();
    let world = app.world_mut();
    let player = world
        .spawn((Player, Transform::from_xyz(0.0, 0.0, 80.0)))
        .id();
    let twin_a = world
        .spawn(enemy_bundle(Archetype::Twin.profile(), Transform::from_xyz(-40.0, 0.0, 0.0)))
        .id();
    let twin_b = world
        .spawn(enemy_bundle(Archetype::Twin.profile(), Transform::from_xyz(40.0, 0.0, 0.0)))
        .id();
    tick(&mut app);

    let mut commands: Vec<BridgeCommand> = drain(&mut app);

    app.world_mut().send_event(CaptureRequest { enemy: twin_a, target: player });
    tick(&mut app);
    for _ in 0..60 {
        tick(&mut app);
    }
    app.world_mut().send_event(CaptureRequest { enemy: twin_b, target: player });

    let mut a_done = false;
    for _ in 0..1200 {
        tick(&mut app);
        commands.extend(drain::<BridgeCommand>(&mut app));

        let a_active = app.world().get::<hollow_simulation::capture::CaptureSequence>(twin_a).is_some();
        if !a_active && !a_done {
            a_done = true;
            // B ещё в hallucination → общие эффекты держатся
            let shared = app.world().resource::<SharedEffects>();
            assert!(shared.is_held(SharedEffect::InputLock));
            assert!(shared.is_held(SharedEffect::VisionOverlay));
            assert!(shared.is_held(SharedEffect::AmbientAudioPaused));
        }
    }

    let count = |cmd: BridgeCommand| commands.iter().filter(|c| **c == cmd).count();
    assert_eq!(count(BridgeCommand::SetInputActive(false)), 1);
    assert_eq!(count(BridgeCommand::SetInputActive(true)), 1);
    assert_eq!(count(BridgeCommand::SetVisionOverlay(true)), 1);
    assert_eq!(count(BridgeCommand::SetVisionOverlay(false)), 1);
    assert_eq!(count(BridgeCommand::SetAmbientAudioPaused(true)), 1);
    assert_eq!(count(BridgeCommand::SetAmbientAudioPaused(false)), 1);
    assert_eq!(count(BridgeCommand::SetTensionSuspended(true)), 1);
    assert_eq!(count(BridgeCommand::SetTensionSuspended(false)), 1);
    assert!(app.world().resource::<SharedEffects>().all_released());
}

#[test]
fn test_heartbeat_follows_nearest_enemy() {
    let mut app = app();
    let world = app.world_mut();
    let player = world
        .spawn((Player, Heartbeat::default(), Transform::default()))
        .id();
    // Дальше vision и aggro: стоят на месте
    world.spawn(enemy_bundle(
        Archetype::Stalker.profile(),
        Transform::from_xyz(0.0, 0.0, 10.5),
    ));
    world.spawn(enemy_bundle(
        Archetype::Stalker.profile(),
        Transform::from_xyz(0.0, 0.0, 19.0),
    ));

    tick(&mut app);

    let heartbeat = app.world().get::<Heartbeat>(player).copied().unwrap_or_default();
    assert!(heartbeat.playing);
    assert!((heartbeat.intensity - 0.5).abs() < 1e-4);
}

#[test]
fn test_registry_mirrors_active_enemies() {
    let mut app = app();
    let world = app.world_mut();
    let enemies: Vec<Entity> = (0..3)
        .map(|i| {
            world
                .spawn(enemy_bundle(
                    Archetype::Stalker.profile(),
                    Transform::from_xyz(i as f32 * 5.0, 0.0, 0.0),
                ))
                .id()
        })
        .collect();

    let registry = |app: &App| app.world().resource::<hollow_simulation::EnemyRegistry>().clone();
    assert_eq!(registry(&app).len(), 3);

    // Деактивация / повторная активация без дубликатов
    app.world_mut().entity_mut(enemies[0]).remove::<hollow_simulation::ActiveEnemy>();
    assert!(!registry(&app).contains(enemies[0]));
    app.world_mut().entity_mut(enemies[0]).insert(hollow_simulation::ActiveEnemy);
    app.world_mut().entity_mut(enemies[0]).insert(hollow_simulation::ActiveEnemy);
    assert_eq!(registry(&app).len(), 3);

    app.world_mut().despawn(enemies[1]);
    let after = registry(&app);
    assert_eq!(after.len(), 2);
    assert!(!after.contains(enemies[1]));

    let nearest = after.nearest(Vec3::new(9.0, 0.0, 0.0), |e| {
        app.world().get::<Transform>(e).map(|t| t.translation)
    });
    assert_eq!(nearest.map(|(e, _)| e), Some(enemies[2]));
}
