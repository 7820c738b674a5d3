//! Enemy FSM — Idle / Patrolling / Chasing / Attacking (+ Stunned)
//!
//! Один тик решения на врага в SimSet::Decide:
//! 1. Perception: can_see (cone + ray cast) и distance до TrackedTarget
//! 2. decide_transition(): переход + intent в NavAgent/AttackClock
//! 3. Смена состояния → EnemyStateChanged + PlayAnimation
//!
//! Stunned врагов не трогаем (выход по таймеру в stun.rs),
//! врагов с CaptureSequence / Inert / без ActiveEnemy — тоже.

use bevy::prelude::*;

use crate::ai::events::{CaptureRequest, EnemyStateChanged};
use crate::bridge::BridgeCommand;
use crate::capture::CaptureSequence;
use crate::components::{
    ActiveEnemy, AttackClock, Enemy, EnemyState, EnemyTuning, Inert, NavAgent, PatrolRoute,
    SpawnPose, TrackedTarget,
};
use crate::config::SimulationConfig;
use crate::perception::{can_see, SightQuery, SightTarget, ViewCone};

/// Что враг знает о цели в этом тике
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perceived {
    pub sees_target: bool,
    pub distance: f32,
    pub target_position: Vec3,
}

impl Perceived {
    /// Цель замечена: видна или в aggro радиусе
    pub fn notices(&self, tuning: &EnemyTuning) -> bool {
        self.sees_target || self.distance < tuning.aggro_range
    }
}

/// Результат шага FSM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: EnemyState,
    /// Атака прошла cooldown → capture
    pub capture: bool,
}

impl Transition {
    fn to(state: EnemyState) -> Self {
        Self {
            state,
            capture: false,
        }
    }
}

/// Параметры шага (общие для всех врагов в тике)
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext {
    /// Simulated seconds (Time<Fixed>::elapsed)
    pub now: f64,
    pub arrival_threshold: f32,
}

/// Чистая логика перехода
///
/// Пишет intent в NavAgent (destination / reset_path), двигает PatrolRoute,
/// фиксирует атаку в AttackClock. Ориентацию к цели в Attacking
/// выставляет система (нужен Transform).
pub fn decide_transition(
    state: EnemyState,
    perceived: &Perceived,
    tuning: &EnemyTuning,
    route: Option<&mut PatrolRoute>,
    nav: &mut NavAgent,
    clock: &mut AttackClock,
    ctx: &DecisionContext,
) -> Transition {
    let has_route = route.as_ref().map(|r| !r.is_empty()).unwrap_or(false);

    match state {
        EnemyState::Stunned => Transition::to(EnemyState::Stunned),

        EnemyState::Idle => {
            if perceived.notices(tuning) {
                return Transition::to(EnemyState::Chasing);
            }

            match route.and_then(|r| r.current()) {
                Some(waypoint) => {
                    nav.set_destination(waypoint);
                    Transition::to(EnemyState::Patrolling)
                }
                None => Transition::to(EnemyState::Idle),
            }
        }

        EnemyState::Patrolling => {
            if perceived.notices(tuning) {
                return Transition::to(EnemyState::Chasing);
            }

            let Some(route) = route.filter(|r| !r.is_empty()) else {
                nav.reset_path();
                return Transition::to(EnemyState::Idle);
            };

            let arrived = !nav.path_pending()
                && (!nav.has_path() || nav.remaining_distance() < ctx.arrival_threshold);
            if arrived {
                if let Some(next) = route.advance() {
                    nav.set_destination(next);
                }
            }

            Transition::to(EnemyState::Patrolling)
        }

        EnemyState::Chasing => {
            if !perceived.sees_target && perceived.distance > tuning.aggro_range {
                nav.reset_path();
                if has_route {
                    if let Some(waypoint) = route.and_then(|r| r.current()) {
                        nav.set_destination(waypoint);
                    }
                    return Transition::to(EnemyState::Patrolling);
                }
                return Transition::to(EnemyState::Idle);
            }

            nav.set_destination(perceived.target_position);

            if perceived.distance < tuning.attack_range {
                Transition::to(EnemyState::Attacking)
            } else {
                Transition::to(EnemyState::Chasing)
            }
        }

        EnemyState::Attacking => {
            nav.reset_path();

            if clock.is_ready(ctx.now, tuning.attack_cooldown) {
                clock.record(ctx.now);
                Transition {
                    state: EnemyState::Attacking,
                    capture: true,
                }
            } else {
                Transition::to(EnemyState::Chasing)
            }
        }
    }
}

/// Система: FSM transitions для всех активных врагов
pub fn enemy_fsm_transitions(
    mut enemies: Query<
        (
            Entity,
            &Enemy,
            &EnemyTuning,
            &mut EnemyState,
            &mut AttackClock,
            &mut NavAgent,
            &mut Transform,
            Option<&mut PatrolRoute>,
            &TrackedTarget,
        ),
        (With<ActiveEnemy>, Without<Inert>, Without<CaptureSequence>),
    >,
    targets: Query<&Transform, Without<Enemy>>,
    sight: SightQuery,
    config: Res<SimulationConfig>,
    time: Res<Time<Fixed>>,
    mut captures: EventWriter<CaptureRequest>,
    mut changes: EventWriter<EnemyStateChanged>,
    mut bridge: EventWriter<BridgeCommand>,
) {
    let ctx = DecisionContext {
        now: time.elapsed_secs_f64(),
        arrival_threshold: config.arrival_threshold,
    };

    for (entity, enemy, tuning, mut state, mut clock, mut nav, mut transform, route, target) in
        enemies.iter_mut()
    {
        if *state == EnemyState::Stunned {
            continue;
        }

        let Some(target_entity) = target.0 else {
            continue;
        };
        let Ok(target_transform) = targets.get(target_entity) else {
            // Цель despawned — стоим на месте
            continue;
        };
        let target_position = target_transform.translation;

        let cone = ViewCone::from_transform(&transform, tuning);
        let sees_target = can_see(
            &cone,
            entity,
            Some(SightTarget {
                entity: target_entity,
                position: target_position,
            }),
            &sight,
        );
        let perceived = Perceived {
            sees_target,
            distance: transform.translation.distance(target_position),
            target_position,
        };

        let transition = decide_transition(
            *state,
            &perceived,
            tuning,
            route.map(|r| r.into_inner()),
            &mut nav,
            &mut clock,
            &ctx,
        );

        // Attacking всегда разворачивает к цели, даже если cooldown откатывает в Chasing
        if *state == EnemyState::Attacking || transition.state == EnemyState::Attacking {
            face_towards(&mut transform, target_position);
        }

        if transition.capture {
            crate::log(&format!(
                "🗡️ {} {:?} attacks {:?} (t={:.2})",
                enemy.profile().name(),
                entity,
                target_entity,
                ctx.now
            ));
            captures.write(CaptureRequest {
                enemy: entity,
                target: target_entity,
            });
        }

        if transition.state != *state {
            crate::log(&format!(
                "AI: {} {:?} {} → {}",
                enemy.profile().name(),
                entity,
                state.as_str(),
                transition.state.as_str()
            ));
            changes.write(EnemyStateChanged {
                enemy: entity,
                from: *state,
                to: transition.state,
            });
            if let Some(clip) = enemy.profile().animation_for(transition.state) {
                bridge.write(BridgeCommand::PlayAnimation {
                    enemy: entity,
                    clip: clip.to_string(),
                });
            }
            *state = transition.state;
        }
    }
}

/// Поворот к цели только по горизонтали (враг не наклоняется)
fn face_towards(transform: &mut Transform, target: Vec3) {
    let flat_target = Vec3::new(target.x, transform.translation.y, target.z);
    if flat_target.distance_squared(transform.translation) > f32::EPSILON {
        transform.look_at(flat_target, Vec3::Y);
    }
}

/// Respawn: телепорт в SpawnPose, путь сброшен, состояние Idle
///
/// Идемпотентен: повторный вызов даёт тот же результат.
pub fn respawn(
    transform: &mut Transform,
    state: &mut EnemyState,
    nav: Option<&mut NavAgent>,
    pose: &SpawnPose,
) {
    transform.translation = pose.position();
    transform.rotation = pose.rotation();
    if let Some(nav) = nav {
        nav.warp(pose.position());
        nav.set_movement_suspended(false);
    }
    *state = EnemyState::Idle;
}

#[cfg(test)]
#[path = "fsm_tests.rs"]
mod fsm_tests;
