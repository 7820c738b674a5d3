//! AI компоненты врага: state machine, tuning, attack clock, patrol route

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::capture::EnemyBehaviorProfile;

/// Враг — hostile actor под управлением FSM
///
/// Хранит behavior profile (archetype strategy: capture plan, animation clips).
/// Required Components добавляют state, attack clock, registry marker, tuning.
#[derive(Component, Clone)]
#[require(EnemyState, AttackClock, ActiveEnemy, EnemyTuning, TrackedTarget)]
pub struct Enemy {
    profile: Arc<dyn EnemyBehaviorProfile>,
}

impl Enemy {
    pub fn new(profile: Arc<dyn EnemyBehaviorProfile>) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &dyn EnemyBehaviorProfile {
        self.profile.as_ref()
    }
}

impl std::fmt::Debug for Enemy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enemy")
            .field("profile", &self.profile.name())
            .finish()
    }
}

/// FSM состояния врага
///
/// Ровно одно состояние в любой момент — гарантируется типом.
/// Terminal state нет: Respawn возвращает в Idle.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize,
)]
#[reflect(Component)]
pub enum EnemyState {
    /// Начальное состояние после спавна/respawn
    #[default]
    Idle,
    /// Обход patrol waypoints
    Patrolling,
    /// Преследование tracked target
    Chasing,
    /// В радиусе атаки, cooldown-gated capture
    Attacking,
    /// Оглушён — FSM не тикает до recovery таймера
    Stunned,
}

impl EnemyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyState::Idle => "Idle",
            EnemyState::Patrolling => "Patrolling",
            EnemyState::Chasing => "Chasing",
            EnemyState::Attacking => "Attacking",
            EnemyState::Stunned => "Stunned",
        }
    }
}

/// Параметры врага (tunables из behavior profile)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct EnemyTuning {
    /// Скорость движения (m/s), передаётся в NavAgent
    pub speed: f32,
    /// Дальность зрения (метры)
    pub vision_range: f32,
    /// Половина угла обзора (градусы)
    pub fov_half_angle_deg: f32,
    /// Радиус в котором враг замечает цель без line-of-sight
    pub aggro_range: f32,
    /// Радиус атаки
    pub attack_range: f32,
    /// Cooldown между captures (секунды)
    pub attack_cooldown: f32,
    /// Длительность jumpscare фазы capture sequence (секунды)
    pub jumpscare_duration: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            speed: 3.0,
            vision_range: 10.0,
            fov_half_angle_deg: 60.0, // FOV 120°
            aggro_range: 8.0,
            attack_range: 2.0,
            attack_cooldown: 2.0,
            jumpscare_duration: 2.5,
        }
    }
}

/// Время последней атаки (simulated seconds)
///
/// Инвариант: last_attack только растёт.
/// None = ещё не атаковал (первая атака доступна сразу).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackClock {
    last_attack: Option<f64>,
}

impl AttackClock {
    pub fn with_last_attack(time: f64) -> Self {
        Self {
            last_attack: Some(time),
        }
    }

    pub fn last_attack(&self) -> Option<f64> {
        self.last_attack
    }

    /// Прошло ли cooldown секунд с последней атаки
    pub fn is_ready(&self, now: f64, cooldown: f32) -> bool {
        match self.last_attack {
            None => true,
            Some(last) => now - last >= cooldown as f64,
        }
    }

    pub fn record(&mut self, now: f64) {
        self.last_attack = Some(match self.last_attack {
            Some(last) => last.max(now),
            None => now,
        });
    }
}

/// Patrol waypoints (циклический обход)
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatrolRoute {
    points: Vec<Vec3>,
    index: usize,
}

impl PatrolRoute {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points, index: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<Vec3> {
        self.points.get(self.index).copied()
    }

    /// Следующий waypoint (index modulo count)
    pub fn advance(&mut self) -> Option<Vec3> {
        if self.points.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.points.len();
        self.current()
    }
}

/// Цель которую преследует враг (обычно Player)
///
/// None → FSM inert (warning один раз при инициализации).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackedTarget(pub Option<Entity>);

/// Маркер: враг активен в симуляции (членство в EnemyRegistry)
///
/// Удаление маркера = деактивация (unregister), повторная вставка = register.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ActiveEnemy;

/// Маркер: враг без required collaborator (navigation/target)
///
/// Ставится один раз при валидации, FSM его больше не трогает.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Inert;
