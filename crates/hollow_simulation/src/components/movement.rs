//! Movement компоненты: NavAgent (navigation adapter)
//!
//! Архитектура (как MovementCommand → NavigationAgent в engine bridge):
//! - ECS AI пишет intent: set_destination / reset_path / warp / suspend
//! - Engine (или HeadlessNavigationPlugin) исполняет и пишет обратно
//!   remaining_distance, velocity, path_pending
//! - AI читает только публичные getters, pathfinding internals скрыты

use bevy::prelude::*;

/// Navigation adapter — opaque "move-to" capability
#[derive(Component, Debug, Clone, PartialEq)]
pub struct NavAgent {
    /// Скорость движения (m/s)
    pub speed: f32,
    destination: Option<Vec3>,
    /// true пока engine не пересчитал путь после set_destination
    path_pending: bool,
    remaining_distance: f32,
    suspended: bool,
    velocity: Vec3,
    /// Warp применяется executor'ом (teleport без pathing)
    pending_warp: Option<Vec3>,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl NavAgent {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            destination: None,
            path_pending: false,
            remaining_distance: 0.0,
            suspended: false,
            velocity: Vec3::ZERO,
            pending_warp: None,
        }
    }

    // --- Core → engine (intent) ---

    pub fn set_destination(&mut self, target: Vec3) {
        // Follow-retarget каждый тик не должен сбрасывать прогресс пути
        if self.destination == Some(target) {
            return;
        }
        self.destination = Some(target);
        self.path_pending = true;
    }

    pub fn reset_path(&mut self) {
        self.destination = None;
        self.path_pending = false;
        self.remaining_distance = 0.0;
        self.velocity = Vec3::ZERO;
    }

    /// Мгновенный teleport (сбрасывает путь)
    pub fn warp(&mut self, position: Vec3) {
        self.reset_path();
        self.pending_warp = Some(position);
    }

    pub fn set_movement_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
        if suspended {
            self.velocity = Vec3::ZERO;
        }
    }

    // --- Engine → core (queries) ---

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn has_path(&self) -> bool {
        self.destination.is_some()
    }

    pub fn path_pending(&self) -> bool {
        self.path_pending
    }

    pub fn remaining_distance(&self) -> f32 {
        self.remaining_distance
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn current_velocity(&self) -> Vec3 {
        self.velocity
    }

    // --- Executor API (engine bridge / headless driver) ---

    /// Executor забирает pending warp (один раз)
    pub fn take_warp(&mut self) -> Option<Vec3> {
        self.pending_warp.take()
    }

    /// Executor сообщает результат шага движения
    pub fn report_progress(&mut self, remaining_distance: f32, velocity: Vec3) {
        self.path_pending = false;
        self.remaining_distance = remaining_distance;
        self.velocity = velocity;
    }
}
