//! Компоненты игрока: Player, PlayerView, Sanity, Heartbeat

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Игрок — цель для врагов без явного TrackedTarget
///
/// Автоматически добавляет Sanity и PlayerView через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Sanity, PlayerView)]
pub struct Player;

/// Камера игрока (orientation + field of view)
///
/// Engine bridge читает и применяет к камере.
/// Distortion эффект временно возмущает эти значения.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct PlayerView {
    pub rotation: Quat,
    pub fov_deg: f32,
}

impl Default for PlayerView {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            fov_deg: 60.0,
        }
    }
}

/// Sanity — жизни игрока
///
/// Инвариант: 0 ≤ current ≤ max_lives
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Sanity {
    pub current: u32,
    pub max_lives: u32,
}

impl Default for Sanity {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Sanity {
    pub fn new(max_lives: u32) -> Self {
        Self {
            current: max_lives,
            max_lives,
        }
    }

    pub fn is_lost(&self) -> bool {
        self.current == 0
    }

    /// Минус одна жизнь. Возвращает true если это была последняя.
    pub fn lose_life(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.current == 0
    }
}

/// Heartbeat — proximity tension effect (audio + visual intensity)
///
/// Intensity считается от ближайшего врага из EnemyRegistry.
/// Audio/animator применяет engine bridge.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Heartbeat {
    /// Дальше этого — тишина (метры)
    pub max_distance: f32,
    /// Ближе этого — максимальная интенсивность
    pub min_distance: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_volume: f32,
    pub max_volume: f32,

    /// false пока capture sequence держит эффект
    pub active: bool,
    pub playing: bool,
    pub intensity: f32,
    pub volume: f32,
    pub pitch: f32,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            max_distance: 20.0,
            min_distance: 1.0,
            min_pitch: 0.8,
            max_pitch: 2.0,
            min_volume: 0.1,
            max_volume: 1.0,
            active: true,
            playing: false,
            intensity: 0.0,
            volume: 0.0,
            pitch: 0.8,
        }
    }
}
