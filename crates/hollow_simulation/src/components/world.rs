//! World компоненты: spawn pose, sight colliders

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Начальная позиция/поворот врага (для Respawn)
///
/// Инвариант: записывается один раз при спавне, дальше только читается.
/// Поля приватные — мутировать нечем.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPose {
    position: Vec3,
    rotation: Quat,
}

impl SpawnPose {
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            rotation: transform.rotation,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }
}

/// Форма для line-of-sight ray casts
///
/// Стены/мебель (occluders) и сама цель (player) — всё через этот компонент.
/// Первый hit луча решает видимость.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SightCollider {
    /// Сфера (player capsule приближаем сферой)
    Ball { radius: f32 },
    /// Box (стены, двери), повёрнут вместе с Transform
    Cuboid { half_extents: Vec3 },
}

impl SightCollider {
    pub fn ball(radius: f32) -> Self {
        Self::Ball { radius }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Cuboid { half_extents }
    }
}
