//! Perception — line-of-sight + distance test против одной цели
//!
//! can_see() — чистая функция: range → FOV angle → ray cast (first hit == target).
//! Ray cast backend абстрагирован через RayCaster:
//! - SightQuery: ECS SystemParam, лучи по SightCollider формам (parry geometry)
//! - тесты подставляют свои реализации
//!
//! Враги (With<Enemy>) не являются occluders — их Transform мутирует FSM.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use bevy_rapier3d::parry::math::{Isometry, Point, Real, Vector};
use bevy_rapier3d::parry::query::{Ray, RayCast};
use bevy_rapier3d::parry::shape::{Ball, Cuboid};

use crate::components::{Enemy, EnemyTuning, SightCollider};

/// Ray cast backend: первая entity на луче
pub trait RayCaster {
    /// `direction` — нормализованный вектор. `exclude` — наблюдатель (не бьём сами себя).
    fn first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<Entity>;
}

/// Конус зрения наблюдателя
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCone {
    pub position: Vec3,
    pub forward: Vec3,
    pub fov_half_angle_deg: f32,
    pub vision_range: f32,
}

impl ViewCone {
    pub fn from_transform(transform: &Transform, tuning: &EnemyTuning) -> Self {
        Self {
            position: transform.translation,
            forward: transform.forward().as_vec3(),
            fov_half_angle_deg: tuning.fov_half_angle_deg,
            vision_range: tuning.vision_range,
        }
    }
}

/// Цель восприятия (entity + позиция)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SightTarget {
    pub entity: Entity,
    pub position: Vec3,
}

/// Видит ли наблюдатель цель
///
/// 1. distance > vision_range → false
/// 2. distance ≈ 0 → true (угол не определён, цель "внутри" наблюдателя)
/// 3. angle(forward, to_target) > half FOV → false
/// 4. первый hit луча должен быть самой целью (стены блокируют)
pub fn can_see(
    cone: &ViewCone,
    observer: Entity,
    target: Option<SightTarget>,
    rays: &impl RayCaster,
) -> bool {
    let Some(target) = target else {
        return false;
    };

    let to_target = target.position - cone.position;
    let distance = to_target.length();

    if distance > cone.vision_range {
        return false;
    }
    if distance <= f32::EPSILON {
        return true;
    }

    let forward = cone.forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return false;
    }

    let angle = forward.angle_between(to_target).to_degrees();
    if angle > cone.fov_half_angle_deg {
        return false;
    }

    let direction = to_target / distance;
    rays.first_hit(cone.position, direction, cone.vision_range, Some(observer))
        == Some(target.entity)
}

/// SystemParam: ray casts по всем SightCollider (кроме врагов)
#[derive(SystemParam)]
pub struct SightQuery<'w, 's> {
    colliders: Query<'w, 's, (Entity, &'static Transform, &'static SightCollider), Without<Enemy>>,
}

impl RayCaster for SightQuery<'_, '_> {
    fn first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<Entity> {
        let mut nearest: Option<(Entity, f32)> = None;

        for (entity, transform, collider) in self.colliders.iter() {
            if Some(entity) == exclude {
                continue;
            }

            let Some(toi) = collider_time_of_impact(collider, transform, origin, direction, max_distance) else {
                continue;
            };

            // Равные toi → меньший Entity (детерминизм при пересечении форм)
            let closer = match nearest {
                None => true,
                Some((best_entity, best_toi)) => {
                    toi < best_toi || (toi == best_toi && entity < best_entity)
                }
            };
            if closer {
                nearest = Some((entity, toi));
            }
        }

        nearest.map(|(entity, _)| entity)
    }
}

/// Пересечение луча с одной формой (None = промах или дальше max_distance)
pub fn collider_time_of_impact(
    collider: &SightCollider,
    transform: &Transform,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<f32> {
    let ray = Ray::new(
        Point::new(origin.x, origin.y, origin.z),
        Vector::new(direction.x, direction.y, direction.z),
    );
    let iso = isometry_from_transform(transform);

    match collider {
        SightCollider::Ball { radius } => Ball::new(*radius).cast_ray(&iso, &ray, max_distance, true),
        SightCollider::Cuboid { half_extents } => {
            Cuboid::new(Vector::new(half_extents.x, half_extents.y, half_extents.z))
                .cast_ray(&iso, &ray, max_distance, true)
        }
    }
}

fn isometry_from_transform(transform: &Transform) -> Isometry<Real> {
    let t = transform.translation;
    let r = transform.rotation;
    Isometry::from_parts(
        Translation3::new(t.x, t.y, t.z),
        UnitQuaternion::new_normalize(Quaternion::new(r.w, r.x, r.y, r.z)),
    )
}

#[cfg(test)]
mod perception_tests;
