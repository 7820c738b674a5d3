//! Headless navigation executor
//!
//! NavAgent — intent от AI. В игре его исполняет engine bridge (navmesh),
//! без engine — HeadlessNavigationPlugin: движение по прямой без препятствий.
//! Достаточно для тестов и headless прогонов (patrol/chase/respawn).

use bevy::prelude::*;

use crate::components::NavAgent;
use crate::SimSet;

pub struct HeadlessNavigationPlugin;

impl Plugin for HeadlessNavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, drive_nav_agents.in_set(SimSet::Navigate));
    }
}

/// Система: warp → шаг к destination → report_progress
pub fn drive_nav_agents(mut agents: Query<(&mut Transform, &mut NavAgent)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut transform, mut nav) in agents.iter_mut() {
        if let Some(position) = nav.take_warp() {
            transform.translation = position;
        }

        if nav.is_suspended() {
            continue;
        }

        let Some(destination) = nav.destination() else {
            continue;
        };

        let to_destination = destination - transform.translation;
        let distance = to_destination.length();
        let step = nav.speed * delta;

        if distance <= step {
            transform.translation = destination;
            nav.report_progress(0.0, Vec3::ZERO);
            continue;
        }

        let direction = to_destination / distance;
        transform.translation += direction * step;

        // Лицом по ходу движения (только yaw)
        let flat = Vec3::new(direction.x, 0.0, direction.z);
        if flat.length_squared() > f32::EPSILON {
            transform.look_to(flat, Vec3::Y);
        }

        let speed = nav.speed;
        nav.report_progress(distance - step, direction * speed);
    }
}
