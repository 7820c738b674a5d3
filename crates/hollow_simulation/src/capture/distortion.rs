//! View distortion — Perlin-noise возмущение камеры игрока (WhiteClown capture)
//!
//! Пока эффект активен:
//! - input игрока заблокирован (держим SharedEffect::InputLock)
//! - pitch/yaw трясутся по Perlin noise, roll качается по синусу, FOV "дышит"
//! По истечении — точное восстановление исходной ориентации и FOV.
//!
//! Повторный старт во время эффекта продлевает таймер,
//! но исходная ориентация остаётся той, что была до ПЕРВОГО старта.

use bevy::prelude::*;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::bridge::BridgeCommand;
use crate::capture::effects::{SharedEffect, SharedEffects};
use crate::capture::profile::DistortionPlan;
use crate::components::PlayerView;

/// Частота семплирования noise (t * NOISE_FREQUENCY)
const NOISE_FREQUENCY: f64 = 10.0;
const ROLL_AMPLITUDE_DEG: f32 = 10.0;
const ROLL_FREQUENCY: f32 = 0.5;
const FOV_AMPLITUDE_DEG: f32 = 5.0;
const FOV_FREQUENCY: f32 = 0.75;

/// Активный distortion эффект на игроке
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDistortion {
    duration: f32,
    intensity: f32,
    elapsed: f32,
    /// Ориентация и FOV до первого старта
    original: PlayerView,
    noise_seed: u32,
    holds_input: bool,
}

impl ViewDistortion {
    pub fn new(plan: DistortionPlan, original: PlayerView, noise_seed: u32) -> Self {
        Self {
            duration: plan.duration,
            intensity: plan.intensity,
            elapsed: 0.0,
            original,
            noise_seed,
            holds_input: false,
        }
    }

    /// Перезапуск: новый таймер, original не трогаем
    pub fn restart(&mut self, plan: DistortionPlan) {
        self.duration = plan.duration;
        self.intensity = plan.intensity;
        self.elapsed = 0.0;
    }

    pub fn original(&self) -> PlayerView {
        self.original
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Возмущённая камера в момент t (секунды от старта)
    pub fn sample(&self, t: f32) -> PlayerView {
        let perlin = Perlin::new(self.noise_seed);
        let sample_t = t as f64 * NOISE_FREQUENCY;

        let pitch = perlin.get([sample_t, 0.0]) as f32 * self.intensity;
        let yaw = perlin.get([0.0, sample_t]) as f32 * self.intensity;
        let roll = (t * ROLL_FREQUENCY).sin() * ROLL_AMPLITUDE_DEG;

        let offset = Quat::from_euler(
            EulerRot::YXZ,
            yaw.to_radians(),
            pitch.to_radians(),
            roll.to_radians(),
        );

        PlayerView {
            rotation: self.original.rotation * offset,
            fov_deg: self.original.fov_deg + (t * FOV_FREQUENCY).sin() * FOV_AMPLITUDE_DEG,
        }
    }
}

/// Старт/рестарт distortion на игроке
///
/// Новый компонент сразу берёт input lock. Существующий — только перезапускается
/// (lock уже взят, второй не нужен).
pub fn start_view_distortion(
    commands: &mut Commands,
    player: Entity,
    plan: DistortionPlan,
    view: PlayerView,
    existing: Option<&mut ViewDistortion>,
    noise_seed: u32,
    shared: &mut SharedEffects,
    bridge: &mut EventWriter<BridgeCommand>,
) {
    if let Some(distortion) = existing {
        distortion.restart(plan);
        crate::log(&format!(
            "🌀 {:?}: view distortion restarted ({:.1}s)",
            player, plan.duration
        ));
        return;
    }

    let mut distortion = ViewDistortion::new(plan, view, noise_seed);
    shared.acquire(SharedEffect::InputLock, bridge);
    distortion.holds_input = true;

    commands.entity(player).insert(distortion);
    crate::log(&format!(
        "🌀 {:?}: view distortion started ({:.1}s, intensity {:.2})",
        player, plan.duration, plan.intensity
    ));
}

/// Система: анимация distortion + восстановление по истечении
pub fn animate_view_distortion(
    mut commands: Commands,
    mut players: Query<(Entity, &mut PlayerView, &mut ViewDistortion)>,
    mut shared: ResMut<SharedEffects>,
    mut bridge: EventWriter<BridgeCommand>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut view, mut distortion) in players.iter_mut() {
        distortion.elapsed += delta;

        if !distortion.is_finished() {
            *view = distortion.sample(distortion.elapsed);
            continue;
        }

        *view = distortion.original;
        if distortion.holds_input {
            shared.release(SharedEffect::InputLock, &mut bridge);
            distortion.holds_input = false;
        }
        commands.entity(entity).remove::<ViewDistortion>();

        crate::log(&format!("🌀 {:?}: view distortion ended, view restored", entity));
    }
}

/// Observer: distortion снят раньше времени (despawn игрока) → отпускаем input lock
pub fn release_distortion_on_remove(
    trigger: Trigger<OnRemove, ViewDistortion>,
    distortions: Query<&ViewDistortion>,
    mut shared: ResMut<SharedEffects>,
    mut bridge: EventWriter<BridgeCommand>,
) {
    let Ok(distortion) = distortions.get(trigger.target()) else {
        return;
    };

    if distortion.holds_input {
        shared.release(SharedEffect::InputLock, &mut bridge);
    }
}
