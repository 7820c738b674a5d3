//! Heartbeat — proximity tension от ближайшего врага
//!
//! Ближайший враг берётся из EnemyRegistry (без перебора всех Enemy).
//! Пока capture sequence держит SharedEffect::TensionSuspended — эффект остановлен.

use bevy::math::FloatExt;
use bevy::prelude::*;

use crate::ai::EnemyRegistry;
use crate::capture::{SharedEffect, SharedEffects};
use crate::components::{Enemy, Heartbeat};

/// Ниже этого громкость/интенсивность считаются нулём
const SILENCE_THRESHOLD: f32 = 0.01;
/// Скорость затухания (lerp factor = dt * FADE_RATE)
const FADE_RATE: f32 = 2.0;

/// 0 на max_distance, 1 на min_distance (clamped)
pub fn intensity_for_distance(distance: f32, max_distance: f32, min_distance: f32) -> f32 {
    let span = min_distance - max_distance;
    if span.abs() <= f32::EPSILON {
        return if distance <= min_distance { 1.0 } else { 0.0 };
    }
    ((distance - max_distance) / span).clamp(0.0, 1.0)
}

impl Heartbeat {
    /// Враг в радиусе: интенсивность и звук по дистанции
    pub fn drive(&mut self, distance: f32) {
        self.playing = true;
        self.intensity = intensity_for_distance(distance, self.max_distance, self.min_distance);
        self.volume = self.min_volume.lerp(self.max_volume, self.intensity);
        self.pitch = self.min_pitch.lerp(self.max_pitch, self.intensity);
    }

    /// Никого рядом: плавное затухание
    pub fn fade(&mut self, delta: f32) {
        let t = (delta * FADE_RATE).clamp(0.0, 1.0);

        if self.playing {
            self.volume = self.volume.lerp(0.0, t);
            if self.volume < SILENCE_THRESHOLD {
                self.playing = false;
            }
        }

        if self.intensity > 0.0 {
            self.intensity = self.intensity.lerp(0.0, t);
            if self.intensity < SILENCE_THRESHOLD {
                self.intensity = 0.0;
            }
        }
    }

    /// Мгновенная остановка (capture sequence)
    pub fn suspend(&mut self) {
        self.active = false;
        self.playing = false;
        self.intensity = 0.0;
    }
}

pub fn update_heartbeat(
    mut hearts: Query<(&Transform, &mut Heartbeat), Without<Enemy>>,
    enemies: Query<&Transform, With<Enemy>>,
    registry: Res<EnemyRegistry>,
    shared: Res<SharedEffects>,
    time: Res<Time<Fixed>>,
) {
    let suspended = shared.is_held(SharedEffect::TensionSuspended);
    let delta = time.delta_secs();

    for (transform, mut heartbeat) in hearts.iter_mut() {
        if suspended {
            if heartbeat.active {
                heartbeat.suspend();
            }
            continue;
        }
        heartbeat.active = true;

        let nearest = registry.nearest(transform.translation, |enemy| {
            enemies.get(enemy).ok().map(|t| t.translation)
        });

        match nearest {
            Some((_, distance)) if distance <= heartbeat.max_distance => heartbeat.drive(distance),
            _ => heartbeat.fade(delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_bounds() {
        assert_eq!(intensity_for_distance(20.0, 20.0, 1.0), 0.0);
        assert_eq!(intensity_for_distance(1.0, 20.0, 1.0), 1.0);
        assert_eq!(intensity_for_distance(0.2, 20.0, 1.0), 1.0);
        assert_eq!(intensity_for_distance(30.0, 20.0, 1.0), 0.0);

        let mid = intensity_for_distance(10.5, 20.0, 1.0);
        assert!((mid - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_drive_maps_volume_and_pitch() {
        let mut heartbeat = Heartbeat::default();
        heartbeat.drive(1.0);

        assert!(heartbeat.playing);
        assert!((heartbeat.volume - 1.0).abs() < 1e-5);
        assert!((heartbeat.pitch - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_fade_reaches_silence() {
        let mut heartbeat = Heartbeat::default();
        heartbeat.drive(5.0);

        for _ in 0..600 {
            heartbeat.fade(1.0 / 60.0);
        }

        assert!(!heartbeat.playing);
        assert_eq!(heartbeat.intensity, 0.0);
    }

    #[test]
    fn test_suspend_stops_immediately() {
        let mut heartbeat = Heartbeat::default();
        heartbeat.drive(2.0);
        heartbeat.suspend();

        assert!(!heartbeat.active);
        assert!(!heartbeat.playing);
        assert_eq!(heartbeat.intensity, 0.0);
    }
}
