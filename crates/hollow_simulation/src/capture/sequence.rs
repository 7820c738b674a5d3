//! Capture sequence — что происходит после успешной атаки
//!
//! Последовательность (один раз на capture):
//! 1. PlayerCaught (жизни) + CollectablesReset (если plan требует)
//! 2. Freeze: input lock, tension suspend
//! 3. Main camera → capture camera врага
//! 4. Модель врага скрыта, capture visual + audio, jumpscare trigger
//! 5. Hold jumpscare_duration
//! 6. (Twin) hallucination: голос + overlay + пауза ambient audio, hold
//! 7. Cleanup: main camera, модель, tension, input → respawn врага
//!
//! CaptureSequence компонент = suspension point (phase + elapsed).
//! Пока он есть на враге, FSM врага не тикает и повторный capture игнорируется.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::{respawn, CaptureRequest, EnemyStateChanged, ScheduledEvents, ScheduledKind};
use crate::bridge::{play_voice, BridgeCommand, Viewpoint};
use crate::capture::distortion::{start_view_distortion, ViewDistortion};
use crate::capture::effects::{SharedEffect, SharedEffects};
use crate::capture::profile::{CaptureContext, CapturePlan, DistortionPlan};
use crate::components::{ActiveEnemy, Enemy, EnemyState, EnemyTuning, NavAgent, PlayerView, SpawnPose};
use crate::player::{CollectablesReset, PlayerCaught};
use crate::DeterministicRng;

/// Допуск на накопление float ошибки при сравнении elapsed с длительностью фазы
const PHASE_EPSILON: f32 = 1e-4;

/// Фаза capture sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapturePhase {
    Jumpscare,
    Hallucination,
    Cleanup,
}

/// Активная capture sequence на враге
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSequence {
    target: Entity,
    phase: CapturePhase,
    elapsed: f32,
    plan: CapturePlan,
    /// Shared эффекты которые держит эта sequence (в порядке захвата)
    held: Vec<SharedEffect>,
    capture_view_active: bool,
    voice_playing: bool,
}

impl CaptureSequence {
    pub fn new(target: Entity, plan: CapturePlan) -> Self {
        Self {
            target,
            phase: CapturePhase::Jumpscare,
            elapsed: 0.0,
            plan,
            held: Vec::new(),
            capture_view_active: false,
            voice_playing: false,
        }
    }

    pub fn target(&self) -> Entity {
        self.target
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn plan(&self) -> &CapturePlan {
        &self.plan
    }

    pub fn held(&self) -> &[SharedEffect] {
        &self.held
    }

    /// Длительность текущей фазы (Cleanup мгновенная)
    pub fn phase_duration(&self) -> f32 {
        match self.phase {
            CapturePhase::Jumpscare => self.plan.jumpscare_duration,
            CapturePhase::Hallucination => self
                .plan
                .hallucination
                .map(|h| h.duration)
                .unwrap_or(0.0),
            CapturePhase::Cleanup => 0.0,
        }
    }

    fn phase_complete(&self) -> bool {
        self.elapsed + PHASE_EPSILON >= self.phase_duration()
    }

    fn hold(
        &mut self,
        effect: SharedEffect,
        shared: &mut SharedEffects,
        bridge: &mut EventWriter<BridgeCommand>,
    ) {
        if self.held.contains(&effect) {
            return;
        }
        shared.acquire(effect, bridge);
        self.held.push(effect);
    }

    fn release(
        &mut self,
        effect: SharedEffect,
        shared: &mut SharedEffects,
        bridge: &mut EventWriter<BridgeCommand>,
    ) {
        let Some(index) = self.held.iter().position(|held| *held == effect) else {
            return;
        };
        self.held.remove(index);
        shared.release(effect, bridge);
    }
}

/// Система: старт capture sequences по CaptureRequest
///
/// Запросы на врага с активной sequence игнорируются (re-entry guard),
/// включая дубликаты внутри одного тика.
pub fn begin_capture_sequences(
    mut commands: Commands,
    mut requests: EventReader<CaptureRequest>,
    enemies: Query<(&Enemy, &EnemyTuning, Has<CaptureSequence>), With<ActiveEnemy>>,
    mut players: Query<(&PlayerView, Option<&mut ViewDistortion>)>,
    mut shared: ResMut<SharedEffects>,
    mut scheduled: ResMut<ScheduledEvents>,
    mut rng: ResMut<DeterministicRng>,
    mut bridge: EventWriter<BridgeCommand>,
    mut caught: EventWriter<PlayerCaught>,
    mut resets: EventWriter<CollectablesReset>,
) {
    let mut started: Vec<Entity> = Vec::new();
    let mut distortions: Vec<(Entity, DistortionPlan)> = Vec::new();

    for request in requests.read() {
        let Ok((enemy, tuning, in_sequence)) = enemies.get(request.enemy) else {
            crate::log_warning(&format!(
                "⚠️ CaptureRequest for unknown/inactive enemy {:?}",
                request.enemy
            ));
            continue;
        };

        if in_sequence || started.contains(&request.enemy) {
            crate::log(&format!(
                "Capture: {:?} already in capture sequence, request ignored",
                request.enemy
            ));
            continue;
        }
        started.push(request.enemy);

        // Sequence владеет врагом до cleanup: recovery от stun не должен сработать внутри
        if scheduled.cancel(request.enemy, ScheduledKind::StunRecovery) {
            crate::log(&format!(
                "Capture: {:?} stun recovery cancelled",
                request.enemy
            ));
        }

        let ctx = CaptureContext {
            enemy: request.enemy,
            target: request.target,
            tuning: *tuning,
        };
        let plan = enemy.profile().on_capture(&ctx);

        crate::log_info(&format!(
            "😱 {} {:?} captured {:?} (lives -{}, reset coins: {})",
            enemy.profile().name(),
            request.enemy,
            request.target,
            plan.lives_lost,
            plan.reset_collectables
        ));

        // 1. Gameplay последствия
        if plan.lives_lost > 0 {
            caught.write(PlayerCaught {
                player: request.target,
                count: plan.lives_lost,
            });
        }
        if plan.reset_collectables {
            resets.write(CollectablesReset);
        }

        let mut sequence = CaptureSequence::new(request.target, plan.clone());

        // 2. Freeze
        sequence.hold(SharedEffect::InputLock, &mut shared, &mut bridge);
        sequence.hold(SharedEffect::TensionSuspended, &mut shared, &mut bridge);

        // 3. Камера
        sequence.hold(SharedEffect::MainViewHidden, &mut shared, &mut bridge);
        bridge.write(BridgeCommand::ActivateViewpoint(Viewpoint::Capture(request.enemy)));
        sequence.capture_view_active = true;

        // 4. Presentation
        bridge.write(BridgeCommand::SetModelVisible {
            enemy: request.enemy,
            visible: false,
        });
        bridge.write(BridgeCommand::SetCaptureVisual {
            enemy: request.enemy,
            visible: true,
        });
        bridge.write(BridgeCommand::PlayCaptureAudio {
            enemy: request.enemy,
        });
        if let Some(trigger) = &plan.capture_trigger {
            bridge.write(BridgeCommand::TriggerAnimation {
                enemy: request.enemy,
                trigger: trigger.clone(),
            });
        }

        if let Some(distortion) = plan.distortion {
            distortions.push((request.target, distortion));
        }

        commands.entity(request.enemy).insert(sequence);
    }

    // Distortion после основного цикла: несколько captures одного игрока
    // в одном тике → один компонент, один input lock
    let mut distorted: Vec<Entity> = Vec::new();
    for (player, plan) in distortions {
        let Ok((view, mut existing)) = players.get_mut(player) else {
            crate::log_warning(&format!(
                "⚠️ Distortion target {:?} has no PlayerView, skipped",
                player
            ));
            continue;
        };

        if distorted.contains(&player) {
            // Компонент вставлен этим же тиком, commands ещё не применены
            continue;
        }
        distorted.push(player);

        let seed: u32 = rng.rng.gen();
        start_view_distortion(
            &mut commands,
            player,
            plan,
            *view,
            existing.as_deref_mut(),
            seed,
            &mut shared,
            &mut bridge,
        );
    }
}

/// Система: продвижение активных sequences + cleanup/respawn
pub fn advance_capture_sequences(
    mut commands: Commands,
    mut sequences: Query<(
        Entity,
        &mut CaptureSequence,
        &mut EnemyState,
        &mut Transform,
        Option<&mut NavAgent>,
        Option<&SpawnPose>,
    )>,
    mut shared: ResMut<SharedEffects>,
    mut rng: ResMut<DeterministicRng>,
    mut bridge: EventWriter<BridgeCommand>,
    mut changes: EventWriter<EnemyStateChanged>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut sequence, mut state, mut transform, nav, pose) in sequences.iter_mut() {
        sequence.elapsed += delta;

        // Нулевые длительности проходят несколько фаз за один тик
        while sequence.phase != CapturePhase::Cleanup && sequence.phase_complete() {
            sequence.elapsed = (sequence.elapsed - sequence.phase_duration()).max(0.0);

            match sequence.phase {
                CapturePhase::Jumpscare => {
                    if sequence.plan.hallucination.is_some() {
                        enter_hallucination(entity, &mut sequence, &mut shared, &mut rng, &mut bridge);
                        sequence.phase = CapturePhase::Hallucination;
                    } else {
                        sequence.phase = CapturePhase::Cleanup;
                    }
                }
                CapturePhase::Hallucination => {
                    sequence.phase = CapturePhase::Cleanup;
                }
                CapturePhase::Cleanup => {}
            }
        }

        if sequence.phase != CapturePhase::Cleanup {
            continue;
        }

        finish_sequence(entity, &mut sequence, &mut shared, &mut bridge);

        let previous = *state;
        match pose {
            Some(pose) => respawn(&mut transform, &mut state, nav.map(|n| n.into_inner()), pose),
            None => {
                crate::log_warning(&format!("⚠️ {:?}: no SpawnPose, respawn skipped", entity));
                *state = EnemyState::Idle;
            }
        }
        if previous != *state {
            changes.write(EnemyStateChanged {
                enemy: entity,
                from: previous,
                to: *state,
            });
        }

        commands.entity(entity).remove::<CaptureSequence>();
        crate::log_info(&format!("✅ {:?}: capture sequence finished, respawned", entity));
    }
}

/// Twin: capture камера гаснет раньше, включаются голоса и overlay
fn enter_hallucination(
    enemy: Entity,
    sequence: &mut CaptureSequence,
    shared: &mut SharedEffects,
    rng: &mut DeterministicRng,
    bridge: &mut EventWriter<BridgeCommand>,
) {
    bridge.write(BridgeCommand::SetCaptureVisual {
        enemy,
        visible: false,
    });
    if sequence.capture_view_active {
        bridge.write(BridgeCommand::DeactivateViewpoint(Viewpoint::Capture(enemy)));
        sequence.capture_view_active = false;
    }
    sequence.release(SharedEffect::MainViewHidden, shared, bridge);

    sequence.hold(SharedEffect::AmbientAudioPaused, shared, bridge);
    sequence.hold(SharedEffect::VisionOverlay, shared, bridge);

    if let Some(hallucination) = sequence.plan.hallucination {
        if hallucination.voice_clips > 0 {
            let clip = rng.rng.gen_range(0..hallucination.voice_clips);
            sequence.voice_playing = play_voice(bridge, enemy, clip, hallucination.voice_clips);
        }
    }

    crate::log(&format!("👁️ {:?}: hallucination started", enemy));
}

/// Cleanup в каноническом порядке: камера → модель → tension → input
fn finish_sequence(
    enemy: Entity,
    sequence: &mut CaptureSequence,
    shared: &mut SharedEffects,
    bridge: &mut EventWriter<BridgeCommand>,
) {
    if sequence.voice_playing {
        bridge.write(BridgeCommand::StopVoice { enemy });
        sequence.voice_playing = false;
    }

    if sequence.capture_view_active {
        bridge.write(BridgeCommand::SetCaptureVisual {
            enemy,
            visible: false,
        });
        bridge.write(BridgeCommand::DeactivateViewpoint(Viewpoint::Capture(enemy)));
        sequence.capture_view_active = false;
    }
    sequence.release(SharedEffect::MainViewHidden, shared, bridge);
    sequence.release(SharedEffect::VisionOverlay, shared, bridge);
    sequence.release(SharedEffect::AmbientAudioPaused, shared, bridge);

    bridge.write(BridgeCommand::SetModelVisible {
        enemy,
        visible: true,
    });

    sequence.release(SharedEffect::TensionSuspended, shared, bridge);
    sequence.release(SharedEffect::InputLock, shared, bridge);
}

/// Observer: sequence снята не через cleanup (despawn врага) → отпускаем всё что держала
pub fn release_abandoned_sequence(
    trigger: Trigger<OnRemove, CaptureSequence>,
    sequences: Query<&CaptureSequence>,
    mut shared: ResMut<SharedEffects>,
    mut bridge: EventWriter<BridgeCommand>,
) {
    let enemy = trigger.target();
    let Ok(sequence) = sequences.get(enemy) else {
        return;
    };
    if sequence.held.is_empty() && !sequence.voice_playing && !sequence.capture_view_active {
        return;
    }

    crate::log_warning(&format!(
        "⚠️ {:?}: capture sequence dropped mid-flight, releasing {} shared effects",
        enemy,
        sequence.held.len()
    ));
    if sequence.voice_playing {
        bridge.write(BridgeCommand::StopVoice { enemy });
    }
    if sequence.capture_view_active {
        bridge.write(BridgeCommand::SetCaptureVisual {
            enemy,
            visible: false,
        });
        bridge.write(BridgeCommand::DeactivateViewpoint(Viewpoint::Capture(enemy)));
    }
    for effect in sequence.held.iter().rev() {
        shared.release(*effect, &mut bridge);
    }
}

#[cfg(test)]
#[path = "sequence_tests.rs"]
mod sequence_tests;
