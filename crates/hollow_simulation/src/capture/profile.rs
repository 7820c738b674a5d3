//! Behavior profiles — archetype strategy для врагов
//!
//! Один FSM на всех, различия archetype'ов сведены к:
//! - tuning (скорость, зрение, aggro)
//! - CapturePlan (что происходит при поимке игрока)
//! - animation clips по состояниям
//!
//! Новый archetype = новый impl EnemyBehaviorProfile, FSM не меняется.

use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::SetupIssue;
use crate::components::{EnemyState, EnemyTuning};

/// Контекст capture (кто кого поймал)
#[derive(Debug, Clone, Copy)]
pub struct CaptureContext {
    pub enemy: Entity,
    pub target: Entity,
    pub tuning: EnemyTuning,
}

/// Hallucination фаза (Twin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HallucinationPlan {
    pub duration: f32,
    /// Сколько voice clips доступно (выбор через DeterministicRng)
    pub voice_clips: usize,
}

/// View distortion эффект на игроке (WhiteClown)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistortionPlan {
    pub duration: f32,
    pub intensity: f32,
}

/// Что делает capture sequence для конкретного archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturePlan {
    pub lives_lost: u32,
    pub reset_collectables: bool,
    pub jumpscare_duration: f32,
    /// Animator trigger для jumpscare
    pub capture_trigger: Option<String>,
    pub hallucination: Option<HallucinationPlan>,
    pub distortion: Option<DistortionPlan>,
}

impl CapturePlan {
    /// Базовая последовательность: минус одна жизнь, jumpscare, respawn
    pub fn canonical(jumpscare_duration: f32) -> Self {
        Self {
            lives_lost: 1,
            reset_collectables: false,
            jumpscare_duration,
            capture_trigger: Some("Jumpscare".to_string()),
            hallucination: None,
            distortion: None,
        }
    }
}

/// Archetype strategy
pub trait EnemyBehaviorProfile: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn tuning(&self) -> EnemyTuning;

    fn on_capture(&self, ctx: &CaptureContext) -> CapturePlan;

    /// Clip для FSM состояния (None = не трогаем animator)
    fn animation_for(&self, state: EnemyState) -> Option<&'static str>;

    /// Non-fatal проблемы конфигурации archetype'а (проверяются при спавне)
    fn setup_issues(&self) -> Vec<SetupIssue> {
        Vec::new()
    }
}

/// Clips для archetype'ов без своего animator set
fn shared_clip(state: EnemyState) -> Option<&'static str> {
    match state {
        EnemyState::Idle => Some("Idle"),
        EnemyState::Patrolling => Some("Walk"),
        EnemyState::Chasing => Some("Run"),
        EnemyState::Attacking => Some("Attack"),
        EnemyState::Stunned => None,
    }
}

/// Базовый преследователь
#[derive(Debug, Clone, Copy, Default)]
pub struct Stalker;

impl EnemyBehaviorProfile for Stalker {
    fn name(&self) -> &'static str {
        "Stalker"
    }

    fn tuning(&self) -> EnemyTuning {
        EnemyTuning::default()
    }

    fn on_capture(&self, ctx: &CaptureContext) -> CapturePlan {
        CapturePlan::canonical(ctx.tuning.jumpscare_duration)
    }

    fn animation_for(&self, state: EnemyState) -> Option<&'static str> {
        shared_clip(state)
    }
}

/// Basela: при поимке сбрасывает собранные монеты
#[derive(Debug, Clone, Copy, Default)]
pub struct Basela;

impl EnemyBehaviorProfile for Basela {
    fn name(&self) -> &'static str {
        "Basela"
    }

    fn tuning(&self) -> EnemyTuning {
        EnemyTuning {
            speed: 4.5,
            vision_range: 12.0,
            fov_half_angle_deg: 50.0,
            ..default()
        }
    }

    fn on_capture(&self, ctx: &CaptureContext) -> CapturePlan {
        CapturePlan {
            reset_collectables: true,
            ..CapturePlan::canonical(ctx.tuning.jumpscare_duration)
        }
    }

    fn animation_for(&self, state: EnemyState) -> Option<&'static str> {
        shared_clip(state)
    }
}

/// Reeper: отнимает две жизни
#[derive(Debug, Clone, Copy, Default)]
pub struct Reeper;

impl EnemyBehaviorProfile for Reeper {
    fn name(&self) -> &'static str {
        "Reeper"
    }

    fn tuning(&self) -> EnemyTuning {
        EnemyTuning {
            speed: 4.0,
            vision_range: 12.0,
            aggro_range: 10.0,
            ..default()
        }
    }

    fn on_capture(&self, ctx: &CaptureContext) -> CapturePlan {
        CapturePlan {
            lives_lost: 2,
            ..CapturePlan::canonical(ctx.tuning.jumpscare_duration)
        }
    }

    fn animation_for(&self, state: EnemyState) -> Option<&'static str> {
        match state {
            EnemyState::Idle => Some("ReeperIdle"),
            EnemyState::Patrolling => Some("ReeperWalk"),
            EnemyState::Chasing => Some("ReeperRun"),
            EnemyState::Attacking => Some("ReeperAttack"),
            EnemyState::Stunned => None,
        }
    }
}

/// Twin: после jumpscare — hallucination фаза (голоса + overlay)
#[derive(Debug, Clone, Copy)]
pub struct Twin {
    pub hallucination_duration: f32,
    pub voice_clips: usize,
}

impl Default for Twin {
    fn default() -> Self {
        Self {
            hallucination_duration: 10.0,
            voice_clips: 3,
        }
    }
}

impl EnemyBehaviorProfile for Twin {
    fn name(&self) -> &'static str {
        "Twin"
    }

    fn tuning(&self) -> EnemyTuning {
        EnemyTuning::default()
    }

    fn on_capture(&self, ctx: &CaptureContext) -> CapturePlan {
        CapturePlan {
            hallucination: Some(HallucinationPlan {
                duration: self.hallucination_duration,
                voice_clips: self.voice_clips,
            }),
            ..CapturePlan::canonical(ctx.tuning.jumpscare_duration)
        }
    }

    fn animation_for(&self, state: EnemyState) -> Option<&'static str> {
        shared_clip(state)
    }

    fn setup_issues(&self) -> Vec<SetupIssue> {
        if self.voice_clips == 0 {
            vec![SetupIssue::NoVoiceClips]
        } else {
            Vec::new()
        }
    }
}

/// WhiteClown: искажает камеру игрока после поимки
#[derive(Debug, Clone, Copy)]
pub struct WhiteClown {
    pub distortion_duration: f32,
    pub distortion_intensity: f32,
}

impl Default for WhiteClown {
    fn default() -> Self {
        Self {
            distortion_duration: 10.0,
            distortion_intensity: 1.5,
        }
    }
}

impl EnemyBehaviorProfile for WhiteClown {
    fn name(&self) -> &'static str {
        "WhiteClown"
    }

    fn tuning(&self) -> EnemyTuning {
        EnemyTuning {
            speed: 5.0,
            vision_range: 15.0,
            ..default()
        }
    }

    fn on_capture(&self, ctx: &CaptureContext) -> CapturePlan {
        CapturePlan {
            distortion: Some(DistortionPlan {
                duration: self.distortion_duration,
                intensity: self.distortion_intensity,
            }),
            ..CapturePlan::canonical(ctx.tuning.jumpscare_duration)
        }
    }

    fn animation_for(&self, state: EnemyState) -> Option<&'static str> {
        match state {
            EnemyState::Idle => Some("ClownIdle"),
            EnemyState::Patrolling => Some("ClownWalk"),
            EnemyState::Chasing => Some("ClownRun"),
            EnemyState::Attacking => Some("ClownAttack"),
            EnemyState::Stunned => None,
        }
    }
}

/// Archetype preset (для конфигов / headless сцены)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Stalker,
    Basela,
    Reeper,
    Twin,
    WhiteClown,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Stalker,
        Archetype::Basela,
        Archetype::Reeper,
        Archetype::Twin,
        Archetype::WhiteClown,
    ];

    pub fn profile(self) -> Arc<dyn EnemyBehaviorProfile> {
        match self {
            Archetype::Stalker => Arc::new(Stalker),
            Archetype::Basela => Arc::new(Basela),
            Archetype::Reeper => Arc::new(Reeper),
            Archetype::Twin => Arc::new(Twin::default()),
            Archetype::WhiteClown => Arc::new(WhiteClown::default()),
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name())
    }
}
