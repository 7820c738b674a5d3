//! Bridge commands — ECS → presentation layer
//!
//! Симуляция не трогает камеры, аудио, модели и input напрямую.
//! Всё что должен сделать engine пишется как BridgeCommand (ordered event stream),
//! engine bridge читает их в порядке записи и применяет.
//!
//! Порядок внутри одного тика значим: capture sequence полагается на то,
//! что "freeze input" приходит раньше смены камеры и т.д.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Камера/viewpoint которой управляет симуляция
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Viewpoint {
    /// Основная камера игрока
    Main,
    /// Jumpscare камера конкретного врага
    Capture(Entity),
}

/// Команда presentation layer
#[derive(Event, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BridgeCommand {
    SetInputActive(bool),
    ActivateViewpoint(Viewpoint),
    DeactivateViewpoint(Viewpoint),
    /// Heartbeat / proximity tension (audio + animator)
    SetTensionSuspended(bool),
    SetAmbientAudioPaused(bool),
    /// Hallucination overlay поверх экрана
    SetVisionOverlay(bool),
    SetModelVisible { enemy: Entity, visible: bool },
    SetCaptureVisual { enemy: Entity, visible: bool },
    PlayCaptureAudio { enemy: Entity },
    /// One-shot animator trigger (jumpscare)
    TriggerAnimation { enemy: Entity, trigger: String },
    /// Looping clip для FSM состояния
    PlayAnimation { enemy: Entity, clip: String },
    PlayVoice { enemy: Entity, clip: usize },
    StopVoice { enemy: Entity },
}

/// Plugin: регистрирует BridgeCommand event
pub struct BridgePlugin;

impl Plugin for BridgePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BridgeCommand>();
    }
}

/// Voice clip по индексу с проверкой диапазона
///
/// Индекс вне [0, clip_count) → warning, команда не пишется.
pub fn play_voice(
    bridge: &mut EventWriter<BridgeCommand>,
    enemy: Entity,
    clip: usize,
    clip_count: usize,
) -> bool {
    if clip >= clip_count {
        crate::log_warning(&format!(
            "⚠️ {:?}: voice clip index {} out of range (have {})",
            enemy, clip, clip_count
        ));
        return false;
    }

    bridge.write(BridgeCommand::PlayVoice { enemy, clip });
    true
}
