//! Shared presentation effects (input lock, main camera, tension, audio pause, overlay)
//!
//! Несколько capture sequences (и distortion) могут держать один эффект одновременно.
//! Каждый эффект — reference count:
//! - первый acquire → "freeze" команда
//! - последний release → "unfreeze" команда
//!
//! Так freeze/unfreeze всегда сбалансированы, даже при пересекающихся captures.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bridge::{BridgeCommand, Viewpoint};

/// Счётчик держателей эффекта
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefCount {
    holders: u32,
}

impl RefCount {
    /// true если это первый держатель
    pub fn acquire(&mut self) -> bool {
        self.holders += 1;
        self.holders == 1
    }

    /// true если это был последний держатель
    ///
    /// Release без acquire игнорируется (счётчик не уходит в минус).
    pub fn release(&mut self) -> bool {
        if self.holders == 0 {
            return false;
        }
        self.holders -= 1;
        self.holders == 0
    }

    pub fn holders(&self) -> u32 {
        self.holders
    }

    pub fn is_held(&self) -> bool {
        self.holders > 0
    }
}

/// Эффект с общим владением
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SharedEffect {
    InputLock,
    MainViewHidden,
    TensionSuspended,
    AmbientAudioPaused,
    VisionOverlay,
}

impl SharedEffect {
    fn freeze_command(self) -> BridgeCommand {
        match self {
            SharedEffect::InputLock => BridgeCommand::SetInputActive(false),
            SharedEffect::MainViewHidden => BridgeCommand::DeactivateViewpoint(Viewpoint::Main),
            SharedEffect::TensionSuspended => BridgeCommand::SetTensionSuspended(true),
            SharedEffect::AmbientAudioPaused => BridgeCommand::SetAmbientAudioPaused(true),
            SharedEffect::VisionOverlay => BridgeCommand::SetVisionOverlay(true),
        }
    }

    fn unfreeze_command(self) -> BridgeCommand {
        match self {
            SharedEffect::InputLock => BridgeCommand::SetInputActive(true),
            SharedEffect::MainViewHidden => BridgeCommand::ActivateViewpoint(Viewpoint::Main),
            SharedEffect::TensionSuspended => BridgeCommand::SetTensionSuspended(false),
            SharedEffect::AmbientAudioPaused => BridgeCommand::SetAmbientAudioPaused(false),
            SharedEffect::VisionOverlay => BridgeCommand::SetVisionOverlay(false),
        }
    }
}

/// Resource: ref counts всех shared эффектов
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedEffects {
    input_lock: RefCount,
    main_view_hidden: RefCount,
    tension_suspended: RefCount,
    ambient_audio_paused: RefCount,
    vision_overlay: RefCount,
}

impl SharedEffects {
    fn counter_mut(&mut self, effect: SharedEffect) -> &mut RefCount {
        match effect {
            SharedEffect::InputLock => &mut self.input_lock,
            SharedEffect::MainViewHidden => &mut self.main_view_hidden,
            SharedEffect::TensionSuspended => &mut self.tension_suspended,
            SharedEffect::AmbientAudioPaused => &mut self.ambient_audio_paused,
            SharedEffect::VisionOverlay => &mut self.vision_overlay,
        }
    }

    fn counter(&self, effect: SharedEffect) -> &RefCount {
        match effect {
            SharedEffect::InputLock => &self.input_lock,
            SharedEffect::MainViewHidden => &self.main_view_hidden,
            SharedEffect::TensionSuspended => &self.tension_suspended,
            SharedEffect::AmbientAudioPaused => &self.ambient_audio_paused,
            SharedEffect::VisionOverlay => &self.vision_overlay,
        }
    }

    pub fn holders(&self, effect: SharedEffect) -> u32 {
        self.counter(effect).holders()
    }

    pub fn is_held(&self, effect: SharedEffect) -> bool {
        self.counter(effect).is_held()
    }

    /// Нет ни одного держателя (после всех cleanup'ов)
    pub fn all_released(&self) -> bool {
        [
            SharedEffect::InputLock,
            SharedEffect::MainViewHidden,
            SharedEffect::TensionSuspended,
            SharedEffect::AmbientAudioPaused,
            SharedEffect::VisionOverlay,
        ]
        .iter()
        .all(|effect| !self.is_held(*effect))
    }

    pub fn acquire(&mut self, effect: SharedEffect, bridge: &mut EventWriter<BridgeCommand>) {
        if self.counter_mut(effect).acquire() {
            bridge.write(effect.freeze_command());
        }
    }

    pub fn release(&mut self, effect: SharedEffect, bridge: &mut EventWriter<BridgeCommand>) {
        if self.counter_mut(effect).release() {
            bridge.write(effect.unfreeze_command());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refcount_first_and_last_holder() {
        let mut count = RefCount::default();

        assert!(count.acquire());
        assert!(!count.acquire());
        assert_eq!(count.holders(), 2);

        assert!(!count.release());
        assert!(count.release());
        assert!(!count.is_held());
    }

    #[test]
    fn test_refcount_release_without_acquire() {
        let mut count = RefCount::default();
        assert!(!count.release());
        assert_eq!(count.holders(), 0);
    }

    #[test]
    fn test_shared_effects_start_released() {
        let effects = SharedEffects::default();
        assert!(effects.all_released());
        assert_eq!(effects.holders(SharedEffect::InputLock), 0);
    }
}
