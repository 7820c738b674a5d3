//! Capture domain — что происходит когда враг ловит игрока
//!
//! - profile: archetype strategies (EnemyBehaviorProfile + CapturePlan)
//! - effects: ref-counted shared presentation effects
//! - sequence: CaptureSequence (jumpscare → hallucination → cleanup/respawn)
//! - distortion: ViewDistortion на камере игрока

use bevy::prelude::*;

pub mod distortion;
pub mod effects;
pub mod profile;
pub mod sequence;

pub use distortion::{animate_view_distortion, ViewDistortion};
pub use effects::{RefCount, SharedEffect, SharedEffects};
pub use profile::{
    Archetype, Basela, CaptureContext, CapturePlan, DistortionPlan, EnemyBehaviorProfile,
    HallucinationPlan, Reeper, Stalker, Twin, WhiteClown,
};
pub use sequence::{advance_capture_sequences, begin_capture_sequences, CapturePhase, CaptureSequence};

use crate::SimSet;

/// Capture Plugin
///
/// Порядок внутри SimSet::Capture:
/// 1. advance_capture_sequences — sequence начатая в тике N впервые тикает в N+1
/// 2. begin_capture_sequences — CaptureRequest от FSM этого тика
///
/// SimSet::Effects: animate_view_distortion
pub struct CapturePlugin;

impl Plugin for CapturePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SharedEffects>()
            .add_observer(sequence::release_abandoned_sequence)
            .add_observer(distortion::release_distortion_on_remove)
            .add_systems(
                FixedUpdate,
                (advance_capture_sequences, begin_capture_sequences)
                    .chain()
                    .in_set(SimSet::Capture),
            )
            .add_systems(FixedUpdate, animate_view_distortion.in_set(SimSet::Effects));
    }
}
