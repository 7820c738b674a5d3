//! AI decision-making module
//!
//! Enemy FSM (Idle/Patrolling/Chasing/Attacking/Stunned) + вспомогательные части:
//! - events: StunRequest, CaptureRequest, EnemyStateChanged
//! - schedule: ScheduledEvents (stun recovery таймеры)
//! - registry: EnemyRegistry (активные враги, nearest)
//! - setup: enemy_bundle + validate_enemy_setup

use bevy::prelude::*;

pub mod events;
pub mod fsm;
pub mod registry;
pub mod schedule;
pub mod setup;
pub mod stun;

// Re-export основных типов
pub use events::{CaptureRequest, EnemyStateChanged, StunRequest};
pub use fsm::{decide_transition, enemy_fsm_transitions, respawn, DecisionContext, Perceived, Transition};
pub use registry::EnemyRegistry;
pub use schedule::{ScheduledEvent, ScheduledEvents, ScheduledKind};
pub use setup::{enemy_bundle, validate_enemy_setup, SetupIssue};
pub use stun::{apply_stun_requests, tick_scheduled_events};

use crate::SimSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. validate_enemy_setup — новые враги (Timers)
/// 2. tick_scheduled_events — stun recovery (Timers)
/// 3. apply_stun_requests — новые stuns (Timers, после тика: stun тикает со следующего тика)
/// 4. enemy_fsm_transitions — решения FSM (Decide)
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<StunRequest>()
            .add_event::<CaptureRequest>()
            .add_event::<EnemyStateChanged>()
            .init_resource::<EnemyRegistry>()
            .init_resource::<ScheduledEvents>()
            .add_observer(registry::register_active_enemy)
            .add_observer(registry::unregister_inactive_enemy)
            .add_observer(schedule::cancel_timers_on_despawn)
            .add_systems(
                FixedUpdate,
                (validate_enemy_setup, tick_scheduled_events, apply_stun_requests)
                    .chain() // Последовательное выполнение для детерминизма
                    .in_set(SimSet::Timers),
            )
            .add_systems(FixedUpdate, enemy_fsm_transitions.in_set(SimSet::Decide));
    }
}
