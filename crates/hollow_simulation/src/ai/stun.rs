//! Stun — внешнее оглушение врага
//!
//! StunRequest → Stunned + движение приостановлено + таймер StunRecovery.
//! Повторный stun перевзводит таймер (не суммирует).
//! Длительность ≤ 0 или не finite отклоняется.
//! Во время capture sequence stun игнорируется.

use bevy::prelude::*;

use crate::ai::events::{EnemyStateChanged, StunRequest};
use crate::ai::schedule::{ScheduledEvents, ScheduledKind};
use crate::capture::CaptureSequence;
use crate::components::{Enemy, EnemyState, NavAgent};

/// Система: применение StunRequest
pub fn apply_stun_requests(
    mut requests: EventReader<StunRequest>,
    mut enemies: Query<(&mut EnemyState, Option<&mut NavAgent>, Has<CaptureSequence>), With<Enemy>>,
    mut scheduled: ResMut<ScheduledEvents>,
    mut changes: EventWriter<EnemyStateChanged>,
) {
    for request in requests.read() {
        if !(request.duration > 0.0) || !request.duration.is_finite() {
            crate::log_warning(&format!(
                "⚠️ StunRequest for {:?} rejected: invalid duration {}",
                request.enemy, request.duration
            ));
            continue;
        }

        let Ok((mut state, nav, in_capture)) = enemies.get_mut(request.enemy) else {
            crate::log_warning(&format!("⚠️ StunRequest for unknown enemy {:?}", request.enemy));
            continue;
        };

        if in_capture {
            crate::log(&format!(
                "Stun: {:?} is in capture sequence, stun ignored",
                request.enemy
            ));
            continue;
        }

        if let Some(mut nav) = nav {
            nav.set_movement_suspended(true);
        }

        let rearmed = scheduled.arm(request.enemy, ScheduledKind::StunRecovery, request.duration);

        if *state != EnemyState::Stunned {
            changes.write(EnemyStateChanged {
                enemy: request.enemy,
                from: *state,
                to: EnemyState::Stunned,
            });
            *state = EnemyState::Stunned;
        }

        crate::log(&format!(
            "💫 {:?} stunned for {:.2}s{}",
            request.enemy,
            request.duration,
            if rearmed { " (timer re-armed)" } else { "" }
        ));
    }
}

/// Система: тик ScheduledEvents + обработка сработавших
pub fn tick_scheduled_events(
    mut scheduled: ResMut<ScheduledEvents>,
    mut enemies: Query<(&mut EnemyState, Option<&mut NavAgent>), With<Enemy>>,
    mut changes: EventWriter<EnemyStateChanged>,
    time: Res<Time<Fixed>>,
) {
    let fired = scheduled.advance(time.delta_secs());

    for (owner, kind) in fired {
        match kind {
            ScheduledKind::StunRecovery => {
                let Ok((mut state, nav)) = enemies.get_mut(owner) else {
                    continue;
                };

                if let Some(mut nav) = nav {
                    nav.set_movement_suspended(false);
                }

                if *state == EnemyState::Stunned {
                    changes.write(EnemyStateChanged {
                        enemy: owner,
                        from: EnemyState::Stunned,
                        to: EnemyState::Idle,
                    });
                    *state = EnemyState::Idle;
                    crate::log(&format!("💫 {:?} recovered from stun → Idle", owner));
                }
            }
        }
    }
}
