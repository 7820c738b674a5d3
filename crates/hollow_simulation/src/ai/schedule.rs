//! ScheduledEvents — отложенные действия на simulated time
//!
//! Таймеры тикают только в FixedUpdate (Time<Fixed>), поэтому
//! поведение воспроизводимо независимо от frame rate.
//! Один таймер на пару (owner, kind): повторный arm заменяет существующий.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Допуск: 180 × (1/60) в f32 не даёт ровно 0
const FIRE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduledKind {
    /// Выход врага из Stunned
    StunRecovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub owner: Entity,
    pub kind: ScheduledKind,
    pub remaining: f32,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvents {
    entries: Vec<ScheduledEvent>,
}

impl ScheduledEvents {
    /// Поставить таймер. true если заменён уже взведённый.
    pub fn arm(&mut self, owner: Entity, kind: ScheduledKind, delay: f32) -> bool {
        let replaced = self.cancel(owner, kind);
        self.entries.push(ScheduledEvent {
            owner,
            kind,
            remaining: delay.max(0.0),
        });
        replaced
    }

    pub fn cancel(&mut self, owner: Entity, kind: ScheduledKind) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !(e.owner == owner && e.kind == kind));
        self.entries.len() != before
    }

    /// Снять все таймеры entity (despawn)
    pub fn cancel_all(&mut self, owner: Entity) {
        self.entries.retain(|e| e.owner != owner);
    }

    pub fn remaining(&self, owner: Entity, kind: ScheduledKind) -> Option<f32> {
        self.entries
            .iter()
            .find(|e| e.owner == owner && e.kind == kind)
            .map(|e| e.remaining)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Продвинуть время, вернуть сработавшие (в порядке arm)
    pub fn advance(&mut self, delta: f32) -> Vec<(Entity, ScheduledKind)> {
        let mut fired = Vec::new();

        self.entries.retain_mut(|entry| {
            entry.remaining -= delta;
            if entry.remaining <= FIRE_EPSILON {
                fired.push((entry.owner, entry.kind));
                false
            } else {
                true
            }
        });

        fired
    }
}

/// Observer: враг удалён → его таймеры больше не нужны
pub fn cancel_timers_on_despawn(
    trigger: Trigger<OnRemove, crate::components::Enemy>,
    mut scheduled: ResMut<ScheduledEvents>,
) {
    scheduled.cancel_all(trigger.target());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_and_fire() {
        let mut scheduled = ScheduledEvents::default();
        let owner = Entity::from_raw(1);

        assert!(!scheduled.arm(owner, ScheduledKind::StunRecovery, 1.0));
        assert!(scheduled.advance(0.5).is_empty());
        assert_eq!(scheduled.remaining(owner, ScheduledKind::StunRecovery), Some(0.5));

        let fired = scheduled.advance(0.5);
        assert_eq!(fired, vec![(owner, ScheduledKind::StunRecovery)]);
        assert!(scheduled.is_empty());
    }

    #[test]
    fn test_rearm_replaces_timer() {
        let mut scheduled = ScheduledEvents::default();
        let owner = Entity::from_raw(1);

        scheduled.arm(owner, ScheduledKind::StunRecovery, 1.0);
        scheduled.advance(0.75);
        assert!(scheduled.arm(owner, ScheduledKind::StunRecovery, 1.0));

        assert_eq!(scheduled.len(), 1);
        assert!(scheduled.advance(0.5).is_empty());
        assert_eq!(scheduled.advance(0.5).len(), 1);
    }

    #[test]
    fn test_fixed_ticks_fire_on_time() {
        let mut scheduled = ScheduledEvents::default();
        let owner = Entity::from_raw(3);
        scheduled.arm(owner, ScheduledKind::StunRecovery, 3.0);

        let tick = 1.0 / 60.0;
        for _ in 0..179 {
            assert!(scheduled.advance(tick).is_empty());
        }
        assert_eq!(scheduled.advance(tick).len(), 1);
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduled = ScheduledEvents::default();
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);

        scheduled.arm(a, ScheduledKind::StunRecovery, 1.0);
        scheduled.arm(b, ScheduledKind::StunRecovery, 1.0);
        scheduled.cancel_all(a);

        assert_eq!(scheduled.remaining(a, ScheduledKind::StunRecovery), None);
        assert!(scheduled.remaining(b, ScheduledKind::StunRecovery).is_some());
    }
}
