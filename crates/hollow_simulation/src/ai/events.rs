//! AI Events — входящие запросы и исходящие уведомления FSM
//!
//! Входящие (внешний код / gameplay триггеры):
//! - StunRequest: оглушить врага на duration секунд
//! - CaptureRequest: FSM (или внешний триггер) запускает capture sequence
//!
//! Исходящие:
//! - EnemyStateChanged: каждая смена EnemyState (для bridge/debug UI/тестов)

use bevy::prelude::*;

use crate::components::EnemyState;

/// Оглушить врага
///
/// Игнорируется пока у врага активна capture sequence.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StunRequest {
    pub enemy: Entity,
    /// Секунды (отрицательные/NaN отклоняются)
    pub duration: f32,
}

/// Враг поймал цель → capture sequence
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub enemy: Entity,
    pub target: Entity,
}

/// Смена состояния FSM
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyStateChanged {
    pub enemy: Entity,
    pub from: EnemyState,
    pub to: EnemyState,
}
