//! Player events (lives, collectables)

use bevy::prelude::*;

/// Event: враг поймал игрока
///
/// Генерируется:
/// - begin_capture_sequences (count = CapturePlan::lives_lost)
///
/// Обрабатывается:
/// - apply_player_caught: минус `count` жизней
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerCaught {
    pub player: Entity,
    pub count: u32,
}

/// Event: жизни закончились (ровно один раз на игрока)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDefeated {
    pub player: Entity,
}

/// Event: игрок подобрал монету
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinCollected;

/// Event: все собранные монеты потеряны (Basela capture)
///
/// Engine bridge по нему же пересоздаёт монеты на уровне.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectablesReset;
