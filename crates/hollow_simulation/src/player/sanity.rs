//! Sanity system — жизни игрока

use bevy::prelude::*;

use crate::components::Sanity;
use crate::player::events::{PlayerCaught, PlayerDefeated};

/// Система: PlayerCaught → минус жизни, PlayerDefeated на последней
pub fn apply_player_caught(
    mut caught: EventReader<PlayerCaught>,
    mut players: Query<&mut Sanity>,
    mut defeated: EventWriter<PlayerDefeated>,
) {
    for event in caught.read() {
        let Ok(mut sanity) = players.get_mut(event.player) else {
            crate::log_warning(&format!("⚠️ PlayerCaught for {:?} without Sanity", event.player));
            continue;
        };

        for _ in 0..event.count {
            if sanity.lose_life() {
                crate::log_info(&format!("💀 Player {:?} lost all sanity", event.player));
                defeated.write(PlayerDefeated {
                    player: event.player,
                });
            }
        }

        crate::log(&format!(
            "Sanity: {:?} {}/{}",
            event.player, sanity.current, sanity.max_lives
        ));
    }
}
