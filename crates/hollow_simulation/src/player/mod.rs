//! Player domain — всё что capture делает с игроком
//!
//! - sanity: PlayerCaught → жизни, PlayerDefeated
//! - coins: CoinPurse (CoinCollected / CollectablesReset)
//! - heartbeat: proximity tension от ближайшего врага

use bevy::prelude::*;

pub mod coins;
pub mod events;
pub mod heartbeat;
pub mod sanity;

pub use coins::{update_coin_purse, CoinPurse};
pub use events::{CoinCollected, CollectablesReset, PlayerCaught, PlayerDefeated};
pub use heartbeat::update_heartbeat;
pub use sanity::apply_player_caught;

use crate::SimSet;

/// Player Plugin (SimSet::Ambient — после capture и навигации этого тика)
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerCaught>()
            .add_event::<PlayerDefeated>()
            .add_event::<CoinCollected>()
            .add_event::<CollectablesReset>()
            .init_resource::<CoinPurse>()
            .add_systems(
                FixedUpdate,
                (apply_player_caught, update_coin_purse, update_heartbeat)
                    .chain()
                    .in_set(SimSet::Ambient),
            );
    }
}
