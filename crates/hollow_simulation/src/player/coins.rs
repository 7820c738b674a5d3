//! Coin economy — счётчик собранных монет

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::player::events::{CoinCollected, CollectablesReset};

/// Сколько монет собрано из total
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinPurse {
    pub collected: u32,
    pub total: u32,
}

impl Default for CoinPurse {
    fn default() -> Self {
        Self {
            collected: 0,
            total: 10,
        }
    }
}

impl CoinPurse {
    pub fn is_complete(&self) -> bool {
        self.collected >= self.total
    }
}

pub fn update_coin_purse(
    mut collected: EventReader<CoinCollected>,
    mut resets: EventReader<CollectablesReset>,
    mut purse: ResMut<CoinPurse>,
) {
    for _ in collected.read() {
        purse.collected = (purse.collected + 1).min(purse.total);
    }

    // Reset после подборов этого тика: capture забирает всё
    if resets.read().count() > 0 {
        crate::log_info(&format!("💸 All coins lost ({} dropped)", purse.collected));
        purse.collected = 0;
    }
}
