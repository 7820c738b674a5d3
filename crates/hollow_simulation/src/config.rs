//! Конфигурация симуляции (tick rate, seed, navigation thresholds)
//!
//! Загружается из JSON (headless binary, тесты) или берётся Default.
//! SimulationPlugin читает resource при build() — вставлять ДО add_plugins.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::logger::LogLevel;

/// Глобальные параметры симуляции
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Частота FixedUpdate (Hz)
    pub tick_hz: f64,
    /// Seed для DeterministicRng
    pub seed: u64,
    /// Remaining distance ниже которой waypoint считается достигнутым (метры)
    pub arrival_threshold: f32,
    /// Минимальный уровень логов
    pub log_level: LogLevel,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            arrival_threshold: 0.5,
            log_level: LogLevel::Debug,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
