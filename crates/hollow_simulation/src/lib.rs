//! Hollow Simulation Core
//!
//! ECS-симуляция врагов хоррор-игры на Bevy 0.16 (strategic layer):
//! FSM врагов, perception, capture sequences, stun, registry, player tension.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (состояния, решения, таймеры, shared effects)
//! - Engine = tactical layer (navmesh, камеры, аудио, анимации)
//! Связь: NavAgent (intent), SightCollider (геометрия для ray casts),
//! BridgeCommand (ordered presentation commands).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod bridge;
pub mod capture;
pub mod components;
pub mod config;
pub mod logger;
pub mod navigation;
pub mod perception;
pub mod player;

// Re-export для удобства
pub use ai::{AIPlugin, CaptureRequest, EnemyRegistry, EnemyStateChanged, StunRequest};
pub use bridge::{BridgePlugin, BridgeCommand, Viewpoint};
pub use capture::{Archetype, CapturePlugin, EnemyBehaviorProfile, SharedEffects};
pub use components::*;
pub use config::SimulationConfig;
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use navigation::HeadlessNavigationPlugin;
pub use player::{CoinPurse, PlayerPlugin};

/// Порядок фаз внутри одного FixedUpdate тика
///
/// Timers → Decide → Capture → Effects → Navigate → Ambient
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Валидация новых врагов, stun таймеры, stun requests
    Timers,
    /// FSM transitions
    Decide,
    /// Capture sequences (advance, затем begin)
    Capture,
    /// View distortion
    Effects,
    /// Исполнение NavAgent (headless executor или engine bridge)
    Navigate,
    /// Sanity, монеты, heartbeat
    Ambient,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// SimulationConfig читается при build() — вставлять resource ДО add_plugins.
/// Navigation executor не входит: headless → HeadlessNavigationPlugin, игра → engine bridge.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimulationConfig>()
            .cloned()
            .unwrap_or_default();

        logger::set_log_level(config.log_level);

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(config.seed));
        }

        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(config.tick_hz))
            .insert_resource(config)
            .configure_sets(
                FixedUpdate,
                (
                    SimSet::Timers,
                    SimSet::Decide,
                    SimSet::Capture,
                    SimSet::Effects,
                    SimSet::Navigate,
                    SimSet::Ambient,
                )
                    .chain(),
            )
            // Подсистемы (ECS strategic layer)
            .add_plugins((BridgePlugin, AIPlugin, CapturePlugin, PlayerPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Только runtime (MinimalPlugins + RNG + config), без SimulationPlugin:
/// тесты и binary добавляют нужные plugins сами.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(SimulationConfig {
            seed,
            ..default()
        })
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
