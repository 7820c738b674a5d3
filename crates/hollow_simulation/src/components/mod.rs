//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: игрок (Player, PlayerView, Sanity, Heartbeat)
//! - ai: враг (Enemy, EnemyState, EnemyTuning, AttackClock, PatrolRoute, TrackedTarget)
//! - movement: navigation adapter (NavAgent)
//! - world: spawn pose и sight colliders (SpawnPose, SightCollider)

pub mod actor;
pub mod ai;
pub mod movement;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use ai::*;
pub use movement::*;
pub use world::*;
