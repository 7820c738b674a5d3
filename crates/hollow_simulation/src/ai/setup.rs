//! Enemy setup — spawn bundle + одноразовая валидация collaborators
//!
//! validate_enemy_setup проверяет каждого нового врага ровно один раз (Added<Enemy>):
//! - SpawnPose: записываем из Transform, если не задан
//! - TrackedTarget: если пусто, берём Player
//! - NavAgent: без него враг навсегда Inert
//! - PatrolRoute / profile issues: только warnings

use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;

use crate::capture::EnemyBehaviorProfile;
use crate::components::{Enemy, Inert, NavAgent, PatrolRoute, Player, SpawnPose, TrackedTarget};

/// Проблема конфигурации врага
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetupIssue {
    /// Нет цели и нет Player в мире
    MissingTarget,
    /// Нет NavAgent (враг не может двигаться)
    MissingNavigation,
    /// Нет Transform (нечего respawn'ить)
    MissingTransform,
    /// Нет patrol waypoints (враг стоит в Idle пока не заметит цель)
    NoPatrolRoute,
    /// Hallucination без voice clips
    NoVoiceClips,
}

impl SetupIssue {
    /// Required collaborator → враг Inert
    pub fn is_fatal(&self) -> bool {
        matches!(self, SetupIssue::MissingNavigation | SetupIssue::MissingTransform)
    }
}

impl fmt::Display for SetupIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupIssue::MissingTarget => write!(f, "no tracked target and no Player to adopt"),
            SetupIssue::MissingNavigation => write!(f, "no NavAgent, enemy is inert"),
            SetupIssue::MissingTransform => write!(f, "no Transform, enemy is inert"),
            SetupIssue::NoPatrolRoute => write!(f, "no patrol waypoints configured"),
            SetupIssue::NoVoiceClips => write!(f, "hallucination has no voice clips"),
        }
    }
}

/// Всё что нужно врагу для работы (profile + tuning + nav + pose)
pub fn enemy_bundle(profile: Arc<dyn EnemyBehaviorProfile>, transform: Transform) -> impl Bundle {
    let tuning = profile.tuning();
    let name = Name::new(profile.name());

    (
        Enemy::new(profile),
        tuning,
        NavAgent::new(tuning.speed),
        SpawnPose::from_transform(&transform),
        transform,
        name,
    )
}

/// Система: валидация новых врагов (один раз на врага)
pub fn validate_enemy_setup(
    mut commands: Commands,
    mut new_enemies: Query<
        (
            Entity,
            &Enemy,
            &mut TrackedTarget,
            Option<&Transform>,
            Option<&SpawnPose>,
            Option<&NavAgent>,
            Option<&PatrolRoute>,
        ),
        Added<Enemy>,
    >,
    players: Query<Entity, With<Player>>,
) {
    for (entity, enemy, mut target, transform, pose, nav, route) in new_enemies.iter_mut() {
        let mut issues: Vec<SetupIssue> = Vec::new();

        match (pose, transform) {
            (Some(_), _) => {}
            (None, Some(transform)) => {
                commands.entity(entity).insert(SpawnPose::from_transform(transform));
            }
            (None, None) => issues.push(SetupIssue::MissingTransform),
        }

        if target.0.is_none() {
            // Детерминированный выбор если игроков несколько
            target.0 = players.iter().min();
            match target.0 {
                Some(player) => crate::log(&format!("AI: {:?} adopted player {:?} as target", entity, player)),
                None => issues.push(SetupIssue::MissingTarget),
            }
        }

        if nav.is_none() {
            issues.push(SetupIssue::MissingNavigation);
        }

        if route.map(|r| r.is_empty()).unwrap_or(true) {
            issues.push(SetupIssue::NoPatrolRoute);
        }

        issues.extend(enemy.profile().setup_issues());

        let mut inert = false;
        for issue in &issues {
            if issue.is_fatal() {
                inert = true;
                crate::log_error(&format!("❌ {} {:?}: {}", enemy.profile().name(), entity, issue));
            } else {
                crate::log_warning(&format!("⚠️ {} {:?}: {}", enemy.profile().name(), entity, issue));
            }
        }

        if inert {
            commands.entity(entity).insert(Inert);
        }
    }
}
