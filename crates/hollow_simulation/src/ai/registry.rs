//! EnemyRegistry — множество активных врагов
//!
//! Членство = наличие ActiveEnemy на entity с Enemy.
//! Поддерживается observers (OnAdd/OnRemove), поэтому despawn
//! автоматически убирает врага из реестра.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::components::{ActiveEnemy, Enemy};

#[derive(Resource, Debug, Clone, Default)]
pub struct EnemyRegistry {
    members: HashSet<Entity>,
}

impl EnemyRegistry {
    /// true если не был зарегистрирован
    pub fn register(&mut self, enemy: Entity) -> bool {
        self.members.insert(enemy)
    }

    pub fn unregister(&mut self, enemy: Entity) -> bool {
        self.members.remove(&enemy)
    }

    pub fn contains(&self, enemy: Entity) -> bool {
        self.members.contains(&enemy)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.members.iter().copied()
    }

    /// Ближайший враг к точке
    ///
    /// `position_of` → None для entity без позиции (пропускается).
    /// Равные дистанции → меньший Entity (HashSet не упорядочен).
    pub fn nearest(
        &self,
        from: Vec3,
        position_of: impl Fn(Entity) -> Option<Vec3>,
    ) -> Option<(Entity, f32)> {
        let mut best: Option<(Entity, f32)> = None;

        for enemy in self.members.iter().copied() {
            let Some(position) = position_of(enemy) else {
                continue;
            };
            let distance = from.distance(position);

            let closer = match best {
                None => true,
                Some((best_enemy, best_distance)) => {
                    distance < best_distance || (distance == best_distance && enemy < best_enemy)
                }
            };
            if closer {
                best = Some((enemy, distance));
            }
        }

        best
    }
}

/// Observer: ActiveEnemy добавлен → register
pub fn register_active_enemy(
    trigger: Trigger<OnAdd, ActiveEnemy>,
    enemies: Query<(), With<Enemy>>,
    mut registry: ResMut<EnemyRegistry>,
) {
    let entity = trigger.target();
    if enemies.get(entity).is_err() {
        return;
    }

    if registry.register(entity) {
        crate::log(&format!("📋 Registry: {:?} registered ({} active)", entity, registry.len()));
    }
}

/// Observer: ActiveEnemy снят (или entity despawned) → unregister
pub fn unregister_inactive_enemy(
    trigger: Trigger<OnRemove, ActiveEnemy>,
    mut registry: ResMut<EnemyRegistry>,
) {
    let entity = trigger.target();
    if registry.unregister(entity) {
        crate::log(&format!("📋 Registry: {:?} unregistered ({} active)", entity, registry.len()));
    }
}
