//! Tests for perception (view cone + ray casts).

#[cfg(test)]
mod tests {
    use bevy::ecs::system::SystemState;
    use bevy::prelude::*;

    use super::super::{can_see, RayCaster, SightQuery, SightTarget, ViewCone};
    use crate::components::SightCollider;

    /// Mock backend: луч всегда упирается в заданную entity
    struct FixedHit(Option<Entity>);

    impl RayCaster for FixedHit {
        fn first_hit(&self, _: Vec3, _: Vec3, _: f32, _: Option<Entity>) -> Option<Entity> {
            self.0
        }
    }

    fn observer() -> Entity {
        Entity::from_raw(1)
    }

    fn player() -> Entity {
        Entity::from_raw(2)
    }

    /// Наблюдатель в origin, смотрит в -Z (Bevy forward)
    fn cone() -> ViewCone {
        ViewCone {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            fov_half_angle_deg: 60.0,
            vision_range: 10.0,
        }
    }

    fn target_at(position: Vec3) -> Option<SightTarget> {
        Some(SightTarget {
            entity: player(),
            position,
        })
    }

    #[test]
    fn test_visible_in_front() {
        let rays = FixedHit(Some(player()));
        assert!(can_see(&cone(), observer(), target_at(Vec3::new(0.0, 0.0, -5.0)), &rays));
    }

    #[test]
    fn test_out_of_range() {
        let rays = FixedHit(Some(player()));
        assert!(!can_see(&cone(), observer(), target_at(Vec3::new(0.0, 0.0, -10.5)), &rays));
    }

    #[test]
    fn test_outside_fov() {
        let rays = FixedHit(Some(player()));
        // Сзади
        assert!(!can_see(&cone(), observer(), target_at(Vec3::new(0.0, 0.0, 5.0)), &rays));
        // Сбоку под 90°
        assert!(!can_see(&cone(), observer(), target_at(Vec3::new(5.0, 0.0, 0.0)), &rays));
    }

    #[test]
    fn test_occluded_by_scenery() {
        let wall = Entity::from_raw(3);
        let rays = FixedHit(Some(wall));
        assert!(!can_see(&cone(), observer(), target_at(Vec3::new(0.0, 0.0, -5.0)), &rays));
    }

    #[test]
    fn test_no_target_is_never_visible() {
        let rays = FixedHit(Some(player()));
        assert!(!can_see(&cone(), observer(), None, &rays));
    }

    #[test]
    fn test_zero_distance_is_visible() {
        // Луч даже не кастуется — backend без hit не мешает
        let rays = FixedHit(None);
        assert!(can_see(&cone(), observer(), target_at(Vec3::ZERO), &rays));
    }

    #[test]
    fn test_sight_query_wall_blocks_player() {
        let mut world = World::new();
        let player = world
            .spawn((Transform::from_xyz(0.0, 0.0, -8.0), SightCollider::ball(0.5)))
            .id();
        let wall = world
            .spawn((
                Transform::from_xyz(0.0, 0.0, -4.0),
                SightCollider::cuboid(Vec3::new(2.0, 2.0, 0.1)),
            ))
            .id();

        let mut state = SystemState::<SightQuery>::new(&mut world);
        let sight = state.get(&world);

        let hit = sight.first_hit(Vec3::ZERO, Vec3::NEG_Z, 10.0, None);
        assert_eq!(hit, Some(wall));

        // Луч в сторону — мимо обоих
        let miss = sight.first_hit(Vec3::ZERO, Vec3::X, 10.0, None);
        assert_eq!(miss, None);

        let target = Some(SightTarget {
            entity: player,
            position: Vec3::new(0.0, 0.0, -8.0),
        });
        assert!(!can_see(&cone(), observer(), target, &sight));
    }

    #[test]
    fn test_sight_query_clear_line() {
        let mut world = World::new();
        let player = world
            .spawn((Transform::from_xyz(0.0, 0.0, -6.0), SightCollider::ball(0.5)))
            .id();
        // Стена в стороне от луча
        world.spawn((
            Transform::from_xyz(5.0, 0.0, -3.0),
            SightCollider::cuboid(Vec3::new(0.5, 2.0, 0.5)),
        ));

        let mut state = SystemState::<SightQuery>::new(&mut world);
        let sight = state.get(&world);

        let target = Some(SightTarget {
            entity: player,
            position: Vec3::new(0.0, 0.0, -6.0),
        });
        assert!(can_see(&cone(), observer(), target, &sight));
    }
}
