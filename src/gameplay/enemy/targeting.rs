//! Priority-weighted target selection.
//!
//! Each candidate scores `distance / weight`; the lowest score wins. Ties go
//! to the candidate evaluated first (player, then plants, then home). An
//! override target, while it exists, beats everything.

use bevy::prelude::*;

use super::config::TargetPriorities;
use super::{CurrentTarget, EnemyStats, EnemyStatus, OverrideTarget, TargetCategory};
use crate::gameplay::spatial::{CategoryMask, SpatialIndex};
use crate::gameplay::{Health, Home, Player, Untargetable};

/// One potential target as seen from an enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: Entity,
    pub category: TargetCategory,
    pub distance: f32,
    pub weight: f32,
}

impl Candidate {
    /// Weighted distance; `None` when the category is disabled (weight <= 0).
    #[must_use]
    pub fn score(&self) -> Option<f32> {
        (self.weight > 0.0).then(|| self.distance / self.weight)
    }
}

/// Lowest-scoring candidate. Earlier candidates win exact ties.
#[must_use]
pub fn select_target(candidates: impl IntoIterator<Item = Candidate>) -> Option<Candidate> {
    let mut best: Option<(Candidate, f32)> = None;
    for candidate in candidates {
        let Some(score) = candidate.score() else {
            continue;
        };
        if best.is_none_or(|(_, best_score)| score < best_score) {
            best = Some((candidate, score));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Where the player stands and whether it can be attacked right now.
#[derive(Debug, Clone, Copy)]
pub struct PlayerSighting {
    pub entity: Entity,
    pub position: Vec2,
    pub targetable: bool,
}

/// Gather eligible candidates for an enemy at `origin`, in tie-break order.
#[must_use]
pub fn gather_candidates(
    origin: Vec2,
    detection_range: f32,
    priorities: &TargetPriorities,
    player: Option<PlayerSighting>,
    plants: impl IntoIterator<Item = (Entity, Vec2)>,
    home: Option<(Entity, Vec2)>,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    if let Some(player) = player.filter(|p| p.targetable) {
        let distance = origin.distance(player.position);
        if distance <= detection_range {
            candidates.push(Candidate {
                entity: player.entity,
                category: TargetCategory::Player,
                distance,
                weight: priorities.player,
            });
        }
    }

    candidates.extend(plants.into_iter().map(|(entity, position)| Candidate {
        entity,
        category: TargetCategory::Plant,
        distance: origin.distance(position),
        weight: priorities.plant,
    }));

    if let Some((entity, position)) = home {
        let distance = origin.distance(position);
        if distance <= detection_range {
            candidates.push(Candidate {
                entity,
                category: TargetCategory::Home,
                distance,
                weight: priorities.home,
            });
        }
    }

    candidates
}

/// Re-evaluate every living enemy's target. Runs in `GameSet::Ai` after the
/// spatial index rebuild.
pub(super) fn find_targets(
    index: Res<SpatialIndex>,
    mut enemies: Query<(
        &GlobalTransform,
        &EnemyStats,
        &EnemyStatus,
        &mut CurrentTarget,
        &mut OverrideTarget,
    )>,
    players: Query<(Entity, &GlobalTransform, &Health, Has<Untargetable>), With<Player>>,
    homes: Query<(Entity, &GlobalTransform, &Health), With<Home>>,
    positions: Query<&GlobalTransform>,
) {
    let player = players
        .iter()
        .next()
        .map(|(entity, transform, health, hidden)| PlayerSighting {
            entity,
            position: transform.translation().xy(),
            targetable: health.is_alive() && !hidden,
        });
    let home = homes
        .iter()
        .find(|(_, _, health)| health.is_alive())
        .map(|(entity, transform, _)| (entity, transform.translation().xy()));

    for (transform, stats, status, mut current, mut forced) in &mut enemies {
        if status.is_dead {
            continue;
        }

        if let Some(entity) = forced.0 {
            if positions.contains(entity) {
                current.set_if_neq(CurrentTarget {
                    entity: Some(entity),
                    category: Some(TargetCategory::Override),
                });
                continue;
            }
            forced.0 = None;
        }

        let origin = transform.translation().xy();
        // The index only holds living actors.
        let mut plants = index.query_nearby(origin, stats.detection_range, CategoryMask::PLANT);
        plants.sort_unstable();
        plants.dedup();
        let plants = plants
            .into_iter()
            .filter_map(|entity| Some((entity, positions.get(entity).ok()?.translation().xy())));

        let candidates = gather_candidates(
            origin,
            stats.detection_range,
            &stats.priorities,
            player,
            plants,
            home,
        );
        let next = select_target(candidates).map_or_else(CurrentTarget::default, |best| {
            CurrentTarget {
                entity: Some(best.entity),
                category: Some(best.category),
            }
        });
        current.set_if_neq(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    fn player_at(entity: Entity, x: f32) -> Option<PlayerSighting> {
        Some(PlayerSighting {
            entity,
            position: Vec2::new(x, 0.0),
            targetable: true,
        })
    }

    fn equal_weights() -> TargetPriorities {
        TargetPriorities {
            player: 1.0,
            plant: 1.0,
            home: 1.0,
        }
    }

    #[test]
    fn lowest_weighted_distance_wins() {
        let e = entities(2);
        let priorities = TargetPriorities {
            player: 1.0,
            plant: 1.0,
            home: 4.0,
        };
        // Player 10 / 1 = 10, home 20 / 4 = 5.
        let candidates = gather_candidates(
            Vec2::ZERO,
            100.0,
            &priorities,
            player_at(e[0], 10.0),
            [],
            Some((e[1], Vec2::new(20.0, 0.0))),
        );

        let best = select_target(candidates).unwrap();

        assert_eq!(best.category, TargetCategory::Home);
        assert_eq!(best.entity, e[1]);
    }

    #[test]
    fn player_beats_home_when_weighted_closer() {
        let e = entities(2);
        let priorities = TargetPriorities {
            player: 1.0,
            plant: 1.0,
            home: 1.5,
        };
        // Player 10, home 20 / 1.5 = 13.3.
        let candidates = gather_candidates(
            Vec2::ZERO,
            100.0,
            &priorities,
            player_at(e[0], 10.0),
            [],
            Some((e[1], Vec2::new(20.0, 0.0))),
        );

        assert_eq!(select_target(candidates).unwrap().category, TargetCategory::Player);
    }

    #[test]
    fn out_of_range_home_is_never_selected() {
        let e = entities(1);
        let priorities = TargetPriorities {
            home: 100.0,
            ..equal_weights()
        };
        let candidates = gather_candidates(
            Vec2::ZERO,
            10.0,
            &priorities,
            None,
            [],
            Some((e[0], Vec2::new(11.0, 0.0))),
        );

        assert_eq!(select_target(candidates), None);
    }

    #[test]
    fn distant_plant_never_beats_close_player() {
        let e = entities(2);
        let candidates = gather_candidates(
            Vec2::ZERO,
            2000.0,
            &TargetPriorities::default(),
            player_at(e[0], 5.0),
            [(e[1], Vec2::new(1000.0, 0.0))],
            None,
        );

        assert_eq!(select_target(candidates).unwrap().entity, e[0]);
    }

    #[test]
    fn untargetable_player_is_skipped() {
        let e = entities(2);
        let hidden = Some(PlayerSighting {
            entity: e[0],
            position: Vec2::new(1.0, 0.0),
            targetable: false,
        });
        let candidates = gather_candidates(
            Vec2::ZERO,
            100.0,
            &equal_weights(),
            hidden,
            [(e[1], Vec2::new(50.0, 0.0))],
            None,
        );

        assert_eq!(select_target(candidates).unwrap().category, TargetCategory::Plant);
    }

    #[test]
    fn exact_tie_goes_to_evaluation_order() {
        let e = entities(3);
        let candidates = gather_candidates(
            Vec2::ZERO,
            100.0,
            &equal_weights(),
            player_at(e[0], 10.0),
            [(e[1], Vec2::new(0.0, 10.0))],
            Some((e[2], Vec2::new(-10.0, 0.0))),
        );
        assert_eq!(select_target(candidates).unwrap().category, TargetCategory::Player);

        let candidates = gather_candidates(
            Vec2::ZERO,
            100.0,
            &equal_weights(),
            None,
            [(e[1], Vec2::new(0.0, 10.0))],
            Some((e[2], Vec2::new(-10.0, 0.0))),
        );
        assert_eq!(select_target(candidates).unwrap().category, TargetCategory::Plant);
    }

    #[test]
    fn non_positive_weight_disables_category() {
        let e = entities(2);
        let priorities = TargetPriorities {
            player: 0.0,
            ..equal_weights()
        };
        let candidates = gather_candidates(
            Vec2::ZERO,
            100.0,
            &priorities,
            player_at(e[0], 1.0),
            [],
            Some((e[1], Vec2::new(90.0, 0.0))),
        );

        assert_eq!(select_target(candidates).unwrap().category, TargetCategory::Home);
    }

    #[test]
    fn nothing_in_range_selects_nothing() {
        let e = entities(2);
        let candidates = gather_candidates(
            Vec2::ZERO,
            10.0,
            &TargetPriorities::default(),
            player_at(e[0], 50.0),
            [],
            Some((e[1], Vec2::new(80.0, 0.0))),
        );

        assert!(candidates.is_empty());
        assert_eq!(select_target(candidates), None);
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::gameplay::Plant;
    use crate::gameplay::enemy::config::{Archetype, EnemyDefinition};
    use crate::gameplay::spatial::SpatialIndex;
    use crate::testing::{spawn_test_enemy, spawn_test_home, spawn_test_plant, spawn_test_player};
    use pretty_assertions::assert_eq;

    fn create_targeting_test_app() -> App {
        let mut app = crate::testing::create_test_app();
        app.init_resource::<SpatialIndex>();
        app.add_systems(
            Update,
            (
                crate::gameplay::spatial::rebuild_spatial_index,
                find_targets,
            )
                .chain(),
        );
        app
    }

    fn definition(detection_range: f32) -> EnemyDefinition {
        EnemyDefinition {
            detection_range,
            ..EnemyDefinition::fallback(Archetype::Skeleton)
        }
    }

    fn target_of(app: &App, enemy: Entity) -> CurrentTarget {
        *app.world().get::<CurrentTarget>(enemy).unwrap()
    }

    #[test]
    fn enemy_targets_nearby_plant_from_index() {
        let mut app = create_targeting_test_app();
        let enemy = spawn_test_enemy(&mut app, Archetype::Skeleton, &definition(100.0), 0.0, 0.0);
        let plant = spawn_test_plant(app.world_mut(), 30.0, 0.0, 10.0);

        app.update();

        assert_eq!(
            target_of(&app, enemy),
            CurrentTarget {
                entity: Some(plant),
                category: Some(TargetCategory::Plant)
            }
        );
    }

    #[test]
    fn override_target_takes_precedence_until_despawned() {
        let mut app = create_targeting_test_app();
        let enemy = spawn_test_enemy(&mut app, Archetype::Skeleton, &definition(100.0), 0.0, 0.0);
        let player = spawn_test_player(app.world_mut(), 5.0, 0.0, 100.0);
        let taunt = spawn_test_plant(app.world_mut(), 90.0, 0.0, 10.0);
        app.world_mut().get_mut::<OverrideTarget>(enemy).unwrap().0 = Some(taunt);

        app.update();
        assert_eq!(target_of(&app, enemy).entity, Some(taunt));
        assert_eq!(target_of(&app, enemy).category, Some(TargetCategory::Override));

        app.world_mut().despawn(taunt);
        app.update();

        assert_eq!(target_of(&app, enemy).entity, Some(player));
        assert_eq!(app.world().get::<OverrideTarget>(enemy).unwrap().0, None);
    }

    #[test]
    fn target_cleared_when_everything_leaves_range() {
        let mut app = create_targeting_test_app();
        let enemy = spawn_test_enemy(&mut app, Archetype::Skeleton, &definition(50.0), 0.0, 0.0);
        let player = spawn_test_player(app.world_mut(), 10.0, 0.0, 100.0);
        spawn_test_home(app.world_mut(), 500.0, 0.0);

        app.update();
        assert_eq!(target_of(&app, enemy).entity, Some(player));

        crate::testing::teleport(app.world_mut(), player, 200.0, 0.0);
        app.update();

        assert_eq!(target_of(&app, enemy), CurrentTarget::default());
    }

    #[test]
    fn dead_or_hidden_player_is_ignored() {
        let mut app = create_targeting_test_app();
        let enemy = spawn_test_enemy(&mut app, Archetype::Skeleton, &definition(100.0), 0.0, 0.0);
        let player = spawn_test_player(app.world_mut(), 10.0, 0.0, 100.0);
        app.world_mut().entity_mut(player).insert(Untargetable);

        app.update();
        assert_eq!(target_of(&app, enemy).entity, None);

        app.world_mut().entity_mut(player).remove::<Untargetable>();
        app.world_mut().get_mut::<Health>(player).unwrap().kill();
        app.update();
        assert_eq!(target_of(&app, enemy).entity, None);
    }

    #[test]
    fn other_plants_outside_detection_are_ignored() {
        let mut app = create_targeting_test_app();
        let enemy = spawn_test_enemy(&mut app, Archetype::Skeleton, &definition(40.0), 0.0, 0.0);
        app.world_mut().spawn((
            Plant,
            Health::new(10.0),
            GlobalTransform::from(Transform::from_xyz(60.0, 0.0, 0.0)),
        ));

        app.update();

        assert_eq!(target_of(&app, enemy).entity, None);
    }

    #[test]
    fn killed_plant_stops_being_targeted() {
        let mut app = create_targeting_test_app();
        let enemy = spawn_test_enemy(&mut app, Archetype::Skeleton, &definition(100.0), 0.0, 0.0);
        let near = spawn_test_plant(app.world_mut(), 20.0, 0.0, 10.0);
        let far = spawn_test_plant(app.world_mut(), 60.0, 0.0, 10.0);

        app.update();
        assert_eq!(target_of(&app, enemy).entity, Some(near));

        app.world_mut().get_mut::<Health>(near).unwrap().kill();
        app.update();

        assert_eq!(target_of(&app, enemy).entity, Some(far));
    }

    #[test]
    fn destroyed_home_is_not_a_target() {
        let mut app = create_targeting_test_app();
        let enemy = spawn_test_enemy(&mut app, Archetype::Skeleton, &definition(100.0), 0.0, 0.0);
        let home = spawn_test_home(app.world_mut(), 50.0, 0.0);

        app.update();
        assert_eq!(target_of(&app, enemy).entity, Some(home));

        app.world_mut().get_mut::<Health>(home).unwrap().kill();
        app.update();

        assert_eq!(target_of(&app, enemy), CurrentTarget::default());
    }
}
