//! Enemies in the demo garden, driven by the full gameplay plugin.

use std::time::Duration;

use bevy::ecs::message::Messages;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use bevy::transform::TransformPlugin;
use garden_siege::GameState;
use garden_siege::gameplay::combat::{Projectile, ProjectilePool};
use garden_siege::gameplay::enemy::{
    Archetype, CurrentTarget, Enemy, EnemyDefinition, EnemyStatus, Minion, TargetCategory,
    spawn_enemy,
};
use garden_siege::gameplay::feedback::EnemyDied;
use garden_siege::gameplay::{Health, Plant, Player};

fn create_garden_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins((StatesPlugin, TransformPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)));
    app.add_plugins(garden_siege::plugin);
    // Loading, then the garden spawns.
    app.update();
    app.update();
    app
}

fn enemies(app: &mut App) -> Vec<Entity> {
    app.world_mut()
        .query_filtered::<Entity, With<Enemy>>()
        .iter(app.world())
        .collect()
}

#[test]
fn garden_enemies_acquire_targets() {
    let mut app = create_garden_app();

    app.update();

    let targets: Vec<CurrentTarget> = app
        .world_mut()
        .query::<&CurrentTarget>()
        .iter(app.world())
        .copied()
        .collect();
    assert_eq!(targets.len(), 4);
    assert!(targets.iter().all(|target| target.entity.is_some()));
    assert!(
        targets
            .iter()
            .all(|target| target.category != Some(TargetCategory::Override))
    );
}

#[test]
fn killed_enemies_report_death_once_and_disappear() {
    let mut app = create_garden_app();
    let all = enemies(&mut app);
    assert_eq!(all.len(), 4);

    for enemy in &all {
        app.world_mut().get_mut::<Health>(*enemy).unwrap().kill();
    }
    app.update();

    for enemy in &all {
        assert!(app.world().get::<EnemyStatus>(*enemy).unwrap().is_dead);
    }
    let deaths = app.world().resource::<Messages<EnemyDied>>();
    assert_eq!(deaths.iter_current_update_messages().count(), 4);

    for _ in 0..40 {
        app.update();
    }
    assert!(enemies(&mut app).is_empty());
}

#[test]
fn player_survives_a_quiet_garden() {
    let mut app = create_garden_app();
    let player = app
        .world_mut()
        .query_filtered::<Entity, With<Player>>()
        .single(app.world())
        .unwrap();

    app.update();

    assert!(app.world().get::<Health>(player).unwrap().is_alive());
}

#[test]
fn destroyed_plant_is_removed_and_forgotten() {
    let mut app = create_garden_app();
    let doomed = app
        .world_mut()
        .query_filtered::<Entity, With<Plant>>()
        .iter(app.world())
        .next()
        .unwrap();

    app.world_mut().get_mut::<Health>(doomed).unwrap().kill();
    app.update();
    assert!(app.world().get_entity(doomed).is_err());

    app.update();
    let still_targeted = app
        .world_mut()
        .query::<&CurrentTarget>()
        .iter(app.world())
        .any(|target| target.entity == Some(doomed));
    assert!(!still_targeted);
}

#[test]
fn leaving_the_garden_takes_minions_and_projectiles_along() {
    let mut app = create_garden_app();
    let boss = app
        .world_mut()
        .query::<(Entity, &Enemy)>()
        .iter(app.world())
        .find(|(_, enemy)| enemy.archetype == Archetype::Boss)
        .map(|(entity, _)| entity)
        .unwrap();

    let world = app.world_mut();
    let minion = spawn_enemy(
        &mut world.commands(),
        Archetype::Skeleton,
        &EnemyDefinition::fallback(Archetype::Skeleton),
        Vec2::new(380.0, 60.0),
    );
    world.commands().entity(minion).insert(Minion { boss });
    world.resource_scope(|world, mut pool: Mut<ProjectilePool>| {
        pool.launch(&mut world.commands(), Vec2::ZERO, Vec2::X, 5.0, 2.0);
    });
    world.flush();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Loading);
    app.update();

    assert!(enemies(&mut app).is_empty());
    let projectiles = app
        .world_mut()
        .query_filtered::<(), With<Projectile>>()
        .iter(app.world())
        .count();
    assert_eq!(projectiles, 0);
    assert_eq!(app.world().resource::<ProjectilePool>().idle_count(), 0);
}
