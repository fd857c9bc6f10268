//! Testing utilities for Bevy systems.

#![cfg(test)]

use std::time::Duration;

use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::state::state::FreelyMutableState;
use bevy::time::TimeUpdateStrategy;

use crate::gameplay::enemy::{Archetype, EnemyDefinition, EnemyRoster, spawn_enemy};
use crate::gameplay::{Health, Home, Plant, Player};

/// Creates a minimal app for testing with essential plugins.
pub fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app
}

/// Creates a test app with state support.
pub fn create_test_app_with_state<S: FreelyMutableState + Default>() -> App {
    let mut app = create_test_app();
    app.add_plugins(StatesPlugin);
    app.init_state::<S>();
    app
}

/// Creates a test app whose clock advances by exactly `step` every update.
///
/// Runs one update up front: the first frame always has a zero delta.
pub fn create_stepped_app(step: Duration) -> App {
    let mut app = create_test_app();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
    app.update();
    app
}

/// Helper to advance the app by one frame.
pub fn tick(app: &mut App) {
    app.update();
}

/// Helper to advance the app by multiple frames.
pub fn tick_multiple(app: &mut App, count: usize) {
    for _ in 0..count {
        app.update();
    }
}

/// Assert the number of entities matching filter `F`.
pub fn assert_entity_count<F: QueryFilter>(app: &mut App, expected: usize) {
    let count = app
        .world_mut()
        .query_filtered::<(), F>()
        .iter(app.world())
        .count();
    assert_eq!(count, expected, "expected {expected} entities, found {count}");
}

fn placed(x: f32, y: f32) -> (Transform, GlobalTransform) {
    let transform = Transform::from_xyz(x, y, 0.0);
    (transform, GlobalTransform::from(transform))
}

/// Move an entity by overwriting both transforms (no propagation in tests).
pub fn teleport(world: &mut World, entity: Entity, x: f32, y: f32) {
    let (transform, global) = placed(x, y);
    world.entity_mut(entity).insert((transform, global));
}

pub fn spawn_test_player(world: &mut World, x: f32, y: f32, hp: f32) -> Entity {
    world.spawn((Player, Health::new(hp), placed(x, y))).id()
}

pub fn spawn_test_plant(world: &mut World, x: f32, y: f32, hp: f32) -> Entity {
    world.spawn((Plant, Health::new(hp), placed(x, y))).id()
}

pub fn spawn_test_home(world: &mut World, x: f32, y: f32) -> Entity {
    world.spawn((Home, Health::new(1000.0), placed(x, y))).id()
}

/// Spawn an enemy from `definition` through the production spawn path.
pub fn spawn_test_enemy(
    app: &mut App,
    archetype: Archetype,
    definition: &EnemyDefinition,
    x: f32,
    y: f32,
) -> Entity {
    let world = app.world_mut();
    let entity = spawn_enemy(&mut world.commands(), archetype, definition, Vec2::new(x, y));
    world.flush();
    entity
}

/// Roster holding exactly one archetype definition.
pub fn roster_with(archetype: Archetype, definition: EnemyDefinition) -> EnemyRoster {
    let mut roster = EnemyRoster::default();
    roster.insert(archetype, definition);
    roster
}

/// Every `M` written while the app ran, in order.
#[derive(Resource)]
pub struct Collected<M: Message>(pub Vec<M>);

impl<M: Message> Default for Collected<M> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

/// Record every `M` into [`Collected<M>`] at the end of each frame.
pub fn collect_messages<M: Message + Clone>(app: &mut App) {
    app.init_resource::<Collected<M>>();
    app.add_systems(
        Last,
        |mut reader: MessageReader<M>, mut collected: ResMut<Collected<M>>| {
            collected.0.extend(reader.read().cloned());
        },
    );
}
