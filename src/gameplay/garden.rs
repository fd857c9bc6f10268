//! The demo garden: a player, a home and a row of plants under siege.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::enemy::{Archetype, EnemyRoster, spawn_enemy};
use super::{Health, Home, Plant, Player};
use crate::third_party::CollisionLayer;
use crate::{GameState, Z_ACTOR};

const PLAYER_HEALTH: f32 = 100.0;
const PLAYER_RADIUS: f32 = 10.0;
const HOME_HEALTH: f32 = 500.0;
const HOME_SIZE: f32 = 64.0;
const PLANT_HEALTH: f32 = 40.0;
const PLANT_RADIUS: f32 = 8.0;
const PLANT_COUNT: u16 = 5;
const PLANT_SPACING: f32 = 48.0;

/// Where each archetype enters the garden.
const ENEMY_SPAWNS: [(Archetype, Vec2); 4] = [
    (Archetype::Skeleton, Vec2::new(260.0, 100.0)),
    (Archetype::Infernum, Vec2::new(300.0, -120.0)),
    (Archetype::GardenGnome, Vec2::new(-260.0, 140.0)),
    (Archetype::Boss, Vec2::new(380.0, 0.0)),
];

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("Garden Camera"),
        Camera2d,
        DespawnOnExit(GameState::InGame),
    ));
}

fn spawn_garden(mut commands: Commands) {
    commands.spawn((
        Name::new("Home"),
        Home,
        Health::new(HOME_HEALTH),
        Sprite::from_color(Color::srgb(0.55, 0.35, 0.2), Vec2::splat(HOME_SIZE)),
        Transform::from_xyz(-200.0, 0.0, Z_ACTOR),
        RigidBody::Static,
        Collider::rectangle(HOME_SIZE, HOME_SIZE),
        CollisionLayer::structure(),
        DespawnOnExit(GameState::InGame),
    ));

    for i in 0..PLANT_COUNT {
        let y = (f32::from(i) - f32::from(PLANT_COUNT - 1) / 2.0) * PLANT_SPACING;
        commands.spawn((
            Name::new(format!("Plant {i}")),
            Plant,
            Health::new(PLANT_HEALTH),
            Sprite::from_color(Color::srgb(0.3, 0.75, 0.3), Vec2::splat(PLANT_RADIUS * 2.0)),
            Transform::from_xyz(-80.0, y, Z_ACTOR),
            RigidBody::Static,
            Collider::circle(PLANT_RADIUS),
            CollisionLayer::structure(),
            DespawnOnExit(GameState::InGame),
        ));
    }

    commands.spawn((
        Name::new("Player"),
        Player,
        Health::new(PLAYER_HEALTH),
        Sprite::from_color(Color::srgb(0.95, 0.85, 0.3), Vec2::splat(PLAYER_RADIUS * 2.0)),
        Transform::from_xyz(0.0, 0.0, Z_ACTOR),
        RigidBody::Kinematic,
        Collider::circle(PLAYER_RADIUS),
        CollisionLayer::player(),
        DespawnOnExit(GameState::InGame),
    ));
}

fn spawn_enemies(mut commands: Commands, roster: Res<EnemyRoster>) {
    for (archetype, position) in ENEMY_SPAWNS {
        let definition = roster.definition(archetype);
        spawn_enemy(&mut commands, archetype, &definition, position);
    }
    info!("garden under siege by {} enemies", ENEMY_SPAWNS.len());
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(GameState::InGame),
        (spawn_camera, spawn_garden, spawn_enemies),
    );
}
