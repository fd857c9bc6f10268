//! Avian2d physics configuration for top-down gameplay.

use avian2d::collision::collider::contact_query;
use avian2d::prelude::*;
use bevy::prelude::*;

/// Pixels per physics meter.
const LENGTH_UNIT: f32 = 32.0;

// === Collision Layers ===

/// Physics collision layers for the hitbox/hurtbox system.
///
/// - **Pushbox**: bodies that push each other around.
/// - **Hitbox**: attack colliders (projectiles).
/// - **Hurtbox**: damageable actors (plants, home, enemies).
/// - **Player**: the player's body; what garden gnomes cling to.
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum CollisionLayer {
    #[default]
    Pushbox,
    Hitbox,
    Hurtbox,
    Player,
}

impl CollisionLayer {
    /// Layers for an enemy body: solid, damageable, touches the player.
    #[must_use]
    pub fn enemy() -> CollisionLayers {
        CollisionLayers::new(
            [Self::Pushbox, Self::Hurtbox],
            [Self::Pushbox, Self::Hitbox, Self::Player],
        )
    }

    /// Layers for the player body.
    #[must_use]
    pub fn player() -> CollisionLayers {
        CollisionLayers::new(
            [Self::Pushbox, Self::Player],
            [Self::Pushbox, Self::Hitbox],
        )
    }

    /// Layers for static damageable actors (plants, home).
    #[must_use]
    pub fn structure() -> CollisionLayers {
        CollisionLayers::new(
            [Self::Pushbox, Self::Hurtbox],
            [Self::Pushbox, Self::Hitbox],
        )
    }
}

// === Queries ===

/// Gap between the surfaces of two unrotated colliders, zero when they
/// overlap. `f32::MAX` if the shape pair is unsupported.
#[must_use]
pub fn surface_distance(c1: &Collider, pos1: Vec2, c2: &Collider, pos2: Vec2) -> f32 {
    contact_query::distance(c1, pos1, 0.0, c2, pos2, 0.0).unwrap_or(f32::MAX)
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(PhysicsPlugins::default().with_length_unit(LENGTH_UNIT));
    app.insert_resource(Gravity::ZERO);
}
