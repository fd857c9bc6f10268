//! Combat primitives shared by every enemy archetype: damage rolls,
//! radius hit-scans, pooled projectiles, knockback and the death of
//! everything that is not an enemy.

pub mod death;
pub mod knockback;
pub mod projectile;

use avian2d::prelude::Collider;
use bevy::ecs::entity::hash_set::EntityHashSet;
use bevy::prelude::*;
use rand::Rng;

use super::spatial::{CategoryMask, SpatialIndex};
use crate::third_party::surface_distance;

pub use death::DeathCheck;
pub use knockback::Knockback;
pub use projectile::{Projectile, ProjectilePool};

/// Uniform damage roll in `[min, max]`. Swapped bounds are tolerated.
#[must_use]
pub fn roll_damage(min: f32, max: f32) -> f32 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rand::rng().random_range(low..=high)
}

/// Upper bound on the distance from an actor's centre to its collider
/// edge (the home's half-diagonal is about 45).
pub const MAX_ACTOR_EXTENT: f32 = 48.0;

/// Everything an enemy may hurt whose body `touches` the circle of `radius`
/// around `center` and that is not already in `already_hit`. Newly found
/// targets are added to the set, so a target is reported at most once per
/// set even if the index repeats it.
///
/// The index only knows centres, so the lookup is widened by
/// [`MAX_ACTOR_EXTENT`] and `touches` decides.
#[must_use]
pub fn hit_scan(
    index: &SpatialIndex,
    center: Vec2,
    radius: f32,
    already_hit: &mut EntityHashSet,
    mut touches: impl FnMut(Entity) -> bool,
) -> Vec<Entity> {
    index
        .query_nearby(center, radius + MAX_ACTOR_EXTENT, CategoryMask::ENEMY_PREY)
        .into_iter()
        .filter(|&entity| {
            !already_hit.contains(&entity) && touches(entity) && already_hit.insert(entity)
        })
        .collect()
}

/// Whether a body at `position` overlaps the circle of `radius` around
/// `center`. Bodies without a collider count as points.
#[must_use]
pub fn overlaps_circle(center: Vec2, radius: f32, position: Vec2, body: Option<&Collider>) -> bool {
    match body {
        Some(collider) => {
            surface_distance(&Collider::circle(radius), center, collider, position) <= 0.0
        }
        None => position.distance(center) <= radius,
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((death::plugin, projectile::plugin, knockback::plugin));
}
