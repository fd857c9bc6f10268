//! Uniform-grid spatial index answering "who is near this point?".

use bevy::prelude::*;
use std::collections::HashMap;

use super::{ActorCategory, Health};
use crate::GameSet;

/// Cell edge length of the index, in world units (pixels).
pub const SPATIAL_CELL_SIZE: f32 = 64.0;

/// Set of [`ActorCategory`] values accepted by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryMask(u8);

impl CategoryMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u8::MAX);
    pub const PLAYER: Self = Self::only(ActorCategory::Player);
    pub const PLANT: Self = Self::only(ActorCategory::Plant);
    pub const HOME: Self = Self::only(ActorCategory::Home);
    pub const ENEMY: Self = Self::only(ActorCategory::Enemy);
    /// Everything an enemy is allowed to hurt.
    pub const ENEMY_PREY: Self = Self::PLAYER.with(ActorCategory::Plant).with(ActorCategory::Home);

    #[must_use]
    pub const fn only(category: ActorCategory) -> Self {
        Self(1 << category as u8)
    }

    #[must_use]
    pub const fn with(self, category: ActorCategory) -> Self {
        Self(self.0 | Self::only(category).0)
    }

    #[must_use]
    pub const fn contains(self, category: ActorCategory) -> bool {
        self.0 & Self::only(category).0 != 0
    }
}

/// An entity registered in the index together with where and what it is.
#[derive(Debug, Clone, Copy)]
struct Entry {
    entity: Entity,
    position: Vec2,
    category: ActorCategory,
}

/// Spatial hash for neighbor lookups. Rebuilt every frame in `GameSet::Ai`.
#[derive(Resource, Debug)]
pub struct SpatialIndex {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<Entry>>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(SPATIAL_CELL_SIZE)
    }
}

impl SpatialIndex {
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Remove all entries. Called at the start of each frame's rebuild.
    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
    }

    pub fn insert(&mut self, entity: Entity, position: Vec2, category: ActorCategory) {
        let coords = self.cell_coords(position);
        self.cells.entry(coords).or_default().push(Entry {
            entity,
            position,
            category,
        });
    }

    /// Entities within `radius` of `center` whose category is in `mask`.
    ///
    /// An entity inserted twice is returned twice; callers that must not
    /// process an entity more than once deduplicate themselves.
    #[must_use]
    pub fn query_nearby(&self, center: Vec2, radius: f32, mask: CategoryMask) -> Vec<Entity> {
        let min = self.cell_coords(center - Vec2::splat(radius));
        let max = self.cell_coords(center + Vec2::splat(radius));
        let radius_sq = radius * radius;
        let mut result = Vec::new();
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                let Some(entries) = self.cells.get(&(x, y)) else {
                    continue;
                };
                result.extend(
                    entries
                        .iter()
                        .filter(|e| mask.contains(e.category))
                        .filter(|e| e.position.distance_squared(center) <= radius_sq)
                        .map(|e| e.entity),
                );
            }
        }
        result
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_coords(&self, position: Vec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }
}

/// Re-register every living categorized actor at its current position.
pub(crate) fn rebuild_spatial_index(
    mut index: ResMut<SpatialIndex>,
    actors: Query<(Entity, &GlobalTransform, &ActorCategory, Option<&Health>)>,
) {
    index.clear();
    for (entity, transform, category, health) in &actors {
        if health.is_some_and(|h| !h.is_alive()) {
            continue;
        }
        index.insert(entity, transform.translation().xy(), *category);
    }
}

/// `SystemSet` for the index rebuild so queries can order after it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpatialRebuild;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<SpatialIndex>();
    app.add_systems(
        Update,
        rebuild_spatial_index
            .in_set(SpatialRebuild)
            .in_set(GameSet::Ai)
            .run_if(crate::gameplay_running),
    );
}
