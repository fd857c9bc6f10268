//! Death of the player, plants and the home: despawned at zero health.
//!
//! Enemies are left alone here; their brains run the Dead state and
//! despawn them once the corpse has lingered.

use bevy::prelude::*;

use crate::gameplay::enemy::Enemy;
use crate::gameplay::{ActorCategory, Health};
use crate::{GameSet, gameplay_running};

/// `SystemSet` for death detection. Damage dealers order `.before(DeathCheck)`
/// so a lethal hit is removed in the same frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeathCheck;

/// Despawns any non-enemy whose health drops to 0 or below.
fn check_death(
    mut commands: Commands,
    query: Query<(Entity, &Health, Option<&ActorCategory>), Without<Enemy>>,
) {
    for (entity, health, category) in &query {
        if health.current > 0.0 {
            continue;
        }
        match category.copied() {
            Some(kind @ (ActorCategory::Player | ActorCategory::Home)) => {
                info!("{kind:?} {entity} destroyed");
            }
            _ => debug!("{entity} destroyed"),
        }
        commands.entity(entity).despawn();
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        check_death
            .in_set(DeathCheck)
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
}
