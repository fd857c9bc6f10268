//! Gameplay domain: shared actor components and the domain plugins.

pub mod combat;
pub mod enemy;
pub mod feedback;
pub mod fsm;
pub(crate) mod garden;
pub mod sequence;
pub mod spatial;

use bevy::prelude::*;

// === Shared Components ===

/// What kind of actor an entity is, as seen by targeting and hit detection.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum ActorCategory {
    Player,
    Plant,
    Home,
    Enemy,
}

/// Marker for the player character.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(ActorCategory = ActorCategory::Player)]
pub struct Player;

/// Marker for a planted crop or defensive plant.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(ActorCategory = ActorCategory::Plant)]
pub struct Plant;

/// Marker for the home structure enemies march on.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(ActorCategory = ActorCategory::Home)]
pub struct Home;

/// Marker: the actor is currently not a valid target (e.g. invulnerable, hidden).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Untargetable;

/// Hit points of any damageable actor.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    #[must_use]
    pub const fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn apply_damage(&mut self, amount: f32) {
        self.current -= amount.max(0.0);
    }

    /// Drop to zero regardless of remaining health.
    pub const fn kill(&mut self) {
        self.current = 0.0;
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<ActorCategory>()
        .register_type::<Player>()
        .register_type::<Plant>()
        .register_type::<Home>()
        .register_type::<Untargetable>()
        .register_type::<Health>();

    app.add_plugins((
        spatial::plugin,
        feedback::plugin,
        combat::plugin,
        enemy::plugin,
        garden::plugin,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn health_new_sets_current_to_max() {
        let health = Health::new(100.0);
        assert_eq!(health.current, 100.0);
        assert_eq!(health.max, 100.0);
    }

    #[test]
    fn apply_damage_ignores_negative_amounts() {
        let mut health = Health::new(50.0);
        health.apply_damage(-10.0);
        assert_eq!(health.current, 50.0);
        health.apply_damage(20.0);
        assert_eq!(health.current, 30.0);
    }

    #[test]
    fn kill_empties_health() {
        let mut health = Health::new(50.0);
        health.kill();
        assert!(!health.is_alive());
    }

    #[test]
    fn markers_require_their_category() {
        let mut world = World::new();
        let player = world.spawn(Player).id();
        let plant = world.spawn(Plant).id();
        let home = world.spawn(Home).id();

        assert_eq!(world.get::<ActorCategory>(player), Some(&ActorCategory::Player));
        assert_eq!(world.get::<ActorCategory>(plant), Some(&ActorCategory::Plant));
        assert_eq!(world.get::<ActorCategory>(home), Some(&ActorCategory::Home));
    }
}
