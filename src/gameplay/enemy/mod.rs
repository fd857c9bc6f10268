//! Enemy actors: components, spawning and the plugin that drives their brains.

mod archetypes;
mod brain;
pub mod config;
pub mod context;
pub mod states;
pub mod targeting;

use avian2d::prelude::*;
use bevy::ecs::entity::hash_set::EntityHashSet;
use bevy::prelude::*;

use super::fsm::StateMachine;
use super::sequence::Sequences;
use super::{ActorCategory, Health};
use crate::third_party::CollisionLayer;
use crate::{GameSet, GameState, Z_ACTOR, gameplay_running};

pub use config::{Archetype, Behavior, EnemyDefinition, EnemyRoster, RosterError};
pub(crate) use config::load_enemy_roster;
use context::EnemyContext;

// === Components ===

/// An enemy actor of a given archetype.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(ActorCategory = ActorCategory::Enemy, EnemyStatus, CurrentTarget, OverrideTarget)]
pub struct Enemy {
    pub archetype: Archetype,
    pub behavior: Behavior,
}

/// Movement and targeting numbers shared by every archetype.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct EnemyStats {
    pub move_speed: f32,
    pub detection_range: f32,
    pub attack_cooldown: f32,
    /// Body radius; ranges are measured from the centre of this circle.
    pub radius: f32,
    pub priorities: config::TargetPriorities,
}

/// Read-only view of what an enemy is doing, for animation and UI.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct EnemyStatus {
    /// Terminal once set.
    pub is_dead: bool,
    /// An attack is in flight; no other attack may start.
    pub is_attacking: bool,
    pub is_spawning: bool,
    pub attack_animation: bool,
}

/// Why the current target was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum TargetCategory {
    Player,
    Plant,
    Home,
    Override,
}

/// Selected target, rewritten every frame by targeting.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CurrentTarget {
    pub entity: Option<Entity>,
    pub category: Option<TargetCategory>,
}

/// Externally forced target (e.g. a taunting plant). Cleared once the entity is gone.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct OverrideTarget(pub Option<Entity>);

/// The enemy's state machine.
#[derive(Component, Debug)]
pub struct Brain(pub StateMachine<EnemyContext>);

/// Which boss attack a timed strike belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum BossMove {
    Melee,
    Special,
}

/// Delayed work an enemy can schedule on its [`Sequences`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyStep {
    /// A melee swing lands.
    MeleeStrike,
    /// A boss attack lands.
    BossStrike(BossMove),
    /// End of the summoning sequence.
    FinishMinionSpawn,
    /// Re-trigger the death animation and schedule removal.
    DeathFollowUp,
    Despawn,
    /// A clinging gnome goes off.
    Explode,
}

/// Targets already damaged by the swing in progress.
#[derive(Component, Debug, Default)]
pub struct MeleeSwing {
    pub hit: EntityHashSet,
}

/// Fire-rate gate of a ranged enemy.
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct RangedGun {
    pub next_fire_at: f32,
}

impl RangedGun {
    #[must_use]
    pub fn can_shoot(&self, now: f32) -> bool {
        now >= self.next_fire_at
    }

    /// Close the gate for `1 / fire_rate` seconds.
    pub fn reload(&mut self, now: f32, fire_rate: f32) {
        self.next_fire_at = now + 1.0 / fire_rate.max(f32::EPSILON);
    }
}

/// Garden gnome cling state. Clinging happens at most once per lifetime.
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct Cling {
    pub used: bool,
    pub attached_to: Option<Entity>,
}

/// Minions a boss has alive, and how long it has been without any.
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct BossMinions {
    pub minions: Vec<Entity>,
    pub spawn_cooldown: f32,
}

impl BossMinions {
    pub const fn reset_spawn_cooldown(&mut self) {
        self.spawn_cooldown = 0.0;
    }
}

/// An enemy summoned by `boss`.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Minion {
    pub boss: Entity,
}

// === Spawning ===

impl Archetype {
    const fn color(self) -> Color {
        match self {
            Self::Skeleton => Color::srgb(0.85, 0.85, 0.8),
            Self::Infernum => Color::srgb(0.9, 0.3, 0.1),
            Self::GardenGnome => Color::srgb(0.2, 0.4, 0.9),
            Self::Boss => Color::srgb(0.5, 0.1, 0.6),
        }
    }
}

/// Spawn a fully wired enemy that is removed when the garden is left.
/// Returns the new entity.
pub fn spawn_enemy(
    commands: &mut Commands,
    archetype: Archetype,
    definition: &EnemyDefinition,
    position: Vec2,
) -> Entity {
    let transform = Transform::from_translation(position.extend(Z_ACTOR));
    let behavior = definition.behavior;
    let mut enemy = commands.spawn((
        Name::new(archetype.display_name()),
        Enemy {
            archetype,
            behavior,
        },
        EnemyStats {
            move_speed: definition.move_speed,
            detection_range: definition.detection_range,
            attack_cooldown: definition.attack_cooldown,
            radius: definition.radius,
            priorities: definition.priorities,
        },
        Health::new(definition.max_health),
        Brain(states::build_brain(&behavior)),
        Sequences::<EnemyStep>::default(),
        Sprite::from_color(archetype.color(), Vec2::splat(definition.radius * 2.0)),
        transform,
        GlobalTransform::from(transform),
        RigidBody::Dynamic,
        Collider::circle(definition.radius),
        CollisionLayer::enemy(),
        LockedAxes::ROTATION_LOCKED,
        LinearVelocity::ZERO,
        DespawnOnExit(GameState::InGame),
    ));

    match behavior {
        Behavior::Melee(_) => {
            enemy.insert(MeleeSwing::default());
        }
        Behavior::Ranged(_) => {
            enemy.insert(RangedGun::default());
        }
        Behavior::Exploding(_) => {
            enemy.insert((
                Cling::default(),
                CollisionEventsEnabled,
                CollidingEntities::default(),
            ));
        }
        Behavior::Boss(_) => {
            enemy.insert((MeleeSwing::default(), BossMinions::default()));
        }
    }
    enemy.id()
}

/// Drop a dead or despawned minion from its boss's list.
fn forget_minion(
    removed: On<Remove, Minion>,
    minions: Query<&Minion>,
    mut bosses: Query<&mut BossMinions>,
) {
    let Ok(minion) = minions.get(removed.entity) else {
        return;
    };
    if let Ok(mut boss) = bosses.get_mut(minion.boss) {
        boss.minions.retain(|&m| m != removed.entity);
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Enemy>()
        .register_type::<EnemyStats>()
        .register_type::<EnemyStatus>()
        .register_type::<CurrentTarget>()
        .register_type::<OverrideTarget>()
        .register_type::<RangedGun>()
        .register_type::<Cling>()
        .register_type::<BossMinions>()
        .register_type::<Minion>();

    app.init_resource::<EnemyRoster>();
    app.add_observer(forget_minion);

    app.add_systems(
        Update,
        targeting::find_targets
            .after(super::spatial::SpatialRebuild)
            .in_set(GameSet::Ai)
            .run_if(gameplay_running),
    );
    app.add_plugins(brain::plugin);
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::testing::{assert_entity_count, spawn_test_enemy};

    #[test]
    fn spawned_enemies_carry_archetype_components() {
        let mut app = crate::testing::create_test_app();
        for (i, archetype) in Archetype::ALL.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32 * 100.0;
            spawn_test_enemy(&mut app, *archetype, &EnemyDefinition::fallback(*archetype), x, 0.0);
        }

        assert_entity_count::<With<Enemy>>(&mut app, 4);
        assert_entity_count::<(With<Enemy>, With<ActorCategory>, With<Brain>)>(&mut app, 4);
        assert_entity_count::<With<MeleeSwing>>(&mut app, 2);
        assert_entity_count::<With<RangedGun>>(&mut app, 1);
        assert_entity_count::<With<Cling>>(&mut app, 1);
        assert_entity_count::<With<BossMinions>>(&mut app, 1);
    }

    #[test]
    fn removed_minion_leaves_boss_list() {
        let mut app = crate::testing::create_test_app();
        app.add_observer(forget_minion);
        let boss = spawn_test_enemy(
            &mut app,
            Archetype::Boss,
            &EnemyDefinition::fallback(Archetype::Boss),
            0.0,
            0.0,
        );
        let minion = app.world_mut().spawn(Minion { boss }).id();
        let other = app.world_mut().spawn(Minion { boss }).id();
        app.world_mut()
            .get_mut::<BossMinions>(boss)
            .unwrap()
            .minions
            .extend([minion, other]);

        app.world_mut().despawn(minion);

        assert_eq!(
            app.world().get::<BossMinions>(boss).unwrap().minions,
            vec![other]
        );
    }
}
