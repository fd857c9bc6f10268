//! Pooled enemy projectiles: straight-line flight, contact damage, recycling.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::death::DeathCheck;
use crate::gameplay::{ActorCategory, Health};
use crate::third_party::CollisionLayer;
use crate::{GameSet, GameState, Z_PROJECTILE, gameplay_running};

/// Projectile collider and sprite radius (pixels).
pub const PROJECTILE_RADIUS: f32 = 3.0;

const PROJECTILE_COLOR: Color = Color::srgb(1.0, 0.45, 0.1);

/// A projectile in flight.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    pub velocity: Vec2,
    pub damage: f32,
    /// Seconds of flight left before the projectile is recycled.
    pub remaining: f32,
}

/// Marker for projectiles parked in the pool.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Pooled;

/// Recycles projectile entities instead of spawning one per shot.
#[derive(Resource, Debug, Default)]
pub struct ProjectilePool {
    idle: Vec<Entity>,
}

impl ProjectilePool {
    /// An idle projectile entity, spawning a fresh body when the pool is dry.
    /// The entity is still parked; [`Self::launch`] activates it.
    pub fn get(&mut self, commands: &mut Commands) -> Entity {
        self.idle
            .pop()
            .unwrap_or_else(|| commands.spawn(projectile_body()).id())
    }

    /// Park `entity` for reuse. Returning the same entity twice is a no-op.
    pub fn give_back(&mut self, commands: &mut Commands, entity: Entity) {
        if self.idle.contains(&entity) {
            return;
        }
        commands
            .entity(entity)
            .remove::<Projectile>()
            .insert((Pooled, ColliderDisabled, Visibility::Hidden));
        self.idle.push(entity);
    }

    /// Take a projectile from the pool and send it flying from `from`.
    pub fn launch(
        &mut self,
        commands: &mut Commands,
        from: Vec2,
        velocity: Vec2,
        damage: f32,
        lifetime: f32,
    ) -> Entity {
        let entity = self.get(commands);
        commands
            .entity(entity)
            .remove::<(Pooled, ColliderDisabled)>()
            .insert((
                Projectile {
                    velocity,
                    damage,
                    remaining: lifetime,
                },
                Transform::from_translation(from.extend(Z_PROJECTILE)),
                CollidingEntities::default(),
                Visibility::Visible,
            ));
        entity
    }

    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }
}

/// Parked bodies are despawned with the garden; forget them.
fn reset_projectile_pool(mut pool: ResMut<ProjectilePool>) {
    pool.idle.clear();
}

fn projectile_body() -> impl Bundle {
    (
        Name::new("Projectile"),
        Pooled,
        Sprite::from_color(PROJECTILE_COLOR, Vec2::splat(PROJECTILE_RADIUS * 2.0)),
        Transform::default(),
        Visibility::Hidden,
        RigidBody::Kinematic,
        Collider::circle(PROJECTILE_RADIUS),
        Sensor,
        ColliderDisabled,
        CollisionLayers::new(CollisionLayer::Hitbox, [CollisionLayer::Hurtbox, CollisionLayer::Player]),
        CollisionEventsEnabled,
        CollidingEntities::default(),
        DespawnOnExit(GameState::InGame),
    )
}

/// Straight-line flight; projectiles past their lifetime go back to the pool.
fn move_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    mut pool: ResMut<ProjectilePool>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform), Without<Pooled>>,
) {
    let dt = time.delta_secs();
    for (entity, mut projectile, mut transform) in &mut projectiles {
        projectile.remaining -= dt;
        if projectile.remaining <= 0.0 {
            pool.give_back(&mut commands, entity);
            continue;
        }
        let step = projectile.velocity * dt;
        transform.translation.x += step.x;
        transform.translation.y += step.y;
    }
}

/// Damages the first non-enemy actor a projectile touches, then recycles it.
fn handle_projectile_hits(
    mut commands: Commands,
    mut pool: ResMut<ProjectilePool>,
    projectiles: Query<(Entity, &Projectile, &CollidingEntities), Without<Pooled>>,
    mut targets: Query<(&ActorCategory, &mut Health)>,
) {
    for (entity, projectile, colliding) in &projectiles {
        for &hit in &colliding.0 {
            let Ok((category, mut health)) = targets.get_mut(hit) else {
                continue;
            };
            if *category == ActorCategory::Enemy || !health.is_alive() {
                continue;
            }
            health.apply_damage(projectile.damage);
            pool.give_back(&mut commands, entity);
            break;
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Projectile>().register_type::<Pooled>();
    app.init_resource::<ProjectilePool>();

    app.add_systems(
        Update,
        (move_projectiles, handle_projectile_hits)
            .chain()
            .before(DeathCheck)
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
    app.add_systems(OnExit(GameState::InGame), reset_projectile_pool);
}
