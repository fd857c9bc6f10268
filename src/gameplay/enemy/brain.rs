//! Drives enemy state machines from the ECS.
//!
//! Each frame, [`think`] handles deaths, runs due timed steps, ticks every
//! brain and applies the actions its states queued. [`move_enemies`] runs the
//! fixed tick afterwards and turns move requests into velocities.

use std::f32::consts::TAU;
use std::time::Duration;

use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::archetypes;
use super::context::{EnemyAction, EnemyContext, TargetSighting};
use super::states::{CORPSE_LINGER, Dead, Idle, SpawnMinion};
use super::{
    BossMinions, Brain, Cling, CurrentTarget, Enemy, EnemyRoster, EnemyStats, EnemyStatus,
    EnemyStep, MeleeSwing, Minion, RangedGun, spawn_enemy,
};
use crate::gameplay::combat::{DeathCheck, Knockback, ProjectilePool};
use crate::gameplay::combat::knockback::KnockbackStep;
use crate::gameplay::feedback::{
    AnimationCue, AnimationTrigger, CameraShake, EnemyAttacked, EnemyDied, SoundCue,
};
use crate::gameplay::fsm::StateMachine;
use crate::gameplay::sequence::Sequences;
use crate::gameplay::spatial::SpatialIndex;
use crate::gameplay::{ActorCategory, Health};
use crate::third_party::surface_distance;
use crate::{GameSet, gameplay_running};

/// Where a body is and what shape it has, if any.
pub(super) type Bodies<'w, 's> =
    Query<'w, 's, (&'static GlobalTransform, Option<&'static Collider>)>;

/// World access the attack hooks and death handling need.
#[derive(SystemParam)]
pub(super) struct Effects<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub index: Res<'w, SpatialIndex>,
    pub roster: Res<'w, EnemyRoster>,
    pub pool: ResMut<'w, ProjectilePool>,
    /// Anything an enemy can damage. Enemies never hurt each other.
    pub victims: Query<'w, 's, (&'static ActorCategory, &'static mut Health), Without<Enemy>>,
    pub bodies: Bodies<'w, 's>,
    pub sounds: MessageWriter<'w, SoundCue>,
    pub shakes: MessageWriter<'w, CameraShake>,
    pub animations: MessageWriter<'w, AnimationTrigger>,
    pub attacks: MessageWriter<'w, EnemyAttacked>,
    pub deaths: MessageWriter<'w, EnemyDied>,
}

/// Mutable view of one enemy for the duration of its update.
pub(super) struct Actor<'a> {
    pub entity: Entity,
    pub enemy: &'a Enemy,
    pub stats: &'a EnemyStats,
    pub status: &'a mut EnemyStatus,
    pub brain: &'a mut Brain,
    pub sequences: &'a mut Sequences<EnemyStep>,
    pub velocity: &'a mut LinearVelocity,
    pub health: &'a mut Health,
    pub position: Vec2,
    pub target: Option<TargetSighting>,
    pub immobilized: bool,
    pub cling: Option<&'a Cling>,
    pub swing: Option<&'a mut MeleeSwing>,
    pub gun: Option<&'a mut RangedGun>,
    pub minions: Option<&'a mut BossMinions>,
}

/// Resolve the current target of `viewer` to a position, if it still exists.
/// With both colliders known, the sighting carries the target's extent so
/// ranges reach the surface of large bodies such as the home.
fn sight(
    target: &CurrentTarget,
    viewer: Entity,
    radius: f32,
    bodies: &Bodies,
) -> Option<TargetSighting> {
    let entity = target.entity?;
    let (transform, collider) = bodies.get(entity).ok()?;
    let position = transform.translation().xy();
    let extent = match (bodies.get(viewer), collider) {
        (Ok((own_transform, Some(own))), Some(theirs)) => {
            let from = own_transform.translation().xy();
            let gap = surface_distance(own, from, theirs, position);
            (from.distance(position) - gap - radius).max(0.0)
        }
        _ => 0.0,
    };
    Some(TargetSighting {
        entity,
        position,
        category: target.category?,
        extent,
    })
}

fn base_context(
    enemy: &Enemy,
    stats: &EnemyStats,
    status: EnemyStatus,
    position: Vec2,
    now: f32,
) -> EnemyContext {
    let mut ctx = EnemyContext::new(enemy.behavior, position);
    ctx.now = now;
    ctx.move_speed = stats.move_speed;
    ctx.attack_cooldown = stats.attack_cooldown;
    ctx.status = status;
    ctx
}

impl Actor<'_> {
    fn context(&self, now: f32) -> EnemyContext {
        let mut ctx = base_context(self.enemy, self.stats, *self.status, self.position, now);
        ctx.target = self.target;
        ctx.immobilized = self.immobilized;
        ctx.can_shoot = self.gun.as_ref().is_some_and(|gun| gun.can_shoot(now));
        ctx
    }

    /// Hand the brain a fresh context, then apply what its states asked for.
    pub fn dispatch(
        &mut self,
        fx: &mut Effects,
        now: f32,
        f: impl FnOnce(&mut StateMachine<EnemyContext>, &mut EnemyContext),
    ) {
        let mut ctx = self.context(now);
        f(&mut self.brain.0, &mut ctx);
        *self.status = ctx.status;
        for action in ctx.take_actions() {
            self.apply(action, fx, now);
        }
    }

    fn apply(&mut self, action: EnemyAction, fx: &mut Effects, now: f32) {
        match action {
            EnemyAction::Move { direction, speed } => self.velocity.0 = direction * speed,
            EnemyAction::Stop => self.velocity.0 = Vec2::ZERO,
            EnemyAction::Attack => archetypes::attack(self, fx, now),
            EnemyAction::BossAttack(boss_move) => archetypes::boss_attack(self, fx, boss_move),
            EnemyAction::Animate(cue) => {
                fx.animations.write(AnimationTrigger {
                    entity: self.entity,
                    cue,
                });
            }
            EnemyAction::DisableCollision => {
                fx.commands.entity(self.entity).insert(ColliderDisabled);
            }
            EnemyAction::FreezeBody => {
                self.velocity.0 = Vec2::ZERO;
                fx.commands.entity(self.entity).insert(RigidBodyDisabled);
            }
            EnemyAction::Schedule { delay, step } => self.sequences.schedule(delay, step),
            EnemyAction::Cancel(step) => self.sequences.cancel(|pending| *pending == step),
        }
    }

    fn run_step(&mut self, step: EnemyStep, fx: &mut Effects, now: f32) {
        if self.status.is_dead && !matches!(step, EnemyStep::DeathFollowUp | EnemyStep::Despawn) {
            return;
        }
        match step {
            EnemyStep::MeleeStrike => archetypes::melee_strike(self, fx),
            EnemyStep::BossStrike(boss_move) => archetypes::boss_strike(self, fx, boss_move),
            EnemyStep::FinishMinionSpawn => self.finish_summoning(fx, now),
            EnemyStep::Explode => archetypes::explode(self, fx, now),
            EnemyStep::DeathFollowUp => {
                fx.animations.write(AnimationTrigger {
                    entity: self.entity,
                    cue: AnimationCue::Death,
                });
                self.sequences.schedule(CORPSE_LINGER, EnemyStep::Despawn);
            }
            EnemyStep::Despawn => {
                fx.commands.entity(self.entity).despawn();
            }
        }
    }

    /// Mark the enemy dead and force the Dead state. Runs at most once.
    pub fn die(&mut self, fx: &mut Effects, now: f32) {
        if self.status.is_dead {
            return;
        }
        self.health.kill();
        self.status.is_dead = true;
        self.status.is_attacking = false;
        self.sequences.cancel_all();

        let archetype = self.enemy.archetype;
        debug!("{} {} died", archetype.display_name(), self.entity);
        fx.sounds.write(SoundCue {
            event: archetype.death_cue(),
            at: Some(self.position),
        });
        fx.deaths.write(EnemyDied {
            enemy: self.entity,
            archetype,
        });
        // A dead minion no longer counts toward its boss's population.
        fx.commands.entity(self.entity).remove::<Minion>();

        self.dispatch(fx, now, |fsm, ctx| {
            fsm.change_state::<Dead>(ctx);
        });
    }

    /// Boss only: accumulate time without minions and start a summon when due.
    fn boss_cycle(&mut self, fx: &mut Effects, now: f32, dt: f32) {
        let Some(profile) = self.enemy.behavior.boss().copied() else {
            return;
        };
        let busy = self.status.is_attacking || self.status.is_spawning;
        let Some(minions) = self.minions.as_deref_mut() else {
            return;
        };
        if busy || !minions.minions.is_empty() {
            return;
        }
        minions.spawn_cooldown += dt;
        if minions.spawn_cooldown < profile.spawn_delay_after_minions_die {
            return;
        }
        info!("{} summons minions", self.entity);
        self.dispatch(fx, now, |fsm, ctx| {
            fsm.change_state::<SpawnMinion>(ctx);
        });
    }

    /// End of the summoning sequence: spawn the minions and go back to Idle.
    fn finish_summoning(&mut self, fx: &mut Effects, now: f32) {
        let Some(profile) = self.enemy.behavior.boss().copied() else {
            return;
        };
        let definition = fx.roster.definition(profile.minion_archetype);
        let count = profile.minion_count.max(1);
        let summoned: Vec<Entity> = (0..profile.minion_count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let angle = TAU * i as f32 / count as f32;
                let at = self.position + Vec2::from_angle(angle) * profile.minion_spawn_radius;
                let minion =
                    spawn_enemy(&mut fx.commands, profile.minion_archetype, &definition, at);
                fx.commands.entity(minion).insert(Minion { boss: self.entity });
                minion
            })
            .collect();

        if let Some(minions) = self.minions.as_deref_mut() {
            minions.minions.extend(summoned);
            minions.reset_spawn_cooldown();
        }
        fx.sounds.write(SoundCue {
            event: "boss_summon",
            at: Some(self.position),
        });
        self.dispatch(fx, now, |fsm, ctx| {
            ctx.status.is_spawning = false;
            fsm.change_state::<Idle>(ctx);
        });
    }

    fn update(&mut self, fx: &mut Effects, now: f32, delta: Duration) {
        if !self.status.is_dead && !self.health.is_alive() {
            self.die(fx, now);
            return;
        }

        for step in self.sequences.advance(delta) {
            self.run_step(step, fx, now);
        }
        if self.status.is_dead {
            return;
        }

        if self.brain.0.current().is_none() {
            self.dispatch(fx, now, |fsm, ctx| {
                fsm.change_state::<Idle>(ctx);
            });
        }
        self.dispatch(fx, now, StateMachine::tick);
        self.boss_cycle(fx, now, delta.as_secs_f32());
    }
}

/// A dying boss takes its minions with it, before it enters Dead itself.
pub(super) fn doom_minions(
    bosses: Query<(&Health, &EnemyStatus, &BossMinions), Without<Minion>>,
    mut minions: Query<&mut Health, With<Minion>>,
) {
    for (health, status, tracked) in &bosses {
        if status.is_dead || health.is_alive() {
            continue;
        }
        for &minion in &tracked.minions {
            if let Ok(mut minion_health) = minions.get_mut(minion) {
                minion_health.kill();
            }
        }
    }
}

/// Logical tick of every enemy. Runs in `GameSet::Combat`.
pub(super) fn think(
    time: Res<Time>,
    mut enemies: Query<(
        Entity,
        &Enemy,
        &EnemyStats,
        &mut EnemyStatus,
        &mut Brain,
        &mut Sequences<EnemyStep>,
        &CurrentTarget,
        &GlobalTransform,
        &mut LinearVelocity,
        &mut Health,
        Has<Knockback>,
        Option<&Cling>,
        Option<&mut MeleeSwing>,
        Option<&mut RangedGun>,
        Option<&mut BossMinions>,
    )>,
    mut fx: Effects,
) {
    let now = time.elapsed_secs();
    let delta = time.delta();
    for (
        entity,
        enemy,
        stats,
        mut status,
        mut brain,
        mut sequences,
        target,
        transform,
        mut velocity,
        mut health,
        knocked_back,
        cling,
        mut swing,
        mut gun,
        mut minions,
    ) in &mut enemies
    {
        let mut actor = Actor {
            entity,
            enemy,
            stats,
            status: &mut status,
            brain: &mut brain,
            sequences: &mut sequences,
            velocity: &mut velocity,
            health: &mut health,
            position: transform.translation().xy(),
            target: sight(target, entity, stats.radius, &fx.bodies),
            immobilized: knocked_back || cling.is_some_and(|c| c.attached_to.is_some()),
            cling,
            swing: swing.as_deref_mut(),
            gun: gun.as_deref_mut(),
            minions: minions.as_deref_mut(),
        };
        actor.update(&mut fx, now, delta);
    }
}

/// Fixed tick of every living enemy: Chase turns into a velocity here.
/// Runs in `GameSet::Movement`, after [`think`].
pub(super) fn move_enemies(
    time: Res<Time>,
    mut enemies: Query<(
        Entity,
        &Enemy,
        &EnemyStats,
        &EnemyStatus,
        &mut Brain,
        &CurrentTarget,
        &GlobalTransform,
        &mut LinearVelocity,
        Has<Knockback>,
        Option<&Cling>,
    )>,
    bodies: Bodies,
) {
    let now = time.elapsed_secs();
    for (
        entity,
        enemy,
        stats,
        status,
        mut brain,
        target,
        transform,
        mut velocity,
        knocked_back,
        cling,
    ) in &mut enemies
    {
        if status.is_dead {
            continue;
        }
        let mut ctx = base_context(enemy, stats, *status, transform.translation().xy(), now);
        ctx.target = sight(target, entity, stats.radius, &bodies);
        ctx.immobilized = knocked_back || cling.is_some_and(|c| c.attached_to.is_some());

        brain.0.fixed_tick(&mut ctx);

        for action in ctx.take_actions() {
            match action {
                EnemyAction::Move { direction, speed } => velocity.0 = direction * speed,
                EnemyAction::Stop => velocity.0 = Vec2::ZERO,
                other => debug!("fixed update cannot apply {other:?}"),
            }
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (
            archetypes::cling_on_contact,
            doom_minions,
            think,
        )
            .chain()
            .before(DeathCheck)
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
    app.add_systems(
        Update,
        move_enemies
            .before(KnockbackStep)
            .in_set(GameSet::Movement)
            .run_if(gameplay_running),
    );
}

/// App running targeting and every brain system on a fixed 100 ms clock,
/// without physics. Records [`EnemyDied`] and [`EnemyAttacked`].
#[cfg(test)]
pub(super) fn create_enemy_test_app() -> App {
    use super::config::{Archetype, EnemyDefinition};
    use crate::testing::{collect_messages, roster_with};

    let mut app = crate::testing::create_stepped_app(Duration::from_millis(100));
    app.add_message::<SoundCue>()
        .add_message::<CameraShake>()
        .add_message::<AnimationTrigger>()
        .add_message::<EnemyAttacked>()
        .add_message::<EnemyDied>();
    app.init_resource::<SpatialIndex>()
        .init_resource::<ProjectilePool>()
        .insert_resource(roster_with(
            Archetype::Skeleton,
            EnemyDefinition::fallback(Archetype::Skeleton),
        ));
    app.add_observer(super::forget_minion);
    app.add_systems(
        Update,
        (
            crate::gameplay::spatial::rebuild_spatial_index,
            super::targeting::find_targets,
            archetypes::cling_on_contact,
            doom_minions,
            think,
            move_enemies,
        )
            .chain(),
    );
    collect_messages::<EnemyDied>(&mut app);
    collect_messages::<EnemyAttacked>(&mut app);
    app
}
