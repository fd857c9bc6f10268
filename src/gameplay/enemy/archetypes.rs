//! Archetype attack hooks: what "attack" means for each kind of enemy.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::brain::{Actor, Effects};
use super::config::Behavior;
use super::{BossMove, Cling, Enemy, EnemyStatus, EnemyStep};
use crate::gameplay::combat::{hit_scan, overlaps_circle, roll_damage};
use crate::gameplay::feedback::{
    AnimationCue, AnimationTrigger, CameraShake, EnemyAttacked, SoundCue,
};
use crate::gameplay::sequence::Sequences;
use crate::gameplay::{ActorCategory, Player};

const HIT_SHAKE: CameraShake = CameraShake {
    intensity: 4.0,
    duration: 0.2,
};

const EXPLOSION_SHAKE: CameraShake = CameraShake {
    intensity: 10.0,
    duration: 0.4,
};

fn announce_attack(actor: &Actor, fx: &mut Effects, cue: AnimationCue) {
    fx.animations.write(AnimationTrigger {
        entity: actor.entity,
        cue,
    });
    fx.attacks.write(EnemyAttacked {
        enemy: actor.entity,
        target: actor.target.map(|target| target.entity),
        category: actor.target.map(|target| target.category),
    });
}

/// Start an attack according to the enemy's behavior.
pub(super) fn attack(actor: &mut Actor, fx: &mut Effects, now: f32) {
    match actor.enemy.behavior {
        Behavior::Melee(profile) => {
            if actor.status.is_attacking {
                return;
            }
            actor.status.is_attacking = true;
            if let Some(swing) = actor.swing.as_deref_mut() {
                swing.hit.clear();
            }
            announce_attack(actor, fx, AnimationCue::Attack);
            fx.sounds.write(SoundCue {
                event: "melee_swing",
                at: Some(actor.position),
            });
            actor
                .sequences
                .schedule(profile.swing_delay, EnemyStep::MeleeStrike);
        }
        Behavior::Ranged(profile) => {
            let Some(target) = actor.target else {
                return;
            };
            let Some(gun) = actor.gun.as_deref_mut() else {
                return;
            };
            if !gun.can_shoot(now) {
                return;
            }
            let aim = target.position + Vec2::Y * profile.aim_offset;
            let Some(direction) = (aim - actor.position).try_normalize() else {
                return;
            };
            fx.pool.launch(
                &mut fx.commands,
                actor.position,
                direction * profile.projectile_speed,
                profile.projectile_damage,
                profile.projectile_lifetime,
            );
            gun.reload(now, profile.fire_rate);
            announce_attack(actor, fx, AnimationCue::Attack);
            fx.sounds.write(SoundCue {
                event: "fireball",
                at: Some(actor.position),
            });
        }
        // Gnomes hurt by clinging; bosses attack through `boss_attack`.
        Behavior::Exploding(_) | Behavior::Boss(_) => {}
    }
}

/// Damage everything in range of `center` not yet hit by the current swing.
fn strike(actor: &mut Actor, fx: &mut Effects, center: Vec2, radius: f32, damage: (f32, f32)) {
    let Some(swing) = actor.swing.as_deref_mut() else {
        return;
    };
    let bodies = &fx.bodies;
    let touched = hit_scan(&fx.index, center, radius, &mut swing.hit, |entity| {
        bodies.get(entity).is_ok_and(|(transform, collider)| {
            overlaps_circle(center, radius, transform.translation().xy(), collider)
        })
    });
    for victim in touched {
        let Ok((category, mut health)) = fx.victims.get_mut(victim) else {
            continue;
        };
        health.apply_damage(roll_damage(damage.0, damage.1));
        if *category == ActorCategory::Player {
            fx.shakes.write(HIT_SHAKE);
        }
    }
}

/// The swing started by [`attack`] lands in front of the enemy.
pub(super) fn melee_strike(actor: &mut Actor, fx: &mut Effects) {
    let Behavior::Melee(profile) = actor.enemy.behavior else {
        return;
    };
    let facing = actor
        .target
        .and_then(|target| (target.position - actor.position).try_normalize())
        .unwrap_or(Vec2::ZERO);
    let center = actor.position + facing * profile.attack_offset;
    strike(
        actor,
        fx,
        center,
        profile.attack_radius,
        (profile.min_damage, profile.max_damage),
    );
    actor.status.is_attacking = false;
}

pub(super) fn boss_attack(actor: &mut Actor, fx: &mut Effects, boss_move: BossMove) {
    let Some(profile) = actor.enemy.behavior.boss().copied() else {
        return;
    };
    actor.status.is_attacking = true;
    if let Some(swing) = actor.swing.as_deref_mut() {
        swing.hit.clear();
    }
    let (cue, hit_delay) = match boss_move {
        BossMove::Melee => (AnimationCue::BossMelee, profile.melee_hit_delay),
        BossMove::Special => (AnimationCue::BossSpecial, profile.special_hit_delay),
    };
    announce_attack(actor, fx, cue);
    actor
        .sequences
        .schedule(hit_delay, EnemyStep::BossStrike(boss_move));
}

/// A boss attack lands around the boss.
pub(super) fn boss_strike(actor: &mut Actor, fx: &mut Effects, boss_move: BossMove) {
    let Some(profile) = actor.enemy.behavior.boss().copied() else {
        return;
    };
    let (radius, damage) = match boss_move {
        BossMove::Melee => (
            profile.melee_radius,
            (profile.melee_min_damage, profile.melee_max_damage),
        ),
        BossMove::Special => {
            fx.shakes.write(EXPLOSION_SHAKE);
            (
                profile.special_radius,
                (profile.special_min_damage, profile.special_max_damage),
            )
        }
    };
    let center = actor.position;
    strike(actor, fx, center, radius, damage);
    actor.status.is_attacking = false;
}

/// A clinging gnome goes off, hurting whoever it holds on to, and dies.
pub(super) fn explode(actor: &mut Actor, fx: &mut Effects, now: f32) {
    let Behavior::Exploding(profile) = actor.enemy.behavior else {
        return;
    };
    let victim = actor.cling.and_then(|cling| cling.attached_to);
    if let Some(Ok((_, mut health))) = victim.map(|victim| fx.victims.get_mut(victim)) {
        health.apply_damage(roll_damage(profile.min_damage, profile.max_damage));
    }
    fx.shakes.write(EXPLOSION_SHAKE);
    fx.sounds.write(SoundCue {
        event: "gnome_explode",
        at: Some(actor.position),
    });
    actor.die(fx, now);
}

/// Gnomes touching the player latch on once and start their fuse.
pub(super) fn cling_on_contact(
    mut commands: Commands,
    mut gnomes: Query<(
        Entity,
        &Enemy,
        &EnemyStatus,
        &mut Cling,
        &CollidingEntities,
        &GlobalTransform,
        &mut Transform,
        &mut LinearVelocity,
        &mut Sequences<EnemyStep>,
    )>,
    players: Query<&GlobalTransform, With<Player>>,
    mut sounds: MessageWriter<SoundCue>,
) {
    for (
        gnome,
        enemy,
        status,
        mut cling,
        contacts,
        global,
        mut transform,
        mut velocity,
        mut sequences,
    ) in &mut gnomes
    {
        let Behavior::Exploding(profile) = enemy.behavior else {
            continue;
        };
        if status.is_dead || cling.used {
            continue;
        }
        let Some((player, player_transform)) = contacts
            .0
            .iter()
            .find_map(|&entity| players.get(entity).ok().map(|t| (entity, t)))
        else {
            continue;
        };

        cling.used = true;
        cling.attached_to = Some(player);
        velocity.0 = Vec2::ZERO;
        let offset = global.translation() - player_transform.translation();
        transform.translation = offset.truncate().extend(transform.translation.z);
        commands.entity(player).add_child(gnome);
        commands
            .entity(gnome)
            .insert((RigidBodyDisabled, ColliderDisabled));
        sequences.schedule(profile.cling_duration, EnemyStep::Explode);
        sounds.write(SoundCue {
            event: "gnome_cling",
            at: Some(global.translation().xy()),
        });
        debug!("gnome {gnome} clings to {player}");
    }
}
