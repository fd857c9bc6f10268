//! The enemy states: Idle, Chase, Attack, Dead and the boss-only SpawnMinion.

use crate::gameplay::feedback::AnimationCue;
use crate::gameplay::fsm::{State, StateMachine, Transition};

use super::config::Behavior;
use super::context::{EnemyAction, EnemyContext};
use super::{BossMove, EnemyStep};

/// Extra distance a target may back off before Attack gives up and chases.
pub const ATTACK_RANGE_SLACK: f32 = 0.5;

/// Delay before the death animation is re-triggered and removal scheduled.
pub const DEATH_FOLLOW_UP_DELAY: f32 = 0.1;

/// How long a corpse stays in the world after the follow-up.
pub const CORPSE_LINGER: f32 = 1.0;

/// Length of the boss's summoning sequence.
pub const MINION_SPAWN_DURATION: f32 = 1.5;

/// Build the state machine for an enemy with `behavior`. The machine starts
/// without a current state; the host enters [`Idle`] on the first tick.
#[must_use]
pub fn build_brain(behavior: &Behavior) -> StateMachine<EnemyContext> {
    let attack_range = behavior.attack_range();
    let mut fsm = StateMachine::new()
        .with_state(Idle)
        .with_state(Chase::new(attack_range))
        .with_state(Attack::new(attack_range))
        .with_state(Dead);
    if behavior.boss().is_some() {
        fsm.register_state(SpawnMinion);
    }
    fsm
}

/// Standing still until something worth attacking shows up.
#[derive(Debug, Default)]
pub struct Idle;

impl State<EnemyContext> for Idle {
    fn on_enter(&mut self, ctx: &mut EnemyContext) {
        ctx.push(EnemyAction::Stop);
    }

    fn on_update(&mut self, ctx: &mut EnemyContext) -> Transition {
        if ctx.target.is_some() {
            Transition::to::<Chase>()
        } else {
            Transition::Stay
        }
    }
}

/// Walking toward the current target.
#[derive(Debug)]
pub struct Chase {
    attack_range: f32,
}

impl Chase {
    #[must_use]
    pub const fn new(attack_range: f32) -> Self {
        Self { attack_range }
    }
}

impl State<EnemyContext> for Chase {
    fn on_update(&mut self, ctx: &mut EnemyContext) -> Transition {
        let Some(distance) = ctx.distance_to_target() else {
            return Transition::to::<Idle>();
        };
        if distance <= self.attack_range {
            Transition::to::<Attack>()
        } else {
            Transition::Stay
        }
    }

    fn on_fixed_update(&mut self, ctx: &mut EnemyContext) {
        if ctx.immobilized {
            return;
        }
        if let Some(direction) = ctx.direction_to_target() {
            ctx.push(EnemyAction::Move {
                direction,
                speed: ctx.move_speed,
            });
        }
    }

    fn on_exit(&mut self, ctx: &mut EnemyContext) {
        ctx.push(EnemyAction::Stop);
    }
}

/// In range: attack on cooldown until the target escapes.
#[derive(Debug)]
pub struct Attack {
    attack_range: f32,
    next_attack_at: f32,
}

impl Attack {
    #[must_use]
    pub const fn new(attack_range: f32) -> Self {
        Self {
            attack_range,
            next_attack_at: 0.0,
        }
    }
}

impl State<EnemyContext> for Attack {
    fn on_enter(&mut self, ctx: &mut EnemyContext) {
        ctx.push(EnemyAction::Stop);
        ctx.status.is_attacking = false;
        ctx.cancel_strikes();
        self.next_attack_at = ctx.now;
        ctx.status.attack_animation = true;
    }

    fn on_update(&mut self, ctx: &mut EnemyContext) -> Transition {
        let Some(distance) = ctx.distance_to_target() else {
            return Transition::to::<Chase>();
        };
        if distance > self.attack_range + ATTACK_RANGE_SLACK {
            return Transition::to::<Chase>();
        }

        let ready = ctx.now >= self.next_attack_at && !ctx.status.is_attacking;

        if let Some(boss) = ctx.behavior.boss().copied() {
            if !ready {
                return Transition::Stay;
            }
            if distance <= boss.melee_radius {
                ctx.push(EnemyAction::BossAttack(BossMove::Melee));
                self.next_attack_at = ctx.now + boss.melee_delay;
            } else if distance <= boss.special_radius {
                ctx.push(EnemyAction::BossAttack(BossMove::Special));
                self.next_attack_at = ctx.now + boss.special_delay;
            }
            return Transition::Stay;
        }

        let mut attacked = false;
        if ready {
            ctx.push(EnemyAction::Attack);
            self.next_attack_at = ctx.now + ctx.attack_cooldown;
            attacked = true;
        }
        if ctx.behavior.is_ranged() && ctx.can_shoot && !attacked {
            ctx.push(EnemyAction::Attack);
        }
        Transition::Stay
    }

    fn on_exit(&mut self, ctx: &mut EnemyContext) {
        ctx.status.is_attacking = false;
        ctx.status.attack_animation = false;
        ctx.cancel_strikes();
    }
}

/// Terminal. Never exited.
#[derive(Debug, Default)]
pub struct Dead;

impl State<EnemyContext> for Dead {
    fn on_enter(&mut self, ctx: &mut EnemyContext) {
        ctx.push(EnemyAction::Stop);
        ctx.status.is_attacking = false;
        ctx.status.attack_animation = false;
        ctx.push(EnemyAction::Animate(AnimationCue::Death));
        ctx.push(EnemyAction::DisableCollision);
        ctx.push(EnemyAction::FreezeBody);
        ctx.push(EnemyAction::Schedule {
            delay: DEATH_FOLLOW_UP_DELAY,
            step: EnemyStep::DeathFollowUp,
        });
    }
}

/// Boss only: stand still and summon. The host finishes the sequence.
#[derive(Debug, Default)]
pub struct SpawnMinion;

impl State<EnemyContext> for SpawnMinion {
    fn on_enter(&mut self, ctx: &mut EnemyContext) {
        ctx.push(EnemyAction::Stop);
        ctx.status.is_attacking = false;
        ctx.status.is_spawning = true;
        ctx.push(EnemyAction::Animate(AnimationCue::SummonMinions));
        ctx.push(EnemyAction::Schedule {
            delay: MINION_SPAWN_DURATION,
            step: EnemyStep::FinishMinionSpawn,
        });
    }

    fn on_exit(&mut self, ctx: &mut EnemyContext) {
        ctx.status.is_spawning = false;
        ctx.push(EnemyAction::Cancel(EnemyStep::FinishMinionSpawn));
    }
}
