//! What an enemy's states see of the world, and what they may ask of it.
//!
//! States never touch the ECS. The host builds an [`EnemyContext`] from the
//! actor's components before each dispatch, states read it and queue
//! [`EnemyAction`]s, and the host applies those actions afterwards.

use bevy::prelude::*;

use super::{BossMove, EnemyStatus, EnemyStep, TargetCategory};
use super::config::Behavior;
use crate::gameplay::feedback::AnimationCue;

/// Where the current target is this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSighting {
    pub entity: Entity,
    /// Centre of the target's body.
    pub position: Vec2,
    pub category: TargetCategory,
    /// How far the target's surface sits in front of its centre, seen from
    /// the enemy. Zero for bodies without a collider.
    pub extent: f32,
}

/// Side effects a state can request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyAction {
    /// Move hook: walk along `direction` (unit length) at `speed`.
    Move { direction: Vec2, speed: f32 },
    /// Zero the body's velocity.
    Stop,
    /// Archetype attack hook.
    Attack,
    /// Start a timed boss attack.
    BossAttack(BossMove),
    Animate(AnimationCue),
    /// Disable every collider on the actor.
    DisableCollision,
    /// Zero velocity and take the body out of the simulation.
    FreezeBody,
    Schedule { delay: f32, step: EnemyStep },
    Cancel(EnemyStep),
}

/// Snapshot of one enemy handed to its state machine.
#[derive(Debug, Clone)]
pub struct EnemyContext {
    /// Elapsed game time in seconds.
    pub now: f32,
    pub position: Vec2,
    pub target: Option<TargetSighting>,
    pub behavior: Behavior,
    pub move_speed: f32,
    pub attack_cooldown: f32,
    pub status: EnemyStatus,
    /// Knocked back or clinging: the move hook must not run.
    pub immobilized: bool,
    /// Archetype-internal fire gate (ranged only).
    pub can_shoot: bool,
    actions: Vec<EnemyAction>,
}

impl EnemyContext {
    #[must_use]
    pub fn new(behavior: Behavior, position: Vec2) -> Self {
        Self {
            now: 0.0,
            position,
            target: None,
            behavior,
            move_speed: 0.0,
            attack_cooldown: 0.0,
            status: EnemyStatus::default(),
            immobilized: false,
            can_shoot: false,
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, action: EnemyAction) {
        self.actions.push(action);
    }

    /// Drain the queued actions in request order.
    pub fn take_actions(&mut self) -> Vec<EnemyAction> {
        std::mem::take(&mut self.actions)
    }

    #[cfg(test)]
    #[must_use]
    pub fn actions(&self) -> &[EnemyAction] {
        &self.actions
    }

    /// Distance from the enemy's centre to the target's surface.
    #[must_use]
    pub fn distance_to_target(&self) -> Option<f32> {
        self.target
            .map(|target| (self.position.distance(target.position) - target.extent).max(0.0))
    }

    #[must_use]
    pub fn direction_to_target(&self) -> Option<Vec2> {
        self.target
            .and_then(|target| (target.position - self.position).try_normalize())
    }

    /// Cancel every pending strike so a stale swing cannot land later.
    pub fn cancel_strikes(&mut self) {
        self.push(EnemyAction::Cancel(EnemyStep::MeleeStrike));
        self.push(EnemyAction::Cancel(EnemyStep::BossStrike(BossMove::Melee)));
        self.push(EnemyAction::Cancel(EnemyStep::BossStrike(BossMove::Special)));
    }
}
