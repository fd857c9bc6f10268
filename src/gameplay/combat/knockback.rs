//! Knockback: a short, externally applied shove that overrides movement.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::{GameSet, gameplay_running};

/// Present while an actor is being knocked back. Chase skips its move hook
/// for as long as this component exists.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Knockback {
    pub velocity: Vec2,
    pub timer: Timer,
}

impl Knockback {
    #[must_use]
    pub fn new(velocity: Vec2, duration_secs: f32) -> Self {
        Self {
            velocity,
            timer: Timer::from_seconds(duration_secs, TimerMode::Once),
        }
    }

    /// Advance by `delta`; returns `true` once the shove is over.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.timer.tick(delta);
        self.timer.just_finished()
    }
}

/// `SystemSet` for knockback so brain movement can order before it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct KnockbackStep;

/// Drive knocked-back bodies and drop the component when it expires.
fn apply_knockback(
    time: Res<Time>,
    mut commands: Commands,
    mut shoved: Query<(Entity, &mut Knockback, &mut LinearVelocity)>,
) {
    for (entity, mut knockback, mut velocity) in &mut shoved {
        if knockback.tick(time.delta()) {
            velocity.0 = Vec2::ZERO;
            commands.entity(entity).remove::<Knockback>();
        } else {
            velocity.0 = knockback.velocity;
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Knockback>();
    app.add_systems(
        Update,
        apply_knockback
            .in_set(KnockbackStep)
            .in_set(GameSet::Movement)
            .run_if(gameplay_running),
    );
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn knockback_sets_velocity_then_expires() {
        let mut app = crate::testing::create_stepped_app(Duration::from_millis(100));
        app.add_systems(Update, apply_knockback);
        let body = app
            .world_mut()
            .spawn((
                Knockback::new(Vec2::new(50.0, 0.0), 0.25),
                LinearVelocity::ZERO,
            ))
            .id();

        app.update();
        assert_eq!(app.world().get::<LinearVelocity>(body).unwrap().0, Vec2::new(50.0, 0.0));
        assert!(app.world().get::<Knockback>(body).is_some());

        crate::testing::tick_multiple(&mut app, 2);
        assert_eq!(app.world().get::<LinearVelocity>(body).unwrap().0, Vec2::ZERO);
        assert!(app.world().get::<Knockback>(body).is_none());
    }
}
