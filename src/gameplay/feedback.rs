//! Notifications the combat core sends to presentation collaborators
//! (audio, camera, animation, rewards), plus their default consumers.

use bevy::prelude::*;
use rand::Rng;

use crate::gameplay::enemy::{Archetype, TargetCategory};
use crate::{GameSet, gameplay_running};

// === Messages ===

/// Fire-and-forget request to play a named sound. `at` is set for positional cues.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct SoundCue {
    pub event: &'static str,
    pub at: Option<Vec2>,
}

/// Request to shake the camera.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct CameraShake {
    pub intensity: f32,
    pub duration: f32,
}

/// Animation triggers raised by enemy states and attack hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum AnimationCue {
    Attack,
    BossMelee,
    BossSpecial,
    SummonMinions,
    Death,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTrigger {
    pub entity: Entity,
    pub cue: AnimationCue,
}

/// An enemy started an attack against `target`.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyAttacked {
    pub enemy: Entity,
    pub target: Option<Entity>,
    pub category: Option<TargetCategory>,
}

/// An enemy died. Sent exactly once per enemy.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyDied {
    pub enemy: Entity,
    pub archetype: Archetype,
}

// === Camera Shake ===

/// Shake currently applied to the camera.
#[derive(Resource, Debug, Default, Reflect)]
#[reflect(Resource)]
pub struct ScreenShake {
    pub intensity: f32,
    pub remaining: f32,
    /// Offset applied to the camera last frame, removed before the next one.
    pub applied: Vec2,
}

impl ScreenShake {
    /// Merge a new request; the stronger and longer shake wins.
    pub fn add(&mut self, shake: CameraShake) {
        self.intensity = self.intensity.max(shake.intensity);
        self.remaining = self.remaining.max(shake.duration);
    }

    /// Count down by `dt`. Returns the offset magnitude for this frame.
    pub fn decay(&mut self, dt: f32) -> f32 {
        if self.remaining <= 0.0 {
            self.intensity = 0.0;
            return 0.0;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        self.intensity
    }
}

fn apply_camera_shake(
    time: Res<Time>,
    mut requests: MessageReader<CameraShake>,
    mut shake: ResMut<ScreenShake>,
    mut cameras: Query<&mut Transform, With<Camera2d>>,
) {
    for request in requests.read() {
        shake.add(*request);
    }

    let magnitude = shake.decay(time.delta_secs());
    let offset = if magnitude > 0.0 {
        let mut rng = rand::rng();
        Vec2::new(
            rng.random_range(-magnitude..=magnitude),
            rng.random_range(-magnitude..=magnitude),
        )
    } else {
        Vec2::ZERO
    };

    let previous = shake.applied;
    for mut transform in &mut cameras {
        transform.translation.x += offset.x - previous.x;
        transform.translation.y += offset.y - previous.y;
    }
    shake.applied = offset;
}

// === Audio ===

/// Default audio collaborator: no mixer is wired in, so cues are only logged.
fn log_sound_cues(mut cues: MessageReader<SoundCue>) {
    for cue in cues.read() {
        debug!("sound cue `{}` at {:?}", cue.event, cue.at);
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.add_message::<SoundCue>()
        .add_message::<CameraShake>()
        .add_message::<AnimationTrigger>()
        .add_message::<EnemyAttacked>()
        .add_message::<EnemyDied>();

    app.register_type::<ScreenShake>()
        .init_resource::<ScreenShake>();

    app.add_systems(
        Update,
        (apply_camera_shake, log_sound_cues)
            .in_set(GameSet::Feedback)
            .run_if(gameplay_running),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stronger_shake_wins() {
        let mut shake = ScreenShake::default();
        shake.add(CameraShake {
            intensity: 2.0,
            duration: 0.5,
        });
        shake.add(CameraShake {
            intensity: 1.0,
            duration: 1.0,
        });

        assert_eq!(shake.intensity, 2.0);
        assert_eq!(shake.remaining, 1.0);
    }

    #[test]
    fn shake_decays_to_rest() {
        let mut shake = ScreenShake::default();
        shake.add(CameraShake {
            intensity: 3.0,
            duration: 0.5,
        });

        assert_eq!(shake.decay(0.25), 3.0);
        assert_eq!(shake.decay(0.25), 3.0);
        assert_eq!(shake.decay(0.25), 0.0);
        assert_eq!(shake.intensity, 0.0);
    }
}
