//! Third-party plugin isolation.

mod avian;

pub use avian::{CollisionLayer, surface_distance};

/// Physics setup. Kept out of the gameplay plugin so tests can run the
/// gameplay systems without a physics pipeline.
pub fn plugin(app: &mut bevy::prelude::App) {
    app.add_plugins(avian::plugin);
}
