//! Garden siege: enemy combat and AI for a top-down survival/defense game.

#[cfg(feature = "dev")]
pub mod dev_tools;
pub mod gameplay;
#[cfg(test)]
pub mod testing;
pub mod third_party;

use bevy::prelude::*;

/// Primary game states.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Reading data files (enemy roster).
    #[default]
    Loading,
    /// Active gameplay state.
    InGame,
}

/// Per-frame ordering of gameplay systems, chained in `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    /// Spatial index rebuild and target selection.
    Ai,
    /// State machine updates, attacks, projectiles, death.
    Combat,
    /// Fixed-cadence state updates that drive velocities.
    Movement,
    /// Camera shake, audio and other presentation consumers.
    Feedback,
}

/// Z layer for enemies and other actors.
pub const Z_ACTOR: f32 = 2.0;

/// Z layer for projectiles, drawn above actors.
pub const Z_PROJECTILE: f32 = 3.0;

/// Run condition: gameplay systems only tick while in `InGame`.
pub fn gameplay_running(state: Option<Res<State<GameState>>>) -> bool {
    state.is_some_and(|state| *state.get() == GameState::InGame)
}

fn finish_loading(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InGame);
}

/// Root plugin: states, system ordering and every gameplay domain.
pub fn plugin(app: &mut App) {
    app.init_state::<GameState>();
    app.configure_sets(
        Update,
        (
            GameSet::Ai,
            GameSet::Combat,
            GameSet::Movement,
            GameSet::Feedback,
        )
            .chain(),
    );
    app.add_systems(
        OnEnter(GameState::Loading),
        (gameplay::enemy::load_enemy_roster, finish_loading).chain(),
    );

    app.add_plugins(gameplay::plugin);
}
