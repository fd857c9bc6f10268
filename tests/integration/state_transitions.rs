//! Tests for game state transitions.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use garden_siege::GameState;
use pretty_assertions::assert_eq;

fn create_game_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.add_plugins(garden_siege::plugin);
    app
}

#[test]
fn game_initializes_in_loading_state() {
    let app = create_game_app();
    let state = app.world().resource::<State<GameState>>();
    assert_eq!(*state.get(), GameState::Loading);
}

#[test]
fn loading_finishes_into_the_garden() {
    let mut app = create_game_app();

    app.update();
    app.update();

    let state = app.world().resource::<State<GameState>>();
    assert_eq!(*state.get(), GameState::InGame);
    assert!(
        app.world()
            .get_resource::<garden_siege::gameplay::enemy::EnemyRoster>()
            .is_some()
    );
}
