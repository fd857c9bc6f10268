//! Garden siege entry point.

use bevy::prelude::*;

fn main() {
    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Garden Siege".to_string(),
                    resolution: (1280, 720).into(),
                    resizable: true,
                    ..default()
                }),
                ..default()
            })
            .set(ImagePlugin::default_nearest()),
    )
    .add_plugins((garden_siege::third_party::plugin, garden_siege::plugin));

    #[cfg(feature = "dev")]
    app.add_plugins(garden_siege::dev_tools::plugin);

    app.run();
}
