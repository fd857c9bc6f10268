//! Development tools, only included with `cargo run --features dev`.
//!
//! Debug overlays, test spawners, and inspector setup go here.
//! This module is stripped from release builds.

use bevy::prelude::*;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use crate::gameplay::Player;
use crate::gameplay::enemy::{Archetype, Enemy, EnemyRoster, EnemyStats, spawn_enemy};
use crate::{GameSet, gameplay_running};

/// Distance from the player at which debug enemies appear.
const DEBUG_SPAWN_DISTANCE: f32 = 200.0;

const SPAWN_KEYS: [(KeyCode, Archetype); 4] = [
    (KeyCode::Digit1, Archetype::Skeleton),
    (KeyCode::Digit2, Archetype::Infernum),
    (KeyCode::Digit3, Archetype::GardenGnome),
    (KeyCode::Digit4, Archetype::Boss),
];

/// Number keys 1-4 drop one enemy of the matching archetype near the player.
fn debug_spawn_enemies(
    keyboard: Res<ButtonInput<KeyCode>>,
    roster: Res<EnemyRoster>,
    player: Query<&GlobalTransform, With<Player>>,
    mut commands: Commands,
) {
    let origin = player
        .iter()
        .next()
        .map_or(Vec2::ZERO, |transform| transform.translation().xy());
    for (key, archetype) in SPAWN_KEYS {
        if !keyboard.just_pressed(key) {
            continue;
        }
        let definition = roster.definition(archetype);
        let at = origin + Vec2::X * DEBUG_SPAWN_DISTANCE;
        spawn_enemy(&mut commands, archetype, &definition, at);
        info!("debug spawned {} at {at}", archetype.display_name());
    }
}

/// Detection (grey) and attack (red) radius of every enemy.
fn draw_enemy_ranges(mut gizmos: Gizmos, enemies: Query<(&GlobalTransform, &Enemy, &EnemyStats)>) {
    for (transform, enemy, stats) in &enemies {
        let center = transform.translation().xy();
        gizmos.circle_2d(center, stats.detection_range, Color::srgba(0.6, 0.6, 0.6, 0.3));
        gizmos.circle_2d(center, enemy.behavior.attack_range(), Color::srgb(0.9, 0.2, 0.2));
    }
}

pub fn plugin(app: &mut App) {
    app.add_plugins((EguiPlugin::default(), WorldInspectorPlugin::new()));
    app.add_systems(
        Update,
        (
            debug_spawn_enemies.before(GameSet::Ai),
            draw_enemy_ranges.in_set(GameSet::Feedback),
        )
            .run_if(gameplay_running),
    );
}
