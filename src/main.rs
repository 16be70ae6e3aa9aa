//! Dungeon Combat - headless entry point.
//!
//! Builds the current room and runs the combat frame at 60 Hz until the
//! player is defeated.
//!
//! Controls (when a keyboard is attached):
//! - WASD: Move
//! - Space: Melee attack
//! - F: Fire ranged weapon
//! - Shift: Block
//! - Escape: Pause/Unpause

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use dungeon_combat::core::GameState;

fn main() -> AppExit {
    App::new()
        // Headless frame loop
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            Duration::from_secs_f64(1.0 / 60.0),
        )))
        .add_plugins((StatesPlugin, LogPlugin::default()))

        // Our game plugin
        .add_plugins(dungeon_combat::DungeonCombatPlugin)

        .add_systems(OnEnter(GameState::GameOver), exit_on_game_over)
        .run()
}

fn exit_on_game_over(mut exit: EventWriter<AppExit>) {
    info!("Game over");
    exit.send(AppExit::Success);
}
