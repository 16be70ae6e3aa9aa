//! Game state definitions that control the overall flow of the game.
//!
//! States determine which systems run at any given time. The whole combat
//! frame only runs in `InGame`; reaching `GameOver` tears the scene down.

use bevy::prelude::*;

/// Main game states - controls overall game flow.
///
/// - Start in `Loading` while data files are read
/// - Enter `InGame` once the room can be built
/// - `Paused` freezes the frame pipeline but keeps the scene alive
/// - `GameOver` when the player is defeated
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    /// Initial state - loading data files
    #[default]
    Loading,
    /// Active gameplay
    InGame,
    /// Game is paused (scene stays registered)
    Paused,
    /// Player has been defeated
    GameOver,
}
