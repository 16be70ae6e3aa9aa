//! Player module - player entity, input, movement, and weapon handling.

mod components;
mod movement;
mod plugin;

pub use components::*;
pub use movement::{read_player_input, spawn_player, update_player};
pub use plugin::PlayerPlugin;
