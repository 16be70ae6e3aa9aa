//! Player plugin - keyboard intent and the per-frame player update.

use bevy::prelude::*;

use super::components::PlayerConfig;
use super::movement::{read_player_input, update_player};
use crate::core::FrameSet;

/// Player plugin. The player entity itself is spawned with the room.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerConfig>().add_systems(
            Update,
            (read_player_input, update_player)
                .chain()
                .in_set(FrameSet::Actors),
        );
    }
}
