//! Combat plugin - projectiles, melee, and damage resolution.

use bevy::prelude::*;

use super::components::CombatConfig;
use super::manager::CombatManager;
use super::profile::load_weapons;
use super::systems::*;
use crate::core::FrameSet;

/// Combat plugin - handles all combat systems.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Config first, the manager reads it on creation
            .init_resource::<CombatConfig>()
            .init_resource::<CombatManager>()

            .add_systems(Startup, load_weapons)

            .add_systems(Update, step_collision_world.in_set(FrameSet::Physics))
            .add_systems(Update, dispatch_contacts.in_set(FrameSet::Contacts))
            .add_systems(
                Update,
                (resolve_combat, remove_defeated_npcs, check_player_defeat)
                    .chain()
                    .in_set(FrameSet::Resolve),
            )
            .add_systems(Update, flush_feedback.in_set(FrameSet::Feedback));
    }
}
