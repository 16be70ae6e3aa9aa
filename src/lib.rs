//! Dungeon Combat - the collision and combat core of a top-down dungeon game.
//!
//! # Architecture
//!
//! The game is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Game states, frame ordering, feedback events, errors
//! - **Physics**: Actor taxonomy and the bridge to the rigid-body solver
//! - **World**: Rooms, tile-to-wall extraction, the collision world
//! - **Combat**: Weapons, projectiles, damage and knockback resolution
//! - **Npc**: NPC definitions, AI movement, health, attacks
//! - **Player**: Player input, movement, and weapon handling
//!
//! Every per-frame rule lives in plain Rust types (`CollisionWorld`,
//! `CombatManager`, `Npc`, `Player`) that the plugins wrap as resources and
//! components, so the whole pipeline can be driven without a Bevy app.

pub mod combat;
pub mod core;
pub mod npc;
pub mod physics;
pub mod player;
pub mod world;

use bevy::prelude::*;

/// Main plugin that adds all sub-plugins.
pub struct DungeonCombatPlugin;

impl Plugin for DungeonCombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Room loading and collision world
            .add_plugins(world::WorldPlugin)

            // Combat systems
            .add_plugins(combat::CombatPlugin)

            // NPC systems
            .add_plugins(npc::NpcPlugin)

            // Player systems
            .add_plugins(player::PlayerPlugin);
    }
}
