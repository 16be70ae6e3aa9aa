//! NPC module - definitions, AI movement, health, attacks, and spawning.
//!
//! An [`Npc`] is one component composed of three small state machines:
//! [`NpcMovement`], [`NpcHealth`] and [`NpcCombat`]. Each can be driven and
//! tested without a Bevy app.

mod attack;
mod components;
mod data;
mod health;
mod movement;
mod plugin;
mod spawning;

pub use attack::NpcCombat;
pub use components::Npc;
pub use data::{load_npc_definitions, NpcDefinition, NpcRegistry};
pub use health::{DamageOutcome, NpcHealth, DEFEAT_DURATION, HIT_COOLDOWN};
pub use movement::{AiKind, MovementPhase, NpcMovement};
pub use plugin::{update_npcs, NpcPlugin};
pub use spawning::{spawn_npc, validate_spawn, MIN_PLAYER_DISTANCE};
