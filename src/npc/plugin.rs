//! NPC plugin - definition loading and the per-frame NPC update.

use bevy::prelude::*;

use super::components::Npc;
use super::data::load_npcs;
use crate::combat::CombatManager;
use crate::core::FrameSet;
use crate::player::{update_player, Player};
use crate::world::CollisionWorld;

/// NPC plugin - handles NPC definitions, AI, and attacks.
pub struct NpcPlugin;

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_npcs).add_systems(
            Update,
            update_npcs.in_set(FrameSet::Actors).after(update_player),
        );
    }
}

/// Move, swing, and fire for every NPC, then sync their bodies.
pub fn update_npcs(
    time: Res<Time>,
    mut npc_query: Query<&mut Npc>,
    player_query: Query<&Player>,
    mut world: ResMut<CollisionWorld>,
    mut manager: ResMut<CombatManager>,
) {
    let dt = time.delta_secs();
    let player_center = player_query
        .get_single()
        .ok()
        .filter(|player| !player.is_defeated())
        .map(Player::visual_center);
    let mut rng = rand::thread_rng();

    for mut npc in npc_query.iter_mut() {
        let obstacles = world.nearby_obstacles(npc.center());
        if let Some(shot) = npc.update(dt, player_center, &obstacles, &mut rng) {
            if manager.spawn_projectile(shot, &mut world).is_none() {
                warn!("{} could not launch its projectile", npc.npc_type);
            }
        }
        world.update_npc_position(&npc);
    }
}
