//! Combat systems - physics step, contact dispatch, resolution, feedback.

use bevy::prelude::*;

use super::manager::CombatManager;
use crate::core::{FeedbackEvent, GameState};
use crate::npc::Npc;
use crate::physics::{CollisionActor, ContactEvent};
use crate::player::Player;
use crate::world::CollisionWorld;

/// Step the collision world and publish this frame's contacts.
pub fn step_collision_world(
    time: Res<Time>,
    mut world: ResMut<CollisionWorld>,
    mut contacts: EventWriter<ContactEvent>,
) {
    let events = world.step(time.delta_secs());
    if !events.is_empty() {
        contacts.send_batch(events);
    }
}

/// Run every actor's collision hook, then resolve projectile hits.
///
/// The solver step has already returned, so hooks are free to add and
/// remove bodies.
pub fn dispatch_contacts(
    mut contacts: EventReader<ContactEvent>,
    mut manager: ResMut<CombatManager>,
    mut world: ResMut<CollisionWorld>,
    mut npc_query: Query<&mut Npc>,
    mut player_query: Query<&mut Player>,
) {
    let contacts: Vec<ContactEvent> = contacts.read().copied().collect();
    let mut npcs: Vec<&mut Npc> = npc_query.iter_mut().map(Mut::into_inner).collect();
    let player = player_query.get_single_mut().ok().map(Mut::into_inner);

    manager.dispatch_contacts(&contacts, &mut world, &mut npcs, player);
}

/// Per-frame combat resolution with fresh hit polygons.
pub fn resolve_combat(
    time: Res<Time>,
    mut manager: ResMut<CombatManager>,
    mut world: ResMut<CollisionWorld>,
    mut npc_query: Query<&mut Npc>,
    mut player_query: Query<&mut Player>,
) {
    let mut npcs: Vec<&mut Npc> = npc_query.iter_mut().map(Mut::into_inner).collect();
    let player = player_query.get_single_mut().ok().map(Mut::into_inner);

    manager.update(time.delta_secs(), &mut world, &mut npcs, player);
}

/// Unregister and despawn NPCs whose defeat timer ran out.
pub fn remove_defeated_npcs(
    mut commands: Commands,
    mut world: ResMut<CollisionWorld>,
    query: Query<(Entity, &Npc)>,
) {
    for (entity, npc) in query.iter() {
        if !npc.health.is_ready_to_remove() {
            continue;
        }
        if let Some(id) = npc.actor {
            world.unregister(id);
        }
        debug!("Removing {} at {:?}", npc.npc_type, npc.bounds().center());
        commands.entity(entity).despawn_recursive();
    }
}

/// Move to GameOver once the player has fallen.
pub fn check_player_defeat(
    query: Query<&Player>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if query.iter().any(Player::is_defeated) {
        info!("Player died! Transitioning to Game Over...");
        next_state.set(GameState::GameOver);
    }
}

/// Hand queued feedback to whoever listens.
pub fn flush_feedback(
    mut manager: ResMut<CombatManager>,
    mut events: EventWriter<FeedbackEvent>,
) {
    let feedback = manager.take_feedback();
    if !feedback.is_empty() {
        events.send_batch(feedback.into_iter().map(FeedbackEvent));
    }
}
