//! Player input, per-frame update, and spawning.

use bevy::prelude::*;

use super::components::{Player, PlayerConfig};
use crate::combat::{CombatManager, Weapon, WeaponRegistry};
use crate::world::CollisionWorld;

/// Translate WASD / Space / F / Shift into the player's intent.
///
/// Headless runs have no keyboard resource; the intent is then left to
/// whatever else drives the player.
pub fn read_player_input(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    mut player_query: Query<&mut Player>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };
    let Ok(mut player) = player_query.get_single_mut() else {
        return;
    };

    // Display space: y grows downwards.
    let mut direction = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        direction.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        direction.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }

    player.intent.movement = direction;
    player.intent.block = keyboard.pressed(KeyCode::ShiftLeft);
    player.intent.attack |= keyboard.just_pressed(KeyCode::Space);
    player.intent.fire |= keyboard.just_pressed(KeyCode::KeyF);
}

/// Move and swing the player, launch shots, and sync the body.
pub fn update_player(
    time: Res<Time>,
    mut player_query: Query<&mut Player>,
    mut world: ResMut<CollisionWorld>,
    mut manager: ResMut<CombatManager>,
) {
    let Ok(mut player) = player_query.get_single_mut() else {
        return;
    };

    let obstacles = world.nearby_obstacles(player.visual_center());
    if let Some(shot) = player.update(time.delta_secs(), &obstacles, &mut manager) {
        if manager.spawn_projectile(shot, &mut world).is_none() {
            warn!("Player projectile could not be registered");
        }
    }
    world.update_player_position(&player);
}

/// Spawn the player at `position` (sprite top-left) and register its body.
///
/// Returns the player's visual center, used to keep NPC spawns at a distance.
pub fn spawn_player(
    commands: &mut Commands,
    world: &mut CollisionWorld,
    weapon_registry: &WeaponRegistry,
    config: &PlayerConfig,
    position: Vec2,
) -> Vec2 {
    let weapon = Weapon::from_definition(&weapon_registry.get_or_default(&config.starting_weapon));
    let mut player = Player::with_config(position, weapon, config);

    player.actor = world.register_player(&player);
    if player.actor.is_none() {
        warn!("Player body could not be created at {:?}", position);
    }

    let center = player.visual_center();
    info!("Spawned player at {:?} with {}", center, player.weapon.name);
    commands.spawn((player, Name::new("Player")));
    center
}
