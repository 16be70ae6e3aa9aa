//! World plugin - room loading, collision world setup, and teardown.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::combat::{CombatManager, WeaponRegistry};
use crate::core::GameState;
use crate::npc::{spawn_npc, Npc, NpcRegistry};
use crate::player::{spawn_player, Player, PlayerConfig};

use super::collision_world::CollisionWorld;
use super::data::{load_rooms, CurrentRoom, RoomDefinition, RoomRegistry};

/// World plugin - handles room loading and the collision world lifecycle.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CollisionWorld>()
            .add_systems(Startup, load_rooms)
            .add_systems(Update, finish_loading.run_if(in_state(GameState::Loading)))
            .add_systems(OnEnter(GameState::InGame), setup_room)
            .add_systems(OnEnter(GameState::GameOver), cleanup_room);
    }
}

/// Leave `Loading` once every data registry is in place.
fn finish_loading(
    rooms: Option<Res<RoomRegistry>>,
    npcs: Option<Res<NpcRegistry>>,
    weapons: Option<Res<WeaponRegistry>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if rooms.is_some() && npcs.is_some() && weapons.is_some() {
        next_state.set(GameState::InGame);
    }
}

/// Loaded data a room is built from.
#[derive(SystemParam)]
pub struct RoomData<'w> {
    rooms: Res<'w, RoomRegistry>,
    current_room: Res<'w, CurrentRoom>,
    npcs: Res<'w, NpcRegistry>,
    weapons: Res<'w, WeaponRegistry>,
    player_config: Res<'w, PlayerConfig>,
}

/// Build the current room: walls, chests, player, NPCs.
///
/// Coming back from `Paused` re-enters `InGame`; the room is still loaded
/// then and nothing is rebuilt.
pub fn setup_room(
    mut commands: Commands,
    mut world: ResMut<CollisionWorld>,
    mut manager: ResMut<CombatManager>,
    data: RoomData,
) {
    if world.is_loaded() {
        return;
    }

    let current_room = &data.current_room;
    let room = match data.rooms.get(&current_room.name) {
        Some(room) => room.clone(),
        None => {
            warn!(
                "Room '{}' not found, building the fallback room",
                current_room.name
            );
            RoomDefinition::fallback()
        }
    };

    info!("Building room: {}", room.name);

    *world = CollisionWorld::new(room.tile_size);
    world.build_from_tiles(&room.tile_grid());
    for rect in room.chest_rects() {
        world.add_chest(rect);
    }

    manager.reset();
    manager.set_world_bounds(world.play_area());

    let player_center = spawn_player(
        &mut commands,
        &mut world,
        &data.weapons,
        &data.player_config,
        room.player_start(),
    );

    let spawned = room
        .npc_spawns()
        .iter()
        .filter_map(|spawn| {
            spawn_npc(
                &mut commands,
                &mut world,
                &data.npcs,
                &data.weapons,
                spawn,
                Some(player_center),
            )
        })
        .count();

    info!("Room '{}' ready with {} NPC(s)", room.name, spawned);
}

/// Dispose of the scene: every body, every projectile, every entity.
fn cleanup_room(
    mut commands: Commands,
    mut world: ResMut<CollisionWorld>,
    mut manager: ResMut<CombatManager>,
    npc_query: Query<Entity, With<Npc>>,
    player_query: Query<Entity, With<Player>>,
) {
    world.clear();
    manager.reset();

    for entity in npc_query.iter() {
        commands.entity(entity).despawn_recursive();
    }
    for entity in player_query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
