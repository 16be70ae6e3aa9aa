//! NPC spawning with placement checks.

use bevy::prelude::*;

use super::components::Npc;
use super::data::NpcRegistry;
use crate::combat::{Weapon, WeaponRegistry};
use crate::core::CombatError;
use crate::physics::{CollisionActor, Hitbox};
use crate::world::{CollisionWorld, NpcSpawnPoint, Obstacles};

/// NPCs never appear closer than this to the player's center.
pub const MIN_PLAYER_DISTANCE: f32 = 64.0;

/// Check that an NPC may appear at `position` (sprite top-left).
pub fn validate_spawn(
    position: Vec2,
    sprite_size: Vec2,
    hitbox: &Hitbox,
    player_center: Option<Vec2>,
    obstacles: &impl Obstacles,
) -> Result<(), CombatError> {
    let reject = |reason: &str| CombatError::InvalidSpawnPosition {
        x: position.x,
        y: position.y,
        reason: reason.to_string(),
    };

    if let Some(player) = player_center {
        if player.distance(position + sprite_size * 0.5) < MIN_PLAYER_DISTANCE {
            return Err(reject("too close to the player"));
        }
    }

    let bounds = hitbox.at(position);
    if obstacles.is_blocked(bounds) {
        return Err(reject("overlaps solid scenery"));
    }

    let area = obstacles.play_area();
    if !area.is_empty() && !area.contains(bounds.center()) {
        return Err(reject("outside the room"));
    }

    Ok(())
}

/// Spawn one NPC from a layout spawn point.
///
/// Unknown NPC types spawn as the weakest known type. Returns `None` when
/// the placement is rejected or the body cannot be created.
pub fn spawn_npc(
    commands: &mut Commands,
    world: &mut CollisionWorld,
    npc_registry: &NpcRegistry,
    weapon_registry: &WeaponRegistry,
    spawn: &NpcSpawnPoint,
    player_center: Option<Vec2>,
) -> Option<Entity> {
    let definition = npc_registry.get_or_weakest(&spawn.npc_type);
    let weapon = Weapon::from_definition(&weapon_registry.get_or_default(&definition.weapon));
    let mut npc = Npc::from_definition(&spawn.npc_type, &definition, weapon, spawn.position);

    if let Err(err) = validate_spawn(
        npc.position,
        npc.sprite_size,
        &npc.hitbox,
        player_center,
        &*world,
    ) {
        debug!("{}", err);
        return None;
    }

    let Some(actor) = world.register_npc(&npc) else {
        warn!("{} at {:?} could not be registered", definition.name, spawn.position);
        return None;
    };
    npc.actor = Some(actor);

    debug!(
        "Spawned {} at {:?}",
        definition.name,
        npc.bounds().center()
    );
    Some(
        commands
            .spawn((npc, Name::new(definition.name.clone())))
            .id(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TileGrid;

    fn room() -> CollisionWorld {
        let mut world = CollisionWorld::new(32.0);
        world.build_from_tiles(&TileGrid::from_rows(
            &["#######", "#.....#", "#.....#", "#######"],
            |c| c == '#',
        ));
        world
    }

    fn check(position: Vec2, player: Option<Vec2>, world: &CollisionWorld) -> Result<(), CombatError> {
        let size = Vec2::splat(32.0);
        validate_spawn(position, size, &Hitbox::feet(size), player, world)
    }

    #[test]
    fn open_floor_is_valid() {
        let world = room();
        assert!(check(Vec2::new(96.0, 32.0), None, &world).is_ok());
    }

    #[test]
    fn too_close_to_player() {
        let world = room();
        let err = check(Vec2::new(96.0, 32.0), Some(Vec2::new(120.0, 50.0)), &world).unwrap_err();
        assert!(matches!(err, CombatError::InvalidSpawnPosition { .. }));
    }

    #[test]
    fn inside_a_wall() {
        let world = room();
        assert!(check(Vec2::new(96.0, 80.0), None, &world).is_err());
    }
}
