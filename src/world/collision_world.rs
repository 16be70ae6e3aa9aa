//! Collision world - static walls from the tile grid plus dynamic actors.
//!
//! One instance lives per active room. It is cleared explicitly when the
//! room is torn down.

use std::collections::HashMap;

use bevy::prelude::*;

use super::tiles::{extract_wall_rectangles, TileOccupancy};
use crate::combat::Projectile;
use crate::npc::Npc;
use crate::physics::{
    ActorId, ActorKind, ChestCollider, CollisionActor, ContactEvent, Hitbox, KinematicClass,
    PhysicsBridge, WallCollider,
};
use crate::player::Player;

/// Default tile edge in display pixels.
pub const DEFAULT_TILE_SIZE: f32 = 32.0;

/// How many tiles around a point `get_nearby_walls` looks.
const NEARBY_WALL_TILES: f32 = 2.0;

/// What movement code needs to know about the room.
pub trait Obstacles {
    /// True if `area` overlaps solid scenery.
    fn is_blocked(&self, area: Rect) -> bool;

    /// Region every actor must stay inside.
    fn play_area(&self) -> Rect;
}

/// Resource owning the physics bridge for the current room.
#[derive(Resource)]
pub struct CollisionWorld {
    bridge: PhysicsBridge,
    tile_size: f32,
    play_area: Rect,
    walls: HashMap<ActorId, WallCollider>,
    chests: HashMap<ActorId, ChestCollider>,
    dynamic: HashMap<ActorId, ActorKind>,
    loaded: bool,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl CollisionWorld {
    pub fn new(tile_size: f32) -> Self {
        Self {
            bridge: PhysicsBridge::default(),
            tile_size,
            play_area: Rect::default(),
            walls: HashMap::new(),
            chests: HashMap::new(),
            dynamic: HashMap::new(),
            loaded: false,
        }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Room rectangle every actor is clamped to; empty until built.
    pub fn play_area(&self) -> Rect {
        self.play_area
    }

    /// Run-length encoded wall rectangles for a grid, at this world's tile size.
    pub fn extract_wall_rectangles(&self, grid: &impl TileOccupancy) -> Vec<Rect> {
        extract_wall_rectangles(grid, self.tile_size)
    }

    /// Replace the static scenery with walls extracted from `grid`.
    ///
    /// Returns how many wall colliders were created.
    pub fn build_from_tiles(&mut self, grid: &impl TileOccupancy) -> usize {
        self.clear();
        self.play_area = Rect::new(
            0.0,
            0.0,
            grid.columns() as f32 * self.tile_size,
            grid.rows() as f32 * self.tile_size,
        );

        for rect in self.extract_wall_rectangles(grid) {
            let wall = WallCollider { rect };
            if let Some(id) = self.bridge.add_actor(&wall) {
                self.walls.insert(id, wall);
            }
        }
        self.loaded = true;

        info!(
            "Collision world built: {}x{} tiles, {} wall colliders",
            grid.columns(),
            grid.rows(),
            self.walls.len()
        );
        self.walls.len()
    }

    pub fn add_chest(&mut self, rect: Rect) -> Option<ActorId> {
        let chest = ChestCollider::new(rect);
        let id = self.bridge.add_actor(&chest)?;
        self.chests.insert(id, chest);
        Some(id)
    }

    pub fn register_player(&mut self, player: &Player) -> Option<ActorId> {
        self.register_dynamic(player)
    }

    pub fn register_npc(&mut self, npc: &Npc) -> Option<ActorId> {
        self.register_dynamic(npc)
    }

    pub fn register_projectile(&mut self, projectile: &Projectile) -> Option<ActorId> {
        self.register_dynamic(projectile)
    }

    fn register_dynamic(&mut self, actor: &dyn CollisionActor) -> Option<ActorId> {
        let kind = actor.kind();
        if kind.is_solid_scenery() {
            warn!("{:?} cannot be registered as a moving actor", kind);
            return None;
        }
        let id = self.bridge.add_actor(actor)?;
        self.dynamic.insert(id, kind);
        Some(id)
    }

    /// Remove a moving actor or chest. Unknown ids are a no-op.
    pub fn unregister(&mut self, id: ActorId) -> bool {
        if !self.bridge.remove_actor(id) {
            return false;
        }
        self.dynamic.remove(&id);
        self.chests.remove(&id);
        self.walls.remove(&id);
        true
    }

    pub fn update_npc_position(&mut self, npc: &Npc) -> bool {
        self.push_bounds(npc.actor, npc.bounds())
    }

    pub fn update_player_position(&mut self, player: &Player) -> bool {
        self.push_bounds(player.actor, player.bounds())
    }

    pub fn update_projectile_position(&mut self, projectile: &Projectile) -> bool {
        self.push_bounds(projectile.actor, projectile.bounds())
    }

    fn push_bounds(&mut self, id: Option<ActorId>, bounds: Rect) -> bool {
        id.is_some_and(|id| self.bridge.update_actor_position(id, bounds.min))
    }

    /// Step the simulation and return this step's contacts.
    pub fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        self.bridge.step(dt)
    }

    /// Run the collision hook of a wall or chest. Other kinds are ignored.
    pub fn deliver_scenery_contact(&mut self, event: &ContactEvent) {
        let partner = event.partner();
        match event.actor_kind {
            ActorKind::Wall => {
                if let Some(wall) = self.walls.get_mut(&event.actor) {
                    wall.on_collision(partner, event.penetration);
                }
            }
            ActorKind::Chest => {
                if let Some(chest) = self.chests.get_mut(&event.actor) {
                    chest.on_collision(partner, event.penetration);
                }
            }
            _ => {}
        }
    }

    /// Wall rectangles within a couple of tiles of `position`.
    pub fn get_nearby_walls(&self, position: Vec2) -> Vec<Rect> {
        let region =
            Rect::from_center_half_size(position, Vec2::splat(self.tile_size * NEARBY_WALL_TILES));
        self.bridge
            .query_aabb(region)
            .into_iter()
            .filter_map(|id| self.walls.get(&id).map(|wall| wall.rect))
            .collect()
    }

    /// Walls and chests around `position`, for movement that only needs
    /// local wall avoidance.
    pub fn nearby_obstacles(&self, position: Vec2) -> NearbyObstacles {
        let mut solids = self.get_nearby_walls(position);
        let region =
            Rect::from_center_half_size(position, Vec2::splat(self.tile_size * NEARBY_WALL_TILES));
        solids.extend(
            self.chests
                .values()
                .filter(|chest| !chest.rect.intersect(region).is_empty())
                .map(|chest| chest.rect),
        );
        NearbyObstacles {
            solids,
            play_area: self.play_area,
        }
    }

    pub fn bounds_of(&self, id: ActorId) -> Option<Rect> {
        self.bridge.record(id).map(|record| record.bounds)
    }

    /// Sprite top-left of a solver-driven actor after the last step, given
    /// the hitbox it registered with. `None` for scenery, projectiles and
    /// unknown ids.
    pub fn settled_position(&self, id: ActorId, hitbox: &Hitbox) -> Option<Vec2> {
        let kind = self.dynamic.get(&id)?;
        if kind.kinematic_class() != KinematicClass::Dynamic {
            return None;
        }
        let bounds = self.bounds_of(id)?;
        Some(clamp_to_area(bounds.min - hitbox.offset, hitbox, self.play_area))
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.bridge.contains(id)
    }

    pub fn actor_count(&self) -> usize {
        self.bridge.len()
    }

    /// Tear down every body. Called on room transitions.
    pub fn clear(&mut self) {
        self.bridge.clear();
        self.walls.clear();
        self.chests.clear();
        self.dynamic.clear();
        self.play_area = Rect::default();
        self.loaded = false;
    }
}

impl Obstacles for CollisionWorld {
    fn is_blocked(&self, area: Rect) -> bool {
        let region = area.inflate(self.tile_size);
        self.bridge.query_aabb(region).into_iter().any(|id| {
            let solid = self
                .walls
                .get(&id)
                .map(|wall| wall.rect)
                .or_else(|| self.chests.get(&id).map(|chest| chest.rect));
            solid.is_some_and(|rect| !rect.intersect(area).is_empty())
        })
    }

    fn play_area(&self) -> Rect {
        CollisionWorld::play_area(self)
    }
}

/// Snapshot of the solid scenery near one point.
#[derive(Debug, Clone, Default)]
pub struct NearbyObstacles {
    solids: Vec<Rect>,
    play_area: Rect,
}

impl NearbyObstacles {
    pub fn solids(&self) -> &[Rect] {
        &self.solids
    }
}

impl Obstacles for NearbyObstacles {
    fn is_blocked(&self, area: Rect) -> bool {
        self.solids
            .iter()
            .any(|rect| !rect.intersect(area).is_empty())
    }

    fn play_area(&self) -> Rect {
        self.play_area
    }
}

/// Move by `delta`, sliding along walls: full move, else horizontal only,
/// else vertical only, else stay put.
pub fn slide_move(
    position: Vec2,
    delta: Vec2,
    hitbox: &Hitbox,
    obstacles: &impl Obstacles,
) -> Vec2 {
    for candidate in [delta, Vec2::new(delta.x, 0.0), Vec2::new(0.0, delta.y)] {
        if candidate == Vec2::ZERO {
            continue;
        }
        let next = position + candidate;
        if !obstacles.is_blocked(hitbox.at(next)) {
            return next;
        }
    }
    position
}

/// Keep an entity's hitbox inside `area`.
pub fn clamp_to_area(position: Vec2, hitbox: &Hitbox, area: Rect) -> Vec2 {
    if area.is_empty() {
        return position;
    }
    let min = area.min - hitbox.offset;
    let max = area.max - hitbox.offset - hitbox.size;
    position.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{ProjectileOwner, ProjectileVariant, Weapon, WeaponDefinition};
    use crate::npc::NpcDefinition;
    use crate::world::TileGrid;

    fn room() -> TileGrid {
        TileGrid::from_rows(
            &[
                "######", //
                "#....#", //
                "#.##.#", //
                "#....#", //
                "######",
            ],
            |c| c == '#',
        )
    }

    #[test]
    fn builds_one_collider_per_run() {
        let mut world = CollisionWorld::new(32.0);
        // rows: 1 + 2 + 3 + 2 + 1
        assert_eq!(world.build_from_tiles(&room()), 9);
        assert_eq!(world.play_area(), Rect::new(0.0, 0.0, 192.0, 160.0));
        assert!(world.is_loaded());
    }

    #[test]
    fn nearby_walls_are_local() {
        let mut world = CollisionWorld::new(32.0);
        world.build_from_tiles(&room());
        let near = world.get_nearby_walls(Vec2::new(48.0, 48.0));
        assert!(near.contains(&Rect::new(0.0, 0.0, 192.0, 32.0)));
        assert!(near.contains(&Rect::new(64.0, 64.0, 128.0, 96.0)));
        assert!(!near.contains(&Rect::new(0.0, 128.0, 192.0, 160.0)));
    }

    #[test]
    fn blocked_only_when_overlapping() {
        let mut world = CollisionWorld::new(32.0);
        world.build_from_tiles(&room());
        assert!(!world.is_blocked(Rect::new(32.0, 32.0, 64.0, 64.0)));
        assert!(world.is_blocked(Rect::new(30.0, 32.0, 60.0, 60.0)));
    }

    #[test]
    fn slide_move_keeps_free_axis() {
        let mut world = CollisionWorld::new(32.0);
        world.build_from_tiles(&room());
        let hitbox = Hitbox::new(Vec2::ZERO, Vec2::splat(16.0));
        // Pushing up-left into the corner wall from (36, 36): x is blocked, y is blocked.
        let stuck = slide_move(Vec2::new(36.0, 36.0), Vec2::new(-8.0, -8.0), &hitbox, &world);
        assert_eq!(stuck, Vec2::new(36.0, 36.0));
        // Moving diagonally along the top wall keeps the horizontal part.
        let slid = slide_move(Vec2::new(40.0, 34.0), Vec2::new(6.0, -6.0), &hitbox, &world);
        assert_eq!(slid, Vec2::new(46.0, 34.0));
    }

    #[test]
    fn nearby_obstacles_include_chests() {
        let mut world = CollisionWorld::new(32.0);
        world.build_from_tiles(&room());
        let chest = Rect::new(128.0, 96.0, 160.0, 128.0);
        world.add_chest(chest);

        let local = world.nearby_obstacles(Vec2::new(120.0, 100.0));
        assert!(local.solids().contains(&chest));
        assert!(local.is_blocked(Rect::new(130.0, 100.0, 140.0, 110.0)));
        assert!(!local.is_blocked(Rect::new(100.0, 100.0, 110.0, 110.0)));
        assert_eq!(local.play_area(), world.play_area());
    }

    #[test]
    fn clamp_keeps_hitbox_inside() {
        let hitbox = Hitbox::new(Vec2::new(8.0, 20.0), Vec2::new(16.0, 12.0));
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(clamp_to_area(Vec2::new(-50.0, 200.0), &hitbox, area), Vec2::new(-8.0, 68.0));
    }

    #[test]
    fn settled_position_only_for_bodies_the_solver_moves() {
        let mut world = CollisionWorld::new(32.0);
        world.build_from_tiles(&room());
        let npc = Npc::from_definition(
            "slime",
            &NpcDefinition::default(),
            Weapon::from_definition(&WeaponDefinition::default()),
            Vec2::new(100.0, 80.0),
        );
        let npc_id = world.register_npc(&npc).unwrap();
        let shot = Projectile::new(
            Vec2::new(40.0, 40.0),
            Vec2::X,
            1.0,
            ProjectileOwner::Player,
            ProjectileVariant::Arrow,
        );
        let shot_id = world.register_projectile(&shot).unwrap();
        world.step(1.0 / 60.0);

        let settled = world.settled_position(npc_id, &npc.hitbox).unwrap();
        assert!(settled.distance(npc.position) < 1e-3);
        assert!(world.settled_position(shot_id, &Hitbox::new(Vec2::ZERO, Vec2::ONE)).is_none());
        assert!(world.settled_position(ActorId(999), &npc.hitbox).is_none());
    }

    #[test]
    fn unregister_unknown_is_noop_and_clear_resets() {
        let mut world = CollisionWorld::new(32.0);
        world.build_from_tiles(&room());
        assert!(!world.unregister(ActorId(999)));
        world.clear();
        assert_eq!(world.actor_count(), 0);
        assert!(!world.is_loaded());
    }
}
