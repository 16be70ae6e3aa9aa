//! World module - rooms, wall extraction, and the collision world.

mod collision_world;
mod data;
mod error;
mod plugin;
mod tiles;

pub use collision_world::{
    clamp_to_area, slide_move, CollisionWorld, NearbyObstacles, Obstacles, DEFAULT_TILE_SIZE,
};
pub use data::{
    load_room_definitions, load_room_file, read_ron_file, ron_files_in, CurrentRoom,
    NpcSpawnPoint, RoomDefinition, RoomRegistry,
};
pub use error::DataLoadError;
pub use plugin::{setup_room, WorldPlugin};
pub use tiles::{extract_wall_rectangles, TileGrid, TileOccupancy};
