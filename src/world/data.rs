//! Room data structures and RON loading.

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::collision_world::DEFAULT_TILE_SIZE;
use super::error::DataLoadError;
use super::tiles::TileGrid;

const WALL: char = '#';
const CHEST: char = 'C';
const PLAYER_START: char = 'P';

fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}

/// Room definition as read from RON.
///
/// Layout legend: `#` wall, `C` chest, `P` player start, `.` floor, and any
/// character in `npc_palette` spawns that NPC type on a floor tile.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomDefinition {
    pub name: String,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    pub layout: Vec<String>,
    #[serde(default)]
    pub npc_palette: HashMap<char, String>,
}

/// An NPC placement resolved from the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct NpcSpawnPoint {
    pub npc_type: String,
    /// Top-left display position of the tile.
    pub position: Vec2,
}

impl RoomDefinition {
    /// Small walled room used when no room data can be found.
    pub fn fallback() -> Self {
        Self {
            name: "fallback".to_string(),
            tile_size: DEFAULT_TILE_SIZE,
            layout: [
                "##########",
                "#P.......#",
                "#........#",
                "#...##...#",
                "#.......s#",
                "##########",
            ]
            .iter()
            .map(|row| row.to_string())
            .collect(),
            npc_palette: HashMap::from([('s', "slime".to_string())]),
        }
    }

    pub fn validate(&self) -> Result<(), DataLoadError> {
        let invalid = |details: &str| DataLoadError::InvalidRoom {
            name: self.name.clone(),
            details: details.to_string(),
        };

        if self.layout.is_empty() {
            return Err(invalid("layout is empty"));
        }
        if self.tile_size <= 0.0 {
            return Err(invalid("tile_size must be positive"));
        }
        if self.tiles().all(|(_, _, c)| c == WALL) {
            return Err(invalid("layout has no floor"));
        }
        Ok(())
    }

    fn tiles(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.layout
            .iter()
            .enumerate()
            .flat_map(|(row, line)| line.chars().enumerate().map(move |(col, c)| (col, row, c)))
    }

    pub fn tile_grid(&self) -> TileGrid {
        TileGrid::from_rows(self.layout.as_slice(), |c| c == WALL)
    }

    /// Top-left display position of a tile.
    pub fn tile_to_world(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new(col as f32 * self.tile_size, row as f32 * self.tile_size)
    }

    /// Marked start tile, else the first floor tile.
    pub fn player_start(&self) -> Vec2 {
        let marked = self.tiles().find(|(_, _, c)| *c == PLAYER_START);
        let first_floor = || self.tiles().find(|(_, _, c)| *c != WALL && *c != CHEST);
        match marked.or_else(first_floor) {
            Some((col, row, _)) => self.tile_to_world(col, row),
            None => Vec2::ZERO,
        }
    }

    pub fn chest_rects(&self) -> Vec<Rect> {
        self.tiles()
            .filter(|(_, _, c)| *c == CHEST)
            .map(|(col, row, _)| {
                let min = self.tile_to_world(col, row);
                Rect::from_corners(min, min + Vec2::splat(self.tile_size))
            })
            .collect()
    }

    pub fn npc_spawns(&self) -> Vec<NpcSpawnPoint> {
        self.tiles()
            .filter_map(|(col, row, c)| {
                self.npc_palette.get(&c).map(|npc_type| NpcSpawnPoint {
                    npc_type: npc_type.clone(),
                    position: self.tile_to_world(col, row),
                })
            })
            .collect()
    }
}

/// Resource storing all loaded room definitions.
#[derive(Resource, Default)]
pub struct RoomRegistry {
    pub rooms: HashMap<String, RoomDefinition>,
}

impl RoomRegistry {
    pub fn get(&self, name: &str) -> Option<&RoomDefinition> {
        self.rooms.get(name)
    }

    pub fn insert(&mut self, key: String, room: RoomDefinition) {
        self.rooms.insert(key, room);
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Resource indicating which room to build.
#[derive(Resource)]
pub struct CurrentRoom {
    pub name: String,
}

impl Default for CurrentRoom {
    fn default() -> Self {
        Self {
            name: "crypt".to_string(),
        }
    }
}

/// Read one RON data file.
pub fn read_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path).map_err(|source| DataLoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str::<T>(&contents).map_err(|source| DataLoadError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// Every `*.ron` file in `dir` with its registry key (file stem, minus a
/// `.room` style secondary extension).
pub fn ron_files_in(dir: &Path) -> Vec<(String, PathBuf)> {
    let Ok(entries) = fs::read_dir(dir) else {
        warn!("Data directory not found: {:?}", dir);
        return Vec::new();
    };

    let mut files: Vec<(String, PathBuf)> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
        .filter_map(|path| {
            let stem = path.file_stem()?.to_string_lossy().into_owned();
            let key = match stem.split_once('.') {
                Some((key, _)) => key.to_string(),
                None => stem,
            };
            Some((key, path))
        })
        .collect();
    files.sort();
    files
}

/// Read and validate a single room file.
pub fn load_room_file(path: &Path) -> Result<RoomDefinition, DataLoadError> {
    let room: RoomDefinition = read_ron_file(path)?;
    room.validate()?;
    Ok(room)
}

/// Load every `*.ron` room in `dir`. Bad files are skipped and logged.
pub fn load_room_definitions(dir: &Path) -> RoomRegistry {
    let mut registry = RoomRegistry::default();

    for (key, path) in ron_files_in(dir) {
        match load_room_file(&path) {
            Ok(room) => {
                info!("Loaded room: {}", key);
                registry.insert(key, room);
            }
            Err(e) => error!("Skipping room {:?}: {}", path, e),
        }
    }

    info!("Loaded {} room(s)", registry.len());
    registry
}

/// Startup system: load rooms from `assets/data/rooms/`.
pub fn load_rooms(mut commands: Commands) {
    let registry = load_room_definitions(Path::new("assets/data/rooms"));
    commands.insert_resource(registry);
    commands.init_resource::<CurrentRoom>();
}
