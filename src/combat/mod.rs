//! Combat module - weapons, projectiles, and damage resolution.

mod components;
mod geometry;
mod manager;
mod plugin;
mod profile;
mod systems;
mod weapon;

pub use components::*;
pub use geometry::{point_in_polygon, polygons_intersect, rect_polygon, transform_polygon};
pub use manager::CombatManager;
pub use plugin::CombatPlugin;
pub use profile::{
    load_weapon_definitions, RangedProfile, ShapeDescriptor, SpriteRegion, SwingProfile,
    WeaponDefinition, WeaponRegistry, WeaponTimingRecord, DEFAULT_FRAME_DURATION,
};
pub use weapon::{SwingState, Weapon, XP_PER_LEVEL};
