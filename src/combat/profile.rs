//! Data-driven swing timing and weapon definitions.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::path::Path;

use super::components::ProjectileVariant;
use crate::core::CombatError;
use crate::world::{read_ron_file, ron_files_in};

/// Seconds per animation frame when a weapon does not say otherwise.
pub const DEFAULT_FRAME_DURATION: f32 = 1.0 / 12.0;

/// Hit area of an attack, in the weapon's local space (+x points along the blade).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum ShapeDescriptor {
    /// Blade swept through the swing arc.
    Arc { length: f32, width: f32 },
    /// Box pushed out in front of the wielder.
    Box {
        length: f32,
        width: f32,
        #[serde(default)]
        offset: f32,
    },
    /// Narrow stab.
    Thrust { length: f32, width: f32 },
    /// Area around the weapon tip.
    Area {
        radius: f32,
        #[serde(default)]
        offset: f32,
    },
}

impl ShapeDescriptor {
    /// Local hit polygon for this shape.
    pub fn local_polygon(&self) -> Vec<Vec2> {
        match *self {
            ShapeDescriptor::Arc { length, width } | ShapeDescriptor::Thrust { length, width } => {
                blade(0.0, length, width)
            }
            ShapeDescriptor::Box {
                length,
                width,
                offset,
            } => blade(offset, length, width),
            ShapeDescriptor::Area { radius, offset } => (0..8)
                .map(|i| Vec2::new(offset, 0.0) + Vec2::from_angle(i as f32 * TAU / 8.0) * radius)
                .collect(),
        }
    }
}

/// Rectangle from `start` to `start + length` along +x.
pub fn blade(start: f32, length: f32, width: f32) -> Vec<Vec2> {
    let half = width * 0.5;
    vec![
        Vec2::new(start, -half),
        Vec2::new(start + length, -half),
        Vec2::new(start + length, half),
        Vec2::new(start, half),
    ]
}

/// Per-weapon timing record as authored in data files.
///
/// Every field is optional; anything missing falls back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeaponTimingRecord {
    /// 1-based frame on which the active window opens.
    pub active_start_frame: Option<u32>,
    pub active_frame_count: Option<u32>,
    pub setup_frame_count: Option<u32>,
    pub recovery_frame_count: Option<u32>,
    /// Degrees.
    pub windup_angle: Option<f32>,
    /// Degrees.
    pub slash_angle: Option<f32>,
    /// Degrees.
    pub recovery_angle: Option<f32>,
    pub duration_scale: Option<f32>,
    pub shape: Option<ShapeDescriptor>,
}

/// Resolved swing timing. Durations in seconds, angles in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct SwingProfile {
    pub windup_duration: f32,
    pub active_duration: f32,
    pub recovery_duration: f32,
    pub windup_angle: f32,
    pub slash_angle: f32,
    pub recovery_angle: f32,
}

impl Default for SwingProfile {
    fn default() -> Self {
        Self {
            windup_duration: 0.15,
            active_duration: 0.2,
            recovery_duration: 0.15,
            windup_angle: 45f32.to_radians(),
            slash_angle: 120f32.to_radians(),
            recovery_angle: 0.0,
        }
    }
}

impl SwingProfile {
    pub fn total_duration(&self) -> f32 {
        self.windup_duration + self.active_duration + self.recovery_duration
    }

    /// Derive timing from frame counts.
    ///
    /// An active window that works out to zero seconds would make the weapon
    /// unable to hit anything, so the whole default profile is used instead.
    pub fn from_record(record: &WeaponTimingRecord, frame_duration: f32) -> Self {
        let defaults = Self::default();
        let scale = record.duration_scale.unwrap_or(1.0);
        let frames = |count: u32| count as f32 * frame_duration * scale;

        let setup_frames = record
            .setup_frame_count
            .or_else(|| record.active_start_frame.map(|start| start.saturating_sub(1)));

        let profile = Self {
            windup_duration: setup_frames.map_or(defaults.windup_duration * scale, frames),
            active_duration: record
                .active_frame_count
                .map_or(defaults.active_duration * scale, frames),
            recovery_duration: record
                .recovery_frame_count
                .map_or(defaults.recovery_duration * scale, frames),
            windup_angle: record
                .windup_angle
                .map_or(defaults.windup_angle, f32::to_radians),
            slash_angle: record
                .slash_angle
                .map_or(defaults.slash_angle, f32::to_radians),
            recovery_angle: record
                .recovery_angle
                .map_or(defaults.recovery_angle, f32::to_radians),
        };

        if profile.active_duration <= 0.0 {
            warn!(
                "Swing timing has no active window ({} s), using default profile",
                profile.active_duration
            );
            return defaults;
        }
        profile
    }
}

/// Sprite sheet region. Purely informational for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpriteRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Projectile a ranged weapon fires.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RangedProfile {
    pub variant: ProjectileVariant,
    pub speed: f32,
    /// Multiplier on the weapon's damage.
    #[serde(default = "default_damage_scale")]
    pub damage_scale: f32,
}

fn default_damage_scale() -> f32 {
    1.0
}

/// Weapon definition loaded from RON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeaponDefinition {
    pub name: String,
    pub damage: f32,
    pub length: f32,
    #[serde(default)]
    pub sprite_region: Option<SpriteRegion>,
    #[serde(default)]
    pub ranged: Option<RangedProfile>,
    #[serde(default)]
    pub frame_duration: Option<f32>,
    #[serde(default)]
    pub timing: Option<WeaponTimingRecord>,
}

impl Default for WeaponDefinition {
    /// Bare-handed fallback: functional, but nothing to draw.
    fn default() -> Self {
        Self {
            name: "fists".to_string(),
            damage: 2.0,
            length: 14.0,
            sprite_region: None,
            ranged: None,
            frame_duration: None,
            timing: None,
        }
    }
}

impl WeaponDefinition {
    pub fn swing_profile(&self) -> SwingProfile {
        match &self.timing {
            Some(record) => SwingProfile::from_record(
                record,
                self.frame_duration.unwrap_or(DEFAULT_FRAME_DURATION),
            ),
            None => SwingProfile::default(),
        }
    }

    pub fn local_polygon(&self) -> Vec<Vec2> {
        match self.timing.as_ref().and_then(|t| t.shape.as_ref()) {
            Some(shape) => shape.local_polygon(),
            None => blade(0.0, self.length, (self.length * 0.25).max(4.0)),
        }
    }
}

/// Resource holding all loaded weapon definitions.
#[derive(Resource, Default)]
pub struct WeaponRegistry {
    pub definitions: HashMap<String, WeaponDefinition>,
}

impl WeaponRegistry {
    pub fn get(&self, name: &str) -> Result<&WeaponDefinition, CombatError> {
        self.definitions
            .get(name)
            .ok_or_else(|| CombatError::ConfigurationMissing {
                kind: "weapon",
                name: name.to_string(),
            })
    }

    /// Look up a weapon, falling back to the built-in default.
    pub fn get_or_default(&self, name: &str) -> WeaponDefinition {
        match self.get(name) {
            Ok(definition) => definition.clone(),
            Err(err) => {
                warn!("{}", err);
                WeaponDefinition::default()
            }
        }
    }
}

/// Load every weapon in `dir`. Malformed files are skipped.
pub fn load_weapon_definitions(dir: &Path) -> WeaponRegistry {
    let mut registry = WeaponRegistry::default();

    for (key, path) in ron_files_in(dir) {
        match read_ron_file::<WeaponDefinition>(&path) {
            Ok(definition) => {
                info!("Loaded weapon definition: {} ({})", definition.name, key);
                registry.definitions.insert(key, definition);
            }
            Err(e) => warn!("Skipping weapon definition {:?}: {}", path, e),
        }
    }

    info!("Loaded {} weapon definitions", registry.definitions.len());
    registry
}

/// Startup system: load weapons from `assets/data/weapons/`.
pub fn load_weapons(mut commands: Commands) {
    commands.insert_resource(load_weapon_definitions(Path::new("assets/data/weapons")));
}
