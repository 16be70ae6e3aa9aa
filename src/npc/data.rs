//! NPC data loading from RON files.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::movement::AiKind;
use crate::core::CombatError;
use crate::world::{read_ron_file, ron_files_in};

fn default_sprite_size() -> f32 {
    32.0
}

/// NPC definition loaded from RON file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct NpcDefinition {
    pub name: String,
    pub max_health: f32,
    pub speed: f32,
    pub chase_speed: f32,
    #[serde(default)]
    pub ai: AiKind,
    pub detection_range: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    /// Weapon registry key.
    pub weapon: String,
    pub score: u32,
    #[serde(default = "default_sprite_size")]
    pub sprite_size: f32,
}

impl Default for NpcDefinition {
    fn default() -> Self {
        Self {
            name: "Slime".to_string(),
            max_health: 6.0,
            speed: 20.0,
            chase_speed: 35.0,
            ai: AiKind::Wander,
            detection_range: 96.0,
            attack_range: 24.0,
            attack_cooldown: 1.5,
            weapon: "fists".to_string(),
            score: 10,
            sprite_size: default_sprite_size(),
        }
    }
}

/// Resource holding all loaded NPC definitions.
#[derive(Resource, Default)]
pub struct NpcRegistry {
    pub definitions: HashMap<String, NpcDefinition>,
}

impl NpcRegistry {
    pub fn get(&self, npc_type: &str) -> Result<&NpcDefinition, CombatError> {
        self.definitions
            .get(npc_type)
            .ok_or_else(|| CombatError::ConfigurationMissing {
                kind: "npc",
                name: npc_type.to_string(),
            })
    }

    /// Look up an NPC type. Unknown types become the weakest known type, or
    /// the built-in default when nothing was loaded.
    pub fn get_or_weakest(&self, npc_type: &str) -> NpcDefinition {
        match self.get(npc_type) {
            Ok(definition) => definition.clone(),
            Err(err) => {
                warn!("{}", err);
                self.definitions
                    .values()
                    .min_by(|a, b| a.max_health.total_cmp(&b.max_health))
                    .cloned()
                    .unwrap_or_default()
            }
        }
    }
}

/// Load every NPC definition in `dir`. Malformed files are skipped.
pub fn load_npc_definitions(dir: &Path) -> NpcRegistry {
    let mut registry = NpcRegistry::default();

    for (npc_type, path) in ron_files_in(dir) {
        match read_ron_file::<NpcDefinition>(&path) {
            Ok(definition) => {
                info!("Loaded NPC definition: {} ({})", definition.name, npc_type);
                registry.definitions.insert(npc_type, definition);
            }
            Err(e) => error!("Failed to load NPC definition {:?}: {}", path, e),
        }
    }

    info!("Loaded {} NPC definitions", registry.definitions.len());
    registry
}

/// Startup system: load NPCs from `assets/data/npcs/`.
pub fn load_npcs(mut commands: Commands) {
    commands.insert_resource(load_npc_definitions(Path::new("assets/data/npcs")));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> NpcRegistry {
        let mut registry = NpcRegistry::default();
        for (key, health) in [("skeleton", 12.0), ("bat", 3.0), ("ogre", 40.0)] {
            registry.definitions.insert(
                key.to_string(),
                NpcDefinition {
                    name: key.to_string(),
                    max_health: health,
                    ..Default::default()
                },
            );
        }
        registry
    }

    #[test]
    fn unknown_type_becomes_weakest() {
        let definition = registry().get_or_weakest("dragon");
        assert_eq!(definition.name, "bat");
    }

    #[test]
    fn known_type_is_returned() {
        assert_eq!(registry().get_or_weakest("ogre").max_health, 40.0);
    }

    #[test]
    fn empty_registry_uses_builtin() {
        let definition = NpcRegistry::default().get_or_weakest("anything");
        assert_eq!(definition, NpcDefinition::default());
    }

    #[test]
    fn parses_minimal_definition() {
        let definition: NpcDefinition = ron::from_str(
            r#"(
                name: "Skeleton",
                max_health: 12.0,
                speed: 25.0,
                chase_speed: 45.0,
                ai: ChasePlayer,
                detection_range: 160.0,
                attack_range: 28.0,
                attack_cooldown: 1.2,
                weapon: "rusty_sword",
                score: 25,
            )"#,
        )
        .unwrap();
        assert_eq!(definition.ai, AiKind::ChasePlayer);
        assert_eq!(definition.sprite_size, 32.0);
    }
}
