//! Player component and configuration.

use bevy::prelude::*;

use crate::combat::{CombatManager, Projectile, ProjectileOwner, Weapon};
use crate::core::{Feedback, SoundCue};
use crate::physics::{ActorId, ActorKind, CollisionActor, ContactPartner, Hitbox};
use crate::world::{clamp_to_area, slide_move, Obstacles};

/// Tunables for the player character.
#[derive(Resource, Debug, Clone)]
pub struct PlayerConfig {
    /// Movement speed in display pixels per second
    pub move_speed: f32,
    /// Speed multiplier while holding block
    pub block_speed_factor: f32,
    pub max_health: f32,
    /// Distance from the visual center at which the weapon is held
    pub weapon_orbit: f32,
    pub sprite_size: f32,
    /// Weapon registry key equipped on spawn
    pub starting_weapon: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 80.0,
            block_speed_factor: 0.5,
            max_health: 10.0,
            weapon_orbit: 10.0,
            sprite_size: 32.0,
            starting_weapon: "rusty_sword".to_string(),
        }
    }
}

/// What the player wants to do this frame.
///
/// `attack` and `fire` are one-shot and cleared after each update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    pub movement: Vec2,
    pub attack: bool,
    pub fire: bool,
    pub block: bool,
}

/// The player character.
#[derive(Component, Debug, Clone)]
pub struct Player {
    pub actor: Option<ActorId>,
    /// Sprite top-left, display space.
    pub position: Vec2,
    pub sprite_size: Vec2,
    pub hitbox: Hitbox,
    pub velocity: Vec2,
    pub speed: f32,
    block_speed_factor: f32,
    pub health: f32,
    pub max_health: f32,
    pub is_blocking: bool,
    pub weapon: Weapon,
    pub weapon_orbit: f32,
    /// Unit vector the player last moved or aimed along.
    pub facing: Vec2,
    pub intent: PlayerIntent,
    next_swing_clockwise: bool,
}

impl Player {
    pub fn new(position: Vec2, weapon: Weapon) -> Self {
        Self::with_config(position, weapon, &PlayerConfig::default())
    }

    pub fn with_config(position: Vec2, weapon: Weapon, config: &PlayerConfig) -> Self {
        let sprite_size = Vec2::splat(config.sprite_size);
        Self {
            actor: None,
            position,
            sprite_size,
            hitbox: Hitbox::feet(sprite_size),
            velocity: Vec2::ZERO,
            speed: config.move_speed,
            block_speed_factor: config.block_speed_factor,
            health: config.max_health,
            max_health: config.max_health,
            is_blocking: false,
            weapon,
            weapon_orbit: config.weapon_orbit,
            facing: Vec2::X,
            intent: PlayerIntent::default(),
            next_swing_clockwise: true,
        }
    }

    /// Center of the sprite; weapons orbit around this point.
    pub fn visual_center(&self) -> Vec2 {
        self.position + self.sprite_size * 0.5
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    /// Subtract health, clamped at zero. Returns true if this hit was the
    /// one that defeated the player.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.is_defeated() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.is_defeated()
    }

    /// One player tick driven by the current intent.
    ///
    /// Melee and ranged attacks share the manager's global cooldown. A fired
    /// projectile is returned for the caller to register.
    pub fn update(
        &mut self,
        dt: f32,
        obstacles: &impl Obstacles,
        manager: &mut CombatManager,
    ) -> Option<Projectile> {
        let intent = self.intent;
        self.intent.attack = false;
        self.intent.fire = false;

        if self.is_defeated() {
            self.velocity = Vec2::ZERO;
            return None;
        }

        self.is_blocking = intent.block;

        let direction = intent.movement.normalize_or_zero();
        if direction != Vec2::ZERO {
            self.facing = direction;
        }
        let speed = if self.is_blocking {
            self.speed * self.block_speed_factor
        } else {
            self.speed
        };
        self.velocity = direction * speed;
        let next = slide_move(self.position, self.velocity * dt, &self.hitbox, obstacles);
        self.position = clamp_to_area(next, &self.hitbox, obstacles.play_area());

        self.weapon.offset = self.facing * self.weapon_orbit;
        if self.weapon.is_idle() {
            self.weapon.set_base_rotation(self.facing.to_angle());
        }

        let mut shot = None;
        if !self.is_blocking && manager.can_attack() {
            if intent.attack && self.weapon.start_swing(self.next_swing_clockwise) {
                self.next_swing_clockwise = !self.next_swing_clockwise;
                manager.start_cooldown();
                manager.push_feedback(Feedback::Sound(SoundCue::Swing));
            } else if intent.fire {
                shot = self
                    .weapon
                    .fire(self.visual_center(), self.facing, ProjectileOwner::Player);
                if shot.is_some() {
                    manager.start_cooldown();
                }
            }
        }

        let center = self.visual_center();
        self.weapon.update(dt, center);
        shot
    }
}

impl CollisionActor for Player {
    fn kind(&self) -> ActorKind {
        ActorKind::Player
    }

    fn bounds(&self) -> Rect {
        self.hitbox.at(self.position)
    }

    /// Walls are handled by sliding movement; damage goes through the
    /// combat manager.
    fn on_collision(&mut self, _other: ContactPartner, _penetration: Vec2) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{
        CombatConfig, ProjectileVariant, RangedProfile, SwingState, WeaponDefinition,
    };
    use approx::assert_abs_diff_eq;

    struct Room;

    impl Obstacles for Room {
        fn is_blocked(&self, area: Rect) -> bool {
            // A wall column from x = 200.
            area.max.x > 200.0
        }

        fn play_area(&self) -> Rect {
            Rect::new(0.0, 0.0, 400.0, 400.0)
        }
    }

    fn player() -> Player {
        Player::new(
            Vec2::new(100.0, 100.0),
            Weapon::from_definition(&WeaponDefinition::default()),
        )
    }

    fn wand() -> Weapon {
        Weapon::from_definition(&WeaponDefinition {
            name: "wand".to_string(),
            ranged: Some(RangedProfile {
                variant: ProjectileVariant::Arrow,
                speed: 200.0,
                damage_scale: 1.0,
            }),
            ..Default::default()
        })
    }

    #[test]
    fn damage_clamps_and_reports_defeat_once() {
        let mut player = player();
        assert!(!player.apply_damage(4.0));
        assert!(player.apply_damage(100.0));
        assert_eq!(player.health, 0.0);
        assert!(!player.apply_damage(1.0));
        assert!(player.is_defeated());
    }

    #[test]
    fn moves_along_intent_and_faces_it() {
        let mut player = player();
        let mut manager = CombatManager::new(CombatConfig::default());
        player.intent.movement = Vec2::new(0.0, 1.0);
        player.update(0.5, &Room, &mut manager);
        assert_abs_diff_eq!(player.position.y, 140.0, epsilon = 1e-4);
        assert_eq!(player.facing, Vec2::Y);
        assert_eq!(player.weapon.offset, Vec2::new(0.0, 10.0));
    }

    #[test]
    fn walls_stop_movement() {
        let mut player = player();
        let mut manager = CombatManager::new(CombatConfig::default());
        player.intent.movement = Vec2::X;
        for _ in 0..20 {
            player.update(0.1, &Room, &mut manager);
        }
        assert!(player.bounds().max.x <= 200.0);
    }

    #[test]
    fn attack_respects_global_cooldown() {
        let mut player = player();
        let mut manager = CombatManager::new(CombatConfig::default());

        player.intent.attack = true;
        player.update(0.01, &Room, &mut manager);
        assert_eq!(player.weapon.state(), SwingState::WindingUp);
        assert!(!manager.can_attack());
        assert!(manager
            .take_feedback()
            .contains(&Feedback::Sound(SoundCue::Swing)));

        // One-shot intent is consumed.
        assert!(!player.intent.attack);
    }

    #[test]
    fn blocking_slows_and_prevents_attacks() {
        let mut player = player();
        let mut manager = CombatManager::new(CombatConfig::default());
        player.intent = PlayerIntent {
            movement: Vec2::X,
            attack: true,
            fire: false,
            block: true,
        };
        player.update(0.5, &Room, &mut manager);
        assert!(player.is_blocking);
        assert_abs_diff_eq!(player.position.x, 120.0, epsilon = 1e-4);
        assert!(player.weapon.is_idle());
        assert!(manager.can_attack());
    }

    #[test]
    fn ranged_weapon_fires_along_facing() {
        let mut player = Player::new(Vec2::new(50.0, 50.0), wand());
        let mut manager = CombatManager::new(CombatConfig::default());
        player.intent.fire = true;

        let shot = player.update(0.01, &Room, &mut manager).unwrap();
        assert_eq!(shot.owner, ProjectileOwner::Player);
        assert_abs_diff_eq!(shot.velocity.x, 200.0, epsilon = 1e-4);
        assert!(!manager.can_attack());

        player.intent.fire = true;
        assert!(player.update(0.01, &Room, &mut manager).is_none());
    }

    #[test]
    fn defeated_player_does_nothing() {
        let mut player = player();
        let mut manager = CombatManager::new(CombatConfig::default());
        player.apply_damage(100.0);
        player.intent.movement = Vec2::X;
        player.intent.attack = true;
        let start = player.position;
        player.update(0.5, &Room, &mut manager);
        assert_eq!(player.position, start);
        assert!(player.weapon.is_idle());
    }
}
