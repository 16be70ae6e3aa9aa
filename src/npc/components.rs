//! The NPC component, composed of movement, health, and attack state.

use bevy::prelude::*;
use rand::Rng;

use super::attack::NpcCombat;
use super::data::NpcDefinition;
use super::health::NpcHealth;
use super::movement::NpcMovement;
use crate::combat::{Projectile, ProjectileOwner, Weapon};
use crate::physics::{ActorId, ActorKind, CollisionActor, ContactPartner, Hitbox};
use crate::world::Obstacles;

/// A non-player character.
#[derive(Component, Debug, Clone)]
pub struct Npc {
    pub actor: Option<ActorId>,
    pub npc_type: String,
    /// Sprite top-left, display space.
    pub position: Vec2,
    pub sprite_size: Vec2,
    pub hitbox: Hitbox,
    pub movement: NpcMovement,
    pub health: NpcHealth,
    pub combat: NpcCombat,
    pub weapon: Weapon,
    pub score_value: u32,
    next_swing_clockwise: bool,
}

impl Npc {
    pub fn from_definition(
        npc_type: &str,
        definition: &NpcDefinition,
        weapon: Weapon,
        position: Vec2,
    ) -> Self {
        let sprite_size = Vec2::splat(definition.sprite_size);
        Self {
            actor: None,
            npc_type: npc_type.to_string(),
            position,
            sprite_size,
            hitbox: Hitbox::feet(sprite_size),
            movement: NpcMovement::new(
                definition.ai,
                definition.speed,
                definition.chase_speed,
                definition.detection_range,
            ),
            health: NpcHealth::new(definition.max_health),
            combat: NpcCombat::new(definition.attack_range, definition.attack_cooldown),
            weapon,
            score_value: definition.score,
            next_swing_clockwise: true,
        }
    }

    /// Center of the sprite.
    pub fn center(&self) -> Vec2 {
        self.position + self.sprite_size * 0.5
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_defeated()
    }

    /// One NPC tick: timers, attack decision, movement, weapon.
    ///
    /// Returns a projectile when a ranged attack goes off; the caller hands
    /// it to the combat manager.
    pub fn update(
        &mut self,
        dt: f32,
        player_center: Option<Vec2>,
        obstacles: &impl Obstacles,
        rng: &mut impl Rng,
    ) -> Option<Projectile> {
        self.health.update(dt);
        if self.health.is_defeated() {
            return None;
        }

        self.combat.tick(dt);
        self.combat.refresh(&self.weapon);

        let mut shot = None;
        let stunned = self.health.is_stunned();

        if let Some(target) = player_center {
            let to_player = target - self.center();
            if !self.combat.is_attacking() {
                self.weapon.set_base_rotation(to_player.to_angle());
            }
            let in_range = to_player.length() <= self.combat.attack_range;
            if in_range
                && !stunned
                && self
                    .combat
                    .begin_attack(&mut self.weapon, self.next_swing_clockwise)
            {
                self.next_swing_clockwise = !self.next_swing_clockwise;
                self.movement.halt();
                let owner = ProjectileOwner::Npc(self.actor.unwrap_or(ActorId(u32::MAX)));
                shot = self.weapon.fire(self.center(), to_player, owner);
            }
        }

        if self.movement.is_knocked_back() || !(stunned || self.combat.is_attacking()) {
            self.position = self.movement.update(
                dt,
                self.position,
                &self.hitbox,
                player_center,
                obstacles,
                rng,
            );
        }

        let center = self.center();
        self.weapon.update(dt, center);
        shot
    }
}

impl CollisionActor for Npc {
    fn kind(&self) -> ActorKind {
        ActorKind::Npc
    }

    fn bounds(&self) -> Rect {
        self.hitbox.at(self.position)
    }

    fn on_collision(&mut self, other: ContactPartner, _penetration: Vec2) {
        if other.kind.is_solid_scenery() {
            self.movement.bump_wall();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{ProjectileVariant, RangedProfile, SwingState, WeaponDefinition};
    use crate::npc::AiKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct OpenRoom;

    impl Obstacles for OpenRoom {
        fn is_blocked(&self, _area: Rect) -> bool {
            false
        }

        fn play_area(&self) -> Rect {
            Rect::new(0.0, 0.0, 640.0, 640.0)
        }
    }

    fn skeleton(weapon: WeaponDefinition) -> Npc {
        let definition = NpcDefinition {
            ai: AiKind::ChasePlayer,
            detection_range: 200.0,
            attack_range: 40.0,
            attack_cooldown: 1.0,
            ..Default::default()
        };
        Npc::from_definition(
            "skeleton",
            &definition,
            Weapon::from_definition(&weapon),
            Vec2::new(100.0, 100.0),
        )
    }

    #[test]
    fn attacks_when_player_in_range() {
        let mut npc = skeleton(WeaponDefinition::default());
        let mut rng = StdRng::seed_from_u64(1);
        let player = npc.center() + Vec2::new(30.0, 0.0);

        let shot = npc.update(0.016, Some(player), &OpenRoom, &mut rng);
        assert!(shot.is_none());
        assert!(npc.combat.is_attacking());
        assert_eq!(npc.weapon.state(), SwingState::WindingUp);
    }

    #[test]
    fn chases_when_player_out_of_range() {
        let mut npc = skeleton(WeaponDefinition::default());
        let mut rng = StdRng::seed_from_u64(1);
        let start = npc.position;
        npc.update(0.1, Some(npc.center() + Vec2::new(150.0, 0.0)), &OpenRoom, &mut rng);
        assert!(npc.position.x > start.x);
        assert!(!npc.combat.is_attacking());
    }

    #[test]
    fn ranged_npc_fires_at_player() {
        let mut npc = skeleton(WeaponDefinition {
            name: "wand".to_string(),
            damage: 2.0,
            length: 12.0,
            ranged: Some(RangedProfile {
                variant: ProjectileVariant::Magic,
                speed: 120.0,
                damage_scale: 1.0,
            }),
            ..Default::default()
        });
        npc.actor = Some(ActorId(9));
        let mut rng = StdRng::seed_from_u64(1);
        let shot = npc
            .update(0.016, Some(npc.center() + Vec2::new(0.0, 20.0)), &OpenRoom, &mut rng)
            .unwrap();
        assert_eq!(shot.owner, ProjectileOwner::Npc(ActorId(9)));
        assert!(shot.velocity.y > 0.0);
    }

    #[test]
    fn defeated_npc_only_counts_down() {
        let mut npc = skeleton(WeaponDefinition::default());
        let mut rng = StdRng::seed_from_u64(1);
        npc.health.take_damage(100.0, 0.0);
        let start = npc.position;

        npc.update(0.5, Some(npc.center() + Vec2::new(10.0, 0.0)), &OpenRoom, &mut rng);
        assert_eq!(npc.position, start);
        assert!(!npc.combat.is_attacking());
        npc.update(0.5, None, &OpenRoom, &mut rng);
        assert!(npc.health.is_ready_to_remove());
    }

    #[test]
    fn wall_contact_turns_a_wanderer() {
        let mut npc = Npc::from_definition(
            "slime",
            &NpcDefinition::default(),
            Weapon::from_definition(&WeaponDefinition::default()),
            Vec2::new(100.0, 100.0),
        );
        let mut rng = StdRng::seed_from_u64(3);
        npc.update(0.016, None, &OpenRoom, &mut rng);
        let heading = npc.movement.velocity();

        npc.on_collision(
            ContactPartner {
                id: ActorId(0),
                kind: ActorKind::Wall,
            },
            Vec2::X,
        );
        npc.update(0.016, None, &OpenRoom, &mut rng);
        assert_ne!(npc.movement.velocity(), heading);
    }
}
