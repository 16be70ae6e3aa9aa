//! Combat data: projectiles, explosions, and tunable constants.

use bevy::prelude::*;
use serde::Deserialize;

use crate::physics::{ActorId, ActorKind, CollisionActor, ContactPartner};

/// Projectile flavours. Each reacts to walls and targets differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ProjectileVariant {
    Arrow,
    Fireball,
    Magic,
    Bullet,
}

/// What a projectile does when it meets solid scenery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallResponse {
    Destroy,
    Ricochet,
    Explode,
}

impl ProjectileVariant {
    /// Penetrating projectiles keep flying after hitting a target.
    pub fn is_penetrating(self) -> bool {
        matches!(self, ProjectileVariant::Magic)
    }

    pub fn wall_response(self) -> WallResponse {
        match self {
            ProjectileVariant::Bullet => WallResponse::Ricochet,
            ProjectileVariant::Fireball => WallResponse::Explode,
            ProjectileVariant::Arrow | ProjectileVariant::Magic => WallResponse::Destroy,
        }
    }

    /// Edge length of the square collision box, in pixels.
    pub fn size(self) -> f32 {
        match self {
            ProjectileVariant::Arrow => 6.0,
            ProjectileVariant::Fireball => 12.0,
            ProjectileVariant::Magic => 10.0,
            ProjectileVariant::Bullet => 4.0,
        }
    }
}

/// Who fired a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOwner {
    Player,
    Npc(ActorId),
}

/// A contact queued by the projectile's hook, resolved by the combat manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingHit {
    pub partner: ContactPartner,
    pub penetration: Vec2,
}

/// A projectile in flight. Owned by the combat manager.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub actor: Option<ActorId>,
    /// Center, display space.
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub owner: ProjectileOwner,
    pub variant: ProjectileVariant,
    pub is_active: bool,
    pub can_collide: bool,
    pub has_ricocheted: bool,
    pending: Vec<PendingHit>,
    resolved: Vec<ActorId>,
}

impl Projectile {
    pub fn new(
        position: Vec2,
        velocity: Vec2,
        damage: f32,
        owner: ProjectileOwner,
        variant: ProjectileVariant,
    ) -> Self {
        Self {
            actor: None,
            position,
            velocity,
            damage,
            owner,
            variant,
            is_active: true,
            can_collide: true,
            has_ricocheted: false,
            pending: Vec::new(),
            resolved: Vec::new(),
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.can_collide = false;
    }

    pub fn is_owned_by_player(&self) -> bool {
        self.owner == ProjectileOwner::Player
    }

    /// Contacts queued since the last resolve.
    pub fn take_pending_hits(&mut self) -> Vec<PendingHit> {
        std::mem::take(&mut self.pending)
    }

    /// Remember that a partner has been dealt with, so a projectile still
    /// overlapping it next step does not hit it again.
    pub fn mark_resolved(&mut self, id: ActorId) {
        if !self.resolved.contains(&id) {
            self.resolved.push(id);
        }
    }
}

impl CollisionActor for Projectile {
    fn kind(&self) -> ActorKind {
        ActorKind::Projectile
    }

    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, Vec2::splat(self.variant.size()))
    }

    fn on_collision(&mut self, other: ContactPartner, penetration: Vec2) {
        if !self.is_active || !self.can_collide || self.resolved.contains(&other.id) {
            return;
        }
        if self.pending.iter().any(|hit| hit.partner.id == other.id) {
            return;
        }
        self.pending.push(PendingHit {
            partner: other,
            penetration,
        });
    }
}

/// Area damage queued by a fireball, applied on the next combat update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    pub position: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Player-owned blasts hurt NPCs, NPC-owned blasts hurt the player.
    pub owner: ProjectileOwner,
    /// Actor hit directly by the projectile; already damaged.
    pub spared: Option<ActorId>,
}

/// Combat tuning constants.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CombatConfig {
    /// Global player attack cooldown, seconds.
    pub attack_cooldown: f32,
    /// Player invulnerability after taking damage, seconds.
    pub player_immunity: f32,
    /// Knockback speed from projectile hits.
    pub projectile_knockback: f32,
    /// Knockback speed from melee hits.
    pub melee_knockback: f32,
    pub knockback_duration: f32,
    /// Fraction of speed a bullet keeps after bouncing.
    pub ricochet_retention: f32,
    pub explosion_radius: f32,
    /// Explosion damage relative to the fireball's own damage.
    pub explosion_damage_factor: f32,
    /// Stun applied to an NPC per hit, seconds.
    pub stun_duration: f32,
    /// Weapon experience per defeated NPC.
    pub weapon_xp_per_kill: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_cooldown: 0.35,
            player_immunity: 1.0,
            projectile_knockback: 150.0,
            melee_knockback: 120.0,
            knockback_duration: 0.2,
            ricochet_retention: 0.6,
            explosion_radius: 40.0,
            explosion_damage_factor: 0.5,
            stun_duration: 0.25,
            weapon_xp_per_kill: 10,
        }
    }
}
