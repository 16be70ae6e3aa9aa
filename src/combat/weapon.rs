//! Weapon swing state machine.
//!
//! A swing runs `Idle -> WindingUp -> Slashing -> Idle`. After the slash the
//! blade eases back to rest while already idle, following through by the
//! profile's recovery angle. The world-space hit polygon is rebuilt on every
//! update from the current rotation, so it is never stale by more than one
//! tick.

use bevy::prelude::*;

use super::components::{Projectile, ProjectileOwner};
use super::geometry::transform_polygon;
use super::profile::{RangedProfile, SpriteRegion, SwingProfile, WeaponDefinition};
use crate::physics::ActorId;

/// Experience needed per weapon level.
pub const XP_PER_LEVEL: u32 = 100;

/// Damage bonus per weapon level.
const DAMAGE_PER_LEVEL: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwingState {
    #[default]
    Idle,
    WindingUp,
    Slashing,
}

#[derive(Debug, Clone)]
pub struct Weapon {
    pub name: String,
    base_damage: f32,
    pub length: f32,
    base_rotation: f32,
    rotation: f32,
    local_polygon: Vec<Vec2>,
    hit_polygon: Vec<Vec2>,
    state: SwingState,
    phase_timer: f32,
    recovery_timer: f32,
    clockwise: bool,
    profile: SwingProfile,
    /// Added to the wielder's center when placing the weapon.
    pub offset: Vec2,
    ranged: Option<RangedProfile>,
    pub sprite_region: Option<SpriteRegion>,
    experience: u32,
    level: u32,
    struck: Vec<ActorId>,
}

impl Weapon {
    pub fn from_definition(definition: &WeaponDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            base_damage: definition.damage,
            length: definition.length,
            base_rotation: 0.0,
            rotation: 0.0,
            local_polygon: definition.local_polygon(),
            hit_polygon: Vec::new(),
            state: SwingState::Idle,
            phase_timer: 0.0,
            recovery_timer: 0.0,
            clockwise: true,
            profile: definition.swing_profile(),
            offset: Vec2::ZERO,
            ranged: definition.ranged,
            sprite_region: definition.sprite_region,
            experience: 0,
            level: 0,
            struck: Vec::new(),
        }
    }

    pub fn state(&self) -> SwingState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SwingState::Idle
    }

    /// Idle, but the blade is still easing back after a slash.
    pub fn is_recovering(&self) -> bool {
        self.state == SwingState::Idle && self.recovery_timer > 0.0
    }

    pub fn is_slashing(&self) -> bool {
        self.state == SwingState::Slashing
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn base_rotation(&self) -> f32 {
        self.base_rotation
    }

    pub fn profile(&self) -> &SwingProfile {
        &self.profile
    }

    pub fn hit_polygon(&self) -> &[Vec2] {
        &self.hit_polygon
    }

    pub fn is_ranged(&self) -> bool {
        self.ranged.is_some()
    }

    /// Damage including the level bonus.
    pub fn damage(&self) -> f32 {
        self.base_damage * (1.0 + DAMAGE_PER_LEVEL * self.level as f32)
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    /// Aim direction. While idle the blade follows it immediately.
    pub fn set_base_rotation(&mut self, radians: f32) {
        self.base_rotation = radians;
        if self.state == SwingState::Idle {
            self.rotation = radians;
        }
    }

    /// Begin a swing. Returns false, changing nothing, unless idle.
    pub fn start_swing(&mut self, clockwise: bool) -> bool {
        if self.state != SwingState::Idle {
            return false;
        }
        self.clockwise = clockwise;
        self.state = SwingState::WindingUp;
        self.phase_timer = 0.0;
        self.recovery_timer = 0.0;
        self.struck.clear();
        true
    }

    /// Advance the swing and rebuild the hit polygon around `wielder_center`.
    pub fn update(&mut self, dt: f32, wielder_center: Vec2) {
        let sign = if self.clockwise { 1.0 } else { -1.0 };
        let windup = self.profile.windup_angle;
        let slash = self.profile.slash_angle;

        match self.state {
            SwingState::Idle if self.recovery_timer > 0.0 => {
                self.recovery_timer -= dt;
                if self.recovery_timer <= 0.0 {
                    self.rotation = self.base_rotation;
                } else {
                    let duration = self.profile.recovery_duration;
                    let t = progress(duration - self.recovery_timer, duration);
                    let follow = self.profile.recovery_angle * (std::f32::consts::PI * t).sin();
                    self.rotation = self.base_rotation + sign * (slash * (1.0 - t) + follow);
                }
            }
            SwingState::Idle => {
                self.rotation = self.base_rotation;
            }
            SwingState::WindingUp => {
                self.phase_timer += dt;
                let t = progress(self.phase_timer, self.profile.windup_duration);
                self.rotation = self.base_rotation - sign * windup * t;
                if self.phase_timer >= self.profile.windup_duration {
                    self.state = SwingState::Slashing;
                    self.phase_timer = 0.0;
                }
            }
            SwingState::Slashing => {
                self.phase_timer += dt;
                let t = progress(self.phase_timer, self.profile.active_duration);
                self.rotation = self.base_rotation + sign * (-windup + (windup + slash) * t);
                if self.phase_timer >= self.profile.active_duration {
                    self.state = SwingState::Idle;
                    self.phase_timer = 0.0;
                    self.recovery_timer = self.profile.recovery_duration;
                    if self.recovery_timer <= 0.0 {
                        self.rotation = self.base_rotation;
                    }
                }
            }
        }

        self.hit_polygon = transform_polygon(
            &self.local_polygon,
            self.rotation,
            wielder_center + self.offset,
        );
    }

    /// Record a target hit by the current swing. False if it was already hit.
    pub fn mark_struck(&mut self, id: ActorId) -> bool {
        if self.struck.contains(&id) {
            return false;
        }
        self.struck.push(id);
        true
    }

    /// Launch this weapon's projectile, if it has one.
    pub fn fire(&self, origin: Vec2, direction: Vec2, owner: ProjectileOwner) -> Option<Projectile> {
        let ranged = self.ranged?;
        let direction = direction.try_normalize()?;
        Some(Projectile::new(
            origin,
            direction * ranged.speed,
            self.damage() * ranged.damage_scale,
            owner,
            ranged.variant,
        ))
    }

    /// Bank experience. Returns true if at least one level was gained.
    pub fn gain_experience(&mut self, amount: u32) -> bool {
        self.experience = self.experience.saturating_add(amount);
        let level = self.experience / XP_PER_LEVEL;
        let leveled_up = level > self.level;
        self.level = level;
        leveled_up
    }
}

fn progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}
