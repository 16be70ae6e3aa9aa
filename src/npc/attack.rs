//! NPC attack state: its own cooldown plus a once-per-swing hit gate.

use crate::combat::Weapon;

#[derive(Debug, Clone, PartialEq)]
pub struct NpcCombat {
    pub attack_range: f32,
    attack_cooldown: f32,
    cooldown_timer: f32,
    is_attacking: bool,
    hit_this_swing: bool,
}

impl NpcCombat {
    pub fn new(attack_range: f32, attack_cooldown: f32) -> Self {
        Self {
            attack_range,
            attack_cooldown,
            cooldown_timer: 0.0,
            is_attacking: false,
            hit_this_swing: false,
        }
    }

    pub fn is_attacking(&self) -> bool {
        self.is_attacking
    }

    pub fn can_attack(&self) -> bool {
        !self.is_attacking && self.cooldown_timer <= 0.0
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown_timer -= dt;
    }

    /// Start a swing if ready. The cooldown covers at least the whole swing.
    pub fn begin_attack(&mut self, weapon: &mut Weapon, clockwise: bool) -> bool {
        if !self.can_attack() || !weapon.start_swing(clockwise) {
            return false;
        }
        self.is_attacking = true;
        self.hit_this_swing = false;
        self.cooldown_timer = self.attack_cooldown.max(weapon.profile().total_duration());
        true
    }

    /// Leave the attacking state once the weapon has come back to idle.
    pub fn refresh(&mut self, weapon: &Weapon) {
        if self.is_attacking && weapon.is_idle() {
            self.is_attacking = false;
            self.hit_this_swing = false;
        }
    }

    pub fn check_player_hit(&self, weapon: &Weapon) -> bool {
        self.is_attacking && weapon.is_slashing() && !self.hit_this_swing
    }

    pub fn register_hit(&mut self) {
        self.hit_this_swing = true;
    }
}
