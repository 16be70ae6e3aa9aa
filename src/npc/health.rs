//! NPC health: hit cooldown, stun, and the terminal defeat state.

/// Seconds of invulnerability after a hit lands.
pub const HIT_COOLDOWN: f32 = 0.5;

/// Seconds between defeat and removal.
pub const DEFEAT_DURATION: f32 = 1.0;

/// Result of [`NpcHealth::take_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Still invulnerable or already defeated; nothing changed.
    Ignored,
    Damaged,
    /// This hit brought health to zero.
    Defeated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpcHealth {
    current: f32,
    hit_timer: f32,
    stun_timer: f32,
    defeated: bool,
    defeat_timer: f32,
    ready_to_remove: bool,
}

impl NpcHealth {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            hit_timer: 0.0,
            stun_timer: 0.0,
            defeated: false,
            defeat_timer: 0.0,
            ready_to_remove: false,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn can_take_damage(&self) -> bool {
        self.hit_timer <= 0.0
    }

    pub fn is_stunned(&self) -> bool {
        !self.defeated && self.stun_timer > 0.0
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn defeat_timer(&self) -> f32 {
        self.defeat_timer
    }

    pub fn is_ready_to_remove(&self) -> bool {
        self.ready_to_remove
    }

    pub fn take_damage(&mut self, amount: f32, stun_duration: f32) -> DamageOutcome {
        if self.defeated || !self.can_take_damage() {
            return DamageOutcome::Ignored;
        }

        self.current = (self.current - amount).max(0.0);
        self.hit_timer = HIT_COOLDOWN;
        self.stun_timer = stun_duration;

        if self.current <= 0.0 {
            self.defeated = true;
            self.defeat_timer = DEFEAT_DURATION;
            return DamageOutcome::Defeated;
        }
        DamageOutcome::Damaged
    }

    pub fn update(&mut self, dt: f32) {
        if !self.defeated {
            self.hit_timer -= dt;
            self.stun_timer -= dt;
            return;
        }
        if self.ready_to_remove {
            return;
        }
        self.defeat_timer -= dt;
        if self.defeat_timer <= 0.0 {
            self.ready_to_remove = true;
        }
    }
}
