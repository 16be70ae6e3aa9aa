//! NPC movement: wander and chase AI, with knockback taking priority.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

use crate::physics::Hitbox;
use crate::world::{clamp_to_area, slide_move, Obstacles};

/// Which AI drives an NPC when it is not being knocked back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AiKind {
    #[default]
    Wander,
    ChasePlayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementPhase {
    #[default]
    Idle,
    Walking,
    KnockedBack,
}

#[derive(Debug, Clone)]
pub struct NpcMovement {
    pub ai: AiKind,
    pub speed: f32,
    pub chase_speed: f32,
    pub detection_range: f32,
    velocity: Vec2,
    phase: MovementPhase,
    direction_timer: f32,
    idle_timer: f32,
    knockback_timer: f32,
    knockback_velocity: Vec2,
    bumped_wall: bool,
}

impl NpcMovement {
    pub fn new(ai: AiKind, speed: f32, chase_speed: f32, detection_range: f32) -> Self {
        Self {
            ai,
            speed,
            chase_speed,
            detection_range,
            velocity: Vec2::ZERO,
            phase: MovementPhase::Idle,
            direction_timer: 0.0,
            idle_timer: 0.0,
            knockback_timer: 0.0,
            knockback_velocity: Vec2::ZERO,
            bumped_wall: false,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn phase(&self) -> MovementPhase {
        self.phase
    }

    pub fn knockback_velocity(&self) -> Vec2 {
        self.knockback_velocity
    }

    pub fn is_knocked_back(&self) -> bool {
        self.phase == MovementPhase::KnockedBack
    }

    pub fn apply_knockback(&mut self, velocity: Vec2, duration: f32) {
        self.knockback_velocity = velocity;
        self.velocity = velocity;
        self.knockback_timer = duration;
        self.phase = MovementPhase::KnockedBack;
    }

    /// Flag set from the collision hook; wandering turns away next update.
    pub fn bump_wall(&mut self) {
        self.bumped_wall = true;
    }

    /// Stop in place. Knockback is not interrupted.
    pub fn halt(&mut self) {
        if self.phase == MovementPhase::KnockedBack {
            return;
        }
        self.velocity = Vec2::ZERO;
        self.phase = MovementPhase::Idle;
    }

    /// Move one step and return the new top-left position.
    ///
    /// `target` is the player's center, if there is a player.
    pub fn update(
        &mut self,
        dt: f32,
        position: Vec2,
        hitbox: &Hitbox,
        target: Option<Vec2>,
        obstacles: &impl Obstacles,
        rng: &mut impl Rng,
    ) -> Vec2 {
        let bumped = std::mem::take(&mut self.bumped_wall);

        if self.phase == MovementPhase::KnockedBack {
            self.knockback_timer -= dt;
            let next = slide_move(position, self.knockback_velocity * dt, hitbox, obstacles);
            if self.knockback_timer <= 0.0 {
                self.velocity = Vec2::ZERO;
                self.knockback_velocity = Vec2::ZERO;
                self.phase = MovementPhase::Idle;
                self.idle_timer = 0.0;
            }
            return clamp_to_area(next, hitbox, obstacles.play_area());
        }

        let center = hitbox.at(position).center();
        let chase_target = match (self.ai, target) {
            (AiKind::ChasePlayer, Some(target))
                if target.distance(center) <= self.detection_range =>
            {
                Some(target)
            }
            _ => None,
        };

        match chase_target {
            Some(target) => self.chase(center, target),
            None => self.wander(dt, bumped, rng),
        }

        let next = slide_move(position, self.velocity * dt, hitbox, obstacles);
        clamp_to_area(next, hitbox, obstacles.play_area())
    }

    fn chase(&mut self, center: Vec2, target: Vec2) {
        self.velocity = (target - center).normalize_or_zero() * self.chase_speed;
        self.phase = if self.velocity == Vec2::ZERO {
            MovementPhase::Idle
        } else {
            MovementPhase::Walking
        };
    }

    fn wander(&mut self, dt: f32, bumped: bool, rng: &mut impl Rng) {
        match self.phase {
            MovementPhase::Idle => {
                self.idle_timer -= dt;
                if self.idle_timer <= 0.0 {
                    self.pick_direction(rng);
                }
            }
            MovementPhase::Walking => {
                self.direction_timer -= dt;
                if bumped {
                    self.pick_direction(rng);
                } else if self.direction_timer <= 0.0 {
                    self.velocity = Vec2::ZERO;
                    self.idle_timer = rng.gen_range(0.5..2.0);
                    self.phase = MovementPhase::Idle;
                }
            }
            MovementPhase::KnockedBack => {}
        }
    }

    fn pick_direction(&mut self, rng: &mut impl Rng) {
        let angle = rng.gen_range(0.0..TAU);
        self.velocity = Vec2::from_angle(angle) * self.speed;
        self.direction_timer = rng.gen_range(1.0..3.0);
        self.phase = MovementPhase::Walking;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct OpenField;

    impl Obstacles for OpenField {
        fn is_blocked(&self, _area: Rect) -> bool {
            false
        }

        fn play_area(&self) -> Rect {
            Rect::new(0.0, 0.0, 1000.0, 1000.0)
        }
    }

    /// A wall along x = 100.
    struct WallAtX;

    impl Obstacles for WallAtX {
        fn is_blocked(&self, area: Rect) -> bool {
            area.max.x > 100.0
        }

        fn play_area(&self) -> Rect {
            Rect::new(0.0, 0.0, 1000.0, 1000.0)
        }
    }

    fn hitbox() -> Hitbox {
        Hitbox::new(Vec2::ZERO, Vec2::splat(10.0))
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn chase_heads_for_the_player_at_chase_speed() {
        let mut movement = NpcMovement::new(AiKind::ChasePlayer, 20.0, 50.0, 500.0);
        let next = movement.update(
            0.1,
            Vec2::new(100.0, 100.0),
            &hitbox(),
            Some(Vec2::new(205.0, 105.0)),
            &OpenField,
            &mut rng(),
        );
        assert_abs_diff_eq!(movement.velocity().length(), 50.0, epsilon = 1e-4);
        assert_abs_diff_eq!(next.x, 105.0, epsilon = 1e-4);
        assert_abs_diff_eq!(next.y, 100.0, epsilon = 1e-4);
    }

    #[test]
    fn chase_ignores_far_player() {
        let mut movement = NpcMovement::new(AiKind::ChasePlayer, 20.0, 50.0, 30.0);
        movement.update(
            0.1,
            Vec2::new(100.0, 100.0),
            &hitbox(),
            Some(Vec2::new(900.0, 900.0)),
            &OpenField,
            &mut rng(),
        );
        // Wandering instead: walking at wander speed.
        assert_abs_diff_eq!(movement.velocity().length(), 20.0, epsilon = 1e-4);
    }

    #[test]
    fn knockback_overrides_ai_until_expired() {
        let mut movement = NpcMovement::new(AiKind::ChasePlayer, 20.0, 50.0, 500.0);
        movement.apply_knockback(Vec2::new(-150.0, 0.0), 0.25);
        let target = Some(Vec2::new(500.0, 100.0));

        let pos = movement.update(0.125, Vec2::new(100.0, 100.0), &hitbox(), target, &OpenField, &mut rng());
        assert_abs_diff_eq!(pos.x, 81.25, epsilon = 1e-4);
        assert!(movement.is_knocked_back());

        let pos = movement.update(0.125, pos, &hitbox(), target, &OpenField, &mut rng());
        assert_abs_diff_eq!(pos.x, 62.5, epsilon = 1e-3);
        assert_eq!(movement.phase(), MovementPhase::Idle);
        assert_eq!(movement.velocity(), Vec2::ZERO);
    }

    #[test]
    fn knockback_slides_along_walls() {
        let mut movement = NpcMovement::new(AiKind::Wander, 20.0, 50.0, 0.0);
        movement.apply_knockback(Vec2::new(100.0, 100.0), 1.0);
        let pos = movement.update(0.1, Vec2::new(85.0, 50.0), &hitbox(), None, &WallAtX, &mut rng());
        assert_eq!(pos, Vec2::new(85.0, 60.0));
    }

    #[test]
    fn halt_does_not_cancel_knockback() {
        let mut movement = NpcMovement::new(AiKind::Wander, 20.0, 50.0, 0.0);
        movement.apply_knockback(Vec2::X, 0.5);
        movement.halt();
        assert!(movement.is_knocked_back());
    }

    #[test]
    fn wander_turns_after_wall_bump() {
        let mut movement = NpcMovement::new(AiKind::Wander, 20.0, 50.0, 0.0);
        let mut rng = rng();
        movement.update(0.01, Vec2::new(50.0, 50.0), &hitbox(), None, &OpenField, &mut rng);
        let before = movement.velocity();
        assert_eq!(movement.phase(), MovementPhase::Walking);

        movement.bump_wall();
        movement.update(0.01, Vec2::new(50.0, 50.0), &hitbox(), None, &OpenField, &mut rng);
        assert_ne!(movement.velocity(), before);
    }

    #[test]
    fn movement_stays_inside_the_room() {
        let mut movement = NpcMovement::new(AiKind::ChasePlayer, 20.0, 5000.0, 5000.0);
        let pos = movement.update(
            1.0,
            Vec2::new(10.0, 10.0),
            &hitbox(),
            Some(Vec2::new(-4000.0, 15.0)),
            &OpenField,
            &mut rng(),
        );
        assert!(pos.x >= 0.0);
    }
}
