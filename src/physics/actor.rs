//! Collision actor taxonomy.
//!
//! Exactly five kinds of actor exist. The kind decides how the solver
//! treats the body; callers never pick the kinematic class themselves.

use bevy::prelude::*;

/// Identity of a registered actor, allocated by the physics bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

/// How the solver moves a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KinematicClass {
    /// Never moves.
    Static,
    /// Moved by gameplay, unaffected by forces.
    Kinematic,
    /// Fully simulated.
    Dynamic,
}

/// The closed set of collision participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    Wall,
    Chest,
    Projectile,
    Npc,
    Player,
}

impl ActorKind {
    pub fn kinematic_class(self) -> KinematicClass {
        match self {
            ActorKind::Wall | ActorKind::Chest => KinematicClass::Static,
            ActorKind::Projectile => KinematicClass::Kinematic,
            ActorKind::Npc | ActorKind::Player => KinematicClass::Dynamic,
        }
    }

    pub fn is_solid_scenery(self) -> bool {
        matches!(self, ActorKind::Wall | ActorKind::Chest)
    }
}

/// The other side of a contact, as seen from one actor's hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactPartner {
    pub id: ActorId,
    pub kind: ActorKind,
}

/// Capability shared by everything that can collide.
pub trait CollisionActor {
    fn kind(&self) -> ActorKind;

    /// Current axis-aligned bounds in display space.
    fn bounds(&self) -> Rect;

    /// Bounds used when the actor is first registered.
    fn calculate_initial_bounds(&self) -> Rect {
        self.bounds()
    }

    /// Collision response hook, called once per contacting pair per step.
    fn on_collision(&mut self, other: ContactPartner, penetration: Vec2);

    fn kinematic_class(&self) -> KinematicClass {
        self.kind().kinematic_class()
    }
}

/// Fixed-offset interaction box relative to an entity's top-left position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub offset: Vec2,
    pub size: Vec2,
}

impl Hitbox {
    pub const fn new(offset: Vec2, size: Vec2) -> Self {
        Self { offset, size }
    }

    /// "Feet" box: lower-middle part of the sprite, half as wide and
    /// three eighths as tall.
    pub fn feet(sprite_size: Vec2) -> Self {
        Self {
            offset: Vec2::new(sprite_size.x * 0.25, sprite_size.y * 0.625),
            size: Vec2::new(sprite_size.x * 0.5, sprite_size.y * 0.375),
        }
    }

    pub fn at(&self, position: Vec2) -> Rect {
        let min = position + self.offset;
        Rect::from_corners(min, min + self.size)
    }
}

/// Static wall segment produced by wall extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallCollider {
    pub rect: Rect,
}

impl CollisionActor for WallCollider {
    fn kind(&self) -> ActorKind {
        ActorKind::Wall
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    fn on_collision(&mut self, _other: ContactPartner, _penetration: Vec2) {}
}

/// Static chest; remembers whether anything has struck it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChestCollider {
    pub rect: Rect,
    pub struck: bool,
}

impl ChestCollider {
    pub fn new(rect: Rect) -> Self {
        Self { rect, struck: false }
    }
}

impl CollisionActor for ChestCollider {
    fn kind(&self) -> ActorKind {
        ActorKind::Chest
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    fn on_collision(&mut self, other: ContactPartner, _penetration: Vec2) {
        if other.kind == ActorKind::Projectile {
            self.struck = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinematic_class_follows_kind() {
        assert_eq!(ActorKind::Wall.kinematic_class(), KinematicClass::Static);
        assert_eq!(ActorKind::Chest.kinematic_class(), KinematicClass::Static);
        assert_eq!(ActorKind::Projectile.kinematic_class(), KinematicClass::Kinematic);
        assert_eq!(ActorKind::Npc.kinematic_class(), KinematicClass::Dynamic);
        assert_eq!(ActorKind::Player.kinematic_class(), KinematicClass::Dynamic);
    }

    #[test]
    fn feet_hitbox_sits_inside_sprite() {
        let hitbox = Hitbox::feet(Vec2::new(32.0, 32.0));
        let rect = hitbox.at(Vec2::new(100.0, 50.0));
        assert_eq!(rect.min, Vec2::new(108.0, 70.0));
        assert_eq!(rect.max, Vec2::new(124.0, 82.0));
    }

    #[test]
    fn chest_only_remembers_projectiles() {
        let mut chest = ChestCollider::new(Rect::new(0.0, 0.0, 16.0, 16.0));
        chest.on_collision(ContactPartner { id: ActorId(1), kind: ActorKind::Npc }, Vec2::X);
        assert!(!chest.struck);
        chest.on_collision(ContactPartner { id: ActorId(2), kind: ActorKind::Projectile }, Vec2::X);
        assert!(chest.struck);
    }
}
