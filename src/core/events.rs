//! Feedback events produced by the combat core.
//!
//! The core never draws, plays audio, or keeps the score display itself. It
//! queues fire-and-forget [`Feedback`] records, which the plugin layer turns
//! into [`FeedbackEvent`]s for whatever collaborator listens.

use bevy::prelude::*;

use crate::combat::ProjectileVariant;

/// Sound effects the core asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    NpcHurt,
    NpcDefeated,
    PlayerHurt,
    Blocked,
    Explosion,
    Ricochet,
    ProjectileMiss,
    Swing,
}

/// A single fire-and-forget notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    /// Floating damage number at a display position.
    DamageNumber { position: Vec2, amount: f32 },
    /// Sound effect trigger.
    Sound(SoundCue),
    /// Score increment from a defeated NPC.
    Score { points: u32 },
    /// Experience banked for the player's weapon.
    WeaponExperience { amount: u32, leveled_up: bool },
    /// A projectile left play (hit, expired, or left the world).
    ProjectileMiss { position: Vec2, variant: ProjectileVariant },
    /// Area damage went off.
    Explosion { position: Vec2, radius: f32 },
    /// The player blocked an incoming projectile.
    Blocked { position: Vec2 },
    /// Player health reached zero.
    PlayerDefeated,
}

/// Bevy event wrapper so excluded collaborators can subscribe.
#[derive(Event, Debug, Clone)]
pub struct FeedbackEvent(pub Feedback);
