//! Error taxonomy for the collision and combat core.
//!
//! None of these cross a frame boundary: callers log them and recover.

use thiserror::Error;

use crate::physics::ActorId;

/// Recoverable failures raised inside the combat core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CombatError {
    /// A weapon, NPC type, or animation reference could not be resolved.
    #[error("Missing {kind} configuration '{name}', using default")]
    ConfigurationMissing { kind: &'static str, name: String },

    /// Spawn request rejected by distance or collision constraints.
    #[error("Invalid spawn position ({x}, {y}): {reason}")]
    InvalidSpawnPosition { x: f32, y: f32, reason: String },

    /// Bounds with zero area cannot back a physics body.
    #[error("Cannot create physics body for {width}x{height} bounds")]
    PhysicsBodyCreationFailure { width: f32, height: f32 },

    /// The solver handed out a body that is already linked to an actor.
    #[error("Body for actor {0:?} is already linked to another actor")]
    BodyAlreadyLinked(ActorId),

    /// Removal or update of an actor that is not registered.
    #[error("Actor {0:?} is not registered")]
    StaleActorReference(ActorId),
}
