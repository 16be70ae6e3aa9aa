//! Physics module - the bridge between gameplay actors and the rigid-body solver.
//!
//! Gameplay code only ever sees [`ActorId`]s, display-space [`Rect`]s and
//! [`ContactEvent`]s. The solver lives behind [`PhysicsBackend`].
//!
//! [`Rect`]: bevy::math::Rect

mod actor;
mod backend;
mod bridge;
mod registry;
pub mod units;

pub use actor::*;
pub use backend::{BodyDesc, BodyHandle, PhysicsBackend, RapierBackend, RawContact};
pub use bridge::{ActorRecord, ContactEvent, PhysicsBridge};
pub use registry::ActorRegistry;
