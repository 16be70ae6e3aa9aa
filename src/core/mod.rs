//! Core module - states, frame ordering, feedback events, and errors.
//!
//! This module provides the foundation that all other game systems build upon.

mod error;
mod events;
mod plugin;
mod states;

pub use error::CombatError;
pub use events::*;
pub use plugin::{CorePlugin, FrameSet};
pub use states::*;
