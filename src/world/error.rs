//! Errors raised while reading room, NPC, and weapon data.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("Data file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read '{}': {source}", .path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// RON parsing failed; the source carries line and column.
    #[error("Parse error in '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// The layout parsed but cannot be played.
    #[error("Invalid room '{name}': {details}")]
    InvalidRoom { name: String, details: String },
}
