//! Error types for the playground engine

use thiserror::Error;

/// Result type alias for playground operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the playground engine
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to render or snapshot the preview
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to execute a script in the preview context
    #[error("Script execution failed: {0}")]
    ScriptError(String),
}
