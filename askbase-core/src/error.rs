//! Error types shared across Askbase crates.

use thiserror::Error;

/// Errors produced by generator backends and shared infrastructure.
#[derive(Debug, Error)]
pub enum AskError {
    /// A language-model call failed or returned an unusable response.
    #[error("Model error: {0}")]
    Model(String),

    /// A streaming response ended abnormally before completion.
    #[error("Stream error: {0}")]
    Stream(String),
}

/// A convenience result type for core operations.
pub type Result<T> = std::result::Result<T, AskError>;
