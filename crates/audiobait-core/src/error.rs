//! Core error types for audiobait-core.
//!
//! Only two kinds are fatal to the process: configuration failures at
//! startup and playback failures. Everything raised inside a burst
//! iteration is absorbed there.

use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiError;

/// Core error type for audiobait-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Audio device errors
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Failures reported by the audio collaborators.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The player ran but exited unsuccessfully.
    #[error("play failed for {path}: {status}\noutput:\n{output}")]
    PlayerFailed {
        path: PathBuf,
        status: String,
        output: String,
    },

    /// The external program could not be started at all.
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Setting the mixer level failed.
    #[error("volume set failed: {status}\noutput:\n{output}")]
    Volume { status: String, output: String },
}

/// Failure to hand a playback event to the reporting channel.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The delivery task has stopped; nothing will be sent.
    #[error("event queue closed")]
    QueueClosed,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
