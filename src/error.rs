//! # Error Types
//!
//! Custom error types for go2-teleop using `thiserror`.

use thiserror::Error;

/// Main error type for go2-teleop
#[derive(Debug, Error)]
pub enum TeleopError {
    /// Robot link errors (publish or request failed)
    #[error("robot link error: {0}")]
    Link(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Command channel closed (sampler or executor gone)
    #[error("command channel closed")]
    ChannelClosed,

    /// Telemetry logging errors
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for go2-teleop
pub type Result<T> = std::result::Result<T, TeleopError>;
