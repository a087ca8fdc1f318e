//! Error types for the simulation core.
//!
//! The core performs no I/O during play, so every variant except the config
//! ones is a caller contract violation.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Contract violations and configuration failures.
#[derive(Debug, Error)]
pub enum SimError {
    /// Spawn requested at a NaN or infinite position.
    #[error("Non-finite spawn position: ({x}, {y})")]
    NonFinitePosition {
        /// Requested x.
        x: f64,
        /// Requested y.
        y: f64,
    },

    /// Spawn requested with a NaN or infinite velocity.
    #[error("Non-finite spawn velocity: ({x}, {y})")]
    NonFiniteVelocity {
        /// Requested x component.
        x: f64,
        /// Requested y component.
        y: f64,
    },

    /// Tick delta was negative or not finite.
    #[error("Invalid tick delta: {0} ms")]
    InvalidDelta(f64),

    /// `tick` called after the run was lost, without a `reset` in between.
    #[error("Run is over; reset before ticking again")]
    RunOver,

    /// Configuration or world bounds failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration JSON could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("Failed to read configuration '{path}': {source}")]
    ConfigRead {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
