//! Configuration error types

use thiserror::Error;

/// Errors raised while building or loading animation configuration
///
/// The frame loop itself never returns these: parameters are checked by the
/// layer that assembles configs, and the integrator trusts what it is given.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A spring parameter was negative, zero where it must not be, or not finite
    #[error("Invalid spring parameter `{name}`: {value}")]
    InvalidSpring { name: &'static str, value: f64 },

    /// Duration was negative or not finite
    #[error("Invalid duration: {0}")]
    InvalidDuration(f64),

    /// Decay rate outside of (0, 1)
    #[error("Invalid decay rate: {0} (expected 0 < rate < 1)")]
    InvalidDecay(f64),

    /// Unknown integration method name
    #[error("Unknown integration method: {0}")]
    UnknownIntegration(String),

    /// Settings file could not be parsed
    #[error("Settings parse error: {0}")]
    Settings(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
