//! # Config Error Types
//!
//! Failures while loading or saving the policy file.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the policy file failed.
    #[error("Policy file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The policy file is not valid TOML for the expected schema.
    #[error("Failed to parse policy file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The policy could not be written as TOML.
    #[error("Failed to serialize policy: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The merged policy table is inconsistent (e.g. min above max).
    #[error("Invalid policy: {0}")]
    InvalidPolicy(#[from] tender_core::CoreError),
}
