//! Error definitions for the mapping module

use thiserror::Error;

/// Errors raised while setting up the command mapping
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    /// An axis profile cannot produce a meaningful value
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Two axes are bound to the same reading
    #[error("Conflicting axis binding: {0}")]
    ConflictingBinding(String),
}
