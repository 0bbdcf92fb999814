//! Domain error types
//!
//! This module defines the error hierarchy for nhsfilter.
//! All errors are domain-specific and don't expose third-party types.

use super::nhs_number::NhsNumber;
use std::path::PathBuf;
use thiserror::Error;

/// Main nhsfilter error type
///
/// This is the primary error type used throughout the library.
/// The CLI layer wraps it in `anyhow` and maps it to an exit code.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Pseudonym table errors (save failures, unwritable paths)
    #[error("Pseudonym table error: {0}")]
    Table(String),

    /// An unmapped NHS number was found and the user refused auto-generation
    ///
    /// The message leaves the number out so that it never reaches the logs.
    #[error("Auto-generation of pseudonyms was declined for an unmapped NHS number")]
    AutoGenerationDenied { nhs_number: NhsNumber },

    /// The generator could not find a free pseudonym within its attempt cap
    #[error("No unused pseudonym found after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    /// Output file could not be produced
    #[error("Failed to write {}: {message}", path.display())]
    Output { path: PathBuf, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl FilterError {
    /// Process exit code the CLI reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FilterError::Configuration(_) => 2,
            FilterError::AutoGenerationDenied { .. } => 3,
            _ => 5,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for FilterError {
    fn from(err: std::io::Error) -> Self {
        FilterError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FilterError {
    fn from(err: toml::de::Error) -> Self {
        FilterError::Configuration(format!("TOML parse error: {err}"))
    }
}
