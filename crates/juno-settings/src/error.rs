//! Error types for the settings crate.
//!
//! This module provides structured error types for the configuration cache,
//! the override file and the validation gate.

use juno_core::ResolutionError;
use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The cache file could not be loaded.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    /// The cache file could not be saved.
    #[error("Failed to save settings: {0}")]
    SaveError(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// The override file could not be read or created.
    #[error("Override file error: {0}")]
    Override(String),

    /// A mandatory field is still empty after every layer.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

impl SettingsError {
    /// The resolution failure, if this is one
    pub fn as_resolution(&self) -> Option<&ResolutionError> {
        match self {
            SettingsError::Resolution(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;
