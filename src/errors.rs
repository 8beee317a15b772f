//! Error types for the lovecal application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur while managing calendar events.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the lovecal application.
#[derive(Error, Debug)]
pub enum CalError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required field is missing or out of range. Nothing was written.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// The input could not be interpreted as a calendar day.
    #[error("Could not parse date: {input}")]
    DateParse { input: String },

    /// The remote store could not be reached or rejected the request.
    #[error("Remote store unavailable: {message}")]
    RemoteUnavailable { message: String },

    /// A local storage slot holds data that does not decode.
    #[error("Local storage slot '{slot}' is corrupt: {message}")]
    StorageCorrupt { slot: String, message: String },

    /// Event was not found when performing an operation.
    #[error("Event not found: {id}")]
    EventNotFound { id: String },

    /// Wrong passphrase, or an operation attempted before unlocking.
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}

impl CalError {
    pub fn validation(message: impl Into<String>) -> Self {
        CalError::Validation {
            message: message.into(),
        }
    }

    pub fn remote(message: impl ToString) -> Self {
        CalError::RemoteUnavailable {
            message: message.to_string(),
        }
    }
}
