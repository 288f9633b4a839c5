//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the directory search service, providing
//! structured error types and conversion utilities for all system components.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from various system components
//! - **Output**: Structured error types with context and error chains
//! - **Error Categories**: Storage, Search, API, Configuration
//!
//! ## Key Features
//! - Structured error types with detailed context
//! - Automatic error conversion and chaining
//! - User-friendly error messages for API responses
//! - Structured logging integration

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Error types for the directory search service
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The backing store cannot be reached or refused the operation.
    /// Surfaced to the caller unchanged; never retried internally.
    #[error("store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// A referenced record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Caller-supplied input rejected before any store call
    #[error("invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Record encoding/decoding errors
    #[error("serialization failed for {data_type}: {reason}")]
    Serialization { data_type: String, reason: String },

    /// Internal system errors
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DirectoryError {
    /// Check if the error is recoverable (can be retried by the caller)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DirectoryError::StoreUnavailable { .. })
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            DirectoryError::StoreUnavailable { .. } | DirectoryError::Serialization { .. } => {
                "storage"
            }
            DirectoryError::NotFound { .. } => "lookup",
            DirectoryError::InvalidInput { .. } => "validation",
            DirectoryError::Config { .. } => "configuration",
            DirectoryError::Internal { .. } => "generic",
        }
    }

    /// HTTP status code for API responses
    pub fn status_code(&self) -> u16 {
        match self {
            DirectoryError::InvalidInput { .. } => 400,
            DirectoryError::NotFound { .. } => 404,
            DirectoryError::StoreUnavailable { .. } => 503,
            _ => 500,
        }
    }
}

// Conversion from common error types
impl From<sled::Error> for DirectoryError {
    fn from(err: sled::Error) -> Self {
        DirectoryError::StoreUnavailable {
            reason: err.to_string(),
        }
    }
}

impl From<bincode::Error> for DirectoryError {
    fn from(err: bincode::Error) -> Self {
        DirectoryError::Serialization {
            data_type: "record".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for DirectoryError {
    fn from(err: std::io::Error) -> Self {
        DirectoryError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(err: serde_json::Error) -> Self {
        DirectoryError::Serialization {
            data_type: "json".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DirectoryError {
    fn from(err: toml::de::Error) -> Self {
        DirectoryError::Config {
            message: err.to_string(),
        }
    }
}
