//! Error handling for MCAT
//!
//! Structural and type errors are local and recoverable: the caller decides
//! what to do with a rejected key or value. Validity problems of data
//! providers are not errors at all; they are collected in a
//! [`ValidityReport`](crate::validity::ValidityReport).

use std::path::PathBuf;

use thiserror::Error;

use crate::data::DataType;
use crate::parameters::FieldType;

/// Result type alias for MCAT operations
pub type Result<T> = std::result::Result<T, McatError>;

/// Main error type for MCAT operations
#[derive(Error, Debug)]
pub enum McatError {
    // Parameter Errors
    #[error("Parameter with key '{key}' already exists")]
    DuplicateKey { key: String },

    #[error("Parameter type '{field_type}' is not allowed here (key '{key}')")]
    TypeNotAllowed { key: String, field_type: FieldType },

    #[error("Type mismatch for '{key}': expected {expected}, got {found}")]
    TypeMismatch {
        key: String,
        expected: FieldType,
        found: FieldType,
    },

    #[error("Unknown parameter: {key}")]
    UnknownParameter { key: String },

    #[error("Value for '{key}' was rejected by its holder")]
    ValueRejected { key: String },

    #[error("Cannot read '{input}' as {field_type}")]
    InvalidValue { field_type: FieldType, input: String },

    // Data Slot Errors
    #[error("Slot '{slot}' expects {expected} data, provider produces {found}")]
    IncompatibleProvider {
        slot: String,
        expected: DataType,
        found: DataType,
    },

    #[error("No data provider available for slot '{slot}'")]
    NoProviderAvailable { slot: String },

    #[error("Unknown data provider kind: {kind}")]
    UnknownProviderKind { kind: String },

    // Project Errors
    #[error("Sample not found: {name}")]
    SampleNotFound { name: String },

    #[error("Sample already exists: {name}")]
    SampleAlreadyExists { name: String },

    #[error("Invalid document: {reason}")]
    InvalidDocument { reason: String },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl McatError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            McatError::DuplicateKey { .. } => "DUPLICATE_KEY",
            McatError::TypeNotAllowed { .. } => "TYPE_NOT_ALLOWED",
            McatError::TypeMismatch { .. } => "TYPE_MISMATCH",
            McatError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            McatError::ValueRejected { .. } => "VALUE_REJECTED",
            McatError::InvalidValue { .. } => "INVALID_VALUE",
            McatError::IncompatibleProvider { .. } => "INCOMPATIBLE_PROVIDER",
            McatError::NoProviderAvailable { .. } => "NO_PROVIDER_AVAILABLE",
            McatError::UnknownProviderKind { .. } => "UNKNOWN_PROVIDER_KIND",
            McatError::SampleNotFound { .. } => "SAMPLE_NOT_FOUND",
            McatError::SampleAlreadyExists { .. } => "SAMPLE_ALREADY_EXISTS",
            McatError::InvalidDocument { .. } => "INVALID_DOCUMENT",
            McatError::FileNotFound { .. } => "FILE_NOT_FOUND",
            McatError::FileReadError { .. } => "FILE_READ_ERROR",
            McatError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            McatError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            McatError::DuplicateKey { .. }
                | McatError::TypeNotAllowed { .. }
                | McatError::TypeMismatch { .. }
                | McatError::UnknownParameter { .. }
                | McatError::ValueRejected { .. }
                | McatError::InvalidValue { .. }
                | McatError::IncompatibleProvider { .. }
                | McatError::SampleNotFound { .. }
                | McatError::SampleAlreadyExists { .. }
                | McatError::FileNotFound { .. }
        )
    }

    /// Returns a user-facing recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            McatError::DuplicateKey { .. } => Some("Choose a different parameter key."),
            McatError::TypeNotAllowed { .. } => {
                Some("Use one of the parameter types allowed by this collection.")
            }
            McatError::TypeMismatch { .. } | McatError::InvalidValue { .. } => {
                Some("Provide a value of the parameter's declared type.")
            }
            McatError::ValueRejected { .. } => Some("The value is out of the accepted range."),
            McatError::IncompatibleProvider { .. } => {
                Some("Select a data provider listed as available for this slot.")
            }
            McatError::SampleAlreadyExists { .. } => Some("Choose a different sample name."),
            McatError::FileNotFound { .. } => Some("Check the file path and try again."),
            _ => None,
        }
    }
}
