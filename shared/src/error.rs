//! Unified error type for the fulfillment system
//!
//! Provides [`ErrorCode`] (stable, serializable codes) and [`AppError`]
//! (code + message + optional structured details). Lower layers define their
//! own `thiserror` enums and convert into `AppError` at the boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Stable error codes surfaced to embedding callers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input failed validation; details carry field-level messages
    ValidationFailed,
    /// Requested resource (session, order, item) does not exist
    NotFound,
    /// Operation conflicts with the current lifecycle state
    StateConflict,
    /// Operation is not permitted on this order
    Forbidden,
    /// The mail transport reported a failure
    TransportFailure,
    /// Persistence layer failure
    StorageError,
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::StateConflict => "Operation conflicts with current state",
            Self::Forbidden => "Operation not permitted",
            Self::TransportFailure => "Mail transport failure",
            Self::StorageError => "Storage failure",
            Self::InternalError => "Internal error",
        }
    }
}

/// Application error with structured code and details
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create a state conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::StateConflict, msg)
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::Forbidden, msg)
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::StorageError, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }
}

pub type AppResult<T> = Result<T, AppError>;
