//! Order operation errors

use super::storage::StorageError;
use shared::error::AppError;
use shared::order::{FieldError, SaveResponse};
use thiserror::Error;

/// Errors raised while processing a save operation
#[derive(Debug, Error)]
pub enum OrderError {
    /// Input failed validation; the transaction is aborted
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    /// Operation conflicts with the order's lifecycle state
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// Target order does not exist
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl OrderError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation { field, message } => {
                AppError::validation(message).with_detail("field", field)
            }
            OrderError::StateConflict(msg) => AppError::conflict(msg),
            OrderError::NotFound(msg) => AppError::not_found(msg),
            OrderError::Storage(e) => AppError::storage(e.to_string()),
        }
    }
}

/// Fold a domain error into the save response shape
///
/// Storage errors stay hard errors for the caller; everything else becomes a
/// structured response with the matching result code.
pub fn error_response(err: OrderError) -> Result<SaveResponse, StorageError> {
    match err {
        OrderError::Validation { field, message } => Ok(SaveResponse::validation_failure(vec![
            FieldError::new(field, message),
        ])),
        OrderError::StateConflict(msg) => Ok(SaveResponse::forbidden(msg)),
        OrderError::NotFound(msg) => Ok(SaveResponse::not_found(msg)),
        OrderError::Storage(e) => Err(e),
    }
}
