//! Shared types for the materials fulfillment system
//!
//! Domain models, closed enumerations, the canonical order snapshot with its
//! fingerprint, and the unified error type used across crates.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
