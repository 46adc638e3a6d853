//! Materials fulfillment engine
//!
//! Manages the lifecycle of materials orders attached to training sessions:
//!
//! - **orders**: transactional save pipeline: item reconciliation,
//!   simulation-credits synchronization, status derivation, persistence
//! - **notify**: recipient resolution, send/suppress decision, mail seam
//! - **catalog**: read-only collaborator seam for options, outlines,
//!   default rules and region labels
//!
//! # Save Flow
//!
//! ```text
//! SaveRequest → OrdersManager
//!     ├─ begin write transaction
//!     ├─ load or create order + items
//!     ├─ apply header changes / reconcile rows
//!     ├─ synchronize simulation credits
//!     ├─ recompute status
//!     ├─ capture snapshot + fingerprint
//!     ├─ notification decision → transport
//!     └─ commit (fingerprint persisted only on transport success)
//! ```

pub mod catalog;
pub mod common;
pub mod config;
pub mod notify;
pub mod orders;

// Re-exports
pub use catalog::{CatalogProvider, StaticCatalog};
pub use config::Config;
pub use notify::{MailTransport, RecipientDirectory, SendOutcome};
pub use orders::{OrderStorage, OrdersManager, StorageError};

// Re-export shared types for convenience
pub use shared::order::{
    HeaderChanges, LineItem, MaterialsOrder, OperatorContext, OrderSnapshot, RowEdit, SaveAction,
    SaveRequest, SaveResponse, SaveResult,
};
