//! Order notification fan-out
//!
//! When an order's externally-visible snapshot changes, the processing team
//! responsible for its (region, bucket) slice gets one email:
//!
//! - **recipients**: bucket derivation and the fallback-chain directory
//! - **decision**: send/suppress rules over fingerprint + notified state
//! - **mailer**: message composition and the opaque transport seam

pub mod decision;
pub mod mailer;
pub mod recipients;

// Re-exports
pub use decision::{Decision, SuppressReason, decide};
pub use mailer::{MailMessage, MailTransport, NoopTransport, SendOutcome, compose};
pub use recipients::{Bucket, RecipientDirectory, bucket_for};
