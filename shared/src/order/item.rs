//! Materials order line item

use super::types::ItemFormat;
use serde::{Deserialize, Serialize};

/// Catalog reference of the synthetic simulation-credits line
pub const SIM_CREDITS_REF: &str = "simulation_credits";

/// One line item on a materials order
///
/// `title`/`description`/`sku` are snapshotted from the catalog option at
/// creation time and never refreshed; catalog edits must not rewrite
/// history on existing orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Storage-assigned ID, unique within the session
    pub id: u64,
    /// Owning session ID
    pub session_id: String,
    /// Catalog reference (`"<kind>:<id>"`) or [`SIM_CREDITS_REF`]
    pub catalog_ref: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sku: String,
    /// Language code, e.g. "en"
    pub language: String,
    pub format: ItemFormat,
    /// Quantity (> 0; a reconciled quantity of 0 deletes the row)
    pub quantity: i32,
    #[serde(default)]
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<String>,
}

impl LineItem {
    /// True when this is the synthetic simulation-credits line
    pub fn is_sim_credits(&self) -> bool {
        self.catalog_ref == SIM_CREDITS_REF
    }

    /// Identity key used to merge duplicate rows
    pub fn matches_identity(&self, catalog_ref: &str, language: &str, format: ItemFormat) -> bool {
        self.catalog_ref == catalog_ref && self.language == language && self.format == format
    }

    /// Set the processed flag, stamping or clearing the audit fields
    ///
    /// Returns true when the flag actually changed.
    pub fn set_processed(&mut self, processed: bool, operator: &str, at: i64) -> bool {
        if self.processed == processed {
            return false;
        }
        self.processed = processed;
        if processed {
            self.processed_at = Some(at);
            self.processed_by = Some(operator.to_string());
        } else {
            self.processed_at = None;
            self.processed_by = None;
        }
        true
    }
}
