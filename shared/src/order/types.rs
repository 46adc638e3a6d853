//! Closed enumerations and small value types for materials orders

use serde::{Deserialize, Serialize};

/// Order type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OrderType {
    #[default]
    Standard,
    Supplemental,
    Replacement,
    Simulation,
    Custom,
}

/// Overall materials format chosen on the order header
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialsFormat {
    AllDigital,
    AllPhysical,
    Mixed,
    SimOnly,
}

/// Per-line-item format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ItemFormat {
    #[default]
    Digital,
    Print,
    Kit,
}

/// Order fulfillment status
///
/// `New → InProgress → Processed → Finalized` is the core progression
/// derived from edits and item completion. The remaining values are
/// side-states set by explicit operations and left alone by the derivation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OrderStatus {
    #[default]
    New,
    #[serde(rename = "In progress")]
    InProgress,
    Processed,
    Finalized,
    Ordered,
    Shipped,
    Delivered,
    #[serde(rename = "On hold")]
    OnHold,
    Cancelled,
}

impl OrderStatus {
    /// True for the derived core progression states
    pub fn is_core(&self) -> bool {
        matches!(self, Self::New | Self::InProgress | Self::Processed)
    }
}

/// Why a notification is being sent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifyReason {
    /// First notification for this order
    Created,
    /// Order changed after a previous notification
    Updated,
}

/// Shipping contact and address block on the order header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShippingAddress {
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}
