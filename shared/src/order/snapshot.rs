//! Canonical order snapshot and fingerprint
//!
//! The snapshot reduces an order to its externally-visible facts: what the
//! processing teams would see change. Its fingerprint (lowercase-hex SHA-256
//! of the canonically serialized snapshot) is compared against the last
//! notified fingerprint to suppress duplicate notifications.
//!
//! Canonical form: JSON with sorted keys and no incidental whitespace.
//! Two orders with identical externally-visible facts fingerprint
//! identically regardless of item insertion order or internal row IDs.

use crate::models::session::{DeliveryType, TrainingSession, WorkshopLocation};
use crate::order::header::MaterialsOrder;
use crate::order::item::LineItem;
use crate::order::types::{ItemFormat, MaterialsFormat, OrderType, ShippingAddress};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Line item reduced to its externally-visible fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SnapshotItem {
    pub title: String,
    /// Lowercased language code
    pub language: String,
    pub format: ItemFormat,
    pub catalog_ref: String,
    pub quantity: i32,
}

impl SnapshotItem {
    fn from_item(item: &LineItem) -> Self {
        Self {
            title: item.title.clone(),
            language: item.language.to_lowercase(),
            format: item.format,
            catalog_ref: item.catalog_ref.clone(),
            quantity: item.quantity,
        }
    }
}

/// Canonical externally-visible order state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    // Scheduling facts
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_start_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_end_time: Option<NaiveTime>,
    pub timezone: String,
    pub delivery_type: DeliveryType,
    /// Workshop language
    pub language: String,
    // Shipping contact/address block
    pub shipping: ShippingAddress,
    /// Workshop location; unstructured locations carry only the label
    pub location: WorkshopLocation,
    // Order header
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materials_format: Option<MaterialsFormat>,
    pub material_sets: i32,
    pub special_instructions: String,
    /// Items sorted by (title, language, format)
    pub items: Vec<SnapshotItem>,
}

impl OrderSnapshot {
    /// Capture the snapshot of an order in its session context
    pub fn capture(
        order: &MaterialsOrder,
        session: &TrainingSession,
        items: &[LineItem],
    ) -> Self {
        let mut snapshot_items: Vec<SnapshotItem> =
            items.iter().map(SnapshotItem::from_item).collect();
        snapshot_items.sort();

        Self {
            start_date: session.start_date,
            end_date: session.end_date,
            daily_start_time: session.daily_start_time,
            daily_end_time: session.daily_end_time,
            timezone: session.timezone.clone(),
            delivery_type: session.delivery_type,
            language: session.language.clone(),
            shipping: order.shipping.clone(),
            location: session.location.clone(),
            order_type: order.order_type,
            materials_format: order.materials_format,
            material_sets: order.material_sets,
            special_instructions: order.special_instructions.clone(),
            items: snapshot_items,
        }
    }

    /// Canonical serialized form: sorted keys, no incidental whitespace
    ///
    /// Round-tripping through `serde_json::Value` sorts object keys (the
    /// default map is BTreeMap-backed), which makes the byte form stable
    /// across struct field reordering.
    pub fn canonical_json(&self) -> String {
        let value = serde_json::to_value(self).expect("snapshot serialization cannot fail");
        value.to_string()
    }

    /// Lowercase-hex SHA-256 fingerprint of the canonical form
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_json().as_bytes());
        hex::encode(hasher.finalize())
    }
}
