//! Materials order header row
//!
//! One order per training session, created lazily on first access. The
//! `fingerprint` / `notified_at` pair tracks the last successfully notified
//! snapshot; both are `None` until the first successful send and are only
//! ever written together.

use super::types::{MaterialsFormat, OrderStatus, OrderType, ShippingAddress};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Materials order attached to a training session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialsOrder {
    /// Owning session ID (one non-deleted order per session)
    pub session_id: String,
    pub order_type: OrderType,
    /// Overall format; `None` until chosen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materials_format: Option<MaterialsFormat>,
    /// Number of material sets ordered (>= 0)
    pub material_sets: i32,
    /// Simulation credits ordered (>= 0)
    pub credits: i32,
    /// Selected simulation outline, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_id: Option<String>,
    #[serde(default)]
    pub shipping: ShippingAddress,
    #[serde(default)]
    pub special_instructions: String,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_date: Option<NaiveDate>,
    /// Fingerprint of the last successfully notified snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Timestamp of the last successful notification (millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified_at: Option<i64>,
    /// Set once, on the first successful finalize (millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<i64>,
    /// Set by the deliver operation, cleared by undeliver (millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MaterialsOrder {
    /// Create a fresh order for a session
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = crate::util::now_millis();
        Self {
            session_id: session_id.into(),
            order_type: OrderType::default(),
            materials_format: None,
            material_sets: 0,
            credits: 0,
            outline_id: None,
            shipping: ShippingAddress::default(),
            special_instructions: String::new(),
            status: OrderStatus::New,
            order_date: None,
            ship_date: None,
            arrival_date: None,
            fingerprint: None,
            notified_at: None,
            finalized_at: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once at least one notification has gone out
    pub fn has_been_notified(&self) -> bool {
        self.notified_at.is_some()
    }

    /// Deletion is forbidden while the order is marked delivered
    pub fn is_deletable(&self) -> bool {
        self.delivered_at.is_none()
    }

    /// Record a successful notification: fingerprint and timestamp move together
    pub fn record_notification(&mut self, fingerprint: String, at: i64) {
        self.fingerprint = Some(fingerprint);
        self.notified_at = Some(at);
    }
}
