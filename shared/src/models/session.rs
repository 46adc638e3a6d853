//! Training session model
//!
//! Sessions are owned by the scheduling system; the fulfillment engine only
//! reads them. A session carries the facts that feed the order snapshot
//! (scheduling, language, location) and the routing inputs (region,
//! delivery type, workshop type).

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Delivery type of a training session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DeliveryType {
    #[default]
    #[serde(rename = "In person")]
    InPerson,
    #[serde(rename = "Virtual")]
    Virtual,
    #[serde(rename = "Blended")]
    Blended,
    /// Workshop without a materials shipment; never notified
    #[serde(rename = "Workshop only")]
    WorkshopOnly,
}

/// Workshop type catalog entry
///
/// `simulation_based` gates the simulation-credits side-channel and the
/// Simulation routing bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkshopType {
    /// Stable slug, e.g. "negotiation-sim"
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub simulation_based: bool,
}

/// Workshop location block
///
/// Structured fields are optional; `label` is the single-field fallback used
/// when no structured address was captured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WorkshopLocation {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl WorkshopLocation {
    /// True when no structured field is populated
    pub fn is_unstructured(&self) -> bool {
        self.venue.is_none() && self.street.is_none() && self.city.is_none()
            && self.country.is_none()
    }
}

/// Training session (read-only input to every fulfillment operation)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingSession {
    pub id: String,
    pub title: String,
    pub workshop_type: WorkshopType,
    pub delivery_type: DeliveryType,
    /// Workshop language code, e.g. "en", "de"
    pub language: String,
    /// Region code used for processor routing, e.g. "EMEA"
    pub region: String,
    /// Seat capacity; used as the per-learner default quantity
    pub capacity: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_start_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_end_time: Option<NaiveTime>,
    /// IANA timezone name, e.g. "Europe/Madrid"
    pub timezone: String,
    #[serde(default)]
    pub location: WorkshopLocation,
}
