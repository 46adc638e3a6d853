//! Materials catalog models
//!
//! Catalog options, simulation outlines, and per-workshop-type default rules
//! are owned by the catalog system and consumed read-only.

use crate::order::types::{ItemFormat, OrderType};
use crate::models::session::DeliveryType;
use serde::{Deserialize, Serialize};

/// How a catalog option's default quantity scales
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum QuantityBasis {
    /// One unit per enrolled learner
    #[default]
    #[serde(rename = "Per learner")]
    PerLearner,
    /// Fixed quantity per order
    #[serde(rename = "Per order")]
    PerOrder,
}

/// Reusable materials option from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogOption {
    /// Catalog reference, `"<kind>:<id>"`
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub quantity_basis: QuantityBasis,
    /// Order type this option is scoped to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
}

/// Simulation outline (scenario package) selectable on an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationOutline {
    pub id: String,
    /// Outline number rendered into the credits line title
    pub number: String,
    pub label: String,
}

/// Default line-item rule for a workshop type
///
/// Matched on (delivery_type, region, language); applied only when the
/// caller runs the apply-defaults action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefaultRule {
    pub workshop_type: String,
    pub delivery_type: DeliveryType,
    pub region: String,
    pub language: String,
    pub catalog_ref: String,
    pub format: ItemFormat,
}
