//! Save-operation boundary types
//!
//! The embedding application parses its own wire format (form posts, JSON,
//! whatever) into these structured records before calling the engine. Field
//! presence is explicit: an `Option` that is `None` means "not in the
//! payload", never "clear the value". Fields that can be cleared are
//! double-wrapped (`Option<Option<T>>`).

use super::header::MaterialsOrder;
use super::item::LineItem;
use super::types::{ItemFormat, MaterialsFormat, NotifyReason, OrderType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row edit from a posted batch
///
/// Rows with an `id` address an existing item; rows without one request an
/// insert (or a merge into an identical existing row). Batch order is
/// irrelevant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RowEdit {
    /// Existing item ID, when editing a persisted row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Catalog reference for new rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_ref: Option<String>,
    pub quantity: i32,
    pub language: String,
    pub format: ItemFormat,
    #[serde(default)]
    pub delete: bool,
    /// Processed flag; `None` means the field was absent from the payload
    /// and must not touch the persisted value (finalize excepted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<bool>,
}

/// Presence-wrapped header edits
///
/// `None` leaves the field untouched. Clearable fields are double-wrapped:
/// `Some(None)` clears, `Some(Some(v))` sets.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HeaderChanges {
    pub order_type: Option<OrderType>,
    pub materials_format: Option<Option<MaterialsFormat>>,
    pub material_sets: Option<i32>,
    pub credits: Option<i32>,
    pub outline_id: Option<Option<String>>,
    pub contact_name: Option<String>,
    pub organization: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub special_instructions: Option<String>,
    pub order_date: Option<Option<NaiveDate>>,
    pub arrival_date: Option<Option<NaiveDate>>,
}

impl HeaderChanges {
    /// Apply these changes to an order, returning true when anything changed
    pub fn apply(&self, order: &mut MaterialsOrder) -> bool {
        let mut changed = false;

        fn set<T: PartialEq>(target: &mut T, source: &Option<T>, changed: &mut bool)
        where
            T: Clone,
        {
            if let Some(value) = source
                && target != value
            {
                *target = value.clone();
                *changed = true;
            }
        }

        set(&mut order.order_type, &self.order_type, &mut changed);
        set(&mut order.materials_format, &self.materials_format, &mut changed);
        set(&mut order.material_sets, &self.material_sets, &mut changed);
        set(&mut order.credits, &self.credits, &mut changed);
        set(&mut order.outline_id, &self.outline_id, &mut changed);
        set(&mut order.shipping.contact_name, &self.contact_name, &mut changed);
        set(&mut order.shipping.organization, &self.organization, &mut changed);
        set(&mut order.shipping.street, &self.street, &mut changed);
        set(&mut order.shipping.city, &self.city, &mut changed);
        set(&mut order.shipping.postal_code, &self.postal_code, &mut changed);
        set(&mut order.shipping.country, &self.country, &mut changed);
        set(&mut order.shipping.phone, &self.phone, &mut changed);
        set(&mut order.shipping.email, &self.email, &mut changed);
        set(
            &mut order.special_instructions,
            &self.special_instructions,
            &mut changed,
        );
        set(&mut order.order_date, &self.order_date, &mut changed);
        set(&mut order.arrival_date, &self.arrival_date, &mut changed);

        changed
    }
}

/// Requested operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    Save,
    Finalize,
    ApplyDefaults,
    MarkShipped,
    Deliver,
    Undeliver,
    Delete,
}

/// One save operation against a session's order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub header: HeaderChanges,
    #[serde(default)]
    pub rows: Vec<RowEdit>,
    pub action: SaveAction,
    /// Caller's notification reason hint; normalized by the engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_hint: Option<NotifyReason>,
}

impl SaveRequest {
    /// A plain save with no edits (e.g. to trigger a notification retry)
    pub fn noop_save() -> Self {
        Self {
            header: HeaderChanges::default(),
            rows: Vec::new(),
            action: SaveAction::Save,
            reason_hint: None,
        }
    }
}

/// Operator identity stamped onto processed transitions and logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorContext {
    pub operator_name: String,
    pub timestamp: i64,
}

impl OperatorContext {
    pub fn new(operator_name: impl Into<String>) -> Self {
        Self {
            operator_name: operator_name.into(),
            timestamp: crate::util::now_millis(),
        }
    }
}

/// Field-level validation error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result code of a save operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveResult {
    Ok,
    ValidationFailed,
    Forbidden,
    NotFound,
}

/// Response of a save operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub result: SaveResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<MaterialsOrder>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Whether this operation sent a notification
    #[serde(default)]
    pub notified: bool,
}

impl SaveResponse {
    /// Successful operation
    pub fn ok(order: Option<MaterialsOrder>, items: Vec<LineItem>, notified: bool) -> Self {
        Self {
            result: SaveResult::Ok,
            order,
            items,
            errors: Vec::new(),
            message: None,
            notified,
        }
    }

    /// Validation failure; state unchanged
    pub fn validation_failure(errors: Vec<FieldError>) -> Self {
        Self {
            result: SaveResult::ValidationFailed,
            order: None,
            items: Vec::new(),
            errors,
            message: None,
            notified: false,
        }
    }

    /// State-conflict rejection; state unchanged
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            result: SaveResult::Forbidden,
            order: None,
            items: Vec::new(),
            errors: Vec::new(),
            message: Some(message.into()),
            notified: false,
        }
    }

    /// Target order does not exist
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            result: SaveResult::NotFound,
            order: None,
            items: Vec::new(),
            errors: Vec::new(),
            message: Some(message.into()),
            notified: false,
        }
    }
}
