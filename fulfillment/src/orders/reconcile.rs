//! Item reconciler
//!
//! Merges a posted batch of row edits against the persisted line items.
//! Batches are edit-only, not full replacements: items not referenced by any
//! row are left untouched, and row order is irrelevant.
//!
//! Processed-flag semantics: a row whose processed field was absent from the
//! payload must never silently clear a processed item. Under finalize the
//! payload is authoritative and an absent field reads as false.

use crate::catalog::CatalogProvider;
use shared::models::QuantityBasis;
use shared::order::{LineItem, OperatorContext, RowEdit};

/// Reconciliation inputs beyond the batch itself
pub struct ReconcileContext<'a> {
    pub catalog: &'a dyn CatalogProvider,
    /// Session ID stamped onto created rows
    pub session_id: &'a str,
    /// Header value used as the per-learner default quantity when set
    pub material_sets: i32,
    /// Session seat capacity, the fallback default quantity
    pub session_capacity: i32,
    /// Finalize action: processed is authoritative from the payload
    pub processed_authoritative: bool,
    pub operator: &'a OperatorContext,
}

impl ReconcileContext<'_> {
    /// Default quantity for a per-learner option
    fn default_quantity(&self) -> i32 {
        if self.material_sets > 0 {
            self.material_sets
        } else {
            self.session_capacity
        }
    }
}

/// What the reconciler did to the working set
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub changed: bool,
    /// IDs of persisted rows that were deleted
    pub removed: Vec<u64>,
}

/// Reconcile a batch of row edits against the working item set
///
/// Newly created items carry `id == 0` until the caller allocates storage
/// IDs. Returns which persisted rows were deleted and whether anything
/// changed at all.
pub fn reconcile_rows(
    items: &mut Vec<LineItem>,
    rows: &[RowEdit],
    ctx: &ReconcileContext,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    for row in rows {
        match row.id {
            Some(id) => apply_to_existing(items, id, row, ctx, &mut outcome),
            None => apply_new_row(items, row, ctx, &mut outcome),
        }
    }

    outcome
}

/// Apply a row that addresses a persisted item
fn apply_to_existing(
    items: &mut Vec<LineItem>,
    id: u64,
    row: &RowEdit,
    ctx: &ReconcileContext,
    outcome: &mut ReconcileOutcome,
) {
    let Some(pos) = items.iter().position(|i| i.id == id) else {
        tracing::debug!(item_id = id, "Row edit references unknown item, skipping");
        return;
    };

    // Delete flag or a non-positive resulting quantity removes the row
    if row.delete || row.quantity <= 0 {
        let removed = items.remove(pos);
        if removed.id != 0 {
            outcome.removed.push(removed.id);
        }
        outcome.changed = true;
        return;
    }

    let item = &mut items[pos];
    if item.quantity != row.quantity {
        item.quantity = row.quantity;
        outcome.changed = true;
    }
    if item.language != row.language {
        item.language = row.language.clone();
        outcome.changed = true;
    }
    if item.format != row.format {
        item.format = row.format;
        outcome.changed = true;
    }
    outcome.changed |= apply_processed(item, row, ctx);
}

/// Apply a row without an ID: insert, or merge into an identical row
fn apply_new_row(
    items: &mut Vec<LineItem>,
    row: &RowEdit,
    ctx: &ReconcileContext,
    outcome: &mut ReconcileOutcome,
) {
    if row.delete {
        return;
    }
    let Some(catalog_ref) = row.catalog_ref.as_deref().filter(|r| !r.is_empty()) else {
        return;
    };
    let Some(option) = ctx.catalog.option(catalog_ref) else {
        tracing::debug!(catalog_ref, "Unknown catalog reference in row edit, skipping");
        return;
    };

    let quantity = if row.quantity > 0 {
        row.quantity
    } else {
        // Zero-quantity rows cannot persist
        match option.quantity_basis {
            QuantityBasis::PerOrder => 1,
            QuantityBasis::PerLearner => ctx.default_quantity().max(1),
        }
    };

    // Merge instead of creating a duplicate of an identical row
    if let Some(existing) = items
        .iter_mut()
        .find(|i| i.matches_identity(catalog_ref, &row.language, row.format))
    {
        if existing.quantity != quantity {
            existing.quantity = quantity;
            outcome.changed = true;
        }
        outcome.changed |= apply_processed(existing, row, ctx);
        return;
    }

    let mut item = LineItem {
        id: 0,
        session_id: ctx.session_id.to_string(),
        catalog_ref: catalog_ref.to_string(),
        title: option.title,
        description: option.description,
        sku: option.sku,
        language: row.language.clone(),
        format: row.format,
        quantity,
        processed: false,
        processed_at: None,
        processed_by: None,
    };
    apply_processed(&mut item, row, ctx);
    items.push(item);
    outcome.changed = true;
}

/// Apply the row's processed flag under the presence rules
fn apply_processed(item: &mut LineItem, row: &RowEdit, ctx: &ReconcileContext) -> bool {
    let target = if ctx.processed_authoritative {
        row.processed.unwrap_or(false)
    } else {
        match row.processed {
            Some(value) => value,
            // Absent from the payload: leave the persisted value alone
            None => return false,
        }
    };
    item.set_processed(target, &ctx.operator.operator_name, ctx.operator.timestamp)
}
