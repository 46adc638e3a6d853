//! Shipment status state machine
//!
//! The core progression `New → InProgress → Processed → Finalized` is
//! derived from edit activity and item completion on every save. The
//! remaining statuses (Ordered, Shipped, Delivered, OnHold, Cancelled) are
//! side-states entered through explicit operations; the derivation never
//! touches them.

use super::error::{OrderError, OrderResult};
use chrono::NaiveDate;
use shared::order::{LineItem, MaterialsOrder, OrderStatus};

/// Recompute the derived status after a save's edits
///
/// `data_changed` is true when the header or the item set changed in this
/// save. Returns true when the status moved.
pub fn recompute(order: &mut MaterialsOrder, items: &[LineItem], data_changed: bool) -> bool {
    if !order.status.is_core() {
        return false;
    }

    let before = order.status;

    // Any externally-visible edit reopens a resting order
    if data_changed && matches!(order.status, OrderStatus::New | OrderStatus::Processed) {
        order.status = OrderStatus::InProgress;
    }

    // Item completion drives Processed; an empty set counts as complete
    let all_processed = items.iter().all(|i| i.processed);
    if all_processed {
        order.status = OrderStatus::Processed;
    } else if order.status == OrderStatus::Processed {
        order.status = OrderStatus::InProgress;
    }

    order.status != before
}

/// Finalize the order; requires every item to be processed
///
/// Permanent: a finalized order never re-enters the derived progression.
/// The completion timestamp is set once, on the first finalize.
pub fn finalize(order: &mut MaterialsOrder, items: &[LineItem], at: i64) -> OrderResult<()> {
    let outstanding = items.iter().filter(|i| !i.processed).count();
    if outstanding > 0 {
        return Err(OrderError::StateConflict(format!(
            "Cannot finalize: {} item(s) not yet processed",
            outstanding
        )));
    }

    order.status = OrderStatus::Finalized;
    if order.finalized_at.is_none() {
        order.finalized_at = Some(at);
    }
    Ok(())
}

/// Mark the order shipped, stamping the ship date only when unset
pub fn mark_shipped(order: &mut MaterialsOrder, today: NaiveDate) -> bool {
    let mut changed = false;
    if order.ship_date.is_none() {
        order.ship_date = Some(today);
        changed = true;
    }
    if order.status != OrderStatus::Shipped {
        order.status = OrderStatus::Shipped;
        changed = true;
    }
    changed
}

/// Mark the order delivered; rejected when already delivered
pub fn deliver(order: &mut MaterialsOrder, at: i64) -> OrderResult<()> {
    if order.status == OrderStatus::Delivered {
        return Err(OrderError::StateConflict(
            "Order is already delivered".to_string(),
        ));
    }
    order.status = OrderStatus::Delivered;
    order.delivered_at = Some(at);
    Ok(())
}

/// Revert a delivery: always back to InProgress, delivery timestamp cleared
pub fn undeliver(order: &mut MaterialsOrder) {
    order.status = OrderStatus::InProgress;
    order.delivered_at = None;
}

/// Deletion is rejected once the order has been delivered
pub fn ensure_deletable(order: &MaterialsOrder) -> OrderResult<()> {
    if !order.is_deletable() {
        return Err(OrderError::StateConflict(
            "Cannot delete a delivered order".to_string(),
        ));
    }
    Ok(())
}
