//! Simulation-credits synchronizer
//!
//! Simulation-based workshops carry exactly one synthetic line item
//! representing the purchased simulation credits, titled after the selected
//! outline. The synchronizer keeps that line consistent with the header:
//! it adopts legacy-titled rows, collapses duplicates, retitles on outline
//! changes, and removes the line when no outline is selected or credits
//! drop to zero.

use crate::catalog::CatalogProvider;
use shared::models::TrainingSession;
use shared::order::{ItemFormat, LineItem, MaterialsOrder, SIM_CREDITS_REF};

/// Historical titles of the credits line, still adopted on older orders
const LEGACY_TITLES: [&str; 2] = ["Simulation Credits", "Sim Credits"];

/// What the synchronizer did
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CreditSyncOutcome {
    /// Number of rows created (0 or 1)
    pub rows_created: u32,
    pub changed: bool,
    /// IDs of persisted rows that were deleted
    pub removed: Vec<u64>,
}

/// Synchronize the synthetic credits line with the order header
///
/// No-op for workshop types that are not simulation based. Newly created
/// rows carry `id == 0` until the caller allocates a storage ID.
pub fn sync_credit_line(
    items: &mut Vec<LineItem>,
    order: &MaterialsOrder,
    session: &TrainingSession,
    catalog: &dyn CatalogProvider,
) -> CreditSyncOutcome {
    let mut outcome = CreditSyncOutcome::default();

    if !session.workshop_type.simulation_based {
        return outcome;
    }

    let desired_title = order
        .outline_id
        .as_deref()
        .and_then(|id| catalog.outline(id))
        .map(|outline| format!("SIM Credits ({})", outline.number));

    // Collect candidate rows: the sentinel, the desired title, legacy titles
    let mut candidates: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            item.is_sim_credits()
                || Some(item.title.as_str()) == desired_title.as_deref()
                || LEGACY_TITLES.contains(&item.title.as_str())
        })
        .map(|(pos, _)| pos)
        .collect();

    // Keep the first candidate, delete the rest
    let kept = if candidates.is_empty() {
        None
    } else {
        Some(candidates.remove(0))
    };
    for pos in candidates.into_iter().rev() {
        let removed = items.remove(pos);
        if removed.id != 0 {
            outcome.removed.push(removed.id);
        }
        outcome.changed = true;
    }

    // Nothing to represent: drop the kept row, if any
    let Some(desired_title) = desired_title.filter(|_| order.credits > 0) else {
        if let Some(pos) = kept {
            let removed = items.remove(pos);
            if removed.id != 0 {
                outcome.removed.push(removed.id);
            }
            outcome.changed = true;
        }
        return outcome;
    };

    let quantity = order.credits.max(0);
    match kept {
        Some(pos) => {
            let item = &mut items[pos];
            let mut touched = false;
            if item.catalog_ref != SIM_CREDITS_REF {
                item.catalog_ref = SIM_CREDITS_REF.to_string();
                touched = true;
            }
            if item.title != desired_title {
                item.title = desired_title;
                touched = true;
            }
            if item.language != "en" {
                item.language = "en".to_string();
                touched = true;
            }
            if item.format != ItemFormat::Digital {
                item.format = ItemFormat::Digital;
                touched = true;
            }
            if item.quantity != quantity {
                item.quantity = quantity;
                touched = true;
            }
            if !item.description.is_empty() || !item.sku.is_empty() {
                item.description.clear();
                item.sku.clear();
                touched = true;
            }
            // Credit changes always require re-processing
            if touched && item.processed {
                item.processed = false;
                item.processed_at = None;
                item.processed_by = None;
            }
            outcome.changed |= touched;
        }
        None => {
            items.push(LineItem {
                id: 0,
                session_id: order.session_id.clone(),
                catalog_ref: SIM_CREDITS_REF.to_string(),
                title: desired_title,
                description: String::new(),
                sku: String::new(),
                language: "en".to_string(),
                format: ItemFormat::Digital,
                quantity,
                processed: false,
                processed_at: None,
                processed_by: None,
            });
            outcome.rows_created = 1;
            outcome.changed = true;
        }
    }

    outcome
}
