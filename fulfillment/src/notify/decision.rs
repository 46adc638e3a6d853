//! Notification decision engine
//!
//! Decides whether a save should notify the processing team, guaranteeing at
//! most one send per distinct externally-visible snapshot. The caller's
//! reason hint is normalized from the order's notified state: what matters
//! is whether a notification has ever succeeded, not what the caller thinks
//! happened.

use shared::models::DeliveryType;
use shared::order::{MaterialsOrder, NotifyReason};

/// Outcome of the decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Send with the normalized reason
    Send(NotifyReason),
    Suppress(SuppressReason),
}

/// Why a notification was suppressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Notifications disabled by configuration
    Disabled,
    /// Snapshot unchanged since the last successful send
    Unchanged,
    /// Workshop-only sessions never notify
    WorkshopOnly,
    /// No order row exists
    NoOrder,
    /// The resolver returned zero addresses
    NoRecipients,
}

impl Decision {
    pub fn should_send(&self) -> bool {
        matches!(self, Self::Send(_))
    }
}

/// Decide whether to notify for the given snapshot fingerprint
///
/// `recipients` is the already-resolved list for the order's
/// (region, bucket); an empty list suppresses with a log-only outcome.
pub fn decide(
    order: Option<&MaterialsOrder>,
    delivery_type: DeliveryType,
    new_fingerprint: &str,
    recipients: &[String],
    enabled: bool,
    hint: Option<NotifyReason>,
) -> Decision {
    if !enabled {
        return Decision::Suppress(SuppressReason::Disabled);
    }

    let Some(order) = order else {
        return Decision::Suppress(SuppressReason::NoOrder);
    };

    // 1. Normalize the reason from persisted state; the hint never overrides
    let reason = if order.has_been_notified() {
        NotifyReason::Updated
    } else {
        NotifyReason::Created
    };
    if hint.is_some() && hint != Some(reason) {
        tracing::debug!(?hint, normalized = ?reason, "Notification reason hint overridden");
    }

    // 2. Updated with an unchanged fingerprint is a duplicate
    if reason == NotifyReason::Updated
        && let Some(previous) = &order.fingerprint
        && previous.as_str() == new_fingerprint
    {
        return Decision::Suppress(SuppressReason::Unchanged);
    }

    // 3. Workshop-only sessions have no materials processing step
    if delivery_type == DeliveryType::WorkshopOnly {
        return Decision::Suppress(SuppressReason::WorkshopOnly);
    }

    // 4. Nobody to notify
    if recipients.is_empty() {
        return Decision::Suppress(SuppressReason::NoRecipients);
    }

    Decision::Send(reason)
}
