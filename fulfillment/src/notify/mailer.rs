//! Notification composition and the mail transport seam
//!
//! The transport itself is an external collaborator (SMTP relay, API,
//! whatever); the engine only sees `send(recipients, subject, text, html)`
//! and a success flag. Transport failures are reported back, never panicked.

use async_trait::async_trait;
use shared::models::TrainingSession;
use shared::order::{LineItem, MaterialsOrder, NotifyReason};

/// Result of a transport send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub ok: bool,
    /// Transport-specific detail (message ID on success, error on failure)
    pub detail: Option<String>,
}

impl SendOutcome {
    pub fn success() -> Self {
        Self {
            ok: true,
            detail: None,
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            detail: Some(detail.into()),
        }
    }
}

/// Opaque mail transport
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        text: &str,
        html: &str,
    ) -> SendOutcome;
}

/// Transport that logs instead of sending
///
/// Used in development environments without a mail relay; every send
/// succeeds so notification state advances normally.
#[derive(Debug, Clone, Default)]
pub struct NoopTransport;

#[async_trait]
impl MailTransport for NoopTransport {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        _text: &str,
        _html: &str,
    ) -> SendOutcome {
        tracing::info!(
            recipient_count = recipients.len(),
            subject,
            "Mail transport disabled, dropping notification"
        );
        SendOutcome::success()
    }
}

/// A composed notification message
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Compose the operational notification for an order
pub fn compose(
    reason: NotifyReason,
    order: &MaterialsOrder,
    session: &TrainingSession,
    items: &[LineItem],
    region_label: &str,
) -> MailMessage {
    let verb = match reason {
        NotifyReason::Created => "created",
        NotifyReason::Updated => "updated",
    };
    let subject = format!(
        "Materials order {}: {} ({})",
        verb, session.title, region_label
    );

    let mut text = String::new();
    text.push_str(&format!("Materials order {} for session {}\n\n", verb, session.id));
    text.push_str(&format!("Workshop:   {}\n", session.title));
    text.push_str(&format!("Dates:      {} to {}\n", session.start_date, session.end_date));
    text.push_str(&format!("Region:     {}\n", region_label));
    text.push_str(&format!("Language:   {}\n", session.language));
    let location = &session.location;
    if location.is_unstructured() {
        if !location.label.is_empty() {
            text.push_str(&format!("Location:   {}\n", location.label));
        }
    } else {
        let parts: Vec<&str> = [&location.venue, &location.street, &location.city, &location.country]
            .into_iter()
            .flatten()
            .map(|s| s.as_str())
            .collect();
        text.push_str(&format!("Location:   {}\n", parts.join(", ")));
    }
    text.push_str(&format!("Order type: {:?}\n", order.order_type));
    text.push_str(&format!("Sets:       {}\n", order.material_sets));
    if order.credits > 0 {
        text.push_str(&format!("Credits:    {}\n", order.credits));
    }
    if !order.special_instructions.is_empty() {
        text.push_str(&format!("Instructions: {}\n", order.special_instructions));
    }
    if !order.shipping.contact_name.is_empty() {
        text.push_str(&format!(
            "\nShip to: {}, {}, {} {} {}\n",
            order.shipping.contact_name,
            order.shipping.street,
            order.shipping.postal_code,
            order.shipping.city,
            order.shipping.country,
        ));
    }
    text.push_str("\nItems:\n");
    if items.is_empty() {
        text.push_str("  (none)\n");
    }
    for item in items {
        text.push_str(&format!(
            "  {} x {} [{}] ({:?})\n",
            item.quantity, item.title, item.language, item.format
        ));
    }

    let mut rows = String::new();
    for item in items {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:?}</td></tr>",
            item.quantity, item.title, item.language, item.format
        ));
    }
    let html = format!(
        "<h2>Materials order {verb}</h2>\
         <p><b>{title}</b>, {start} to {end}, {region}</p>\
         <table><tr><th>Qty</th><th>Item</th><th>Language</th><th>Format</th></tr>{rows}</table>",
        verb = verb,
        title = session.title,
        start = session.start_date,
        end = session.end_date,
        region = region_label,
        rows = rows,
    );

    MailMessage {
        subject,
        text,
        html,
    }
}
