//! OrdersManager - save pipeline orchestration
//!
//! Every operation runs inside a single redb write transaction; validation
//! and state-conflict failures drop the transaction and leave no partial
//! writes behind.
//!
//! # Save Flow
//!
//! ```text
//! handle(session, operator, request)
//!     ├─ 1. Begin write transaction
//!     ├─ 2. Load order + items (order created lazily)
//!     ├─ 3. Apply header changes
//!     ├─ 4. Validate merged header state
//!     ├─ 5. Reconcile row edits (or seeded default rows)
//!     ├─ 6. Synchronize the simulation-credits line
//!     ├─ 7. Finalize check / status recompute
//!     ├─ 8. Allocate IDs, persist item deletions and upserts
//!     ├─ 9. Snapshot + fingerprint → notification decision → transport
//!     │     (fingerprint/notified_at persisted only on transport success)
//!     ├─ 10. Persist the order header
//!     └─ 11. Commit
//! ```

use crate::catalog::CatalogProvider;
use crate::config::Config;
use crate::notify::{Decision, MailTransport, RecipientDirectory, bucket_for, compose, decide};
use crate::orders::error::{OrderError, OrderResult, error_response};
use crate::orders::reconcile::{ReconcileContext, reconcile_rows};
use crate::orders::sim_credits::sync_credit_line;
use crate::orders::status;
use crate::orders::storage::{OrderStorage, StorageError, StorageResult};
use redb::WriteTransaction;
use shared::models::TrainingSession;
use shared::order::{
    FieldError, LineItem, MaterialsOrder, OperatorContext, OrderSnapshot, RowEdit, SaveAction,
    SaveRequest, SaveResponse,
};
use std::path::Path;
use std::sync::Arc;

/// Orchestrates materials-order operations
pub struct OrdersManager {
    storage: OrderStorage,
    catalog: Arc<dyn CatalogProvider>,
    recipients: RecipientDirectory,
    transport: Arc<dyn MailTransport>,
    /// Master switch from configuration; false suppresses every send
    notifications_enabled: bool,
}

impl OrdersManager {
    /// Create a manager with a database at the given path
    pub fn new(
        db_path: impl AsRef<Path>,
        catalog: Arc<dyn CatalogProvider>,
        recipients: RecipientDirectory,
        transport: Arc<dyn MailTransport>,
    ) -> StorageResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        Ok(Self {
            storage,
            catalog,
            recipients,
            transport,
            notifications_enabled: true,
        })
    }

    /// Create a manager from environment configuration
    ///
    /// Loads the recipient directory from `RECIPIENT_DIRECTORY` when set;
    /// an empty directory suppresses every notification (log only).
    pub fn from_config(
        config: &Config,
        catalog: Arc<dyn CatalogProvider>,
        transport: Arc<dyn MailTransport>,
    ) -> anyhow::Result<Self> {
        let recipients = match &config.recipient_directory {
            Some(path) => RecipientDirectory::load(path)?,
            None => {
                tracing::warn!("No recipient directory configured, notifications will be suppressed");
                RecipientDirectory::new()
            }
        };
        let mut manager = Self::new(config.db_path(), catalog, recipients, transport)?;
        manager.notifications_enabled = config.notifications_enabled;
        Ok(manager)
    }

    /// Create a manager with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(
        storage: OrderStorage,
        catalog: Arc<dyn CatalogProvider>,
        recipients: RecipientDirectory,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            storage,
            catalog,
            recipients,
            transport,
            notifications_enabled: true,
        }
    }

    /// Toggle the notification fan-out (configuration master switch)
    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.notifications_enabled = enabled;
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Execute one operation against a session's order
    ///
    /// Domain failures (validation, state conflicts, missing order) are
    /// folded into the response; only storage failures surface as `Err`.
    pub fn handle(
        &self,
        session: &TrainingSession,
        operator: &OperatorContext,
        request: SaveRequest,
    ) -> Result<SaveResponse, StorageError> {
        tracing::debug!(
            session_id = %session.id,
            action = ?request.action,
            rows = request.rows.len(),
            "Processing materials order operation"
        );

        let result = match request.action {
            SaveAction::Save | SaveAction::Finalize | SaveAction::ApplyDefaults => {
                self.process_save(session, operator, &request)
            }
            SaveAction::MarkShipped | SaveAction::Deliver | SaveAction::Undeliver => {
                self.process_shipping(session, operator, request.action)
            }
            SaveAction::Delete => self.process_delete(session, operator),
        };

        match result {
            Ok(response) => Ok(response),
            Err(err) => {
                tracing::info!(session_id = %session.id, error = %err, "Operation rejected");
                error_response(err)
            }
        }
    }

    // ========== Save / Finalize / Apply Defaults ==========

    fn process_save(
        &self,
        session: &TrainingSession,
        operator: &OperatorContext,
        request: &SaveRequest,
    ) -> OrderResult<SaveResponse> {
        // 1. Begin write transaction
        let txn = self.storage.begin_write()?;

        // 2. Load order and items; the order is created lazily
        let mut order = match self.storage.get_order_txn(&txn, &session.id)? {
            Some(order) => order,
            None => {
                tracing::info!(session_id = %session.id, "Creating materials order on first access");
                MaterialsOrder::new(&session.id)
            }
        };
        let mut items = self.storage.get_items_txn(&txn, &session.id)?;

        // 3. Apply header changes
        let header_changed = request.header.apply(&mut order);

        // 4. Validate the merged header state; dropping the transaction
        //    rolls back everything, including the header edits above
        let errors = self.validate_header(&order, session);
        if !errors.is_empty() {
            return Ok(SaveResponse::validation_failure(errors));
        }

        // 5. Reconcile row edits (apply-defaults seeds its own batch)
        let rows: Vec<RowEdit> = match request.action {
            SaveAction::ApplyDefaults => self.default_rows(session),
            _ => request.rows.clone(),
        };
        let recon_ctx = ReconcileContext {
            catalog: self.catalog.as_ref(),
            session_id: &session.id,
            material_sets: order.material_sets,
            session_capacity: session.capacity,
            processed_authoritative: request.action == SaveAction::Finalize,
            operator,
        };
        let recon = reconcile_rows(&mut items, &rows, &recon_ctx);

        // 6. Synchronize the simulation-credits line
        let credits = sync_credit_line(&mut items, &order, session, self.catalog.as_ref());

        // 7. Derive the status; finalize rejects outstanding items
        let data_changed = header_changed || recon.changed || credits.changed;
        if request.action == SaveAction::Finalize {
            status::finalize(&mut order, &items, operator.timestamp)?;
        } else {
            status::recompute(&mut order, &items, data_changed);
        }

        // 8. Persist item deletions and upserts, allocating IDs for new rows
        for id in recon.removed.iter().chain(credits.removed.iter()) {
            self.storage.delete_item(&txn, &session.id, *id)?;
        }
        for item in &mut items {
            if item.id == 0 {
                item.id = self.storage.next_item_id(&txn)?;
            }
            self.storage.store_item(&txn, item)?;
        }

        // 9. Snapshot, fingerprint, notification
        let notified = self.maybe_notify(&mut order, session, &items, request, operator);

        // 10. Persist the order header
        if data_changed {
            order.updated_at = operator.timestamp;
        }
        self.storage.store_order(&txn, &order)?;

        // 11. Commit
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            session_id = %session.id,
            action = ?request.action,
            status = ?order.status,
            items = items.len(),
            changed = data_changed,
            notified,
            "Materials order saved"
        );
        Ok(SaveResponse::ok(Some(order), items, notified))
    }

    /// Run the notification decision and, when it says send, the transport
    ///
    /// On transport success the order's fingerprint/notified_at pair is
    /// updated in place (persisted by the caller, same transaction). On
    /// failure nothing is recorded, so the next save retries.
    fn maybe_notify(
        &self,
        order: &mut MaterialsOrder,
        session: &TrainingSession,
        items: &[LineItem],
        request: &SaveRequest,
        operator: &OperatorContext,
    ) -> bool {
        let snapshot = OrderSnapshot::capture(order, session, items);
        let fingerprint = snapshot.fingerprint();

        let bucket = bucket_for(order, session);
        let recipients = self.recipients.resolve(&session.region, bucket);

        let decision = decide(
            Some(&*order),
            session.delivery_type,
            &fingerprint,
            &recipients,
            self.notifications_enabled,
            request.reason_hint,
        );

        let reason = match decision {
            Decision::Send(reason) => reason,
            Decision::Suppress(why) => {
                tracing::debug!(
                    session_id = %session.id,
                    reason = ?why,
                    %bucket,
                    "Notification suppressed"
                );
                return false;
            }
        };

        let region_label = self.catalog.region_label(&session.region);
        let message = compose(reason, order, session, items, &region_label);

        // The transport is the single blocking I/O seam of the pipeline
        let outcome = futures::executor::block_on(self.transport.send(
            &recipients,
            &message.subject,
            &message.text,
            &message.html,
        ));

        if outcome.ok {
            order.record_notification(fingerprint, operator.timestamp);
            tracing::info!(
                session_id = %session.id,
                reason = ?reason,
                %bucket,
                recipient_count = recipients.len(),
                "Materials order notification sent"
            );
            true
        } else {
            tracing::warn!(
                session_id = %session.id,
                detail = ?outcome.detail,
                "Notification transport failed; unchanged state will retry on the next save"
            );
            false
        }
    }

    /// Validate the merged header state against the session
    fn validate_header(&self, order: &MaterialsOrder, session: &TrainingSession) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if order.material_sets < 0 {
            errors.push(FieldError::new(
                "material_sets",
                "Material sets must be zero or greater",
            ));
        }
        if order.credits < 0 {
            errors.push(FieldError::new("credits", "Credits must be zero or greater"));
        }

        match &order.outline_id {
            Some(outline_id) => {
                if self.catalog.outline(outline_id).is_none() {
                    errors.push(FieldError::new("outline_id", "Unknown simulation outline"));
                }
            }
            None => {
                if session.workshop_type.simulation_based && order.credits > 0 {
                    errors.push(FieldError::new(
                        "outline_id",
                        "A simulation outline is required when ordering credits",
                    ));
                }
            }
        }

        errors
    }

    /// Build the seeded row batch for apply-defaults
    fn default_rows(&self, session: &TrainingSession) -> Vec<RowEdit> {
        let rules = self.catalog.default_rules(
            &session.workshop_type.slug,
            session.delivery_type,
            &session.region,
            &session.language,
        );
        tracing::debug!(
            session_id = %session.id,
            workshop_type = %session.workshop_type.slug,
            rule_count = rules.len(),
            "Seeding default rows"
        );
        rules
            .into_iter()
            .map(|rule| RowEdit {
                id: None,
                catalog_ref: Some(rule.catalog_ref),
                // 0 resolves to the option's default quantity
                quantity: 0,
                language: rule.language,
                format: rule.format,
                delete: false,
                processed: None,
            })
            .collect()
    }

    // ========== Shipping Operations ==========

    fn process_shipping(
        &self,
        session: &TrainingSession,
        operator: &OperatorContext,
        action: SaveAction,
    ) -> OrderResult<SaveResponse> {
        let txn = self.storage.begin_write()?;
        let mut order = self.require_order(&txn, &session.id)?;

        match action {
            SaveAction::MarkShipped => {
                let today = chrono::DateTime::from_timestamp_millis(operator.timestamp)
                    .map(|dt| dt.date_naive())
                    .unwrap_or_else(|| chrono::Utc::now().date_naive());
                status::mark_shipped(&mut order, today);
            }
            SaveAction::Deliver => status::deliver(&mut order, operator.timestamp)?,
            SaveAction::Undeliver => status::undeliver(&mut order),
            _ => unreachable!("process_shipping only handles shipping actions"),
        }

        order.updated_at = operator.timestamp;
        self.storage.store_order(&txn, &order)?;
        let items = self.storage.get_items_txn(&txn, &session.id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            session_id = %session.id,
            action = ?action,
            status = ?order.status,
            "Shipping state updated"
        );
        Ok(SaveResponse::ok(Some(order), items, false))
    }

    // ========== Delete ==========

    fn process_delete(
        &self,
        session: &TrainingSession,
        operator: &OperatorContext,
    ) -> OrderResult<SaveResponse> {
        let txn = self.storage.begin_write()?;
        let order = self.require_order(&txn, &session.id)?;

        status::ensure_deletable(&order)?;

        self.storage.delete_order(&txn, &session.id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            session_id = %session.id,
            operator = %operator.operator_name,
            "Materials order deleted"
        );
        Ok(SaveResponse::ok(None, Vec::new(), false))
    }

    fn require_order(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
    ) -> OrderResult<MaterialsOrder> {
        self.storage
            .get_order_txn(txn, session_id)?
            .ok_or_else(|| OrderError::NotFound(format!("No materials order for session {session_id}")))
    }

    // ========== Public Query Methods ==========

    /// Get the order and items for a session, if an order exists
    pub fn get_order(
        &self,
        session_id: &str,
    ) -> StorageResult<Option<(MaterialsOrder, Vec<LineItem>)>> {
        let Some(order) = self.storage.get_order(session_id)? else {
            return Ok(None);
        };
        let items = self.storage.get_items(session_id)?;
        Ok(Some((order, items)))
    }
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("notifications_enabled", &self.notifications_enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests;
