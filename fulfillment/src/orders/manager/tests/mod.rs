use super::*;
use crate::catalog::StaticCatalog;
use crate::notify::SendOutcome;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{
    CatalogOption, DefaultRule, DeliveryType, ProcessorAssignment, QuantityBasis,
    SimulationOutline, WorkshopLocation, WorkshopType,
};
use shared::order::{HeaderChanges, ItemFormat, SaveResult};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

mod test_flows;
mod test_lifecycle;

// ========================================================================
// Helper: recording mail transport
// ========================================================================

#[derive(Debug, Clone)]
pub struct SentMail {
    pub recipients: Vec<String>,
    pub subject: String,
    pub text: String,
}

/// Transport stub that records every send and can be told to fail
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn last(&self) -> Option<SentMail> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        text: &str,
        _html: &str,
    ) -> SendOutcome {
        if self.fail.load(Ordering::SeqCst) {
            return SendOutcome::failure("relay unavailable");
        }
        self.sent.lock().unwrap().push(SentMail {
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            text: text.to_string(),
        });
        SendOutcome::success()
    }
}

// ========================================================================
// Helper: fixtures
// ========================================================================

fn test_catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_option(CatalogOption {
            id: "workbook:1".to_string(),
            title: "Participant Workbook".to_string(),
            description: "Printed participant workbook".to_string(),
            sku: "WB-1".to_string(),
            quantity_basis: QuantityBasis::PerLearner,
            order_type: None,
        })
        .with_option(CatalogOption {
            id: "facilitator:7".to_string(),
            title: "Facilitator Guide".to_string(),
            description: String::new(),
            sku: "FG-7".to_string(),
            quantity_basis: QuantityBasis::PerOrder,
            order_type: None,
        })
        .with_outline(SimulationOutline {
            id: "OL-1".to_string(),
            number: "291104".to_string(),
            label: "Market entry".to_string(),
        })
        .with_outline(SimulationOutline {
            id: "OL-2".to_string(),
            number: "291200".to_string(),
            label: "Turnaround".to_string(),
        })
        .with_default_rule(DefaultRule {
            workshop_type: "strategy-sim".to_string(),
            delivery_type: DeliveryType::InPerson,
            region: "EMEA".to_string(),
            language: "en".to_string(),
            catalog_ref: "workbook:1".to_string(),
            format: ItemFormat::Print,
        })
        .with_region_label("EMEA", "Europe, Middle East & Africa")
}

fn test_directory() -> RecipientDirectory {
    RecipientDirectory::from_assignments([ProcessorAssignment {
        region: "Other".to_string(),
        bucket: "Other".to_string(),
        emails: vec!["ops@example.com".to_string()],
    }])
}

fn create_test_manager() -> (OrdersManager, Arc<RecordingMailer>) {
    let storage = OrderStorage::open_in_memory().unwrap();
    let mailer = RecordingMailer::new();
    let manager = OrdersManager::with_storage(
        storage,
        Arc::new(test_catalog()),
        test_directory(),
        mailer.clone(),
    );
    (manager, mailer)
}

fn session(id: &str) -> TrainingSession {
    TrainingSession {
        id: id.to_string(),
        title: "Leading Teams".to_string(),
        workshop_type: WorkshopType {
            slug: "leading-teams".to_string(),
            name: "Leading Teams".to_string(),
            simulation_based: false,
        },
        delivery_type: DeliveryType::InPerson,
        language: "en".to_string(),
        region: "EMEA".to_string(),
        capacity: 16,
        start_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
        daily_start_time: None,
        daily_end_time: None,
        timezone: "Europe/Madrid".to_string(),
        location: WorkshopLocation {
            label: "Madrid office".to_string(),
            ..Default::default()
        },
    }
}

fn sim_session(id: &str) -> TrainingSession {
    let mut session = session(id);
    session.title = "Strategy Simulation".to_string();
    session.workshop_type = WorkshopType {
        slug: "strategy-sim".to_string(),
        name: "Strategy Simulation".to_string(),
        simulation_based: true,
    };
    session
}

fn operator() -> OperatorContext {
    OperatorContext {
        operator_name: "Test Operator".to_string(),
        timestamp: 1_750_000_000_000,
    }
}

fn save_request(rows: Vec<RowEdit>) -> SaveRequest {
    SaveRequest {
        header: HeaderChanges::default(),
        rows,
        action: SaveAction::Save,
        reason_hint: None,
    }
}

fn item_row(catalog_ref: &str, quantity: i32) -> RowEdit {
    RowEdit {
        id: None,
        catalog_ref: Some(catalog_ref.to_string()),
        quantity,
        language: "en".to_string(),
        format: ItemFormat::Print,
        delete: false,
        processed: None,
    }
}
