//! Save pipeline flows: lazy creation, reconciliation, idempotence,
//! validation rollback, apply-defaults

use super::*;

#[test]
fn test_first_save_creates_order_lazily() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-1");

    assert!(manager.get_order("S-1").unwrap().is_none());

    let response = manager
        .handle(&session, &operator(), save_request(vec![]))
        .unwrap();

    assert_eq!(response.result, SaveResult::Ok);
    assert!(response.order.is_some());
    assert!(manager.get_order("S-1").unwrap().is_some());
}

#[test]
fn test_save_inserts_items_from_rows() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-1");

    let response = manager
        .handle(
            &session,
            &operator(),
            save_request(vec![item_row("workbook:1", 12), item_row("facilitator:7", 1)]),
        )
        .unwrap();

    assert_eq!(response.result, SaveResult::Ok);
    assert_eq!(response.items.len(), 2);
    assert!(response.items.iter().all(|i| i.id > 0));

    let (_, items) = manager.get_order("S-1").unwrap().unwrap();
    assert_eq!(items.len(), 2);
    let workbook = items.iter().find(|i| i.catalog_ref == "workbook:1").unwrap();
    assert_eq!(workbook.title, "Participant Workbook");
    assert_eq!(workbook.quantity, 12);
}

#[test]
fn test_save_notifies_once_and_persists_fingerprint() {
    let (manager, mailer) = create_test_manager();
    let session = session("S-1");

    let response = manager
        .handle(&session, &operator(), save_request(vec![item_row("workbook:1", 12)]))
        .unwrap();

    assert!(response.notified);
    assert_eq!(mailer.sent_count(), 1);
    let mail = mailer.last().unwrap();
    assert_eq!(mail.recipients, vec!["ops@example.com"]);
    assert!(mail.subject.contains("created"));
    assert!(mail.subject.contains("Europe, Middle East & Africa"));
    assert!(mail.text.contains("12 x Participant Workbook"));

    let order = response.order.unwrap();
    assert!(order.fingerprint.is_some());
    assert!(order.notified_at.is_some());
}

#[test]
fn test_double_save_identical_input_is_idempotent() {
    let (manager, mailer) = create_test_manager();
    let session = session("S-1");
    let rows = vec![item_row("workbook:1", 12)];

    manager
        .handle(&session, &operator(), save_request(rows.clone()))
        .unwrap();
    let (order_1, items_1) = manager.get_order("S-1").unwrap().unwrap();

    let response = manager
        .handle(&session, &operator(), save_request(rows))
        .unwrap();
    let (order_2, items_2) = manager.get_order("S-1").unwrap().unwrap();

    // Identical persisted state, exactly one notification in total
    assert!(!response.notified);
    assert_eq!(order_1, order_2);
    assert_eq!(items_1, items_2);
    assert_eq!(mailer.sent_count(), 1);
}

#[test]
fn test_header_change_triggers_new_notification() {
    let (manager, mailer) = create_test_manager();
    let session = session("S-1");

    manager
        .handle(&session, &operator(), save_request(vec![item_row("workbook:1", 12)]))
        .unwrap();
    let fp_before = manager.get_order("S-1").unwrap().unwrap().0.fingerprint;

    // Unchanged snapshot: suppressed
    let response = manager
        .handle(&session, &operator(), save_request(vec![]))
        .unwrap();
    assert!(!response.notified);
    assert_eq!(mailer.sent_count(), 1);

    // Mutating special_instructions changes the snapshot
    let request = SaveRequest {
        header: HeaderChanges {
            special_instructions: Some("Deliver to loading dock".to_string()),
            ..Default::default()
        },
        rows: vec![],
        action: SaveAction::Save,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();

    assert!(response.notified);
    assert_eq!(mailer.sent_count(), 2);
    assert!(mailer.last().unwrap().subject.contains("updated"));
    let fp_after = manager.get_order("S-1").unwrap().unwrap().0.fingerprint;
    assert_ne!(fp_before, fp_after);
}

#[test]
fn test_validation_failure_rolls_back_header_edits() {
    let (manager, mailer) = create_test_manager();
    let session = session("S-1");

    manager
        .handle(&session, &operator(), save_request(vec![]))
        .unwrap();
    let before = manager.get_order("S-1").unwrap().unwrap();

    // Invalid credits alongside an otherwise fine edit
    let request = SaveRequest {
        header: HeaderChanges {
            credits: Some(-1),
            special_instructions: Some("should not survive".to_string()),
            ..Default::default()
        },
        rows: vec![item_row("workbook:1", 5)],
        action: SaveAction::Save,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();

    assert_eq!(response.result, SaveResult::ValidationFailed);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].field, "credits");

    // Nothing was written, nothing was sent beyond the initial save
    let after = manager.get_order("S-1").unwrap().unwrap();
    assert_eq!(before, after);
    assert_eq!(mailer.sent_count(), 1);
}

#[test]
fn test_unknown_outline_is_a_field_error() {
    let (manager, _mailer) = create_test_manager();
    let session = sim_session("S-1");

    let request = SaveRequest {
        header: HeaderChanges {
            outline_id: Some(Some("OL-404".to_string())),
            ..Default::default()
        },
        rows: vec![],
        action: SaveAction::Save,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();

    assert_eq!(response.result, SaveResult::ValidationFailed);
    assert_eq!(response.errors[0].field, "outline_id");
}

#[test]
fn test_credits_without_outline_is_a_field_error() {
    let (manager, _mailer) = create_test_manager();
    let session = sim_session("S-1");

    let request = SaveRequest {
        header: HeaderChanges {
            credits: Some(2),
            ..Default::default()
        },
        rows: vec![],
        action: SaveAction::Save,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();

    assert_eq!(response.result, SaveResult::ValidationFailed);
    assert_eq!(response.errors[0].field, "outline_id");
}

#[test]
fn test_transport_failure_is_retried_by_next_save() {
    let (manager, mailer) = create_test_manager();
    let session = session("S-1");

    mailer.set_failing(true);
    let response = manager
        .handle(&session, &operator(), save_request(vec![item_row("workbook:1", 12)]))
        .unwrap();

    // The save itself succeeds; notification state stays untouched
    assert_eq!(response.result, SaveResult::Ok);
    assert!(!response.notified);
    let order = manager.get_order("S-1").unwrap().unwrap().0;
    assert!(order.fingerprint.is_none());
    assert!(order.notified_at.is_none());

    // Next save with unchanged state retries with created semantics
    mailer.set_failing(false);
    let response = manager
        .handle(&session, &operator(), save_request(vec![]))
        .unwrap();

    assert!(response.notified);
    assert_eq!(mailer.sent_count(), 1);
    assert!(mailer.last().unwrap().subject.contains("created"));
    assert!(manager.get_order("S-1").unwrap().unwrap().0.fingerprint.is_some());
}

// ========================================================================
// Apply defaults
// ========================================================================

#[test]
fn test_apply_defaults_seeds_default_rows() {
    let (manager, _mailer) = create_test_manager();
    let session = sim_session("S-1");

    let request = SaveRequest {
        header: HeaderChanges {
            material_sets: Some(10),
            ..Default::default()
        },
        rows: vec![],
        action: SaveAction::ApplyDefaults,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();

    assert_eq!(response.result, SaveResult::Ok);
    let workbook = response
        .items
        .iter()
        .find(|i| i.catalog_ref == "workbook:1")
        .unwrap();
    // Seeded rows resolve the per-learner default quantity
    assert_eq!(workbook.quantity, 10);
}

#[test]
fn test_apply_defaults_credit_line_scenario() {
    let (manager, _mailer) = create_test_manager();
    let session = sim_session("S-1");

    // credits=2, outline 291104 → one credits line, qty 2, Digital
    let request = SaveRequest {
        header: HeaderChanges {
            credits: Some(2),
            outline_id: Some(Some("OL-1".to_string())),
            ..Default::default()
        },
        rows: vec![],
        action: SaveAction::ApplyDefaults,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();
    let credit_lines: Vec<_> = response
        .items
        .iter()
        .filter(|i| i.is_sim_credits())
        .collect();
    assert_eq!(credit_lines.len(), 1);
    assert_eq!(credit_lines[0].title, "SIM Credits (291104)");
    assert_eq!(credit_lines[0].quantity, 2);
    assert_eq!(credit_lines[0].format, shared::order::ItemFormat::Digital);
    let line_id = credit_lines[0].id;

    // Switch the outline and re-apply: same row, new title
    let request = SaveRequest {
        header: HeaderChanges {
            outline_id: Some(Some("OL-2".to_string())),
            ..Default::default()
        },
        rows: vec![],
        action: SaveAction::ApplyDefaults,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();
    let credit_lines: Vec<_> = response
        .items
        .iter()
        .filter(|i| i.is_sim_credits())
        .collect();
    assert_eq!(credit_lines.len(), 1);
    assert_eq!(credit_lines[0].title, "SIM Credits (291200)");
    assert_eq!(credit_lines[0].id, line_id);

    // Zero credits removes the line
    let request = SaveRequest {
        header: HeaderChanges {
            credits: Some(0),
            ..Default::default()
        },
        rows: vec![],
        action: SaveAction::ApplyDefaults,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();
    assert!(response.items.iter().all(|i| !i.is_sim_credits()));
}

#[test]
fn test_apply_defaults_twice_is_stable() {
    let (manager, _mailer) = create_test_manager();
    let session = sim_session("S-1");

    let request = SaveRequest {
        header: HeaderChanges {
            credits: Some(2),
            outline_id: Some(Some("OL-1".to_string())),
            material_sets: Some(10),
            ..Default::default()
        },
        rows: vec![],
        action: SaveAction::ApplyDefaults,
        reason_hint: None,
    };
    manager.handle(&session, &operator(), request).unwrap();
    let (_, items_1) = manager.get_order("S-1").unwrap().unwrap();

    let request = SaveRequest {
        header: HeaderChanges::default(),
        rows: vec![],
        action: SaveAction::ApplyDefaults,
        reason_hint: None,
    };
    manager.handle(&session, &operator(), request).unwrap();
    let (_, items_2) = manager.get_order("S-1").unwrap().unwrap();

    assert_eq!(items_1, items_2);
}
