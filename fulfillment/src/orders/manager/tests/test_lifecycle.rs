//! Finalize, shipping, delivery, and deletion lifecycle

use super::*;
use shared::order::OrderStatus;

fn processed_row(id: u64) -> RowEdit {
    RowEdit {
        id: Some(id),
        catalog_ref: None,
        quantity: 12,
        language: "en".to_string(),
        format: ItemFormat::Print,
        delete: false,
        processed: Some(true),
    }
}

/// Save one workbook row and return its item ID
fn seed_order(manager: &OrdersManager, session: &TrainingSession) -> u64 {
    let response = manager
        .handle(session, &operator(), save_request(vec![item_row("workbook:1", 12)]))
        .unwrap();
    assert_eq!(response.result, SaveResult::Ok);
    response.items[0].id
}

#[test]
fn test_save_with_unprocessed_items_is_in_progress() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-1");

    let response = manager
        .handle(&session, &operator(), save_request(vec![item_row("workbook:1", 12)]))
        .unwrap();

    assert_eq!(response.order.unwrap().status, OrderStatus::InProgress);
}

#[test]
fn test_all_items_processed_derives_processed_status() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-1");
    let item_id = seed_order(&manager, &session);

    let response = manager
        .handle(&session, &operator(), save_request(vec![processed_row(item_id)]))
        .unwrap();

    assert_eq!(response.order.unwrap().status, OrderStatus::Processed);
    let item = &response.items[0];
    assert!(item.processed);
    assert_eq!(item.processed_by.as_deref(), Some("Test Operator"));
}

#[test]
fn test_finalize_with_unprocessed_item_is_rejected() {
    let (manager, mailer) = create_test_manager();
    let session = session("S-1");
    seed_order(&manager, &session);
    let sent_before = mailer.sent_count();
    let before = manager.get_order("S-1").unwrap().unwrap();

    let request = SaveRequest {
        header: HeaderChanges::default(),
        rows: vec![],
        action: SaveAction::Finalize,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();

    assert_eq!(response.result, SaveResult::Forbidden);
    assert!(response.message.unwrap().contains("not yet processed"));

    // Status unchanged, nothing written, no email
    let after = manager.get_order("S-1").unwrap().unwrap();
    assert_eq!(before, after);
    assert_eq!(mailer.sent_count(), sent_before);
}

#[test]
fn test_failed_finalize_rolls_back_header_edits() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-1");
    seed_order(&manager, &session);

    let request = SaveRequest {
        header: HeaderChanges {
            special_instructions: Some("should not survive".to_string()),
            ..Default::default()
        },
        rows: vec![],
        action: SaveAction::Finalize,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();

    assert_eq!(response.result, SaveResult::Forbidden);
    let order = manager.get_order("S-1").unwrap().unwrap().0;
    assert!(order.special_instructions.is_empty());
}

#[test]
fn test_finalize_succeeds_when_all_processed() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-1");
    let item_id = seed_order(&manager, &session);

    let request = SaveRequest {
        header: HeaderChanges::default(),
        rows: vec![processed_row(item_id)],
        action: SaveAction::Finalize,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();

    assert_eq!(response.result, SaveResult::Ok);
    let order = response.order.unwrap();
    assert_eq!(order.status, OrderStatus::Finalized);
    assert_eq!(order.finalized_at, Some(operator().timestamp));
}

#[test]
fn test_finalize_timestamp_is_set_once() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-1");
    let item_id = seed_order(&manager, &session);

    let request = SaveRequest {
        header: HeaderChanges::default(),
        rows: vec![processed_row(item_id)],
        action: SaveAction::Finalize,
        reason_hint: None,
    };
    manager.handle(&session, &operator(), request.clone()).unwrap();
    let first = manager.get_order("S-1").unwrap().unwrap().0.finalized_at;

    let later = OperatorContext {
        operator_name: "Second Operator".to_string(),
        timestamp: operator().timestamp + 86_400_000,
    };
    manager.handle(&session, &later, request).unwrap();
    let second = manager.get_order("S-1").unwrap().unwrap().0.finalized_at;

    assert_eq!(first, second);
}

#[test]
fn test_finalize_payload_is_authoritative_for_processed() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-1");
    let item_id = seed_order(&manager, &session);

    // Mark processed via a plain save
    manager
        .handle(&session, &operator(), save_request(vec![processed_row(item_id)]))
        .unwrap();

    // Finalize with a row whose processed field is absent: reads as false
    let request = SaveRequest {
        header: HeaderChanges::default(),
        rows: vec![RowEdit {
            id: Some(item_id),
            catalog_ref: None,
            quantity: 12,
            language: "en".to_string(),
            format: ItemFormat::Print,
            delete: false,
            processed: None,
        }],
        action: SaveAction::Finalize,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request).unwrap();

    assert_eq!(response.result, SaveResult::Forbidden);
    // The whole transaction rolled back, so the item is still processed
    let (_, items) = manager.get_order("S-1").unwrap().unwrap();
    assert!(items[0].processed);
}

#[test]
fn test_mark_shipped_sets_ship_date_once() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-1");
    seed_order(&manager, &session);

    let request = SaveRequest {
        header: HeaderChanges::default(),
        rows: vec![],
        action: SaveAction::MarkShipped,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), request.clone()).unwrap();
    let order = response.order.unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    let first_date = order.ship_date;
    assert!(first_date.is_some());

    let later = OperatorContext {
        operator_name: "Test Operator".to_string(),
        timestamp: operator().timestamp + 7 * 86_400_000,
    };
    let response = manager.handle(&session, &later, request).unwrap();
    assert_eq!(response.order.unwrap().ship_date, first_date);
}

#[test]
fn test_deliver_and_undeliver_cycle() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-1");
    seed_order(&manager, &session);

    let deliver = SaveRequest {
        header: HeaderChanges::default(),
        rows: vec![],
        action: SaveAction::Deliver,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), deliver.clone()).unwrap();
    let order = response.order.unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert!(order.delivered_at.is_some());

    // Second deliver is a state conflict
    let response = manager.handle(&session, &operator(), deliver).unwrap();
    assert_eq!(response.result, SaveResult::Forbidden);

    let undeliver = SaveRequest {
        header: HeaderChanges::default(),
        rows: vec![],
        action: SaveAction::Undeliver,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), undeliver).unwrap();
    let order = response.order.unwrap();
    assert_eq!(order.status, OrderStatus::InProgress);
    assert!(order.delivered_at.is_none());
}

#[test]
fn test_delete_rejected_after_delivery() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-1");
    seed_order(&manager, &session);

    let deliver = SaveRequest {
        header: HeaderChanges::default(),
        rows: vec![],
        action: SaveAction::Deliver,
        reason_hint: None,
    };
    manager.handle(&session, &operator(), deliver).unwrap();

    let delete = SaveRequest {
        header: HeaderChanges::default(),
        rows: vec![],
        action: SaveAction::Delete,
        reason_hint: None,
    };
    let response = manager.handle(&session, &operator(), delete.clone()).unwrap();
    assert_eq!(response.result, SaveResult::Forbidden);
    assert!(manager.get_order("S-1").unwrap().is_some());

    // Undeliver clears the delivery stamp; deletion becomes possible again
    let undeliver = SaveRequest {
        header: HeaderChanges::default(),
        rows: vec![],
        action: SaveAction::Undeliver,
        reason_hint: None,
    };
    manager.handle(&session, &operator(), undeliver).unwrap();

    let response = manager.handle(&session, &operator(), delete).unwrap();
    assert_eq!(response.result, SaveResult::Ok);
    assert!(response.order.is_none());
    assert!(manager.get_order("S-1").unwrap().is_none());
}

#[test]
fn test_shipping_operations_require_an_existing_order() {
    let (manager, _mailer) = create_test_manager();
    let session = session("S-404");

    for action in [
        SaveAction::MarkShipped,
        SaveAction::Deliver,
        SaveAction::Undeliver,
        SaveAction::Delete,
    ] {
        let request = SaveRequest {
            header: HeaderChanges::default(),
            rows: vec![],
            action,
            reason_hint: None,
        };
        let response = manager.handle(&session, &operator(), request).unwrap();
        assert_eq!(response.result, SaveResult::NotFound);
    }
}
