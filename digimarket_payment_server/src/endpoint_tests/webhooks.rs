use actix_web::{http::StatusCode, test::TestRequest, web::ServiceConfig};
use digimarket_payment_engine::traits::LedgerError;
use paystack_client::sign_payload;
use serde_json::json;

use super::helpers::{install, paid_order, pending_payment, send_request, successful_payment, TEST_PAYSTACK_SECRET};
use crate::{
    endpoint_tests::mocks::{MockGateway, MockLedgerDb},
    webhook_routes::PAYSTACK_SIGNATURE_HEADER,
};

fn charge_success_body() -> String {
    json!({
        "event": "charge.success",
        "data": {
            "id": 9001,
            "status": "success",
            "reference": "DIGI_1",
            "amount": 1_100_000,
            "currency": "NGN",
            "gateway_response": "Approved"
        }
    })
    .to_string()
}

fn signed_post(body: String) -> TestRequest {
    let signature = sign_payload(TEST_PAYSTACK_SECRET, body.as_bytes());
    TestRequest::post()
        .uri("/webhook/paystack")
        .insert_header((PAYSTACK_SIGNATURE_HEADER, signature))
        .set_payload(body)
}

#[actix_web::test]
async fn a_delivery_without_a_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/webhook/paystack").set_payload(charge_success_body());
    let (status, body) = send_request(req, "", configure_noop).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("The webhook signature is missing or does not match the payload."), "body was: {body}");
}

#[actix_web::test]
async fn a_delivery_with_a_forged_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/webhook/paystack")
        .insert_header((PAYSTACK_SIGNATURE_HEADER, "deadbeef"))
        .set_payload(charge_success_body());
    let (status, body) = send_request(req, "", configure_noop).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("The webhook signature is missing or does not match the payload."), "body was: {body}");
}

// The gateway has no expectations here. A signed delivery carries its own verdict, so a verify call
// would fail the test.
#[actix_web::test]
async fn a_signed_charge_success_settles_the_payment() {
    let _ = env_logger::try_init().ok();
    let req = signed_post(charge_success_body());
    let (status, body) = send_request(req, "", configure_settling_webhook).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""outcome":"Fulfilled""#), "body was: {body}");
}

#[actix_web::test]
async fn an_unknown_reference_is_acknowledged_but_flagged() {
    let _ = env_logger::try_init().ok();
    let req = signed_post(charge_success_body());
    let (status, body) = send_request(req, "", configure_empty_ledger).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":false"#), "body was: {body}");
    assert!(body.contains("Unknown payment reference [DIGI_1]"), "body was: {body}");
}

#[actix_web::test]
async fn non_charge_events_are_acknowledged_and_dropped() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "event": "transfer.success",
        "data": {
            "id": 555,
            "status": "success",
            "reference": "TRF_1",
            "amount": 50_000,
            "currency": "NGN"
        }
    })
    .to_string();
    let req = signed_post(body);
    let (status, body) = send_request(req, "", configure_noop).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Ignored event 'transfer.success'"), "body was: {body}");
}

// Only completed reconciliations are acknowledged with a 2xx. A storage failure must bubble out as a server
// error so Paystack redelivers the event once the database is back.
#[actix_web::test]
async fn a_storage_failure_is_not_acknowledged_so_the_gateway_redelivers() {
    let _ = env_logger::try_init().ok();
    let req = signed_post(charge_success_body());
    let (status, body) = send_request(req, "", configure_broken_ledger).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Storage error"), "body was: {body}");
}

#[actix_web::test]
async fn a_second_delivery_for_a_settled_payment_changes_nothing() {
    let _ = env_logger::try_init().ok();
    let req = signed_post(charge_success_body());
    let (status, body) = send_request(req, "", configure_already_settled).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""outcome":"AlreadyReconciled""#), "body was: {body}");
}

//--------------------------------------   Scenario configurations  --------------------------------------------

fn configure_noop(cfg: &mut ServiceConfig) {
    install(cfg, MockLedgerDb::new(), MockGateway::new());
}

fn configure_empty_ledger(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_payment_by_reference().returning(|_| Ok(None));
    install(cfg, db, MockGateway::new());
}

fn configure_settling_webhook(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_payment_by_reference().returning(|_| Ok(Some(pending_payment())));
    db.expect_settle_payment().returning(|_, _, _| Ok(Some(successful_payment())));
    db.expect_mark_order_paid().returning(|_| Ok(paid_order()));
    db.expect_fetch_order_items().returning(|_| Ok(vec![]));
    install(cfg, db, MockGateway::new());
}

fn configure_broken_ledger(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_payment_by_reference()
        .returning(|_| Err(LedgerError::DatabaseError("the connection pool is closed".to_string())));
    install(cfg, db, MockGateway::new());
}

fn configure_already_settled(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_payment_by_reference().returning(|_| Ok(Some(successful_payment())));
    db.expect_fetch_order_by_id().returning(|_| Ok(Some(paid_order())));
    install(cfg, db, MockGateway::new());
}
