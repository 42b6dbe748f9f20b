use actix_web::{http::StatusCode, test::TestRequest, web::ServiceConfig};
use chrono::{Duration, Utc};
use digimarket_payment_engine::{
    db_types::{Payment, PaymentStatusType},
    traits::{GatewayError, GatewayVerdict, HostedCharge, VerdictStatus},
};
use dpg_common::{Kobo, NGN_CURRENCY_CODE};
use serde_json::json;

use super::helpers::{
    install,
    issue_token,
    paid_order,
    pending_order,
    pending_payment,
    send_request,
    successful_payment,
};
use crate::endpoint_tests::mocks::{MockGateway, MockLedgerDb};

fn success_verdict() -> GatewayVerdict {
    GatewayVerdict {
        status: VerdictStatus::Success,
        amount: Kobo::from_naira(11_000),
        currency: NGN_CURRENCY_CODE.to_string(),
        gateway_tx_id: Some("9001".to_string()),
        message: Some("Approved".to_string()),
        raw: json!({"status": "success"}),
    }
}

#[actix_web::test]
async fn verify_without_a_token_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/payments/verify/DIGI_1");
    let (status, body) = send_request(req, "", configure_noop).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No access token was provided."), "body was: {body}");
}

#[actix_web::test]
async fn verify_with_a_garbled_token_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token("buyer-1", "buyer@example.com");
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let req = TestRequest::get().uri("/payments/verify/DIGI_1");
    let (status, body) = send_request(req, &token, configure_noop).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Access token is invalid."), "body was: {body}");
}

#[actix_web::test]
async fn verify_reconciles_and_reports_fulfillment() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-1", "buyer@example.com");
    let req = TestRequest::get().uri("/payments/verify/DIGI_1");
    let (status, body) = send_request(req, &token, configure_fulfilling_verify).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""outcome":"Fulfilled""#), "body was: {body}");
    assert!(body.contains(r#""payment_status":"Paid""#), "body was: {body}");
}

#[actix_web::test]
async fn verify_someone_elses_payment_is_forbidden() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-2", "other@example.com");
    let req = TestRequest::get().uri("/payments/verify/DIGI_1");
    let (status, body) = send_request(req, &token, configure_lookup_only).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("This payment belongs to another user"), "body was: {body}");
}

#[actix_web::test]
async fn verify_an_unknown_reference_is_not_found() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-1", "buyer@example.com");
    let req = TestRequest::get().uri("/payments/verify/DIGI_nope");
    let (status, body) = send_request(req, &token, configure_empty_ledger).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No payment with reference [DIGI_nope]"), "body was: {body}");
}

#[actix_web::test]
async fn verify_during_a_gateway_outage_is_a_retryable_error() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-1", "buyer@example.com");
    let req = TestRequest::get().uri("/payments/verify/DIGI_1");
    let (status, body) = send_request(req, &token, configure_gateway_outage).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("The payment gateway is unavailable"), "body was: {body}");
}

#[actix_web::test]
async fn paying_an_order_returns_the_checkout_url() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-1", "buyer@example.com");
    let req = TestRequest::post().uri("/orders/ORD-1001/pay");
    let (status, body) = send_request(req, &token, configure_initiate).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""authorization_url":"https://checkout.paystack.com/abc123""#), "body was: {body}");
}

// The gateway mock has no expectations. Re-initiation must hand back the stored checkout, not mint a second
// charge.
#[actix_web::test]
async fn paying_again_reuses_the_live_checkout() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-1", "buyer@example.com");
    let req = TestRequest::post().uri("/orders/ORD-1001/pay");
    let (status, body) = send_request(req, &token, configure_reinitiate).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""reference":"DIGI_1""#), "body was: {body}");
    assert!(body.contains(r#""authorization_url":"https://checkout.paystack.com/abc123""#), "body was: {body}");
}

#[actix_web::test]
async fn paying_someone_elses_order_is_forbidden() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-2", "other@example.com");
    let req = TestRequest::post().uri("/orders/ORD-1001/pay");
    let (status, body) = send_request(req, &token, configure_initiate).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("This order belongs to another user"), "body was: {body}");
}

#[actix_web::test]
async fn refunds_inside_the_window_succeed() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-1", "buyer@example.com");
    let req = TestRequest::post().uri("/payments/1/refund").set_json(json!({ "reason": "Changed my mind" }));
    let (status, body) = send_request(req, &token, configure_refund).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""status":"Cancelled""#), "body was: {body}");
    assert!(body.contains(r#""status":"Refunded""#), "body was: {body}");
}

#[actix_web::test]
async fn refunds_outside_the_window_are_refused() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-1", "buyer@example.com");
    let req = TestRequest::post().uri("/payments/1/refund").set_json(json!({}));
    let (status, body) = send_request(req, &token, configure_refund_expired).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("The refund window has expired."), "body was: {body}");
}

//--------------------------------------   Scenario configurations  --------------------------------------------

// For requests that are rejected before the reconciler is ever reached.
fn configure_noop(cfg: &mut ServiceConfig) {
    install(cfg, MockLedgerDb::new(), MockGateway::new());
}

fn configure_empty_ledger(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_payment_by_reference().returning(|_| Ok(None));
    install(cfg, db, MockGateway::new());
}

fn configure_lookup_only(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_payment_by_reference().returning(|_| Ok(Some(pending_payment())));
    install(cfg, db, MockGateway::new());
}

fn configure_fulfilling_verify(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_payment_by_reference().returning(|_| Ok(Some(pending_payment())));
    db.expect_settle_payment().returning(|_, _, _| Ok(Some(successful_payment())));
    db.expect_mark_order_paid().returning(|_| Ok(paid_order()));
    db.expect_fetch_order_items().returning(|_| Ok(vec![]));
    let mut gateway = MockGateway::new();
    gateway.expect_verify_by_reference().returning(|_| Ok(success_verdict()));
    install(cfg, db, gateway);
}

fn configure_gateway_outage(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_payment_by_reference().returning(|_| Ok(Some(pending_payment())));
    let mut gateway = MockGateway::new();
    gateway
        .expect_verify_by_reference()
        .returning(|_| Err(GatewayError::Unavailable("connect timeout".to_string())));
    install(cfg, db, gateway);
}

fn configure_initiate(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(pending_order())));
    db.expect_fetch_pending_payment_for_order().returning(|_| Ok(None));
    db.expect_insert_payment().returning(|p| {
        let payment = Payment {
            user_id: p.user_id,
            order_id: p.order_id,
            amount: p.amount,
            currency: p.currency,
            reference: p.reference,
            authorization_url: None,
            access_code: None,
            ..pending_payment()
        };
        Ok((payment, true))
    });
    db.expect_store_hosted_checkout().returning(|reference, url, code| {
        Ok(Payment {
            reference: reference.to_string(),
            authorization_url: Some(url.to_string()),
            access_code: Some(code.to_string()),
            ..pending_payment()
        })
    });
    let mut gateway = MockGateway::new();
    gateway.expect_initialize_charge().returning(|charge| {
        Ok(HostedCharge {
            authorization_url: "https://checkout.paystack.com/abc123".to_string(),
            access_code: "abc123".to_string(),
            reference: charge.reference,
        })
    });
    install(cfg, db, gateway);
}

fn configure_reinitiate(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(pending_order())));
    db.expect_fetch_pending_payment_for_order().returning(|_| Ok(Some(pending_payment())));
    install(cfg, db, MockGateway::new());
}

fn configure_refund(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_payment_by_id()
        .returning(|_| Ok(Some(Payment { updated_at: Utc::now() - Duration::days(2), ..successful_payment() })));
    db.expect_refund_payment()
        .returning(|_| Ok(Some(Payment { status: PaymentStatusType::Cancelled, ..successful_payment() })));
    db.expect_mark_order_refunded().returning(|_| {
        use digimarket_payment_engine::db_types::OrderStatusType;
        Ok(digimarket_payment_engine::db_types::Order { status: OrderStatusType::Refunded, ..paid_order() })
    });
    let mut gateway = MockGateway::new();
    gateway.expect_refund().returning(|_| Ok(()));
    install(cfg, db, gateway);
}

fn configure_refund_expired(cfg: &mut ServiceConfig) {
    let mut db = MockLedgerDb::new();
    db.expect_fetch_payment_by_id()
        .returning(|_| Ok(Some(Payment { updated_at: Utc::now() - Duration::days(30), ..successful_payment() })));
    install(cfg, db, MockGateway::new());
}
