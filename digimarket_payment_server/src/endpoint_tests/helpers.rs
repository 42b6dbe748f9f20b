use actix_web::{
    body::MessageBody,
    http::{header::AUTHORIZATION, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{Duration, TimeZone, Utc};
use digimarket_payment_engine::{
    db_types::{Order, OrderId, OrderPaymentStatus, OrderStatusType, Payment, PaymentStatusType},
    events::EventProducers,
    ReconcilerApi,
};
use dpg_common::{Kobo, Secret, NGN_CURRENCY_CODE};
use paystack_client::PaystackConfig;

use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::AuthConfig,
    endpoint_tests::mocks::{MockGateway, MockLedgerDb},
    routes::{PayOrderRoute, RefundPaymentRoute, VerifyPaymentRoute},
    webhook_routes::PaystackWebhookRoute,
};

// Test-only keys. DO NOT re-use these anywhere.
pub const TEST_JWT_SECRET: &str = "1b50c9a7e3f2d8064a5b9c1e7d3f20486a2c8e0b4d6f1a3c";
pub const TEST_PAYSTACK_SECRET: &str = "sk_test_36b1fd0e9a84c2577d13";

pub fn get_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new(TEST_JWT_SECRET.to_string()) }
}

pub fn get_paystack_config() -> PaystackConfig {
    PaystackConfig { secret_key: Secret::new(TEST_PAYSTACK_SECRET.to_string()), ..Default::default() }
}

pub fn issue_token(user_id: &str, email: &str) -> String {
    let issuer = TokenIssuer::new(&get_auth_config());
    let claims = JwtClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
    };
    issuer.issue_token(claims).expect("Failed to sign token")
}

pub async fn send_request(mut req: TestRequest, token: &str, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    if !token.is_empty() {
        req = req.insert_header((AUTHORIZATION, format!("Bearer {token}")));
    }
    let app = App::new()
        .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())))
        .app_data(web::Data::new(get_paystack_config()))
        .configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

/// Registers the mocked reconciler and every route under test on the app.
pub fn install(cfg: &mut ServiceConfig, db: MockLedgerDb, gateway: MockGateway) {
    let api = ReconcilerApi::new(db, gateway, EventProducers::default());
    cfg.app_data(web::Data::new(api))
        .service(VerifyPaymentRoute::<MockLedgerDb, MockGateway>::new())
        .service(PayOrderRoute::<MockLedgerDb, MockGateway>::new())
        .service(RefundPaymentRoute::<MockLedgerDb, MockGateway>::new())
        .service(PaystackWebhookRoute::<MockLedgerDb, MockGateway>::new());
}

//----------------------------------------------   Fixtures  ----------------------------------------------------

pub fn pending_payment() -> Payment {
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Payment {
        id: 1,
        user_id: "buyer-1".to_string(),
        order_id: 10,
        amount: Kobo::from_naira(11_000),
        currency: NGN_CURRENCY_CODE.to_string(),
        reference: "DIGI_1".to_string(),
        authorization_url: Some("https://checkout.paystack.com/abc123".to_string()),
        access_code: Some("abc123".to_string()),
        gateway_tx_id: None,
        status: PaymentStatusType::Pending,
        raw_payload: None,
        failure_reason: None,
        created_at: ts,
        updated_at: ts,
    }
}

pub fn successful_payment() -> Payment {
    Payment {
        status: PaymentStatusType::Successful,
        gateway_tx_id: Some("9001".to_string()),
        updated_at: Utc::now(),
        ..pending_payment()
    }
}

pub fn pending_order() -> Order {
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 11, 55, 0).unwrap();
    Order {
        id: 10,
        order_id: OrderId("ORD-1001".to_string()),
        buyer_id: "buyer-1".to_string(),
        subtotal: Kobo::from_naira(10_000),
        tax: Kobo::from_naira(1_000),
        total_price: Kobo::from_naira(11_000),
        status: OrderStatusType::Pending,
        payment_status: OrderPaymentStatus::Pending,
        paid_at: None,
        created_at: ts,
        updated_at: ts,
    }
}

pub fn paid_order() -> Order {
    Order {
        status: OrderStatusType::Completed,
        payment_status: OrderPaymentStatus::Paid,
        paid_at: Some(Utc::now()),
        ..pending_order()
    }
}
