use actix_web::{middleware::Logger, web, App, HttpServer};
use digimarket_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    SqliteDatabase,
    ReconcilerApi,
};
use log::*;

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    integrations::paystack::PaystackGateway,
    routes::{health, PayOrderRoute, RefundPaymentRoute, VerifyPaymentRoute},
    webhook_routes::PaystackWebhookRoute,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(format!("Could not connect to the ledger database. {e}")))?;
    let gateway = PaystackGateway::new(config.paystack.clone())?;
    let handlers = EventHandlers::new(config.event_buffer_size, notification_hooks());
    let producers = handlers.producers();
    // Finish any fulfillment that a previous run settled but did not complete before starting to serve traffic.
    let api = ReconcilerApi::new(db.clone(), gateway.clone(), producers.clone())
        .with_split(config.fee_split)
        .with_refund_window(config.refund_window);
    match api.resume_fulfillment().await {
        Ok(0) => debug!("🚀️ No interrupted fulfillments to resume."),
        Ok(n) => info!("🚀️ Resumed fulfillment of {n} settled payments."),
        Err(e) => error!("🚀️ Could not resume interrupted fulfillments. {e}"),
    }
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: PaystackGateway,
    producers: EventProducers,
) -> Result<actix_web::dev::Server, ServerError> {
    let jwt_issuer = TokenIssuer::new(&config.auth);
    let paystack_config = config.paystack.clone();
    let fee_split = config.fee_split;
    let refund_window = config.refund_window;
    let srv = HttpServer::new(move || {
        let api = ReconcilerApi::new(db.clone(), gateway.clone(), producers.clone())
            .with_split(fee_split)
            .with_refund_window(refund_window);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("dps::access_log"))
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(jwt_issuer.clone()))
            .app_data(web::Data::new(paystack_config.clone()))
            .service(health)
            .service(VerifyPaymentRoute::<SqliteDatabase, PaystackGateway>::new())
            .service(PayOrderRoute::<SqliteDatabase, PaystackGateway>::new())
            .service(RefundPaymentRoute::<SqliteDatabase, PaystackGateway>::new())
            .service(PaystackWebhookRoute::<SqliteDatabase, PaystackGateway>::new())
    })
    .keep_alive(std::time::Duration::from_secs(600))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// The notification hooks wired into the event bus. These run on their own tasks, after the ledger has committed,
/// so a slow or crashing notifier can never hold up reconciliation.
fn notification_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_buyer_confirmation(|event| {
        Box::pin(async move {
            info!(
                "📧️ Sending purchase confirmation to buyer {} for order {} ({}).",
                event.order.buyer_id, event.order.order_id, event.payment.reference
            );
        })
    });
    hooks.on_seller_sale(|event| {
        Box::pin(async move {
            info!(
                "📧️ Notifying seller {} of {} sold item(s) on order {}. Earnings: {}.",
                event.seller_id,
                event.items.len(),
                event.order.order_id,
                event.earnings
            );
        })
    });
    hooks.on_payment_failed(|event| {
        Box::pin(async move {
            info!("📧️ Notifying buyer {} that payment [{}] failed. {}", event.payment.user_id, event.payment.reference, event.reason);
        })
    });
    hooks
}
