//! Paystack webhook endpoint.
//!
//! Paystack POSTs an event to `/webhook/paystack` whenever a charge changes state, signing the raw body with the
//! account's secret key. The signature is checked before anything is parsed. A verified event carries a trusted
//! verdict straight into the reconciler, so no follow-up verify call is made for webhook traffic.
//!
//! Response codes matter here. Paystack retries anything that is not a 2xx, so transient trouble (the gateway or
//! the database being down) returns 5xx to buy another attempt, while events we can never act on (unknown
//! references, event types we don't handle) are acknowledged with a 200 so the retries stop.
use actix_web::{web, HttpRequest, HttpResponse};
use digimarket_payment_engine::{
    traits::{LedgerDatabase, PaymentGateway},
    ReconcilerApi,
    ReconcilerError,
};
use log::*;
use paystack_client::{data_objects::WebhookEvent, verify_webhook_signature, PaystackConfig};

use crate::{
    data_objects::JsonResponse,
    errors::{AuthError, ServerError},
    integrations::paystack::verdict_from_transaction,
    route,
};

pub const PAYSTACK_SIGNATURE_HEADER: &str = "x-paystack-signature";

route!(paystack_webhook => Post "/webhook/paystack" impl LedgerDatabase, PaymentGateway);
pub async fn paystack_webhook<B, G>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ReconcilerApi<B, G>>,
    config: web::Data<PaystackConfig>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase,
    G: PaymentGateway,
{
    let signature = req
        .headers()
        .get(PAYSTACK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::InvalidWebhookSignature)?;
    if !verify_webhook_signature(config.secret_key.reveal(), &body, signature) {
        warn!("🪝️ Rejecting webhook delivery with an invalid signature");
        return Err(AuthError::InvalidWebhookSignature.into());
    }
    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ServerError::InvalidRequestBody(format!("Invalid webhook payload. {e}")))?;
    if !event.event.starts_with("charge.") {
        debug!("🪝️ Ignoring webhook event type '{}'", event.event);
        return Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Ignored event '{}'", event.event))));
    }
    let reference = event.data.reference.clone();
    info!("🪝️ Webhook event '{}' received for payment [{reference}]", event.event);
    let verdict = verdict_from_transaction(&event.data);
    match api.reconcile(&reference, Some(verdict)).await {
        Ok(result) => {
            info!("🪝️ Payment [{reference}] reconciled from webhook. Outcome: {:?}", result.outcome);
            Ok(HttpResponse::Ok().json(result))
        },
        // Paystack will keep retrying a non-2xx response forever for a reference we'll never know about, so
        // acknowledge it and move on.
        Err(ReconcilerError::UnknownReference(r)) => {
            warn!("🪝️ Webhook delivery for unknown payment reference [{r}]");
            Ok(HttpResponse::Ok().json(JsonResponse::failure(format!("Unknown payment reference [{r}]"))))
        },
        Err(e) => Err(e.into()),
    }
}
