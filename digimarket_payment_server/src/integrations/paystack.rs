//! Adapts the Paystack REST client to the engine's [`PaymentGateway`] trait.
//!
//! The engine never sees Paystack's wire format. Everything it needs is reduced to a [`GatewayVerdict`] here, and
//! the same reduction is applied to webhook payloads so both signal paths speak the same language.
use digimarket_payment_engine::traits::{
    GatewayError,
    GatewayVerdict,
    HostedCharge,
    InitializeCharge,
    PaymentGateway,
    VerdictStatus,
};
use dpg_common::Kobo;
use log::*;
use paystack_client::{
    data_objects::{InitializeTransactionRequest, TransactionData},
    PaystackApi,
    PaystackApiError,
    PaystackConfig,
};
use serde_json::Value;

use crate::errors::ServerError;

#[derive(Clone)]
pub struct PaystackGateway {
    api: PaystackApi,
}

impl PaystackGateway {
    pub fn new(config: PaystackConfig) -> Result<Self, ServerError> {
        let api = PaystackApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { api })
    }
}

impl PaymentGateway for PaystackGateway {
    async fn initialize_charge(&self, charge: InitializeCharge) -> Result<HostedCharge, GatewayError> {
        let request = InitializeTransactionRequest {
            amount: charge.amount.value(),
            email: charge.buyer_email,
            currency: charge.currency,
            reference: charge.reference,
            callback_url: None,
            metadata: charge.metadata,
        };
        let response = self.api.initialize_transaction(request).await.map_err(into_gateway_error)?;
        Ok(HostedCharge {
            authorization_url: response.authorization_url,
            access_code: response.access_code,
            reference: response.reference,
        })
    }

    async fn verify_by_reference(&self, reference: &str) -> Result<GatewayVerdict, GatewayError> {
        let tx = self.api.verify_transaction(reference).await.map_err(|e| match e {
            PaystackApiError::NotFound(_) => GatewayError::ReferenceNotFound(reference.to_string()),
            e => into_gateway_error(e),
        })?;
        Ok(verdict_from_transaction(&tx))
    }

    async fn refund(&self, reference: &str) -> Result<(), GatewayError> {
        self.api.refund_transaction(reference, None).await.map_err(into_gateway_error)
    }
}

fn into_gateway_error(e: PaystackApiError) -> GatewayError {
    match e {
        PaystackApiError::Initialization(m) => GatewayError::Unavailable(m),
        PaystackApiError::Unavailable(m) => GatewayError::Unavailable(m),
        PaystackApiError::JsonError(m) => GatewayError::Unavailable(format!("Unparseable gateway response: {m}")),
        PaystackApiError::NotFound(m) => GatewayError::ReferenceNotFound(m),
        PaystackApiError::Rejected { status, message } => GatewayError::Rejected(format!("HTTP {status}: {message}")),
        PaystackApiError::ApiError(m) => GatewayError::Rejected(m),
    }
}

/// Reduces the gateway's view of a transaction to a verdict. Anything that is not a definitive success or failure
/// counts as pending; the reconciler will simply look again later.
pub fn verdict_from_transaction(tx: &TransactionData) -> GatewayVerdict {
    let status = match tx.status.as_str() {
        "success" => VerdictStatus::Success,
        "failed" | "abandoned" | "reversed" => VerdictStatus::Failed,
        other => {
            trace!("💳️ Transaction [{}] is in flight with status '{other}'", tx.reference);
            VerdictStatus::Pending
        },
    };
    GatewayVerdict {
        status,
        amount: Kobo::from(tx.amount),
        currency: tx.currency.clone(),
        gateway_tx_id: Some(tx.id.to_string()),
        message: tx.gateway_response.clone(),
        raw: serde_json::to_value(tx).unwrap_or(Value::Null),
    }
}
