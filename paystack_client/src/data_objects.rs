use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every gateway response wraps its payload in the same envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: bool,
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitializeTransactionRequest {
    /// Charge amount in the currency's minor unit (kobo for NGN).
    pub amount: i64,
    pub email: String,
    pub currency: String,
    /// Client-generated unique reference. The gateway echoes it back on every event for this charge.
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializeTransactionResponse {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// The gateway's view of a transaction, as returned by the verify call and embedded in webhook events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    pub id: u64,
    /// One of `success`, `failed`, `abandoned`, `pending`, `ongoing` and a few other in-flight states.
    pub status: String,
    pub reference: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub gateway_response: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
}

/// A webhook delivery. Only `charge.success` and `charge.failed` are of interest to the payment server;
/// everything else is acknowledged and dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: TransactionData,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundRequest {
    /// Transaction reference (or gateway transaction id) to refund.
    pub transaction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundData {
    pub id: u64,
    pub status: String,
}
