use dpg_common::Kobo;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway could not be reached, or answered with a server error. The charge's outcome is unknown and the
    /// caller must retry later rather than record a failure.
    #[error("The payment gateway is unavailable: {0}")]
    Unavailable(String),
    /// The gateway understood the request and refused it.
    #[error("The payment gateway rejected the request: {0}")]
    Rejected(String),
    /// The gateway has no record of the reference.
    #[error("The payment gateway has no transaction with reference [{0}]")]
    ReferenceNotFound(String),
}

/// The gateway's authoritative answer about a charge, reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerdictStatus {
    Success,
    Failed,
    Pending,
}

#[derive(Debug, Clone)]
pub struct GatewayVerdict {
    pub status: VerdictStatus,
    /// The amount the gateway actually captured, in minor units.
    pub amount: Kobo,
    pub currency: String,
    pub gateway_tx_id: Option<String>,
    pub message: Option<String>,
    /// The verbatim gateway payload the verdict was derived from. Persisted for audit.
    pub raw: Value,
}

#[derive(Debug, Clone)]
pub struct InitializeCharge {
    pub amount: Kobo,
    pub currency: String,
    pub reference: String,
    pub buyer_email: String,
    pub metadata: Option<Value>,
}

/// What the buyer needs in order to complete a freshly initialized charge.
#[derive(Debug, Clone)]
pub struct HostedCharge {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// The upstream payment processor, as seen by the reconciliation engine.
///
/// `verify_by_reference` is consulted whenever the caller has no signature-verified payload in hand, so a buyer
/// refreshing the verify endpoint always gets the gateway's current answer.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn initialize_charge(&self, charge: InitializeCharge) -> Result<HostedCharge, GatewayError>;
    async fn verify_by_reference(&self, reference: &str) -> Result<GatewayVerdict, GatewayError>;
    async fn refund(&self, reference: &str) -> Result<(), GatewayError>;
}
