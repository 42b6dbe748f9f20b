use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::PaystackConfig,
    data_objects::{
        ApiEnvelope,
        InitializeTransactionRequest,
        InitializeTransactionResponse,
        RefundData,
        RefundRequest,
        TransactionData,
    },
    PaystackApiError,
};

#[derive(Clone)]
pub struct PaystackApi {
    config: PaystackConfig,
    client: Arc<Client>,
}

impl PaystackApi {
    pub fn new(config: PaystackConfig) -> Result<Self, PaystackApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Sends a single REST call and unwraps the standard response envelope.
    ///
    /// Transport failures and 5xx responses map to [`PaystackApiError::Unavailable`] so that callers retry rather
    /// than treat the charge as failed. A 404 maps to [`PaystackApiError::NotFound`]; other 4xx responses map to
    /// [`PaystackApiError::Rejected`].
    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, PaystackApiError> {
        let url = self.url(path);
        trace!("💳️ Sending gateway request: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| PaystackApiError::Unavailable(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("💳️ Gateway request successful. {status}");
            let envelope =
                response.json::<ApiEnvelope<T>>().await.map_err(|e| PaystackApiError::JsonError(e.to_string()))?;
            if !envelope.status {
                return Err(PaystackApiError::ApiError(envelope.message));
            }
            envelope.data.ok_or_else(|| PaystackApiError::JsonError("response envelope carried no data".to_string()))
        } else {
            let message = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(PaystackApiError::NotFound(message)),
                s if s.is_server_error() => Err(PaystackApiError::Unavailable(format!("Error {}. {message}", s))),
                s => Err(PaystackApiError::Rejected { status: s.as_u16(), message }),
            }
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Initializes a hosted charge. The buyer completes payment on the returned authorization URL.
    pub async fn initialize_transaction(
        &self,
        request: InitializeTransactionRequest,
    ) -> Result<InitializeTransactionResponse, PaystackApiError> {
        debug!("💳️ Initializing transaction [{}] for {} {}", request.reference, request.amount, request.currency);
        let result = self
            .rest_query::<InitializeTransactionResponse, _>(Method::POST, "/transaction/initialize", Some(request))
            .await?;
        info!("💳️ Transaction [{}] initialized", result.reference);
        Ok(result)
    }

    /// Fetches the gateway's current view of a transaction. Read-only; safe to call any number of times.
    pub async fn verify_transaction(&self, reference: &str) -> Result<TransactionData, PaystackApiError> {
        let path = format!("/transaction/verify/{reference}");
        debug!("💳️ Verifying transaction [{reference}]");
        let result = self.rest_query::<TransactionData, ()>(Method::GET, &path, None).await?;
        debug!("💳️ Transaction [{reference}] reported as '{}'", result.status);
        Ok(result)
    }

    /// Requests a refund of the full transaction amount.
    pub async fn refund_transaction(&self, reference: &str, note: Option<String>) -> Result<(), PaystackApiError> {
        debug!("💳️ Requesting refund for transaction [{reference}]");
        let request = RefundRequest { transaction: reference.to_string(), merchant_note: note };
        let refund = self.rest_query::<RefundData, _>(Method::POST, "/refund", Some(request)).await?;
        info!("💳️ Refund #{} for [{reference}] accepted with status '{}'", refund.id, refund.status);
        Ok(())
    }
}
