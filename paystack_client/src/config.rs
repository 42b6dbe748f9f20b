use std::time::Duration;

use dpg_common::Secret;
use log::*;

const DEFAULT_BASE_URL: &str = "https://api.paystack.co";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct PaystackConfig {
    /// Base URL of the gateway API. Overridable so tests can point at a local stub.
    pub base_url: String,
    /// The account's secret API key. Also the HMAC key for webhook signatures.
    pub secret_key: Secret<String>,
    /// Per-request timeout. A timed-out call is reported as `Unavailable`, never as a payment failure.
    pub timeout: Duration,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), secret_key: Secret::default(), timeout: DEFAULT_TIMEOUT }
    }
}

impl PaystackConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("DPG_PAYSTACK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let secret_key = Secret::new(std::env::var("DPG_PAYSTACK_SECRET_KEY").unwrap_or_else(|_| {
            warn!("DPG_PAYSTACK_SECRET_KEY is not set. Gateway calls will be rejected until it is configured.");
            String::default()
        }));
        let timeout = std::env::var("DPG_PAYSTACK_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { base_url, secret_key, timeout }
    }
}
