use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Response body for a freshly initiated payment. The buyer completes the charge on the authorization URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitiated {
    pub reference: String,
    pub authorization_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundParams {
    #[serde(default)]
    pub reason: Option<String>,
}
