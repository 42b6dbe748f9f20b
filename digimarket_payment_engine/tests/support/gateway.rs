//! A scriptable in-memory gateway for exercising the reconciler without any network I/O.
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
        Mutex,
    },
};

use digimarket_payment_engine::traits::{
    GatewayError,
    GatewayVerdict,
    HostedCharge,
    InitializeCharge,
    PaymentGateway,
    VerdictStatus,
};
use dpg_common::Kobo;
use serde_json::json;

#[derive(Clone, Default)]
pub struct FakeGateway {
    verdicts: Arc<Mutex<HashMap<String, GatewayVerdict>>>,
    unavailable: Arc<AtomicBool>,
    refunds: Arc<Mutex<Vec<String>>>,
    initializations: Arc<Mutex<Vec<String>>>,
}

impl FakeGateway {
    pub fn set_verdict(&self, reference: &str, verdict: GatewayVerdict) {
        self.verdicts.lock().unwrap().insert(reference.to_string(), verdict);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn refunded_references(&self) -> Vec<String> {
        self.refunds.lock().unwrap().clone()
    }

    /// Every reference a charge was initialized for, in call order.
    pub fn initialized_references(&self) -> Vec<String> {
        self.initializations.lock().unwrap().clone()
    }

    pub fn success(amount: Kobo) -> GatewayVerdict {
        GatewayVerdict {
            status: VerdictStatus::Success,
            amount,
            currency: "NGN".to_string(),
            gateway_tx_id: Some("9001".to_string()),
            message: None,
            raw: json!({"status": "success", "amount": amount.value()}),
        }
    }

    pub fn failed(amount: Kobo, message: &str) -> GatewayVerdict {
        GatewayVerdict {
            status: VerdictStatus::Failed,
            amount,
            currency: "NGN".to_string(),
            gateway_tx_id: Some("9001".to_string()),
            message: Some(message.to_string()),
            raw: json!({"status": "failed"}),
        }
    }

    pub fn pending(amount: Kobo) -> GatewayVerdict {
        GatewayVerdict {
            status: VerdictStatus::Pending,
            amount,
            currency: "NGN".to_string(),
            gateway_tx_id: None,
            message: None,
            raw: json!({"status": "pending"}),
        }
    }
}

impl PaymentGateway for FakeGateway {
    async fn initialize_charge(&self, charge: InitializeCharge) -> Result<HostedCharge, GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("the fake gateway is down".to_string()));
        }
        self.initializations.lock().unwrap().push(charge.reference.clone());
        Ok(HostedCharge {
            authorization_url: format!("https://checkout.test/{}", charge.reference),
            access_code: "ACCESS_test".to_string(),
            reference: charge.reference,
        })
    }

    async fn verify_by_reference(&self, reference: &str) -> Result<GatewayVerdict, GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("the fake gateway is down".to_string()));
        }
        self.verdicts
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| GatewayError::ReferenceNotFound(reference.to_string()))
    }

    async fn refund(&self, reference: &str) -> Result<(), GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("the fake gateway is down".to_string()));
        }
        self.refunds.lock().unwrap().push(reference.to_string());
        Ok(())
    }
}
