//! A thin client for a Paystack-style hosted payment gateway.
//!
//! The client covers the three calls the payment server needs (initialize a hosted charge, verify a transaction by
//! reference, and request a refund) plus the pure webhook signature check. It carries no business logic: callers
//! decide what a verdict means for their orders and ledgers.
mod api;
mod config;
mod error;
mod signature;

pub mod data_objects;

pub use api::PaystackApi;
pub use config::PaystackConfig;
pub use error::PaystackApiError;
pub use signature::{sign_payload, verify_webhook_signature};
