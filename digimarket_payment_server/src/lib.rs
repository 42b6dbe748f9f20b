//! # Digital marketplace payment server
//!
//! The HTTP surface over the reconciliation engine. It exposes
//!
//! * `POST /webhook/paystack`. Signed gateway notifications. The primary settlement path.
//! * `GET  /payments/verify/{reference}`. Buyer-triggered verification after checkout redirects back.
//! * `POST /orders/{order_id}/pay`. Initiates a hosted charge for an order.
//! * `POST /payments/{id}/refund`. Buyer-initiated refunds, subject to the refund window.
//! * `GET  /health`. Liveness check.
//!
//! Both settlement paths feed the same reconciler in `digimarket_payment_engine`, so the ledger cannot diverge
//! depending on which signal arrives first.
pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
