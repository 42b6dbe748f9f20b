//! The traits that must be implemented for any backend wishing to serve as a storage layer or a payment gateway
//! for the reconciliation engine.
//!
//! [`LedgerDatabase`] covers everything the engine persists: orders and their lines, payment attempts, and the
//! product and seller counters. The provided implementation is [`crate::SqliteDatabase`], but nothing in the
//! reconciliation logic depends on SQLite specifically.
//!
//! [`PaymentGateway`] is the trusted source of truth for a charge's outcome. The payment server adapts the
//! Paystack REST client to it; tests substitute a mock.

mod ledger_database;
mod payment_gateway;

pub use ledger_database::{LedgerDatabase, LedgerError};
pub use payment_gateway::{GatewayError, GatewayVerdict, HostedCharge, InitializeCharge, PaymentGateway, VerdictStatus};
