use serde_json::Value;
use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewPayment, Order, OrderId, OrderItem, Payment, Product, SellerLedger},
    helpers::FeeSplit,
};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Could not complete database operation: {0}")]
    DatabaseError(String),
    #[error("No order with internal id {0} exists")]
    OrderIdNotFound(i64),
    #[error("No payment with reference [{0}] exists")]
    PaymentNotFound(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// The storage contract for the reconciliation engine.
///
/// Every state transition the engine performs is expressed here as a single conditional update that either claims
/// the transition or reports that someone else already has. Methods returning `Option` follow that convention:
/// `Some(row)` means this caller won the transition, `None` means the guard clause did not match (the row was
/// already past the expected state). The engine relies on the database's atomicity for these guards rather than
/// any in-process locking.
#[allow(async_fn_in_trait)]
pub trait LedgerDatabase {
    /// The database URL, redacted of credentials where applicable.
    fn url(&self) -> &str;

    /// Inserts a new order with its lines. Returns the stored order and `true` if it was inserted, or the existing
    /// order and `false` if an order with the same order id was already present.
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), LedgerError>;
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, LedgerError>;
    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, LedgerError>;
    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, LedgerError>;

    /// Inserts a new payment attempt. Returns the stored payment and `true` if it was inserted, or the existing
    /// payment and `false` if the reference was already taken.
    async fn insert_payment(&self, payment: NewPayment) -> Result<(Payment, bool), LedgerError>;
    async fn fetch_payment_by_reference(&self, reference: &str) -> Result<Option<Payment>, LedgerError>;
    async fn fetch_payment_by_id(&self, id: i64) -> Result<Option<Payment>, LedgerError>;
    /// The live (pending) payment attempt against an order, if one exists.
    async fn fetch_pending_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, LedgerError>;
    /// Records the hosted checkout the gateway issued for this reference, so re-initiation can hand the buyer
    /// the same checkout again.
    async fn store_hosted_checkout(
        &self,
        reference: &str,
        authorization_url: &str,
        access_code: &str,
    ) -> Result<Payment, LedgerError>;

    /// Marks a pending payment as successful. This is the claim step of reconciliation: exactly one caller per
    /// reference ever receives `Some`, no matter how many race on it.
    async fn settle_payment(
        &self,
        reference: &str,
        gateway_tx_id: Option<String>,
        raw_payload: &Value,
    ) -> Result<Option<Payment>, LedgerError>;
    /// Marks a pending payment as failed, recording the reason. `None` if the payment was already terminal.
    async fn fail_payment(&self, reference: &str, reason: &str) -> Result<Option<Payment>, LedgerError>;
    /// Marks a successful payment as cancelled following a refund. `None` if it was not in the successful state.
    async fn refund_payment(&self, reference: &str) -> Result<Option<Payment>, LedgerError>;

    async fn mark_order_paid(&self, id: i64) -> Result<Order, LedgerError>;
    async fn mark_order_payment_failed(&self, id: i64) -> Result<Order, LedgerError>;
    async fn mark_order_refunded(&self, id: i64) -> Result<Order, LedgerError>;
    /// Cancels an order that is still pending and unpaid, and moves any pending payment attempts against it to a
    /// terminal state in the same transaction, so a charge settling later loses the settle compare-and-set.
    /// `None` if the order was not cancellable.
    async fn cancel_order(&self, id: i64) -> Result<Option<Order>, LedgerError>;

    /// Credits one order line: flips the line's `credited` marker and increments the product counters and the
    /// seller ledger in the same transaction. Returns `false` without touching anything if the line was already
    /// credited.
    async fn credit_order_line(&self, item: &OrderItem, split: FeeSplit) -> Result<bool, LedgerError>;

    /// References of successful payments whose orders still have work outstanding: an unpaid order row or
    /// uncredited lines. Used by the recovery sweep at startup.
    async fn fetch_unfulfilled_paid_references(&self) -> Result<Vec<String>, LedgerError>;

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, LedgerError>;
    async fn fetch_seller_ledger(&self, seller_id: &str) -> Result<Option<SellerLedger>, LedgerError>;

    async fn close(&mut self) -> Result<(), LedgerError>;
}
