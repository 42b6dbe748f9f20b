use thiserror::Error;

use crate::{
    db_types::OrderId,
    traits::{GatewayError, LedgerError},
};

#[derive(Debug, Clone, Error)]
pub enum ReconcilerError {
    /// The reference does not match any payment we initialized. Deliberately indistinguishable from a typo'd
    /// reference; a hostile webhook sender learns nothing from it.
    #[error("No payment with reference [{0}] is known to this server")]
    UnknownReference(String),
    #[error("Storage error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {0} is not payable in its current state")]
    OrderNotPayable(OrderId),
    #[error("Order {0} can no longer be cancelled")]
    OrderNotCancellable(OrderId),
    #[error("This order belongs to another user")]
    NotOrderOwner,
    #[error("No payment with id {0} exists")]
    PaymentNotFound(i64),
    #[error("This payment belongs to another user")]
    NotPaymentOwner,
    #[error("The refund window has expired. {elapsed_days} days have passed; refunds are allowed for {window_days}")]
    RefundWindowExpired { elapsed_days: i64, window_days: i64 },
    #[error("A refund is not possible: {0}")]
    RefundNotAllowed(String),
}
