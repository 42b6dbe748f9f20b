use dpg_common::Kobo;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderItem, Payment};

/// Fired once per order, after the payment has settled and every line has been credited. The buyer's purchase
/// confirmation (receipt, download links) hangs off this event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerConfirmationEvent {
    pub order: Order,
    pub payment: Payment,
}

impl BuyerConfirmationEvent {
    pub fn new(order: Order, payment: Payment) -> Self {
        Self { order, payment }
    }
}

/// Fired once per seller per fulfilled order, carrying only that seller's lines and net earnings from the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerSaleEvent {
    pub seller_id: String,
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// The seller's share of these lines after the platform fee.
    pub earnings: Kobo,
}

/// Fired when a payment reaches the failed state, whether the gateway declined it or the settled amount did not
/// match the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentFailedEvent {
    pub payment: Payment,
    pub reason: String,
}

impl PaymentFailedEvent {
    pub fn new(payment: Payment, reason: String) -> Self {
        Self { payment, reason }
    }
}
