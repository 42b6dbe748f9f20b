//! Row types and status enums shared between the storage layer and the reconciliation API.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use dpg_common::{Kobo, NGN_CURRENCY_CODE};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        -------------------------------------------------------
/// The human-readable order number, e.g. `DM-10000042`. Unique per order and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been created and is awaiting payment.
    Pending,
    /// Payment was confirmed and download rights were granted.
    Completed,
    /// The buyer cancelled the order before paying.
    Cancelled,
    /// The order was completed and subsequently refunded.
    Refunded,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Completed => write!(f, "Completed"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
            OrderStatusType::Refunded => write!(f, "Refunded"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            "Refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------  OrderPaymentStatus   -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderPaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl Display for OrderPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderPaymentStatus::Pending => write!(f, "Pending"),
            OrderPaymentStatus::Paid => write!(f, "Paid"),
            OrderPaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for OrderPaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid order payment status: {s}"))),
        }
    }
}

//--------------------------------------  PaymentStatusType    -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatusType {
    /// The charge has been initialized and the gateway has not settled it yet.
    Pending,
    /// The charge settled for the expected amount. Terminal for reconciliation.
    Successful,
    /// The charge failed, or settled for the wrong amount/currency. Terminal for reconciliation.
    Failed,
    /// A successful payment that was refunded through the gateway.
    Cancelled,
}

impl PaymentStatusType {
    /// Terminal for the reconciliation state machine. A terminal payment is never transitioned by `reconcile` again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatusType::Pending)
    }
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatusType::Pending => write!(f, "Pending"),
            PaymentStatusType::Successful => write!(f, "Successful"),
            PaymentStatusType::Failed => write!(f, "Failed"),
            PaymentStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for PaymentStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Successful" => Ok(Self::Successful),
            "Failed" => Ok(Self::Failed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub buyer_id: String,
    pub subtotal: Kobo,
    pub tax: Kobo,
    /// Always `subtotal + tax` at creation, immutable thereafter.
    pub total_price: Kobo,
    pub status: OrderStatusType,
    pub payment_status: OrderPaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_status == OrderPaymentStatus::Paid
    }
}

//--------------------------------------      OrderItem      ---------------------------------------------------------
/// One purchased line: a snapshot of the product at checkout time plus the per-line fulfillment marker.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    /// Internal id of the owning order row.
    pub order_id: i64,
    pub product_id: i64,
    pub title: String,
    pub unit_price: Kobo,
    pub quantity: i64,
    pub seller_id: String,
    /// Set once the product counters and the seller ledger have been incremented for this line. Rows with
    /// `credited = true` are never credited again, which makes the fulfillment step resumable after a crash.
    pub credited: bool,
}

impl OrderItem {
    pub fn line_total(&self) -> Kobo {
        self.unit_price * self.quantity
    }
}

//--------------------------------------       NewOrder      ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub buyer_id: String,
    pub items: Vec<NewOrderItem>,
    pub tax: Kobo,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(order_id: OrderId, buyer_id: String, items: Vec<NewOrderItem>) -> Self {
        Self { order_id, buyer_id, items, tax: Kobo::from(0), created_at: Utc::now() }
    }

    pub fn with_tax(mut self, tax: Kobo) -> Self {
        self.tax = tax;
        self
    }

    pub fn subtotal(&self) -> Kobo {
        self.items.iter().map(|i| i.unit_price * i.quantity).sum()
    }

    pub fn total_price(&self) -> Kobo {
        self.subtotal() + self.tax
    }
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub title: String,
    pub unit_price: Kobo,
    pub quantity: i64,
    pub seller_id: String,
}

//--------------------------------------       Payment       ---------------------------------------------------------
/// One payment attempt against an order. The `reference` is the sole correlation key shared with the gateway.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    /// The buyer who owns this payment attempt.
    pub user_id: String,
    /// Internal id of the order being paid for.
    pub order_id: i64,
    pub amount: Kobo,
    pub currency: String,
    /// Globally unique, client-generated, immutable. Used as the idempotency key throughout.
    pub reference: String,
    /// The hosted checkout URL the gateway issued for this attempt. `None` until the gateway has answered.
    pub authorization_url: Option<String>,
    pub access_code: Option<String>,
    /// The gateway's own transaction id, unknown until the charge settles.
    pub gateway_tx_id: Option<String>,
    pub status: PaymentStatusType,
    /// The last raw gateway payload observed for this charge, retained verbatim for audit.
    pub raw_payload: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The hosted checkout stored for this attempt, if the gateway ever issued one.
    pub fn hosted_checkout(&self) -> Option<crate::traits::HostedCharge> {
        match (&self.authorization_url, &self.access_code) {
            (Some(url), Some(code)) => Some(crate::traits::HostedCharge {
                authorization_url: url.clone(),
                access_code: code.clone(),
                reference: self.reference.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: String,
    pub order_id: i64,
    pub amount: Kobo,
    pub currency: String,
    pub reference: String,
}

impl NewPayment {
    pub fn new(user_id: String, order_id: i64, amount: Kobo, reference: String) -> Self {
        Self { user_id, order_id, amount, currency: NGN_CURRENCY_CODE.to_string(), reference }
    }
}

//--------------------------------------       Product       ---------------------------------------------------------
/// The aggregate sales counters carried on each product. Monotonically non-decreasing.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub seller_id: String,
    pub title: String,
    pub price: Kobo,
    pub total_sales: i64,
    /// Gross revenue: the full line totals, before the platform fee is deducted.
    pub total_revenue: Kobo,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     SellerLedger    ---------------------------------------------------------
/// The earnings fields carried on a seller's user record. Incremented exactly once per credited order line,
/// by the seller's share of the line total.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SellerLedger {
    pub seller_id: String,
    pub total_earnings: Kobo,
    pub available_balance: Kobo,
    pub total_sales: i64,
    pub updated_at: DateTime<Utc>,
}
