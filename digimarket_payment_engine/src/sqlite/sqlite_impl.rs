//! `SqliteDatabase` is a concrete implementation of the payment engine's storage backend.
//!
//! Unsurprisingly, it uses SQLite and implements the [`crate::traits::LedgerDatabase`] trait. Every multi-row
//! state transition runs inside a single transaction.
use std::fmt::Debug;

use log::*;
use serde_json::Value;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, orders, payments, products, sellers};
use crate::{
    db_types::{NewOrder, NewPayment, Order, OrderId, OrderItem, Payment, Product, SellerLedger},
    helpers::FeeSplit,
    traits::{LedgerDatabase, LedgerError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object with a connection pool attached to the database at the URL in the
    /// `DPG_DATABASE_URL` environment variable.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl LedgerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), LedgerError> {
        let mut tx = self.pool.begin().await?;
        let (order, inserted) = orders::idempotent_insert(order, &mut tx).await?;
        tx.commit().await?;
        if inserted {
            debug!("🗃️ Order [{}] for {} saved with id {}", order.order_id, order.total_price, order.id);
        }
        Ok((order, inserted))
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn insert_payment(&self, payment: NewPayment) -> Result<(Payment, bool), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let (payment, inserted) = payments::idempotent_insert(payment, &mut conn).await?;
        if inserted {
            debug!("🗃️ Payment [{}] for {} saved with id {}", payment.reference, payment.amount, payment.id);
        }
        Ok((payment, inserted))
    }

    async fn fetch_payment_by_reference(&self, reference: &str) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_by_reference(reference, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_payment_by_id(&self, id: i64) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_by_id(id, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_pending_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_pending_payment_for_order(order_id, &mut conn).await?;
        Ok(payment)
    }

    async fn store_hosted_checkout(
        &self,
        reference: &str,
        authorization_url: &str,
        access_code: &str,
    ) -> Result<Payment, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::store_hosted_checkout(reference, authorization_url, access_code, &mut conn)
            .await?
            .ok_or_else(|| LedgerError::PaymentNotFound(reference.to_string()))?;
        debug!("🗃️ Checkout for payment [{reference}] recorded");
        Ok(payment)
    }

    async fn settle_payment(
        &self,
        reference: &str,
        gateway_tx_id: Option<String>,
        raw_payload: &Value,
    ) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::settle_payment(reference, gateway_tx_id, raw_payload, &mut conn).await?;
        match &payment {
            Some(p) => debug!("🗃️ Payment [{reference}] settled for {}", p.amount),
            None => trace!("🗃️ Payment [{reference}] was already terminal. Nothing to settle."),
        }
        Ok(payment)
    }

    async fn fail_payment(&self, reference: &str, reason: &str) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fail_payment(reference, reason, &mut conn).await?;
        if payment.is_some() {
            debug!("🗃️ Payment [{reference}] marked as failed. Reason: {reason}");
        }
        Ok(payment)
    }

    async fn refund_payment(&self, reference: &str) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::refund_payment(reference, &mut conn).await?;
        if payment.is_some() {
            debug!("🗃️ Payment [{reference}] marked as cancelled following a refund");
        }
        Ok(payment)
    }

    async fn mark_order_paid(&self, id: i64) -> Result<Order, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::mark_order_paid(id, &mut conn).await?;
        debug!("🗃️ Order [{}] is paid", order.order_id);
        Ok(order)
    }

    async fn mark_order_payment_failed(&self, id: i64) -> Result<Order, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::mark_order_payment_failed(id, &mut conn).await?;
        Ok(order)
    }

    async fn mark_order_refunded(&self, id: i64) -> Result<Order, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::mark_order_refunded(id, &mut conn).await?;
        debug!("🗃️ Order [{}] is refunded", order.order_id);
        Ok(order)
    }

    /// Cancels the order and any pending payment attempts against it in a single transaction. A charge that
    /// settles at the gateway after this commits finds its payment already terminal and is never fulfilled.
    async fn cancel_order(&self, id: i64) -> Result<Option<Order>, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::cancel_order(id, &mut tx).await?;
        if let Some(order) = &order {
            let cancelled = payments::cancel_pending_payments(id, &mut tx).await?;
            if cancelled > 0 {
                debug!("🗃️ {cancelled} pending payment(s) against order [{}] cancelled with it", order.order_id);
            }
        }
        tx.commit().await?;
        Ok(order)
    }

    /// Credits one order line in a single atomic transaction:
    /// * flips the line's `credited` marker. If someone already has, the transaction is abandoned and `false` is
    ///   returned without touching the counters.
    /// * increments the product's sales count and gross revenue.
    /// * increments the seller's earnings, available balance and sales count by their share of the line total.
    async fn credit_order_line(&self, item: &OrderItem, split: FeeSplit) -> Result<bool, LedgerError> {
        let mut tx = self.pool.begin().await?;
        if !orders::claim_line_credit(item.id, &mut tx).await? {
            trace!("🗃️ Line {} of order {} was already credited. Skipping.", item.id, item.order_id);
            return Ok(false);
        }
        products::credit_product(item, &mut tx).await?;
        let earnings = split.seller_cut(item.line_total());
        sellers::credit_seller(&item.seller_id, earnings, item.quantity, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Credited line {} ({} x{}). Seller {} earned {earnings}",
            item.id, item.title, item.quantity, item.seller_id
        );
        Ok(true)
    }

    async fn fetch_unfulfilled_paid_references(&self) -> Result<Vec<String>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let references = payments::fetch_unfulfilled_paid_references(&mut conn).await?;
        Ok(references)
    }

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_seller_ledger(&self, seller_id: &str) -> Result<Option<SellerLedger>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let ledger = sellers::fetch_seller_ledger(seller_id, &mut conn).await?;
        Ok(ledger)
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}
