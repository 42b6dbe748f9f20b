use std::{collections::BTreeMap, fmt::Debug};

use chrono::{Duration, Utc};
use futures_util::future::join_all;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    db_types::{NewOrder, NewPayment, Order, OrderId, OrderItem, OrderStatusType, Payment},
    dpe_api::errors::ReconcilerError,
    events::{BuyerConfirmationEvent, EventProducers, PaymentFailedEvent, SellerSaleEvent},
    helpers::{new_payment_reference, FeeSplit},
    traits::{GatewayError, GatewayVerdict, HostedCharge, InitializeCharge, LedgerDatabase, PaymentGateway, VerdictStatus},
};

pub const DEFAULT_REFUND_WINDOW_DAYS: i64 = 7;

/// What a call to [`ReconcilerApi::reconcile`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileOutcome {
    /// This call settled the payment, marked the order paid and credited the ledger.
    Fulfilled,
    /// The payment was already in a terminal state, or another caller claimed the transition first. Nothing was
    /// changed.
    AlreadyReconciled,
    /// This call moved the payment to the failed state.
    MarkedFailed,
    /// The gateway has not settled the charge yet. Nothing was persisted; a later call will pick it up.
    StillPending,
}

/// The result of a reconciliation pass: the post-reconciliation order and payment rows plus what this call did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    pub order: Order,
    pub payment: Payment,
    pub outcome: ReconcileOutcome,
}

/// `ReconcilerApi` is the primary API for the payment lifecycle. It is the single write path to the ledger: both
/// webhook deliveries and client-driven verification calls funnel into [`Self::reconcile`], so there is exactly one
/// state machine to reason about regardless of which signal arrives first, last, or twice.
pub struct ReconcilerApi<B, G> {
    db: B,
    gateway: G,
    split: FeeSplit,
    refund_window: Duration,
    producers: EventProducers,
}

impl<B, G> Debug for ReconcilerApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconcilerApi")
    }
}

impl<B, G> ReconcilerApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self {
            db,
            gateway,
            split: FeeSplit::default(),
            refund_window: Duration::days(DEFAULT_REFUND_WINDOW_DAYS),
            producers,
        }
    }

    pub fn with_split(mut self, split: FeeSplit) -> Self {
        self.split = split;
        self
    }

    pub fn with_refund_window(mut self, window: Duration) -> Self {
        self.refund_window = window;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B, G> ReconcilerApi<B, G>
where
    B: LedgerDatabase,
    G: PaymentGateway,
{
    /// Creates a new order with its lines. Idempotent on the order id: resubmitting an existing order returns the
    /// stored order unchanged.
    pub async fn place_order(&self, order: NewOrder) -> Result<Order, ReconcilerError> {
        let order_id = order.order_id.clone();
        let (order, inserted) = self.db.insert_order(order).await?;
        if inserted {
            debug!("🧾️📦️ Order [{order_id}] placed. Total: {}", order.total_price);
        } else {
            info!("🧾️📦️ Order [{order_id}] was already placed. Returning the stored order.");
        }
        Ok(order)
    }

    /// Initializes a charge for an order with the gateway and records the pending payment attempt. Returns the
    /// payment row and the hosted checkout details the buyer needs to complete it.
    ///
    /// Fails if the order does not belong to `user_id`, or is no longer in a payable state. Re-initiating an order
    /// that already has a live payment attempt returns the existing reference and checkout, so a buyer clicking
    /// "pay" twice ends up with one charge, not two.
    pub async fn initiate_payment(
        &self,
        order_id: &OrderId,
        user_id: &str,
        buyer_email: &str,
    ) -> Result<(Payment, HostedCharge), ReconcilerError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| ReconcilerError::OrderNotFound(order_id.clone()))?;
        if order.buyer_id != user_id {
            return Err(ReconcilerError::NotOrderOwner);
        }
        if order.status != OrderStatusType::Pending || order.is_paid() {
            return Err(ReconcilerError::OrderNotPayable(order_id.clone()));
        }
        let payment = match self.db.fetch_pending_payment_for_order(order.id).await? {
            Some(payment) => {
                if let Some(hosted) = payment.hosted_checkout() {
                    info!(
                        "🧾️💳️ Order [{order_id}] already has a live charge [{}]. Returning its checkout.",
                        payment.reference
                    );
                    return Ok((payment, hosted));
                }
                // The attempt was recorded but the process died before the gateway answered. Initialize a
                // checkout for the stored reference.
                payment
            },
            None => {
                let reference = new_payment_reference();
                let new_payment = NewPayment::new(user_id.to_string(), order.id, order.total_price, reference);
                self.db.insert_payment(new_payment).await?.0
            },
        };
        let charge = InitializeCharge {
            amount: payment.amount,
            currency: payment.currency.clone(),
            reference: payment.reference.clone(),
            buyer_email: buyer_email.to_string(),
            metadata: Some(json!({ "order_id": order.order_id.as_str() })),
        };
        let hosted = self.gateway.initialize_charge(charge).await?;
        let payment =
            self.db.store_hosted_checkout(&payment.reference, &hosted.authorization_url, &hosted.access_code).await?;
        info!("🧾️💳️ Charge [{}] for order [{order_id}] initialized. Amount: {}", payment.reference, payment.amount);
        Ok((payment, hosted))
    }

    /// Reconciles a payment against the gateway's verdict. This is the sole write path for payment outcomes; both
    /// the webhook route and the client verify route call it, in any order and any number of times.
    ///
    /// * If the payment is already terminal, nothing is touched and `AlreadyReconciled` is returned. The gateway is
    ///   not even consulted.
    /// * Otherwise a verdict is obtained: `trusted` if the caller already verified one, or a fresh verify call.
    /// * A successful verdict must match the payment's amount and currency exactly. A mismatch marks the payment
    ///   failed rather than fulfilling it.
    /// * A gateway outage surfaces as [`GatewayError::Unavailable`] and changes nothing; the caller retries later.
    pub async fn reconcile(
        &self,
        reference: &str,
        trusted: Option<GatewayVerdict>,
    ) -> Result<Reconciliation, ReconcilerError> {
        let payment = self
            .db
            .fetch_payment_by_reference(reference)
            .await?
            .ok_or_else(|| ReconcilerError::UnknownReference(reference.to_string()))?;
        if payment.is_terminal() {
            trace!("🧾️ Payment [{reference}] is already {}. Nothing to reconcile.", payment.status);
            let order = self.order_for(&payment).await?;
            return Ok(Reconciliation { order, payment, outcome: ReconcileOutcome::AlreadyReconciled });
        }
        let verdict = match trusted {
            Some(v) => v,
            None => match self.gateway.verify_by_reference(reference).await {
                Ok(v) => v,
                Err(GatewayError::ReferenceNotFound(_)) => {
                    warn!("🧾️ Gateway has no record of [{reference}]. Marking the payment as failed.");
                    return self.mark_failed(payment, "The gateway has no record of this reference").await;
                },
                Err(GatewayError::Rejected(msg)) => {
                    warn!("🧾️ Gateway rejected the verification of [{reference}]: {msg}");
                    return self.mark_failed(payment, &format!("Gateway rejected verification: {msg}")).await;
                },
                Err(e @ GatewayError::Unavailable(_)) => return Err(e.into()),
            },
        };
        match verdict.status {
            VerdictStatus::Pending => {
                debug!("🧾️ Payment [{reference}] has not settled at the gateway yet.");
                let order = self.order_for(&payment).await?;
                Ok(Reconciliation { order, payment, outcome: ReconcileOutcome::StillPending })
            },
            VerdictStatus::Success => {
                if verdict.amount != payment.amount || verdict.currency != payment.currency {
                    warn!(
                        "🧾️ Payment [{reference}] settled for {} {} but {} {} was expected. Marking it failed.",
                        verdict.amount, verdict.currency, payment.amount, payment.currency
                    );
                    let reason = format!(
                        "Amount mismatch: gateway captured {} {}, expected {} {}",
                        verdict.amount, verdict.currency, payment.amount, payment.currency
                    );
                    return self.mark_failed(payment, &reason).await;
                }
                self.fulfill(payment, verdict).await
            },
            VerdictStatus::Failed => {
                let reason = verdict.message.unwrap_or_else(|| "The gateway reported the charge as failed".to_string());
                self.mark_failed(payment, &reason).await
            },
        }
    }

    /// Settles the payment and performs fulfillment. The settle step is a compare-and-set on the payment row, so
    /// when two calls race on the same reference exactly one proceeds past it; the loser reports
    /// `AlreadyReconciled` without double-crediting anything.
    async fn fulfill(&self, payment: Payment, verdict: GatewayVerdict) -> Result<Reconciliation, ReconcilerError> {
        let reference = payment.reference.clone();
        let Some(payment) = self.db.settle_payment(&reference, verdict.gateway_tx_id, &verdict.raw).await? else {
            debug!("🧾️ Another caller settled [{reference}] first.");
            let payment = self
                .db
                .fetch_payment_by_reference(&reference)
                .await?
                .ok_or_else(|| ReconcilerError::UnknownReference(reference.clone()))?;
            let order = self.order_for(&payment).await?;
            return Ok(Reconciliation { order, payment, outcome: ReconcileOutcome::AlreadyReconciled });
        };
        let order = self.db.mark_order_paid(payment.order_id).await?;
        let credited = self.apply_ledger_credits(&order).await?;
        info!(
            "🧾️✅️ Payment [{reference}] reconciled. Order [{}] is paid and {} lines were credited.",
            order.order_id,
            credited.len()
        );
        // Notifications go out only after every write has committed. A crashed notifier can cost an email, never a
        // ledger entry.
        self.notify_fulfillment(&order, &payment, &credited).await;
        Ok(Reconciliation { order, payment, outcome: ReconcileOutcome::Fulfilled })
    }

    /// Credits every uncredited line of the order, one transaction per line. A crash partway through leaves the
    /// remaining lines uncredited; the recovery sweep finishes them without touching the ones already done.
    async fn apply_ledger_credits(&self, order: &Order) -> Result<Vec<OrderItem>, ReconcilerError> {
        let items = self.db.fetch_order_items(order.id).await?;
        let mut credited = Vec::with_capacity(items.len());
        for item in items {
            if item.credited {
                continue;
            }
            if self.db.credit_order_line(&item, self.split).await? {
                credited.push(item);
            }
        }
        Ok(credited)
    }

    async fn notify_fulfillment(&self, order: &Order, payment: &Payment, credited: &[OrderItem]) {
        let event = BuyerConfirmationEvent::new(order.clone(), payment.clone());
        let calls = self.producers.buyer_confirmation_producer.iter().map(|p| p.publish_event(event.clone()));
        join_all(calls).await;
        let mut by_seller: BTreeMap<String, Vec<OrderItem>> = BTreeMap::new();
        for item in credited {
            by_seller.entry(item.seller_id.clone()).or_default().push(item.clone());
        }
        for (seller_id, items) in by_seller {
            let earnings = items.iter().map(|i| self.split.seller_cut(i.line_total())).sum();
            let event = SellerSaleEvent { seller_id, order: order.clone(), items, earnings };
            let calls = self.producers.seller_sale_producer.iter().map(|p| p.publish_event(event.clone()));
            join_all(calls).await;
        }
    }

    async fn mark_failed(&self, payment: Payment, reason: &str) -> Result<Reconciliation, ReconcilerError> {
        let reference = payment.reference.clone();
        let Some(payment) = self.db.fail_payment(&reference, reason).await? else {
            debug!("🧾️ Payment [{reference}] reached a terminal state before it could be failed.");
            let payment = self
                .db
                .fetch_payment_by_reference(&reference)
                .await?
                .ok_or_else(|| ReconcilerError::UnknownReference(reference.clone()))?;
            let order = self.order_for(&payment).await?;
            return Ok(Reconciliation { order, payment, outcome: ReconcileOutcome::AlreadyReconciled });
        };
        let order = self.db.mark_order_payment_failed(payment.order_id).await?;
        info!("🧾️❌️ Payment [{reference}] marked as failed: {reason}");
        let event = PaymentFailedEvent::new(payment.clone(), reason.to_string());
        let calls = self.producers.payment_failed_producer.iter().map(|p| p.publish_event(event.clone()));
        join_all(calls).await;
        Ok(Reconciliation { order, payment, outcome: ReconcileOutcome::MarkedFailed })
    }

    /// Cancels an order on the buyer's behalf. Only pending, unpaid orders can be cancelled; a payment settling
    /// concurrently wins the race and the cancellation is refused. When the cancellation does go through, any
    /// pending payment attempts against the order are cancelled with it, so a charge the gateway settles
    /// afterwards is never fulfilled.
    pub async fn cancel_order(&self, order_id: &OrderId, user_id: &str) -> Result<Order, ReconcilerError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| ReconcilerError::OrderNotFound(order_id.clone()))?;
        if order.buyer_id != user_id {
            return Err(ReconcilerError::NotOrderOwner);
        }
        let order = self
            .db
            .cancel_order(order.id)
            .await?
            .ok_or_else(|| ReconcilerError::OrderNotCancellable(order_id.clone()))?;
        info!("🧾️🚫️ Order [{order_id}] cancelled by the buyer");
        Ok(order)
    }

    /// Refunds a successful payment on the buyer's behalf.
    ///
    /// The refund must fall inside the refund window, measured from the moment the payment settled. The gateway is
    /// asked first; only once it accepts does the ledger move the payment to cancelled and the order to refunded.
    /// Product counters and seller earnings are not reversed.
    pub async fn request_refund(
        &self,
        payment_id: i64,
        user_id: &str,
        reason: Option<String>,
    ) -> Result<(Order, Payment), ReconcilerError> {
        let payment =
            self.db.fetch_payment_by_id(payment_id).await?.ok_or(ReconcilerError::PaymentNotFound(payment_id))?;
        if payment.user_id != user_id {
            return Err(ReconcilerError::NotPaymentOwner);
        }
        if payment.status != crate::db_types::PaymentStatusType::Successful {
            return Err(ReconcilerError::RefundNotAllowed(format!(
                "Only successful payments can be refunded. This one is {}",
                payment.status
            )));
        }
        let elapsed = Utc::now() - payment.updated_at;
        if elapsed > self.refund_window {
            return Err(ReconcilerError::RefundWindowExpired {
                elapsed_days: elapsed.num_days(),
                window_days: self.refund_window.num_days(),
            });
        }
        let reference = payment.reference.clone();
        if let Some(reason) = &reason {
            debug!("🧾️↩️ Requesting refund for [{reference}]. Buyer's reason: {reason}");
        }
        self.gateway.refund(&reference).await?;
        let payment = self
            .db
            .refund_payment(&reference)
            .await?
            .ok_or_else(|| ReconcilerError::RefundNotAllowed("The payment was already refunded".to_string()))?;
        let order = self.db.mark_order_refunded(payment.order_id).await?;
        info!("🧾️↩️ Payment [{reference}] refunded. Order [{}] marked as refunded.", order.order_id);
        Ok((order, payment))
    }

    /// Finishes fulfillment work that a crash left behind: orders whose payment settled but which were never marked
    /// paid, or whose lines were only partially credited. Returns the number of lines credited. Buyer and seller
    /// notifications are not re-sent.
    pub async fn resume_fulfillment(&self) -> Result<usize, ReconcilerError> {
        let references = self.db.fetch_unfulfilled_paid_references().await?;
        if references.is_empty() {
            return Ok(0);
        }
        info!("🧾️🔧️ {} settled payments have incomplete fulfillment. Resuming.", references.len());
        let mut total = 0;
        for reference in references {
            let Some(payment) = self.db.fetch_payment_by_reference(&reference).await? else {
                continue;
            };
            let order = self.db.mark_order_paid(payment.order_id).await?;
            let credited = self.apply_ledger_credits(&order).await?;
            debug!("🧾️🔧️ Order [{}]: {} lines credited during recovery", order.order_id, credited.len());
            total += credited.len();
        }
        Ok(total)
    }

    pub async fn payment_by_reference(&self, reference: &str) -> Result<Option<Payment>, ReconcilerError> {
        Ok(self.db.fetch_payment_by_reference(reference).await?)
    }

    pub async fn order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, ReconcilerError> {
        Ok(self.db.fetch_order_by_order_id(order_id).await?)
    }

    async fn order_for(&self, payment: &Payment) -> Result<Order, ReconcilerError> {
        let order = self
            .db
            .fetch_order_by_id(payment.order_id)
            .await?
            .ok_or(crate::traits::LedgerError::OrderIdNotFound(payment.order_id))?;
        Ok(order)
    }
}
