use log::debug;
use serde_json::Value;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPayment, Payment},
    traits::LedgerError,
};

/// Inserts the payment attempt, returning `false` in the second parameter if the reference was already taken.
pub async fn idempotent_insert(
    payment: NewPayment,
    conn: &mut SqliteConnection,
) -> Result<(Payment, bool), LedgerError> {
    let inserted = match fetch_payment_by_reference(&payment.reference, conn).await? {
        Some(payment) => (payment, false),
        None => {
            let payment = insert_payment(payment, conn).await?;
            debug!("📝️ Payment [{}] inserted with id {}", payment.reference, payment.id);
            (payment, true)
        },
    };
    Ok(inserted)
}

async fn insert_payment(payment: NewPayment, conn: &mut SqliteConnection) -> Result<Payment, LedgerError> {
    let payment = sqlx::query_as(
        r#"
            INSERT INTO payments (user_id, order_id, amount, currency, reference)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(payment.user_id)
    .bind(payment.order_id)
    .bind(payment.amount)
    .bind(payment.currency)
    .bind(payment.reference)
    .fetch_one(conn)
    .await?;
    Ok(payment)
}

pub async fn fetch_payment_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment =
        sqlx::query_as("SELECT * FROM payments WHERE reference = $1").bind(reference).fetch_optional(conn).await?;
    Ok(payment)
}

pub async fn fetch_payment_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(payment)
}

/// The live payment attempt against an order, if one exists. There is at most one, since re-initiation re-uses it.
pub async fn fetch_pending_payment_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        "SELECT * FROM payments WHERE order_id = $1 AND status = 'Pending' ORDER BY id DESC LIMIT 1",
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

/// Records the hosted checkout the gateway issued for this reference.
pub async fn store_hosted_checkout(
    reference: &str,
    authorization_url: &str,
    access_code: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            UPDATE payments SET
                authorization_url = $2,
                access_code = $3,
                updated_at = CURRENT_TIMESTAMP
            WHERE reference = $1
            RETURNING *;
        "#,
    )
    .bind(reference)
    .bind(authorization_url)
    .bind(access_code)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

/// Cancels every pending payment attempt against the order. Run when the buyer cancels the order itself: a charge
/// that settles afterwards finds its payment already terminal and loses the settle compare-and-set.
pub async fn cancel_pending_payments(order_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE payments SET
                status = 'Cancelled',
                failure_reason = 'The order was cancelled by the buyer',
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND status = 'Pending';
        "#,
    )
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// The claim step of reconciliation. The `status = 'Pending'` guard makes this a compare-and-set: exactly one
/// caller per reference ever gets a row back, no matter how many race on it.
pub async fn settle_payment(
    reference: &str,
    gateway_tx_id: Option<String>,
    raw_payload: &Value,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            UPDATE payments SET
                status = 'Successful',
                gateway_tx_id = $2,
                raw_payload = $3,
                updated_at = CURRENT_TIMESTAMP
            WHERE reference = $1 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(reference)
    .bind(gateway_tx_id)
    .bind(raw_payload.to_string())
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

/// Moves a pending payment to failed, recording the reason. Same compare-and-set guard as [`settle_payment`].
pub async fn fail_payment(
    reference: &str,
    reason: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            UPDATE payments SET
                status = 'Failed',
                failure_reason = $2,
                updated_at = CURRENT_TIMESTAMP
            WHERE reference = $1 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(reference)
    .bind(reason)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

/// Moves a successful payment to cancelled after a refund has been accepted upstream.
pub async fn refund_payment(reference: &str, conn: &mut SqliteConnection) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            UPDATE payments SET
                status = 'Cancelled',
                updated_at = CURRENT_TIMESTAMP
            WHERE reference = $1 AND status = 'Successful'
            RETURNING *;
        "#,
    )
    .bind(reference)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

/// References of successful payments whose orders still have work outstanding. A payment shows up here when the
/// process died between settling the payment and finishing the ledger updates.
pub async fn fetch_unfulfilled_paid_references(conn: &mut SqliteConnection) -> Result<Vec<String>, sqlx::Error> {
    let references = sqlx::query_scalar(
        r#"
            SELECT DISTINCT p.reference
            FROM payments p
            JOIN orders o ON o.id = p.order_id
            WHERE p.status = 'Successful' AND (
                o.payment_status <> 'Paid'
                OR EXISTS (SELECT 1 FROM order_items i WHERE i.order_id = o.id AND i.credited = 0)
            )
            ORDER BY p.id;
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(references)
}
