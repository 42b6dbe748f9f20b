use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem},
    traits::LedgerError,
};

/// Inserts the order with its lines, returning `false` in the second parameter if the order already exists.
pub async fn idempotent_insert(order: NewOrder, conn: &mut SqliteConnection) -> Result<(Order, bool), LedgerError> {
    let inserted = match fetch_order_by_order_id(&order.order_id, conn).await? {
        Some(order) => (order, false),
        None => {
            let order = insert_order(order, conn).await?;
            debug!("📝️ Order [{}] inserted with id {}", order.order_id, order.id);
            (order, true)
        },
    };
    Ok(inserted)
}

/// Inserts a new order and its lines using the given connection. This is not atomic on its own. Embed the call
/// inside a transaction and pass `&mut *tx` as the connection argument to get atomicity.
async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, LedgerError> {
    let subtotal = order.subtotal();
    let total_price = order.total_price();
    let stored: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                buyer_id,
                subtotal,
                tax,
                total_price,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.buyer_id)
    .bind(subtotal)
    .bind(order.tax)
    .bind(total_price)
    .bind(order.created_at)
    .fetch_one(&mut *conn)
    .await?;
    for item in order.items {
        sqlx::query(
            r#"
                INSERT INTO order_items (order_id, product_id, title, unit_price, quantity, seller_id)
                VALUES ($1, $2, $3, $4, $5, $6);
            "#,
        )
        .bind(stored.id)
        .bind(item.product_id)
        .bind(item.title)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(item.seller_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(stored)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// The lines of an order, in insertion order.
pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Marks the order as paid. Completes a pending order but never downgrades a refunded one, and `paid_at` is only
/// ever written once.
pub async fn mark_order_paid(id: i64, conn: &mut SqliteConnection) -> Result<Order, LedgerError> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET
                payment_status = 'Paid',
                status = CASE status WHEN 'Pending' THEN 'Completed' ELSE status END,
                paid_at = COALESCE(paid_at, CURRENT_TIMESTAMP),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or(LedgerError::OrderIdNotFound(id))?;
    Ok(order)
}

/// Records that the payment attempt against this order failed. Only moves the payment status forward from Pending,
/// so a late failure signal can never clobber a paid order.
pub async fn mark_order_payment_failed(id: i64, conn: &mut SqliteConnection) -> Result<Order, LedgerError> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET
                payment_status = CASE payment_status WHEN 'Pending' THEN 'Failed' ELSE payment_status END,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or(LedgerError::OrderIdNotFound(id))?;
    Ok(order)
}

pub async fn mark_order_refunded(id: i64, conn: &mut SqliteConnection) -> Result<Order, LedgerError> {
    let order = sqlx::query_as(
        "UPDATE orders SET status = 'Refunded', updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or(LedgerError::OrderIdNotFound(id))?;
    Ok(order)
}

/// Cancels an order, but only while it is still pending and no payment has settled against it. An order whose
/// payment attempt failed is still unpaid and stays cancellable. Returns `None` if the guard did not hold.
pub async fn cancel_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET status = 'Cancelled', updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND status = 'Pending' AND payment_status <> 'Paid'
            RETURNING *;
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Flips the line's `credited` marker. Returns `true` if this call claimed the credit, `false` if the line was
/// already credited by someone else.
pub async fn claim_line_credit(item_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE order_items SET credited = 1 WHERE id = $1 AND credited = 0")
        .bind(item_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
