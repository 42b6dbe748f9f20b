use dpg_common::Kobo;
use sqlx::SqliteConnection;

use crate::db_types::SellerLedger;

/// Adds one credited line to the seller's ledger. `earnings` is the seller's share of the line total after the
/// platform fee; it lands in both `total_earnings` and `available_balance`.
pub async fn credit_seller(
    seller_id: &str,
    earnings: Kobo,
    sales: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO sellers (seller_id, total_earnings, available_balance, total_sales, updated_at)
            VALUES ($1, $2, $2, $3, CURRENT_TIMESTAMP)
            ON CONFLICT (seller_id) DO UPDATE SET
                total_earnings = sellers.total_earnings + excluded.total_earnings,
                available_balance = sellers.available_balance + excluded.available_balance,
                total_sales = sellers.total_sales + excluded.total_sales,
                updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(seller_id)
    .bind(earnings)
    .bind(sales)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_seller_ledger(
    seller_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<SellerLedger>, sqlx::Error> {
    let ledger =
        sqlx::query_as("SELECT * FROM sellers WHERE seller_id = $1").bind(seller_id).fetch_optional(conn).await?;
    Ok(ledger)
}
