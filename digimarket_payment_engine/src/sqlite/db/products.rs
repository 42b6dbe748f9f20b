use sqlx::SqliteConnection;

use crate::db_types::{OrderItem, Product};

/// Adds one credited line to the product's counters: `total_sales` by the quantity sold and `total_revenue` by the
/// gross line total. The upsert creates the counter row if catalog data has not been synced for this product yet.
pub async fn credit_product(item: &OrderItem, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO products (id, seller_id, title, price, total_sales, total_revenue, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, CURRENT_TIMESTAMP)
            ON CONFLICT (id) DO UPDATE SET
                total_sales = products.total_sales + excluded.total_sales,
                total_revenue = products.total_revenue + excluded.total_revenue,
                updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(item.product_id)
    .bind(&item.seller_id)
    .bind(&item.title)
    .bind(item.unit_price)
    .bind(item.quantity)
    .bind(item.line_total())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}
