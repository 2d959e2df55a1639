use chrono::{DateTime, Utc};
use log::trace;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderItem, OrderNumber, OrderStatus, PaymentStatus},
    traits::{OrderStoreError, StatusUpdate},
};

/// Inserts the parent order row. Returns the raw `sqlx::Error` so the caller can detect a UNIQUE violation on the
/// order number and retry with a fresh one. Not atomic on its own; embed it in a transaction and pass `&mut *tx`.
pub async fn insert_order(
    order: &NewOrder,
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let stored = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                buyer_id,
                store_id,
                address_id,
                voucher_id,
                subtotal,
                shipping_cost,
                total_amount,
                courier,
                courier_service,
                payment_method,
                notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *;
        "#,
    )
    .bind(number.as_str())
    .bind(order.buyer_id)
    .bind(order.store_id)
    .bind(order.address_id)
    .bind(order.voucher_id)
    .bind(order.subtotal)
    .bind(order.shipping_cost)
    .bind(order.total_amount)
    .bind(&order.courier)
    .bind(&order.courier_service)
    .bind(&order.payment_method)
    .bind(&order.notes)
    .fetch_one(conn)
    .await?;
    Ok(stored)
}

pub async fn insert_order_items(
    order_id: i64,
    items: &[NewOrderItem],
    conn: &mut SqliteConnection,
) -> Result<(), OrderStoreError> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, variant_id, product_name, variant_name, price, quantity, weight)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
        "#,
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.variant_id)
        .bind(&item.product_name)
        .bind(&item.variant_name)
        .bind(item.price)
        .bind(item.quantity)
        .bind(item.weight)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Returns the order for the given number, if any.
pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE order_number = $1")
        .bind(number.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Owner-scoped fetch. An order that exists but belongs to another buyer is indistinguishable from a missing one.
pub async fn fetch_order_for_buyer(
    id: i64,
    buyer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND buyer_id = $2")
        .bind(id)
        .bind(buyer_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_items_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items =
        sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id").bind(order_id).fetch_all(conn).await?;
    Ok(items)
}

pub async fn fetch_orders_for_buyer(
    buyer_id: i64,
    status: Option<OrderStatus>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders WHERE buyer_id = ");
    builder.push_bind(buyer_id);
    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status.to_string());
    }
    builder.push(" ORDER BY created_at DESC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    Ok(orders)
}

/// Records a freshly created payment intent. Conditional on the payment status still being non-terminal.
pub async fn record_payment_intent(
    number: &OrderNumber,
    method: &str,
    reference: &str,
    note: &str,
    expires_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET
                updated_at = CURRENT_TIMESTAMP,
                payment_status = 'Pending',
                payment_method = $1,
                payment_reference = $2,
                payment_expires_at = $3,
                notes = $4
            WHERE order_number = $5 AND payment_status IN ('Unpaid', 'Pending')
            RETURNING *;
        "#,
    )
    .bind(method)
    .bind(reference)
    .bind(expires_at)
    .bind(note)
    .bind(number.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// The single atomic compare-and-swap behind webhook reconciliation. The `payment_status IN (…)` precondition and
/// the mutation happen in one statement, so two concurrent deliveries race at the database and exactly one wins.
pub(crate) async fn conditional_payment_update(
    number: &OrderNumber,
    expected: &[PaymentStatus],
    update: &StatusUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderStoreError> {
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP, payment_status = ");
    builder.push_bind(update.payment_status.to_string());
    if let Some(status) = update.order_status {
        builder.push(", status = ");
        builder.push_bind(status.to_string());
    }
    if let Some(paid_at) = update.paid_at {
        builder.push(", paid_at = ");
        builder.push_bind(paid_at);
    }
    builder.push(" WHERE order_number = ");
    builder.push_bind(number.as_str().to_string());
    let statuses = expected.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(",");
    builder.push(format!(" AND payment_status IN ({statuses})"));
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let res = builder.build().fetch_optional(conn).await?.map(|row: SqliteRow| Order::from_row(&row)).transpose()?;
    trace!("🗃️ Result of conditional_payment_update: {res:?}");
    Ok(res)
}
