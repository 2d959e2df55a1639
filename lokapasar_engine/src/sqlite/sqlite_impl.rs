//! `SqliteDatabase` is the concrete SQLite backend for the Lokapasar engine. It implements the [`OrderStore`] and
//! [`ProductCatalog`] traits on top of the low-level functions in [`super::db`].
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{new_pool, orders, products};
use crate::{
    db_types::{NewOrder, Order, OrderItem, OrderNumber, OrderStatus, PaymentStatus},
    helpers::{generate_order_number, ORDER_NUMBER_TAG},
    pricing::Product,
    traits::{OrderStore, OrderStoreError, ProductCatalog, StatusUpdate},
};

/// How many fresh order numbers to try before giving up on an insert.
const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

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
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, OrderStoreError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any pending schema migrations. Called once at process start (and by the test environment setup).
    pub async fn migrate(&self) -> Result<(), OrderStoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| OrderStoreError::DatabaseError(e.to_string()))
    }
}

impl OrderStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        if order.items.is_empty() {
            return Err(OrderStoreError::EmptyOrder);
        }
        let mut tx = self.pool.begin().await?;
        let mut attempt = 0u32;
        let stored = loop {
            attempt += 1;
            let number = generate_order_number(ORDER_NUMBER_TAG);
            match orders::insert_order(&order, &number, &mut tx).await {
                Ok(o) => break o,
                Err(sqlx::Error::Database(db))
                    if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
                {
                    if attempt >= MAX_ORDER_NUMBER_ATTEMPTS {
                        return Err(OrderStoreError::OrderNumberExhausted(attempt));
                    }
                    warn!("🗃️ Order number {number} collided on insert. Retrying with a fresh one (attempt {attempt}).");
                },
                Err(e) => return Err(e.into()),
            }
        };
        orders::insert_order_items(stored.id, &order.items, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order [{}] inserted with id {} for buyer {}", stored.order_number, stored.id, stored.buyer_id);
        Ok(stored)
    }

    async fn fetch_order(&self, id: i64, buyer_id: i64) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_for_buyer(id, buyer_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_items_for_order(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_orders_for_buyer(
        &self,
        buyer_id: i64,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::fetch_orders_for_buyer(buyer_id, status, &mut conn).await?;
        Ok(result)
    }

    async fn record_payment_intent(
        &self,
        number: &OrderNumber,
        method: &str,
        reference: &str,
        note: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::record_payment_intent(number, method, reference, note, expires_at, &mut conn).await?;
        match &order {
            Some(o) => debug!("🗃️ Recorded payment intent {reference} on order [{}]", o.order_number),
            None => debug!("🗃️ Payment intent {reference} not recorded; order [{number}] is already settled"),
        }
        Ok(order)
    }

    async fn update_payment_status(
        &self,
        number: &OrderNumber,
        expected: &[PaymentStatus],
        update: StatusUpdate,
    ) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::conditional_payment_update(number, expected, &update, &mut conn).await?;
        match &result {
            Some(o) => debug!("🗃️ Order [{}] payment status moved to {}", o.order_number, o.payment_status),
            None => debug!("🗃️ Conditional update on order [{number}] did not apply"),
        }
        Ok(result)
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = products::fetch_products_by_ids(ids, &mut conn).await?;
        Ok(result)
    }
}
