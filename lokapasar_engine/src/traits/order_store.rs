use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderItem, OrderNumber, OrderStatus, PaymentStatus};

/// The persistence contract for orders. The store is the single source of truth and the only shared mutable state in
/// the system; every mutation it exposes is atomic.
#[allow(async_fn_in_trait)]
pub trait OrderStore: Clone {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Assigns a fresh order number and persists the order together with all its line items in one transaction.
    /// Partial orders are never visible. Order-number collisions are resolved by retrying the insert with a new
    /// number, bounded, against the UNIQUE constraint.
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    /// Fetches an order by internal id, scoped to the owning buyer. Returns `None` both for a missing order and for
    /// an order owned by someone else, so callers cannot probe for other tenants' orders.
    async fn fetch_order(&self, id: i64, buyer_id: i64) -> Result<Option<Order>, OrderStoreError>;

    /// Fetches an order by its external reference. Used by the reconciler, which has no buyer context.
    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderStoreError>;

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderStoreError>;

    /// All orders for a buyer, newest first, optionally filtered by order status.
    async fn fetch_orders_for_buyer(
        &self,
        buyer_id: i64,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderStoreError>;

    /// Records the provider reference and expiry for a freshly created payment intent and moves the payment status
    /// to `Pending`. Conditional on the current payment status being `Unpaid` or `Pending`; returns `None` (and
    /// changes nothing) if the order has meanwhile reached a terminal state.
    async fn record_payment_intent(
        &self,
        number: &OrderNumber,
        method: &str,
        reference: &str,
        note: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Order>, OrderStoreError>;

    /// The concurrency-correctness primitive: a single conditional
    /// `UPDATE … WHERE order_number = ? AND payment_status IN (expected) RETURNING *`.
    ///
    /// Succeeds and mutates only if the order's current payment status is still in `expected`; otherwise it is a
    /// no-op and returns `None`. Two concurrent webhook deliveries for the same order therefore race at the database,
    /// exactly one wins, and the loser observes `None` and exits cleanly.
    async fn update_payment_status(
        &self,
        number: &OrderNumber,
        expected: &[PaymentStatus],
        update: StatusUpdate,
    ) -> Result<Option<Order>, OrderStoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderStoreError> {
        Ok(())
    }
}

/// The target state of a conditional payment-status update.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub payment_status: PaymentStatus,
    /// When set, the order axis is advanced in the same statement (only ever to `Paid`).
    pub order_status: Option<OrderStatus>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl StatusUpdate {
    pub fn to(payment_status: PaymentStatus) -> Self {
        Self { payment_status, order_status: None, paid_at: None }
    }

    pub fn paid(at: DateTime<Utc>) -> Self {
        Self { payment_status: PaymentStatus::Paid, order_status: Some(OrderStatus::Paid), paid_at: Some(at) }
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Could not find a free order number after {0} attempts")]
    OrderNumberExhausted(u32),
    #[error("Cannot store an order with no line items")]
    EmptyOrder,
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}
