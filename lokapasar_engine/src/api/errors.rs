use thiserror::Error;

use crate::{
    db_types::OrderNumber,
    pricing::PricingError,
    traits::{GatewayError, OrderStoreError},
};

/// The engine-level error taxonomy. Gateway and storage errors are translated into these stable kinds before they
/// reach any caller; nothing rail-specific ever leaks out of the engine.
#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    /// Malformed or missing input, including every pricing failure. Not retryable.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    /// The order does not exist, or is not owned by the caller. The two cases are deliberately indistinguishable.
    #[error("Order {0} not found")]
    OrderNotFound(i64),
    /// An attempt to pay an order whose payment already completed.
    #[error("Order {0} has already been paid")]
    OrderAlreadyPaid(OrderNumber),
    /// An attempt to pay an order whose payment reached a terminal failure state (expired or failed).
    #[error("Order {0} is closed to further payment")]
    OrderClosed(OrderNumber),
    /// A non-expired payment intent already exists for the order; its provider reference is returned instead of
    /// creating a second intent.
    #[error("Order {number} already has pending payment intent {reference}")]
    PaymentPending { number: OrderNumber, reference: String },
    /// A webhook referenced an order number that was never issued. The order store is left untouched.
    #[error("Unknown payment reference {0}")]
    UnknownReference(OrderNumber),
    /// Transport failure talking to the payment provider. Retryable with backoff.
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
    /// The payment provider rejected the request. Surfaced to the user, not retried.
    #[error("Payment gateway rejected the request: {0}")]
    GatewayRejected(String),
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<OrderStoreError> for OrderFlowError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::EmptyOrder => OrderFlowError::InvalidOrder(e.to_string()),
            e => OrderFlowError::StorageError(e.to_string()),
        }
    }
}

impl From<GatewayError> for OrderFlowError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Unavailable(s) => OrderFlowError::GatewayUnavailable(s),
            GatewayError::Rejected(s) => OrderFlowError::GatewayRejected(s),
        }
    }
}

impl From<PricingError> for OrderFlowError {
    fn from(e: PricingError) -> Self {
        OrderFlowError::InvalidOrder(e.to_string())
    }
}
