use thiserror::Error;

use crate::gateway::{PaymentIntent, PaymentRequest};

/// The rail-agnostic gateway contract. Implementations translate the common [`PaymentRequest`] into rail-specific
/// provider calls and the provider's responses back into a [`PaymentIntent`].
///
/// Implementations know nothing about orders; they are handed amounts, references and callback URLs by the order
/// flow API. They must apply their own transport timeout and surface it as [`GatewayError::Unavailable`]; a timed
/// out initiation is retryable and never means the payment itself failed.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn initiate(&self, request: &PaymentRequest) -> Result<PaymentIntent, GatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Transport failure or provider 5xx. The caller may retry with backoff; the order number is the idempotency key
    /// so a retry can never create a second charge.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
    /// Provider-side validation failure. Surfaced to the user, never retried.
    #[error("Payment gateway rejected the request: {0}")]
    Rejected(String),
}
