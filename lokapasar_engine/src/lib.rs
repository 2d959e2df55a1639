//! Lokapasar order-and-payment engine
//!
//! This library contains the correctness-critical core of the Lokapasar marketplace backend: pricing a cart into an
//! immutable order, initiating payments over the provider's rails, and reconciling asynchronous webhook notifications
//! into a single consistent order/payment status. It is provider-agnostic; any gateway that implements the
//! [`traits::PaymentGateway`] contract can sit behind it.
//!
//! The library is divided into three main sections:
//! 1. Pure domain logic ([`pricing`], [`gateway`], [`db_types`]). The pricing engine is deterministic and does no
//!    I/O, which is what makes the financial numbers auditable and testable.
//! 2. Storage ([`sqlite`] and the [`traits`] it implements). The database is the single source of truth; the
//!    conditional payment-status update it exposes is the only concurrency primitive in the system.
//! 3. The engine public API ([`OrderFlowApi`] and [`ReconcilerApi`]). These orchestrate the pieces above and are what
//!    the server crate talks to.
mod api;

pub mod db_types;
pub mod gateway;
pub mod helpers;
pub mod pricing;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{
    errors::OrderFlowError,
    order_flow_api::{CartSpec, OrderFlowApi},
    reconciler_api::{Reconciliation, ReconciliationAnomaly, ReconcilerApi},
};
