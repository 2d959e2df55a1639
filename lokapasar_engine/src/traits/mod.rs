//! Contracts the engine is generic over.
//!
//! Backends (currently only SQLite) implement [`OrderStore`] and [`ProductCatalog`]; gateway integrations (currently
//! only `xendit_tools`) implement [`PaymentGateway`]. The APIs in this crate never talk to storage or the network
//! except through these traits.
mod catalog;
mod order_store;
mod payment_gateway;

pub use catalog::ProductCatalog;
pub use order_store::{OrderStore, OrderStoreError, StatusUpdate};
pub use payment_gateway::{GatewayError, PaymentGateway};
