//! # Lokapasar payment server
//! This crate hosts the HTTP surface of the Lokapasar order-and-payment core. It is responsible for:
//! * Accepting order creation and payment initiation requests from the storefront.
//! * Receiving and authenticating payment webhook callbacks from the provider, and feeding them to the reconciler.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: liveness check.
//! * `/orders`: order creation and listing (buyer identity comes from the `x-buyer-id` header, which the upstream
//!   auth proxy sets).
//! * `/payments/...`: per-rail payment initiation, capability listing and a status poll.
//! * `/callback/...`: provider webhooks, behind the callback-token middleware.
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;

pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
