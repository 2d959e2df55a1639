use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use lp_common::Rupiah;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------     OrderNumber       -------------------------------------------------------
/// The human-readable, globally unique order identifier, e.g. `INV/20250101/ABC123`. This is distinct from the
/// internal numeric primary key; it is the reference the payment provider echoes back in webhook payloads and is
/// therefore the idempotency key between Lokapasar and the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks the `<TAG>/<YYYYMMDD>/<6-char base36>` shape without touching the database.
    pub fn matches_format(&self, tag: &str) -> bool {
        let mut parts = self.0.splitn(3, '/');
        let (t, date, suffix) = match (parts.next(), parts.next(), parts.next()) {
            (Some(t), Some(d), Some(s)) => (t, d, s),
            _ => return false,
        };
        t == tag
            && date.len() == 8
            && date.chars().all(|c| c.is_ascii_digit())
            && suffix.len() == 6
            && suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------     OrderStatus       -------------------------------------------------------
/// The fulfilment axis of an order's lifecycle. The engine only ever drives the `PendingPayment -> Paid` transition;
/// everything downstream of `Paid` belongs to the order-management services outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order has been created and no payment has been confirmed yet.
    PendingPayment,
    /// Payment has been received in full.
    Paid,
    /// The store is preparing the order.
    Fulfilling,
    /// The order has been handed to the courier.
    Shipped,
    /// The order has arrived.
    Delivered,
    /// The order was cancelled before payment completed.
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::PendingPayment => write!(f, "PendingPayment"),
            OrderStatus::Paid => write!(f, "Paid"),
            OrderStatus::Fulfilling => write!(f, "Fulfilling"),
            OrderStatus::Shipped => write!(f, "Shipped"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PendingPayment" => Ok(Self::PendingPayment),
            "Paid" => Ok(Self::Paid),
            "Fulfilling" => Ok(Self::Fulfilling),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------    PaymentStatus      -------------------------------------------------------
/// The payment axis of an order's lifecycle: `Unpaid -> Pending -> {Paid | Expired | Failed}`.
///
/// `Paid`, `Expired` and `Failed` are terminal. No transition ever leaves a terminal state; the webhook reconciler
/// enforces this with a conditional update whose precondition is `{Unpaid, Pending}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// No payment intent has been created for the order.
    Unpaid,
    /// A payment intent exists at the provider and we are waiting for a callback.
    Pending,
    /// The provider confirmed payment in full.
    Paid,
    /// The payment intent lapsed before the buyer paid.
    Expired,
    /// The provider reported the payment as failed or voided.
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Expired | PaymentStatus::Failed)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "Unpaid"),
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Expired => write!(f, "Expired"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaid" => Ok(Self::Unpaid),
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Expired" => Ok(Self::Expired),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub buyer_id: i64,
    pub store_id: i64,
    pub address_id: i64,
    pub voucher_id: Option<i64>,
    pub subtotal: Rupiah,
    pub shipping_cost: Rupiah,
    pub total_amount: Rupiah,
    pub courier: String,
    pub courier_service: String,
    /// The payment method hint given at creation, replaced by the rail actually used once an intent exists.
    pub payment_method: Option<String>,
    /// The provider-assigned id of the outstanding payment intent, if any.
    pub payment_reference: Option<String>,
    /// When the outstanding intent lapses at the provider. Not every rail sends an expiry webhook, so this is the
    /// only signal that lets a buyer re-initiate after abandoning an intent.
    pub payment_expires_at: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      OrderItem      ---------------------------------------------------------
/// A line item, immutable once the order is created. `price` is the discounted unit price snapshotted at creation
/// time, so later catalog changes never retroactively affect a placed order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub price: Rupiah,
    pub quantity: i64,
    pub weight: i64,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
/// A fully priced order ready for atomic insertion. Produced by [`crate::pricing::price_cart`] via the order flow
/// API; never constructed from raw client input.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer_id: i64,
    pub store_id: i64,
    pub address_id: i64,
    pub voucher_id: Option<i64>,
    pub items: Vec<NewOrderItem>,
    pub subtotal: Rupiah,
    pub shipping_cost: Rupiah,
    pub total_amount: Rupiah,
    pub courier: String,
    pub courier_service: String,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub product_name: String,
    pub variant_name: Option<String>,
    /// Discounted unit price snapshot.
    pub price: Rupiah,
    pub quantity: i64,
    pub weight: i64,
}
