use std::fmt::Display;

use chrono::{DateTime, Utc};
use lokapasar_engine::db_types::{Order, OrderItem};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use xendit_tools::{supported_banks, supported_ewallets, BankChannel, EwalletChannel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetailResponse {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

//--------------------------------------  Payment initiation  ---------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct VirtualAccountPaymentParams {
    pub order_id: i64,
    pub bank_code: String,
    /// The account-holder name shown at the buyer's bank.
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EwalletPaymentParams {
    pub order_id: i64,
    pub channel_code: String,
    pub mobile_number: Option<String>,
    pub success_redirect_url: Option<String>,
    pub failure_redirect_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrisPaymentParams {
    pub order_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoicePaymentParams {
    pub order_id: i64,
    pub payer_email: String,
    pub success_redirect_url: Option<String>,
    pub failure_redirect_url: Option<String>,
}

/// The capability listing for `GET /payments/methods`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodsResponse {
    pub virtual_accounts: &'static [BankChannel],
    pub ewallets: &'static [EwalletChannel],
    pub qris: QrisAvailability,
}

#[derive(Debug, Clone, Serialize)]
pub struct QrisAvailability {
    pub available: bool,
    pub name: &'static str,
}

impl PaymentMethodsResponse {
    pub fn current() -> Self {
        Self {
            virtual_accounts: supported_banks(),
            ewallets: supported_ewallets(),
            qris: QrisAvailability { available: true, name: "QRIS" },
        }
    }
}

/// The owner-scoped payment status poll for `GET /payments/status/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatusResponse {
    pub order_id: i64,
    pub order_number: String,
    pub payment_status: String,
    pub paid_at: Option<DateTime<Utc>>,
}

//--------------------------------------  Webhook payloads  -----------------------------------------------------------
/// Invoice callback body. `paid_amount` and `paid_at` are only present on `PAID` events.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceCallbackPayload {
    pub external_id: String,
    pub status: String,
    #[serde(default)]
    pub paid_amount: Option<i64>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_channel: Option<String>,
}

/// Virtual-account payment callback body. The provider only calls this endpoint when money actually arrived, so
/// there is no status field; receipt of the event is the settlement signal.
#[derive(Debug, Clone, Deserialize)]
pub struct VaCallbackPayload {
    pub external_id: String,
    pub payment_id: String,
    pub amount: i64,
    #[serde(default)]
    pub transaction_timestamp: Option<DateTime<Utc>>,
}

/// E-wallet callback body; the interesting fields are nested under `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct EwalletCallbackPayload {
    #[serde(default)]
    pub event: Option<String>,
    pub data: EwalletCallbackData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EwalletCallbackData {
    pub reference_id: String,
    pub status: String,
    #[serde(default)]
    pub charge_amount: Option<i64>,
    #[serde(flatten)]
    pub rest: Value,
}

/// QRIS payment callback body.
#[derive(Debug, Clone, Deserialize)]
pub struct QrisCallbackPayload {
    pub external_id: String,
    pub status: String,
    #[serde(default)]
    pub amount: Option<i64>,
}
