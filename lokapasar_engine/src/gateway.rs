//! Rail-agnostic payment-gateway data objects.
//!
//! The four payment rails (virtual-account transfer, e-wallet charge, QRIS, hosted invoice) have different request
//! shapes and different display payloads, but the engine only ever sees the common [`PaymentRequest`] /
//! [`PaymentIntent`] pair. The rail is an explicit discriminator, never inferred from the payload.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use lp_common::Rupiah;
use serde::{Deserialize, Serialize};

use crate::db_types::{ConversionError, OrderNumber, PaymentStatus};

//--------------------------------------     PaymentRail       -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentRail {
    VirtualAccount,
    Ewallet,
    Qris,
    Invoice,
}

impl Display for PaymentRail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentRail::VirtualAccount => write!(f, "VirtualAccount"),
            PaymentRail::Ewallet => write!(f, "Ewallet"),
            PaymentRail::Qris => write!(f, "Qris"),
            PaymentRail::Invoice => write!(f, "Invoice"),
        }
    }
}

impl FromStr for PaymentRail {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VirtualAccount" => Ok(Self::VirtualAccount),
            "Ewallet" => Ok(Self::Ewallet),
            "Qris" => Ok(Self::Qris),
            "Invoice" => Ok(Self::Invoice),
            s => Err(ConversionError(format!("Invalid payment rail: {s}"))),
        }
    }
}

//--------------------------------------      RailParams       -------------------------------------------------------
/// The rail-specific part of a payment-initiation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rail")]
pub enum RailParams {
    VirtualAccount {
        /// Provider bank code, e.g. `BCA`, `MANDIRI`.
        bank_code: String,
        /// The account-holder name shown at the buyer's bank.
        display_name: String,
    },
    Ewallet {
        /// Provider channel code, e.g. `ID_OVO`, `ID_DANA`.
        channel_code: String,
        /// Required by OVO; other wallets use redirect URLs instead.
        mobile_number: Option<String>,
        success_redirect_url: Option<String>,
        failure_redirect_url: Option<String>,
    },
    Qris,
    Invoice {
        payer_email: String,
        description: String,
        items: Vec<InvoiceItem>,
        success_redirect_url: Option<String>,
        failure_redirect_url: Option<String>,
    },
}

impl RailParams {
    pub fn rail(&self) -> PaymentRail {
        match self {
            RailParams::VirtualAccount { .. } => PaymentRail::VirtualAccount,
            RailParams::Ewallet { .. } => PaymentRail::Ewallet,
            RailParams::Qris => PaymentRail::Qris,
            RailParams::Invoice { .. } => PaymentRail::Invoice,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub name: String,
    pub quantity: i64,
    pub price: Rupiah,
}

/// One request to the external gateway. `reference` is always the order number; it doubles as the idempotency key
/// between Lokapasar and the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub reference: OrderNumber,
    pub amount: Rupiah,
    pub params: RailParams,
}

impl PaymentRequest {
    pub fn rail(&self) -> PaymentRail {
        self.params.rail()
    }
}

//--------------------------------------     PaymentIntent     -------------------------------------------------------
/// The common result shape of a payment initiation: a payable instrument the buyer can act on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Provider-assigned id of the instrument.
    pub provider_id: String,
    pub reference: OrderNumber,
    pub amount: Rupiah,
    pub expires_at: DateTime<Utc>,
    /// The provider's own status string for the instrument, passed through untouched.
    pub status: String,
    pub payload: IntentPayload,
}

/// Rail-specific display data for a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum IntentPayload {
    BankTransfer { bank_code: String, account_number: String },
    EwalletCheckout { channel_code: String, actions: serde_json::Value },
    QrCode { qr_string: String },
    Checkout { invoice_url: String },
}

impl PaymentIntent {
    /// The note recorded on the order for this intent, mirroring what support staff expect to see.
    pub fn order_note(&self) -> String {
        match &self.payload {
            IntentPayload::BankTransfer { bank_code, account_number } => format!("VA: {account_number} ({bank_code})"),
            IntentPayload::EwalletCheckout { channel_code, .. } => format!("E-Wallet: {channel_code}"),
            IntentPayload::QrCode { .. } => format!("QRIS ID: {}", self.provider_id),
            IntentPayload::Checkout { .. } => format!("Xendit Invoice: {}", self.provider_id),
        }
    }
}

//--------------------------------------     WebhookEvent      -------------------------------------------------------
/// An inbound provider notification after it has passed authentication in the server layer. One-shot input; never
/// persisted as its own entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub rail: PaymentRail,
    pub reference: OrderNumber,
    pub status: String,
    pub paid_amount: Option<Rupiah>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Maps a provider status string to a terminal payment status, per rail. The tables are fixed; anything not listed
/// here is an interim status the reconciler acknowledges and ignores.
pub fn map_provider_status(rail: PaymentRail, status: &str) -> Option<PaymentStatus> {
    match (rail, status) {
        (PaymentRail::Invoice, "PAID") => Some(PaymentStatus::Paid),
        (PaymentRail::Invoice, "EXPIRED") => Some(PaymentStatus::Expired),
        (PaymentRail::VirtualAccount, "COMPLETED") => Some(PaymentStatus::Paid),
        (PaymentRail::Ewallet, "SUCCEEDED") => Some(PaymentStatus::Paid),
        (PaymentRail::Ewallet, "FAILED") => Some(PaymentStatus::Failed),
        (PaymentRail::Ewallet, "VOIDED") => Some(PaymentStatus::Failed),
        (PaymentRail::Qris, "COMPLETED") => Some(PaymentStatus::Paid),
        (PaymentRail::Qris, "EXPIRED") => Some(PaymentStatus::Expired),
        _ => None,
    }
}
