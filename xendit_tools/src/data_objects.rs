//! Wire types for the Xendit endpoints Lokapasar calls. Request bodies serialize to the snake_case JSON the REST API
//! expects; responses only declare the fields we read, everything else is ignored on deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

//--------------------------------------   Virtual accounts   --------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct CreateVirtualAccount {
    pub external_id: String,
    pub bank_code: String,
    pub name: String,
    pub expected_amount: i64,
    pub is_closed: bool,
    pub is_single_use: bool,
    pub expiration_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VirtualAccountResponse {
    pub id: String,
    pub external_id: String,
    pub bank_code: String,
    pub account_number: String,
    pub status: String,
    pub expiration_date: DateTime<Utc>,
}

//--------------------------------------    E-wallet charges   -------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct CreateEwalletCharge {
    pub reference_id: String,
    pub currency: String,
    pub amount: i64,
    pub checkout_method: String,
    pub channel_code: String,
    pub channel_properties: EwalletChannelProperties,
}

/// OVO charges take a mobile number; the other wallets take redirect URLs. Empty fields are omitted from the body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EwalletChannelProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_redirect_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EwalletChargeResponse {
    pub id: String,
    pub reference_id: String,
    pub status: String,
    pub channel_code: String,
    /// Checkout actions (deeplinks, checkout URLs). Shape varies per wallet; passed through untouched.
    #[serde(default)]
    pub actions: Value,
}

//--------------------------------------       QR codes        -------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct CreateQrCode {
    pub external_id: String,
    #[serde(rename = "type")]
    pub qr_type: String,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrCodeResponse {
    pub id: String,
    pub external_id: String,
    pub qr_string: String,
    pub status: String,
}

//--------------------------------------       Invoices        -------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct CreateInvoice {
    pub external_id: String,
    pub amount: i64,
    pub payer_email: String,
    pub description: String,
    pub invoice_duration: u64,
    pub currency: String,
    pub items: Vec<InvoiceItemEntry>,
    pub payment_methods: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_redirect_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceItemEntry {
    pub name: String,
    pub quantity: i64,
    pub price: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub external_id: String,
    pub invoice_url: String,
    pub status: String,
    pub expiry_date: DateTime<Utc>,
}

/// The poll shape of an invoice, richer than the creation response once payment has happened.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceStatusResponse {
    pub id: String,
    pub external_id: String,
    pub status: String,
    pub amount: i64,
    #[serde(default)]
    pub paid_amount: Option<i64>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_channel: Option<String>,
}

//--------------------------------------   Capability tables   -------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct BankChannel {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EwalletChannel {
    pub code: &'static str,
    pub name: &'static str,
    pub requires_phone: bool,
}

/// The banks virtual accounts can be issued against.
pub fn supported_banks() -> &'static [BankChannel] {
    &[
        BankChannel { code: "BCA", name: "Bank Central Asia" },
        BankChannel { code: "BNI", name: "Bank Negara Indonesia" },
        BankChannel { code: "BRI", name: "Bank Rakyat Indonesia" },
        BankChannel { code: "MANDIRI", name: "Bank Mandiri" },
        BankChannel { code: "PERMATA", name: "Bank Permata" },
        BankChannel { code: "BSI", name: "Bank Syariah Indonesia" },
        BankChannel { code: "BJB", name: "Bank Jabar Banten" },
        BankChannel { code: "CIMB", name: "CIMB Niaga" },
    ]
}

/// The e-wallet channels one-time charges can be created on.
pub fn supported_ewallets() -> &'static [EwalletChannel] {
    &[
        EwalletChannel { code: "ID_OVO", name: "OVO", requires_phone: true },
        EwalletChannel { code: "ID_DANA", name: "DANA", requires_phone: false },
        EwalletChannel { code: "ID_SHOPEEPAY", name: "ShopeePay", requires_phone: false },
        EwalletChannel { code: "ID_LINKAJA", name: "LinkAja", requires_phone: false },
        EwalletChannel { code: "ID_GOPAY", name: "GoPay", requires_phone: false },
    ]
}

/// The payment methods offered on a hosted invoice.
pub const INVOICE_PAYMENT_METHODS: [&str; 10] =
    ["BCA", "BNI", "BRI", "MANDIRI", "PERMATA", "OVO", "DANA", "SHOPEEPAY", "LINKAJA", "QRIS"];
