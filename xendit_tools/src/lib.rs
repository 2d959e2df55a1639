//! A thin, typed client for the subset of the Xendit REST API that Lokapasar uses: fixed virtual accounts, e-wallet
//! charges, dynamic QRIS codes and hosted invoices. [`XenditApi`] implements the engine's
//! [`PaymentGateway`](lokapasar_engine::traits::PaymentGateway) contract, so the engine never sees anything
//! Xendit-specific.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::XenditApi;
pub use config::XenditConfig;
pub use data_objects::{
    supported_banks,
    supported_ewallets,
    BankChannel,
    CreateEwalletCharge,
    CreateInvoice,
    CreateQrCode,
    CreateVirtualAccount,
    EwalletChannel,
    EwalletChannelProperties,
    EwalletChargeResponse,
    InvoiceItemEntry,
    InvoiceResponse,
    InvoiceStatusResponse,
    QrCodeResponse,
    VirtualAccountResponse,
    INVOICE_PAYMENT_METHODS,
};
pub use error::XenditApiError;
