use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::*;
use lokapasar_engine::{
    gateway::{IntentPayload, PaymentIntent, PaymentRequest, RailParams},
    traits::{GatewayError, PaymentGateway},
};
use reqwest::{header::HeaderValue, Client, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::XenditConfig,
    data_objects::{
        supported_banks,
        supported_ewallets,
        CreateEwalletCharge,
        CreateInvoice,
        CreateQrCode,
        CreateVirtualAccount,
        EwalletChannelProperties,
        EwalletChargeResponse,
        InvoiceItemEntry,
        InvoiceResponse,
        InvoiceStatusResponse,
        QrCodeResponse,
        VirtualAccountResponse,
        INVOICE_PAYMENT_METHODS,
    },
    XenditApiError,
};

/// Payment instruments lapse on their own after this long if the buyer never pays.
const INTENT_VALIDITY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct XenditApi {
    config: XenditConfig,
    client: Arc<Client>,
}

impl XenditApi {
    pub fn new(config: XenditConfig) -> Result<Self, XenditApiError> {
        let mut headers = reqwest::header::HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| XenditApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Sends one authenticated request. The API key goes in as the Basic-auth username with an empty password, per
    /// the provider's auth scheme.
    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, XenditApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req =
            self.client.request(method, url).basic_auth(self.config.secret_key.reveal().as_str(), Some(""));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                XenditApiError::Timeout(e.to_string())
            } else {
                XenditApiError::RestResponseError(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| XenditApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| XenditApiError::RestResponseError(e.to_string()))?;
            Err(XenditApiError::QueryError { status, message })
        }
    }

    pub async fn create_virtual_account(
        &self,
        req: CreateVirtualAccount,
    ) -> Result<VirtualAccountResponse, XenditApiError> {
        if !supported_banks().iter().any(|b| b.code == req.bank_code) {
            return Err(XenditApiError::UnsupportedChannel(req.bank_code));
        }
        debug!("Creating fixed VA at {} for [{}]", req.bank_code, req.external_id);
        let result =
            self.rest_query::<VirtualAccountResponse, _>(Method::POST, "/callback_virtual_accounts", Some(req)).await?;
        info!("Created VA {} ({} {})", result.id, result.bank_code, result.account_number);
        Ok(result)
    }

    pub async fn create_ewallet_charge(
        &self,
        req: CreateEwalletCharge,
    ) -> Result<EwalletChargeResponse, XenditApiError> {
        if !supported_ewallets().iter().any(|w| w.code == req.channel_code) {
            return Err(XenditApiError::UnsupportedChannel(req.channel_code));
        }
        debug!("Creating {} charge for [{}]", req.channel_code, req.reference_id);
        let result = self.rest_query::<EwalletChargeResponse, _>(Method::POST, "/ewallets/charges", Some(req)).await?;
        info!("Created e-wallet charge {} on {}", result.id, result.channel_code);
        Ok(result)
    }

    pub async fn create_qr_code(&self, req: CreateQrCode) -> Result<QrCodeResponse, XenditApiError> {
        debug!("Creating dynamic QR code for [{}]", req.external_id);
        let result = self.rest_query::<QrCodeResponse, _>(Method::POST, "/qr_codes", Some(req)).await?;
        info!("Created QR code {}", result.id);
        Ok(result)
    }

    pub async fn create_invoice(&self, req: CreateInvoice) -> Result<InvoiceResponse, XenditApiError> {
        debug!("Creating hosted invoice for [{}]", req.external_id);
        let result = self.rest_query::<InvoiceResponse, _>(Method::POST, "/v2/invoices", Some(req)).await?;
        info!("Created invoice {}", result.id);
        Ok(result)
    }

    /// Polls the current status of a hosted invoice. Used for the status endpoint; webhooks remain the source of
    /// truth for settlement.
    pub async fn get_invoice(&self, invoice_id: &str) -> Result<InvoiceStatusResponse, XenditApiError> {
        let path = format!("/v2/invoices/{invoice_id}");
        debug!("Fetching invoice {invoice_id}");
        self.rest_query::<InvoiceStatusResponse, ()>(Method::GET, &path, None).await
    }
}

impl PaymentGateway for XenditApi {
    async fn initiate(&self, request: &PaymentRequest) -> Result<PaymentIntent, GatewayError> {
        let reference = request.reference.clone();
        let amount = request.amount;
        let expires_at = Utc::now() + chrono::Duration::from_std(INTENT_VALIDITY).unwrap_or(chrono::Duration::zero());
        let intent = match &request.params {
            RailParams::VirtualAccount { bank_code, display_name } => {
                let req = CreateVirtualAccount {
                    external_id: reference.to_string(),
                    bank_code: bank_code.clone(),
                    name: display_name.clone(),
                    expected_amount: amount.value(),
                    is_closed: true,
                    is_single_use: true,
                    expiration_date: expires_at,
                };
                let res = self.create_virtual_account(req).await?;
                PaymentIntent {
                    provider_id: res.id,
                    reference,
                    amount,
                    expires_at: res.expiration_date,
                    status: res.status,
                    payload: IntentPayload::BankTransfer {
                        bank_code: res.bank_code,
                        account_number: res.account_number,
                    },
                }
            },
            RailParams::Ewallet { channel_code, mobile_number, success_redirect_url, failure_redirect_url } => {
                // OVO charges are pushed to the buyer's phone; the other wallets bounce through a redirect.
                let channel_properties = if channel_code == "ID_OVO" && mobile_number.is_some() {
                    EwalletChannelProperties { mobile_number: mobile_number.clone(), ..Default::default() }
                } else {
                    EwalletChannelProperties {
                        mobile_number: None,
                        success_redirect_url: success_redirect_url.clone(),
                        failure_redirect_url: failure_redirect_url.clone().or_else(|| success_redirect_url.clone()),
                    }
                };
                let req = CreateEwalletCharge {
                    reference_id: reference.to_string(),
                    currency: lp_common::IDR_CURRENCY_CODE.to_string(),
                    amount: amount.value(),
                    checkout_method: "ONE_TIME_PAYMENT".to_string(),
                    channel_code: channel_code.clone(),
                    channel_properties,
                };
                let res = self.create_ewallet_charge(req).await?;
                PaymentIntent {
                    provider_id: res.id,
                    reference,
                    amount,
                    expires_at,
                    status: res.status,
                    payload: IntentPayload::EwalletCheckout { channel_code: res.channel_code, actions: res.actions },
                }
            },
            RailParams::Qris => {
                let req = CreateQrCode {
                    external_id: reference.to_string(),
                    qr_type: "DYNAMIC".to_string(),
                    amount: amount.value(),
                    callback_url: None,
                };
                let res = self.create_qr_code(req).await?;
                PaymentIntent {
                    provider_id: res.id,
                    reference,
                    amount,
                    expires_at,
                    status: res.status,
                    payload: IntentPayload::QrCode { qr_string: res.qr_string },
                }
            },
            RailParams::Invoice { payer_email, description, items, success_redirect_url, failure_redirect_url } => {
                let items = items
                    .iter()
                    .map(|i| InvoiceItemEntry { name: i.name.clone(), quantity: i.quantity, price: i.price.value() })
                    .collect();
                let req = CreateInvoice {
                    external_id: reference.to_string(),
                    amount: amount.value(),
                    payer_email: payer_email.clone(),
                    description: description.clone(),
                    invoice_duration: INTENT_VALIDITY.as_secs(),
                    currency: lp_common::IDR_CURRENCY_CODE.to_string(),
                    items,
                    payment_methods: INVOICE_PAYMENT_METHODS.iter().map(|s| s.to_string()).collect(),
                    success_redirect_url: success_redirect_url.clone(),
                    failure_redirect_url: failure_redirect_url.clone(),
                };
                let res = self.create_invoice(req).await?;
                PaymentIntent {
                    provider_id: res.id,
                    reference,
                    amount,
                    expires_at: res.expiry_date,
                    status: res.status,
                    payload: IntentPayload::Checkout { invoice_url: res.invoice_url },
                }
            },
        };
        Ok(intent)
    }
}
