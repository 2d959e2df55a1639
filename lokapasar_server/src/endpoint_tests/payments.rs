use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Duration;
use lokapasar_engine::{db_types::PaymentStatus, traits::GatewayError, OrderFlowApi};
use serde_json::{json, Value};

use super::helpers::{get_request, post_request};
use crate::{
    config::ServerOptions,
    endpoint_tests::mocks::{sample_order, MockBackend, MockGateway},
    routes::{payment_methods, PaymentStatusRoute, VaPaymentRoute},
};

#[actix_web::test]
async fn payment_methods_lists_the_channels() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&[], "/payments/methods", configure_methods).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let methods: Value = serde_json::from_str(&body).expect("Body is not JSON");
    let banks = methods["virtual_accounts"].as_array().expect("Expected a bank list");
    assert!(banks.iter().any(|b| b["code"] == "BCA"));
    let wallets = methods["ewallets"].as_array().expect("Expected a wallet list");
    assert!(wallets.iter().any(|w| w["code"] == "ID_OVO" && w["requires_phone"] == true));
    assert_eq!(methods["qris"]["available"], true);
}

#[actix_web::test]
async fn paying_a_settled_order_is_a_conflict() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request(&[("x-buyer-id", "42")], "/payments/virtual-account", va_params(), configure_paid)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("The order is not payable"), "unexpected body: {body}");
}

#[actix_web::test]
async fn gateway_rejections_are_unprocessable() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request(&[("x-buyer-id", "42")], "/payments/virtual-account", va_params(), configure_rejecting)
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("rejected"), "unexpected body: {body}");
}

#[actix_web::test]
async fn payment_status_poll() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&[("x-buyer-id", "42")], "/payments/status/1", configure_paid).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let poll: Value = serde_json::from_str(&body).expect("Body is not JSON");
    assert_eq!(poll["order_number"], "INV/20250101/ABC123");
    assert_eq!(poll["payment_status"], "Paid");
    assert!(poll["paid_at"].is_string());
}

fn va_params() -> Value {
    json!({ "order_id": 1, "bank_code": "BCA", "display_name": "Budi Santoso" })
}

fn configure_methods(cfg: &mut ServiceConfig) {
    cfg.service(payment_methods);
}

fn configure_paid(cfg: &mut ServiceConfig) {
    configure(cfg, PaymentStatus::Paid);
}

fn configure_rejecting(cfg: &mut ServiceConfig) {
    configure(cfg, PaymentStatus::Unpaid);
}

fn configure(cfg: &mut ServiceConfig, payment_status: PaymentStatus) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order().returning(move |_, _| Ok(Some(sample_order(payment_status))));
    let api = OrderFlowApi::new(backend);
    let mut gateway = MockGateway::new();
    gateway.expect_initiate().returning(|_| Err(GatewayError::Rejected("BANK_NOT_SUPPORTED".to_string())));
    let options = ServerOptions { gateway_timeout: Duration::seconds(5) };
    cfg.service(VaPaymentRoute::<MockBackend, MockGateway>::new())
        .service(PaymentStatusRoute::<MockBackend>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(gateway))
        .app_data(web::Data::new(options));
}
