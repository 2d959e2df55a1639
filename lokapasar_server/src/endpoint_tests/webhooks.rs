use actix_web::{http::StatusCode, web, web::ServiceConfig};
use lokapasar_engine::{db_types::PaymentStatus, ReconcilerApi};
use lp_common::Secret;
use serde_json::{json, Value};

use super::helpers::post_request;
use crate::{
    endpoint_tests::mocks::{sample_order, MockBackend},
    middleware::CallbackTokenMiddlewareFactory,
    webhook_routes::{EwalletCallbackRoute, InvoiceCallbackRoute, QrisCallbackRoute, VaCallbackRoute},
};

const TOKEN: &str = "xnd-callback-verification-token";

#[actix_web::test]
async fn callbacks_without_a_token_are_rejected() {
    let _ = env_logger::try_init().ok();
    let err =
        post_request(&[], "/callback/invoice", invoice_paid_json(), configure_untouched).await.expect_err("Expected error");
    assert_eq!(err, "Invalid or missing callback token.");
}

#[actix_web::test]
async fn callbacks_with_a_bad_token_are_rejected() {
    let _ = env_logger::try_init().ok();
    let err = post_request(&[("x-callback-token", "guess")], "/callback/invoice", invoice_paid_json(), configure_untouched)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Invalid or missing callback token.");
}

#[actix_web::test]
async fn invoice_paid_settles_the_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request(&[("x-callback-token", TOKEN)], "/callback/invoice", invoice_paid_json(), configure_unpaid)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let res: Value = serde_json::from_str(&body).expect("Body is not JSON");
    assert_eq!(res["success"], true);
    assert_eq!(res["message"], "Order INV/20250101/ABC123 updated");
}

#[actix_web::test]
async fn duplicate_settlements_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request(&[("x-callback-token", TOKEN)], "/callback/va", va_json(), configure_already_paid)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let res: Value = serde_json::from_str(&body).expect("Body is not JSON");
    assert_eq!(res["success"], true);
    assert_eq!(res["message"], "Order INV/20250101/ABC123 already settled");
}

#[actix_web::test]
async fn unknown_references_are_still_acknowledged() {
    let _ = env_logger::try_init().ok();
    let payload = json!({ "external_id": "INV/20250101/NOSUCH", "status": "COMPLETED", "amount": 195_000 });
    let (status, body) = post_request(&[("x-callback-token", TOKEN)], "/callback/qris", payload, configure_unknown)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let res: Value = serde_json::from_str(&body).expect("Body is not JSON");
    assert_eq!(res["success"], false);
    assert_eq!(res["message"], "Unknown reference INV/20250101/NOSUCH");
}

// Interim statuses never reach the conditional update; the only store access is the reference lookup.
#[actix_web::test]
async fn interim_statuses_are_acknowledged_without_a_transition() {
    let _ = env_logger::try_init().ok();
    let payload = json!({
        "event": "ewallet.capture",
        "data": { "reference_id": "INV/20250101/ABC123", "status": "PENDING" }
    });
    let (status, body) = post_request(&[("x-callback-token", TOKEN)], "/callback/ewallet", payload, configure_unpaid_readonly)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let res: Value = serde_json::from_str(&body).expect("Body is not JSON");
    assert_eq!(res["success"], true);
    assert_eq!(res["message"], "Notification acknowledged");
}

fn invoice_paid_json() -> Value {
    json!({
        "external_id": "INV/20250101/ABC123",
        "status": "PAID",
        "paid_amount": 195_000,
        "paid_at": "2025-01-02T08:15:00Z",
        "payment_method": "BANK_TRANSFER",
        "payment_channel": "BCA"
    })
}

fn va_json() -> Value {
    json!({
        "external_id": "INV/20250101/ABC123",
        "payment_id": "payment-1",
        "amount": 195_000,
        "transaction_timestamp": "2025-01-02T08:15:00Z"
    })
}

// The backend is wired with no expectations at all: if an unauthenticated event reaches the store, the mock panics
// and the test fails.
fn configure_untouched(cfg: &mut ServiceConfig) {
    configure(cfg, MockBackend::new());
}

// Reads are allowed, mutations are not.
fn configure_unpaid_readonly(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_number().returning(|_| Ok(Some(sample_order(PaymentStatus::Unpaid))));
    configure(cfg, backend);
}

fn configure_unpaid(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_number().returning(|_| Ok(Some(sample_order(PaymentStatus::Unpaid))));
    backend.expect_update_payment_status().returning(|_, _, _| Ok(Some(sample_order(PaymentStatus::Paid))));
    configure(cfg, backend);
}

// The conditional update refuses the transition, and the refetch shows the order already settled.
fn configure_already_paid(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_number().returning(|_| Ok(Some(sample_order(PaymentStatus::Paid))));
    backend.expect_update_payment_status().returning(|_, _, _| Ok(None));
    configure(cfg, backend);
}

fn configure_unknown(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_number().returning(|_| Ok(None));
    configure(cfg, backend);
}

fn configure(cfg: &mut ServiceConfig, backend: MockBackend) {
    let api = ReconcilerApi::new(backend);
    let callbacks = web::scope("/callback")
        .wrap(CallbackTokenMiddlewareFactory::new(Secret::new(TOKEN.to_string())))
        .service(InvoiceCallbackRoute::<MockBackend>::new())
        .service(VaCallbackRoute::<MockBackend>::new())
        .service(EwalletCallbackRoute::<MockBackend>::new())
        .service(QrisCallbackRoute::<MockBackend>::new());
    cfg.service(callbacks).app_data(web::Data::new(api));
}
