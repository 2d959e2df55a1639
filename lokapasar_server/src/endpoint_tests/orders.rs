use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use lokapasar_engine::{
    db_types::{Order, OrderItem, OrderNumber, OrderStatus, PaymentStatus},
    OrderFlowApi,
};
use lp_common::Rupiah;
use serde_json::{json, Value};

use super::helpers::{get_request, post_request};
use crate::{
    endpoint_tests::mocks::MockBackend,
    routes::{CreateOrderRoute, MyOrdersRoute, OrderByIdRoute},
};

#[actix_web::test]
async fn create_order_needs_a_buyer_identity() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request(&[], "/orders", cart_json(), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("x-buyer-id"), "unexpected body: {body}");
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&[("x-buyer-id", "42")], "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let orders: Value = serde_json::from_str(&body).expect("Body is not JSON");
    let orders = orders.as_array().expect("Expected a JSON array");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["order_number"], "INV/20240229/AAAA01");
    assert_eq!(orders[0]["payment_status"], "Paid");
    assert_eq!(orders[1]["order_number"], "INV/20240315/AAAA02");
    assert_eq!(orders[1]["payment_status"], "Unpaid");
}

#[actix_web::test]
async fn fetch_order_with_items() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&[("x-buyer-id", "42")], "/orders/10", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let detail: Value = serde_json::from_str(&body).expect("Body is not JSON");
    assert_eq!(detail["order"]["order_number"], "INV/20240229/AAAA01");
    assert_eq!(detail["items"][0]["product_name"], "Kopi Arabika Gayo 250g");
    assert_eq!(detail["items"][0]["price"], 90_000);
}

// The store returns `None` both for a missing order and for an order owned by another buyer, so this covers the
// cross-tenant probe as well.
#[actix_web::test]
async fn missing_orders_are_a_404() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&[("x-buyer-id", "42")], "/orders/99", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("The data was not found"), "unexpected body: {body}");
}

fn cart_json() -> Value {
    json!({
        "store_id": 1,
        "address_id": 1,
        "voucher_id": null,
        "items": [{ "product_id": 1, "variant_id": null, "quantity": 2 }],
        "courier": "jne",
        "courier_service": "REG",
        "shipping_cost": 15000,
        "payment_method": null,
        "notes": null
    })
}

fn configure(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_orders_for_buyer().returning(|_, _| Ok(orders_response()));
    backend.expect_fetch_order().returning(|id, _| match id {
        10 => Ok(Some(orders_response().remove(0))),
        _ => Ok(None),
    });
    backend.expect_fetch_order_items().returning(|_| Ok(items_response()));
    let api = OrderFlowApi::new(backend);
    cfg.service(CreateOrderRoute::<MockBackend>::new())
        .service(MyOrdersRoute::<MockBackend>::new())
        .service(OrderByIdRoute::<MockBackend>::new())
        .app_data(web::Data::new(api));
}

// Mock response to `fetch_orders_for_buyer` and `fetch_order` calls
fn orders_response() -> Vec<Order> {
    let ts = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 13, 30, 0).unwrap();
    vec![
        Order {
            id: 10,
            order_number: OrderNumber::from("INV/20240229/AAAA01".to_string()),
            buyer_id: 42,
            store_id: 1,
            address_id: 1,
            voucher_id: None,
            subtotal: Rupiah::from(180_000),
            shipping_cost: Rupiah::from(15_000),
            total_amount: Rupiah::from(195_000),
            courier: "jne".to_string(),
            courier_service: "REG".to_string(),
            payment_method: Some("VirtualAccount".to_string()),
            payment_reference: Some("va-1".to_string()),
            payment_expires_at: Some(ts(2024, 3, 1)),
            status: OrderStatus::Paid,
            payment_status: PaymentStatus::Paid,
            paid_at: Some(ts(2024, 2, 29)),
            notes: Some("VA: 9889123456 (BCA)".to_string()),
            created_at: ts(2024, 2, 29),
            updated_at: ts(2024, 2, 29),
        },
        Order {
            id: 11,
            order_number: OrderNumber::from("INV/20240315/AAAA02".to_string()),
            buyer_id: 42,
            store_id: 1,
            address_id: 1,
            voucher_id: None,
            subtotal: Rupiah::from(50_000),
            shipping_cost: Rupiah::from(9_000),
            total_amount: Rupiah::from(59_000),
            courier: "sicepat".to_string(),
            courier_service: "BEST".to_string(),
            payment_method: None,
            payment_reference: None,
            payment_expires_at: None,
            status: OrderStatus::PendingPayment,
            payment_status: PaymentStatus::Unpaid,
            paid_at: None,
            notes: None,
            created_at: ts(2024, 3, 15),
            updated_at: ts(2024, 3, 15),
        },
    ]
}

fn items_response() -> Vec<OrderItem> {
    vec![OrderItem {
        id: 1,
        order_id: 10,
        product_id: 1,
        variant_id: None,
        product_name: "Kopi Arabika Gayo 250g".to_string(),
        variant_name: None,
        price: Rupiah::from(90_000),
        quantity: 2,
        weight: 250,
    }]
}
