use chrono::{DateTime, Utc};
use lokapasar_engine::{
    db_types::{NewOrder, Order, OrderItem, OrderNumber, OrderStatus, PaymentStatus},
    gateway::{PaymentIntent, PaymentRequest},
    pricing::Product,
    traits::{GatewayError, OrderStore, OrderStoreError, PaymentGateway, ProductCatalog, StatusUpdate},
};
use lp_common::Rupiah;
use mockall::mock;

mock! {
    pub Backend {}
    impl OrderStore for Backend {
        fn url(&self) -> &str;
        async fn create_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;
        async fn fetch_order(&self, id: i64, buyer_id: i64) -> Result<Option<Order>, OrderStoreError>;
        async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderStoreError>;
        async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderStoreError>;
        async fn fetch_orders_for_buyer(&self, buyer_id: i64, status: Option<OrderStatus>) -> Result<Vec<Order>, OrderStoreError>;
        async fn record_payment_intent(&self, number: &OrderNumber, method: &str, reference: &str, note: &str, expires_at: DateTime<Utc>) -> Result<Option<Order>, OrderStoreError>;
        async fn update_payment_status(&self, number: &OrderNumber, expected: &[PaymentStatus], update: StatusUpdate) -> Result<Option<Order>, OrderStoreError>;
        async fn close(&mut self) -> Result<(), OrderStoreError>;
    }
    impl ProductCatalog for Backend {
        async fn products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, OrderStoreError>;
    }
    impl Clone for Backend {
        fn clone(&self) -> Self;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn initiate(&self, request: &PaymentRequest) -> Result<PaymentIntent, GatewayError>;
    }
}

/// A fully populated order for mock responses.
pub fn sample_order(payment_status: PaymentStatus) -> Order {
    let status = match payment_status {
        PaymentStatus::Paid => OrderStatus::Paid,
        _ => OrderStatus::PendingPayment,
    };
    Order {
        id: 1,
        order_number: OrderNumber::from("INV/20250101/ABC123".to_string()),
        buyer_id: 42,
        store_id: 1,
        address_id: 1,
        voucher_id: None,
        subtotal: Rupiah::from(180_000),
        shipping_cost: Rupiah::from(15_000),
        total_amount: Rupiah::from(195_000),
        courier: "jne".to_string(),
        courier_service: "REG".to_string(),
        payment_method: None,
        payment_reference: None,
        payment_expires_at: None,
        status,
        payment_status,
        paid_at: matches!(payment_status, PaymentStatus::Paid).then(Utc::now),
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
