use std::fmt::Debug;

use chrono::Utc;
use log::*;
use lp_common::Rupiah;
use serde::{Deserialize, Serialize};

use crate::{
    api::errors::OrderFlowError,
    db_types::{NewOrder, Order, OrderItem, OrderStatus, PaymentStatus},
    gateway::{PaymentIntent, PaymentRequest, RailParams},
    pricing::{price_cart, CartLine},
    traits::{OrderStore, PaymentGateway, ProductCatalog},
};

/// The client-facing order specification: what the buyer chose, before any pricing has happened. Prices are never
/// taken from this structure; they come from the catalog snapshot at pricing time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSpec {
    pub store_id: i64,
    pub address_id: i64,
    pub voucher_id: Option<i64>,
    pub items: Vec<CartLine>,
    pub courier: String,
    pub courier_service: String,
    pub shipping_cost: Rupiah,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// `OrderFlowApi` is the order lifecycle manager: it orchestrates order creation (pricing engine → order store) and
/// payment initiation (order store → payment gateway), assigning the initial lifecycle states.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> Clone for OrderFlowApi<B>
where B: Clone
{
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: OrderStore + ProductCatalog
{
    /// Creates a new order for the buyer.
    ///
    /// The cart is priced against the current catalog snapshot, the line-item prices are frozen, and the order is
    /// persisted atomically with `PendingPayment` / `Unpaid` as its initial lifecycle states. The generated order
    /// number is the reference every later payment interaction uses.
    pub async fn create_order(&self, buyer_id: i64, spec: CartSpec) -> Result<Order, OrderFlowError> {
        if spec.items.is_empty() {
            return Err(OrderFlowError::InvalidOrder("the cart contains no items".into()));
        }
        let mut ids = spec.items.iter().map(|i| i.product_id).collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        let catalog = self.db.products_by_ids(&ids).await?;
        let priced = price_cart(&catalog, &spec.items, spec.shipping_cost)?;
        let order = NewOrder {
            buyer_id,
            store_id: spec.store_id,
            address_id: spec.address_id,
            voucher_id: spec.voucher_id,
            items: priced.items,
            subtotal: priced.subtotal,
            shipping_cost: spec.shipping_cost,
            total_amount: priced.total,
            courier: spec.courier,
            courier_service: spec.courier_service,
            payment_method: spec.payment_method,
            notes: spec.notes,
        };
        let order = self.db.create_order(order).await?;
        info!("🛒️ Order [{}] created for buyer {buyer_id}, total {}", order.order_number, order.total_amount);
        Ok(order)
    }

    /// Initiates a payment for the order on the given rail.
    ///
    /// The order must exist, belong to the caller, and not have reached a terminal payment state. If a provider
    /// reference is already recorded and the intent has not passed its recorded expiry, the reference is returned in
    /// a [`OrderFlowError::PaymentPending`] instead of creating a second intent. A lapsed intent falls through to
    /// re-initiation; not every rail sends an expiry webhook, so this is what unsticks an abandoned payment. The
    /// order number is the idempotency key at the provider, so even a retry whose first response was lost cannot
    /// double-charge.
    pub async fn initiate_payment<G: PaymentGateway>(
        &self,
        gateway: &G,
        buyer_id: i64,
        order_id: i64,
        params: RailParams,
    ) -> Result<PaymentIntent, OrderFlowError> {
        let order = self.db.fetch_order(order_id, buyer_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        match order.payment_status {
            PaymentStatus::Paid => return Err(OrderFlowError::OrderAlreadyPaid(order.order_number)),
            PaymentStatus::Expired | PaymentStatus::Failed => {
                return Err(OrderFlowError::OrderClosed(order.order_number))
            },
            PaymentStatus::Pending => {
                if let Some(reference) = order.payment_reference.clone() {
                    let lapsed = order.payment_expires_at.map_or(false, |t| t <= Utc::now());
                    if !lapsed {
                        debug!(
                            "💳️ Order [{}] already has outstanding intent {reference}; not creating another",
                            order.order_number
                        );
                        return Err(OrderFlowError::PaymentPending { number: order.order_number, reference });
                    }
                    debug!("💳️ Intent {reference} on order [{}] has lapsed; re-initiating", order.order_number);
                }
                // Pending without a live reference means the earlier intent lapsed, or an earlier initiation died
                // before the provider answered. Re-initiating with the same order number is safe.
            },
            PaymentStatus::Unpaid => {},
        }
        let rail = params.rail();
        let request =
            PaymentRequest { reference: order.order_number.clone(), amount: order.total_amount, params };
        let intent = gateway.initiate(&request).await?;
        info!("💳️ {rail} intent {} created for order [{}]", intent.provider_id, order.order_number);
        let note = intent.order_note();
        let recorded = self
            .db
            .record_payment_intent(&order.order_number, &rail.to_string(), &intent.provider_id, &note, intent.expires_at)
            .await?;
        if recorded.is_none() {
            // A webhook settled the order between our read and the write. The intent at the provider will lapse on
            // its own; report the terminal state to the caller.
            let current = self.db.fetch_order(order_id, buyer_id).await?;
            return match current.map(|o| o.payment_status) {
                Some(PaymentStatus::Paid) => Err(OrderFlowError::OrderAlreadyPaid(order.order_number)),
                _ => Err(OrderFlowError::OrderClosed(order.order_number)),
            };
        }
        Ok(intent)
    }

    /// Owner-scoped order fetch.
    pub async fn get_order(&self, buyer_id: i64, order_id: i64) -> Result<Order, OrderFlowError> {
        self.db.fetch_order(order_id, buyer_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))
    }

    pub async fn order_items(&self, buyer_id: i64, order_id: i64) -> Result<Vec<OrderItem>, OrderFlowError> {
        let order = self.get_order(buyer_id, order_id).await?;
        Ok(self.db.fetch_order_items(order.id).await?)
    }

    /// All orders for the buyer, newest first.
    pub async fn orders_for_buyer(
        &self,
        buyer_id: i64,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderFlowError> {
        Ok(self.db.fetch_orders_for_buyer(buyer_id, status).await?)
    }
}
