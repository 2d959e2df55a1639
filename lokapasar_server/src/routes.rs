//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database operations, gateway calls, etc.) should be expressed as futures or asynchronous functions. Async handlers
//! get executed concurrently by worker threads and thus don't block execution.

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use lokapasar_engine::{
    db_types::OrderStatus,
    gateway::{InvoiceItem, PaymentIntent, RailParams},
    traits::{OrderStore, PaymentGateway, ProductCatalog},
    CartSpec,
    OrderFlowApi,
};
use serde::Deserialize;

use crate::{
    config::ServerOptions,
    data_objects::{
        EwalletPaymentParams,
        InvoicePaymentParams,
        OrderDetailResponse,
        PaymentMethodsResponse,
        PaymentStatusResponse,
        QrisPaymentParams,
        VirtualAccountPaymentParams,
    },
    errors::ServerError,
    helpers::buyer_id,
};

/// The full backend contract a route handler needs: order persistence plus the read-only catalog snapshot. Blanket
/// implemented, so any store that does both qualifies.
pub trait OrderBackend: OrderStore + ProductCatalog {}
impl<T: OrderStore + ProductCatalog> OrderBackend for T {}

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderBackend);
/// Route handler for order creation.
///
/// The buyer identity comes from the `x-buyer-id` header, which the upstream auth proxy attaches after
/// authenticating the storefront session. The body is the cart specification; all prices are looked up from the
/// catalog snapshot server-side, never taken from the client.
pub async fn create_order<B: OrderBackend>(
    req: HttpRequest,
    body: web::Json<CartSpec>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let buyer = buyer_id(&req)?;
    let spec = body.into_inner();
    debug!("💻️ POST create order for buyer {buyer}");
    let order = api.create_order(buyer, spec).await?;
    Ok(HttpResponse::Ok().json(order))
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

route!(my_orders => Get "/orders" impl OrderBackend);
pub async fn my_orders<B: OrderBackend>(
    req: HttpRequest,
    query: web::Query<OrderListQuery>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let buyer = buyer_id(&req)?;
    debug!("💻️ GET orders for buyer {buyer}");
    let orders = api.orders_for_buyer(buyer, query.status).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl OrderBackend);
pub async fn order_by_id<B: OrderBackend>(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let buyer = buyer_id(&req)?;
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id} for buyer {buyer}");
    let order = api.get_order(buyer, order_id).await?;
    let items = api.order_items(buyer, order_id).await?;
    Ok(HttpResponse::Ok().json(OrderDetailResponse { order, items }))
}

//----------------------------------------------   Payments  ----------------------------------------------------
#[get("/payments/methods")]
pub async fn payment_methods() -> impl Responder {
    trace!("💻️ Received payment methods request");
    HttpResponse::Ok().json(PaymentMethodsResponse::current())
}

route!(payment_status => Get "/payments/status/{id}" impl OrderBackend);
/// Owner-scoped payment status poll. Webhooks remain the source of truth; this endpoint only reads recorded state.
pub async fn payment_status<B: OrderBackend>(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let buyer = buyer_id(&req)?;
    let order_id = path.into_inner();
    debug!("💻️ GET payment status of order {order_id} for buyer {buyer}");
    let order = api.get_order(buyer, order_id).await?;
    let result = PaymentStatusResponse {
        order_id: order.id,
        order_number: order.order_number.to_string(),
        payment_status: order.payment_status.to_string(),
        paid_at: order.paid_at,
    };
    Ok(HttpResponse::Ok().json(result))
}

route!(va_payment => Post "/payments/virtual-account" impl OrderBackend, PaymentGateway);
pub async fn va_payment<TOrderBackend, TPaymentGateway>(
    req: HttpRequest,
    body: web::Json<VirtualAccountPaymentParams>,
    api: web::Data<OrderFlowApi<TOrderBackend>>,
    gateway: web::Data<TPaymentGateway>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError>
where
    TOrderBackend: OrderBackend,
    TPaymentGateway: PaymentGateway,
{
    let buyer = buyer_id(&req)?;
    let params = body.into_inner();
    debug!("💳️ POST initiate VA payment at {} for order {}", params.bank_code, params.order_id);
    let rail_params =
        RailParams::VirtualAccount { bank_code: params.bank_code, display_name: params.display_name };
    let intent = initiate(&api, gateway.get_ref(), &options, buyer, params.order_id, rail_params).await?;
    Ok(HttpResponse::Ok().json(intent))
}

route!(ewallet_payment => Post "/payments/ewallet" impl OrderBackend, PaymentGateway);
pub async fn ewallet_payment<TOrderBackend, TPaymentGateway>(
    req: HttpRequest,
    body: web::Json<EwalletPaymentParams>,
    api: web::Data<OrderFlowApi<TOrderBackend>>,
    gateway: web::Data<TPaymentGateway>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError>
where
    TOrderBackend: OrderBackend,
    TPaymentGateway: PaymentGateway,
{
    let buyer = buyer_id(&req)?;
    let params = body.into_inner();
    debug!("💳️ POST initiate {} payment for order {}", params.channel_code, params.order_id);
    let rail_params = RailParams::Ewallet {
        channel_code: params.channel_code,
        mobile_number: params.mobile_number,
        success_redirect_url: params.success_redirect_url,
        failure_redirect_url: params.failure_redirect_url,
    };
    let intent = initiate(&api, gateway.get_ref(), &options, buyer, params.order_id, rail_params).await?;
    Ok(HttpResponse::Ok().json(intent))
}

route!(qris_payment => Post "/payments/qris" impl OrderBackend, PaymentGateway);
pub async fn qris_payment<TOrderBackend, TPaymentGateway>(
    req: HttpRequest,
    body: web::Json<QrisPaymentParams>,
    api: web::Data<OrderFlowApi<TOrderBackend>>,
    gateway: web::Data<TPaymentGateway>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError>
where
    TOrderBackend: OrderBackend,
    TPaymentGateway: PaymentGateway,
{
    let buyer = buyer_id(&req)?;
    let params = body.into_inner();
    debug!("💳️ POST initiate QRIS payment for order {}", params.order_id);
    let intent = initiate(&api, gateway.get_ref(), &options, buyer, params.order_id, RailParams::Qris).await?;
    Ok(HttpResponse::Ok().json(intent))
}

route!(invoice_payment => Post "/payments/invoice" impl OrderBackend, PaymentGateway);
/// The hosted-invoice rail carries the order's line items so the checkout page can show them. They are read back
/// from the stored order, never from the request.
pub async fn invoice_payment<TOrderBackend, TPaymentGateway>(
    req: HttpRequest,
    body: web::Json<InvoicePaymentParams>,
    api: web::Data<OrderFlowApi<TOrderBackend>>,
    gateway: web::Data<TPaymentGateway>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError>
where
    TOrderBackend: OrderBackend,
    TPaymentGateway: PaymentGateway,
{
    let buyer = buyer_id(&req)?;
    let params = body.into_inner();
    debug!("💳️ POST initiate invoice payment for order {}", params.order_id);
    let order = api.get_order(buyer, params.order_id).await?;
    let items = api
        .order_items(buyer, params.order_id)
        .await?
        .into_iter()
        .map(|i| InvoiceItem { name: i.product_name, quantity: i.quantity, price: i.price })
        .collect();
    let rail_params = RailParams::Invoice {
        payer_email: params.payer_email,
        description: format!("Pembayaran order {}", order.order_number),
        items,
        success_redirect_url: params.success_redirect_url,
        failure_redirect_url: params.failure_redirect_url,
    };
    let intent = initiate(&api, gateway.get_ref(), &options, buyer, params.order_id, rail_params).await?;
    Ok(HttpResponse::Ok().json(intent))
}

/// Wraps payment initiation in the configured outer time budget. A timeout is a 503: the payment may or may not
/// exist at the provider, but the order number keys it there, so the client can safely retry.
async fn initiate<B: OrderBackend, G: PaymentGateway>(
    api: &OrderFlowApi<B>,
    gateway: &G,
    options: &ServerOptions,
    buyer: i64,
    order_id: i64,
    params: RailParams,
) -> Result<PaymentIntent, ServerError> {
    let budget = options.gateway_timeout.to_std().unwrap_or(std::time::Duration::from_secs(30));
    match tokio::time::timeout(budget, api.initiate_payment(gateway, buyer, order_id, params)).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            warn!("💳️ Payment initiation for order {order_id} exceeded the {}s budget", budget.as_secs());
            Err(ServerError::UpstreamUnavailable("Payment initiation timed out".to_string()))
        },
    }
}
