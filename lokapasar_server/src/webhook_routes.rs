//----------------------------------------------   Callbacks  ----------------------------------------------------
//
// One endpoint per rail, all behind the callback-token middleware. Webhook responses must always be in the 200 range
// once the token has been verified, otherwise the provider keeps retrying; anomalies and unknown references are
// logged and acknowledged rather than bounced.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, error, info, trace, warn};
use lokapasar_engine::{
    gateway::{PaymentRail, WebhookEvent},
    traits::OrderStore,
    OrderFlowError,
    Reconciliation,
    ReconcilerApi,
};
use lp_common::Rupiah;

use crate::{
    data_objects::{
        EwalletCallbackPayload,
        InvoiceCallbackPayload,
        JsonResponse,
        QrisCallbackPayload,
        VaCallbackPayload,
    },
    route,
};

route!(invoice_callback => Post "/invoice" impl OrderStore);
pub async fn invoice_callback<B: OrderStore>(
    req: HttpRequest,
    body: web::Json<InvoiceCallbackPayload>,
    api: web::Data<ReconcilerApi<B>>,
) -> HttpResponse {
    trace!("💳️ Received invoice callback: {}", req.uri());
    let payload = body.into_inner();
    let event = WebhookEvent {
        rail: PaymentRail::Invoice,
        reference: payload.external_id.into(),
        status: payload.status,
        paid_amount: payload.paid_amount.map(Rupiah::from),
        paid_at: payload.paid_at,
    };
    apply_event(event, &api).await
}

route!(va_callback => Post "/va" impl OrderStore);
/// The VA payment callback has no status field; the provider only fires it when money landed in the account, so the
/// event itself is the settlement signal and maps to the rail's single terminal status.
pub async fn va_callback<B: OrderStore>(
    req: HttpRequest,
    body: web::Json<VaCallbackPayload>,
    api: web::Data<ReconcilerApi<B>>,
) -> HttpResponse {
    trace!("💳️ Received VA callback: {}", req.uri());
    let payload = body.into_inner();
    let event = WebhookEvent {
        rail: PaymentRail::VirtualAccount,
        reference: payload.external_id.into(),
        status: "COMPLETED".to_string(),
        paid_amount: Some(Rupiah::from(payload.amount)),
        paid_at: payload.transaction_timestamp.or_else(|| Some(Utc::now())),
    };
    apply_event(event, &api).await
}

route!(ewallet_callback => Post "/ewallet" impl OrderStore);
pub async fn ewallet_callback<B: OrderStore>(
    req: HttpRequest,
    body: web::Json<EwalletCallbackPayload>,
    api: web::Data<ReconcilerApi<B>>,
) -> HttpResponse {
    trace!("💳️ Received e-wallet callback: {}", req.uri());
    let payload = body.into_inner();
    let event = WebhookEvent {
        rail: PaymentRail::Ewallet,
        reference: payload.data.reference_id.into(),
        status: payload.data.status,
        paid_amount: payload.data.charge_amount.map(Rupiah::from),
        paid_at: Some(Utc::now()),
    };
    apply_event(event, &api).await
}

route!(qris_callback => Post "/qris" impl OrderStore);
pub async fn qris_callback<B: OrderStore>(
    req: HttpRequest,
    body: web::Json<QrisCallbackPayload>,
    api: web::Data<ReconcilerApi<B>>,
) -> HttpResponse {
    trace!("💳️ Received QRIS callback: {}", req.uri());
    let payload = body.into_inner();
    let event = WebhookEvent {
        rail: PaymentRail::Qris,
        reference: payload.external_id.into(),
        status: payload.status,
        paid_amount: payload.amount.map(Rupiah::from),
        paid_at: Some(Utc::now()),
    };
    apply_event(event, &api).await
}

async fn apply_event<B: OrderStore>(event: WebhookEvent, api: &ReconcilerApi<B>) -> HttpResponse {
    let reference = event.reference.clone();
    let result = match api.apply_event(event).await {
        Ok(Reconciliation::Applied(order)) => {
            info!("💳️ Order [{}] settled as {}", order.order_number, order.payment_status);
            JsonResponse::success(format!("Order {} updated", order.order_number))
        },
        Ok(Reconciliation::AlreadySettled(order)) => {
            info!("💳️ Duplicate notification for [{}]; no change", order.order_number);
            JsonResponse::success(format!("Order {} already settled", order.order_number))
        },
        Ok(Reconciliation::Ignored) => {
            debug!("💳️ Interim notification for [{reference}] ignored");
            JsonResponse::success("Notification acknowledged")
        },
        Ok(Reconciliation::Anomaly(anomaly)) => {
            error!("💳️ Reconciliation anomaly on [{reference}]: {anomaly:?}");
            JsonResponse::failure("Notification flagged for manual review")
        },
        Err(OrderFlowError::UnknownReference(n)) => {
            warn!("💳️ Webhook for unknown order reference [{n}]");
            JsonResponse::failure(format!("Unknown reference {n}"))
        },
        Err(e) => {
            warn!("💳️ Unexpected error while handling incoming payment notification. {e}");
            JsonResponse::failure("Unexpected error handling notification.")
        },
    };
    HttpResponse::Ok().json(result)
}
