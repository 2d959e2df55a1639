use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use lokapasar_engine::{OrderFlowApi, ReconcilerApi, SqliteDatabase};
use xendit_tools::XenditApi;

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    middleware::CallbackTokenMiddlewareFactory,
    routes::{
        health,
        payment_methods,
        CreateOrderRoute,
        EwalletPaymentRoute,
        InvoicePaymentRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        PaymentStatusRoute,
        QrisPaymentRoute,
        VaPaymentRoute,
    },
    webhook_routes::{EwalletCallbackRoute, InvoiceCallbackRoute, QrisCallbackRoute, VaCallbackRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let gateway = XenditApi::new(config.xendit_config.clone())
        .map_err(|e| ServerError::InitializeError(format!("Could not initialize the payment gateway client. {e}")))?;
    let options = ServerOptions::from_config(&config);
    let callback_token = config.callback_token.clone();
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let reconciler_api = ReconcilerApi::new(db.clone());
        let gateway = gateway.clone();
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("lps::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(reconciler_api))
            .app_data(web::Data::new(gateway))
            .app_data(web::Data::new(options));
        // Provider webhooks live in their own scope so the token check covers them uniformly.
        let callback_scope = web::scope("/callback")
            .wrap(CallbackTokenMiddlewareFactory::new(callback_token.clone()))
            .service(InvoiceCallbackRoute::<SqliteDatabase>::new())
            .service(VaCallbackRoute::<SqliteDatabase>::new())
            .service(EwalletCallbackRoute::<SqliteDatabase>::new())
            .service(QrisCallbackRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(payment_methods)
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(PaymentStatusRoute::<SqliteDatabase>::new())
            .service(VaPaymentRoute::<SqliteDatabase, XenditApi>::new())
            .service(EwalletPaymentRoute::<SqliteDatabase, XenditApi>::new())
            .service(QrisPaymentRoute::<SqliteDatabase, XenditApi>::new())
            .service(InvoicePaymentRoute::<SqliteDatabase, XenditApi>::new())
            .service(callback_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
