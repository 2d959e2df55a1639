//! Callback-token middleware for Actix Web.
//!
//! The payment provider authenticates its webhook calls by sending a shared verification token in the
//! `x-callback-token` header on every request. This middleware compares that header against the configured token
//! before the request body is touched; on a mismatch the call is rejected with a 401 and the payload is never parsed.
//!
//! Wrap the `/callback` scope with this middleware so every webhook endpoint is covered uniformly.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use lp_common::Secret;

use crate::{errors::ServerError, helpers::constant_time_token_eq};

pub const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

pub struct CallbackTokenMiddlewareFactory {
    token: Secret<String>,
}

impl CallbackTokenMiddlewareFactory {
    pub fn new(token: Secret<String>) -> Self {
        CallbackTokenMiddlewareFactory { token }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CallbackTokenMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = CallbackTokenMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CallbackTokenMiddlewareService { token: self.token.clone(), service: Rc::new(service) }))
    }
}

pub struct CallbackTokenMiddlewareService<S> {
    token: Secret<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for CallbackTokenMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let expected = self.token.reveal().clone();
        Box::pin(async move {
            trace!("🔐️ Checking callback token for request");
            let presented = req.headers().get(CALLBACK_TOKEN_HEADER).and_then(|v| v.to_str().ok());
            let validated = match presented {
                Some(token) => constant_time_token_eq(&expected, token),
                None => {
                    warn!("🔐️ No callback token found in request. Denying access.");
                    false
                },
            };
            if validated {
                trace!("🔐️ Callback token check for request ✅️");
                service.call(req).await
            } else {
                warn!("🔐️ Invalid callback token in request. Denying access.");
                Err(ServerError::UnauthorizedCallback.into())
            }
        })
    }
}
