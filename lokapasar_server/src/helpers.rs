use actix_web::HttpRequest;
use hmac::{Hmac, Mac};
use log::debug;
use sha2::Sha256;

use crate::errors::ServerError;

/// Compares the presented callback token against the configured one without leaking the match length through timing.
/// Both sides are MACed under a fixed key and the MAC outputs are compared with the constant-time equality that
/// [`hmac::digest::CtOutput`] provides.
pub fn constant_time_token_eq(expected: &str, presented: &str) -> bool {
    let mac_of = |data: &str| {
        // The key is not a secret; it only serves to fix the comparison length.
        let mut mac = Hmac::<Sha256>::new_from_slice(b"lps-callback-token-compare")
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        mac.update(data.as_bytes());
        mac.finalize()
    };
    mac_of(expected) == mac_of(presented)
}

/// Extracts the buyer identity that the upstream auth proxy attaches to every storefront request.
pub fn buyer_id(req: &HttpRequest) -> Result<i64, ServerError> {
    req.headers()
        .get("x-buyer-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            debug!("💻️ Request to {} is missing a valid x-buyer-id header", req.path());
            ServerError::InvalidRequestBody("Missing or invalid x-buyer-id header".to_string())
        })
}
