use log::*;
use lp_common::Secret;

pub const DEFAULT_XENDIT_BASE_URL: &str = "https://api.xendit.co";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct XenditConfig {
    pub base_url: String,
    /// The API secret key. Sent as the Basic-auth username on every request.
    pub secret_key: Secret<String>,
    /// Per-request timeout, in seconds. A timed-out request is reported as the provider being unavailable.
    pub timeout_secs: u64,
}

impl Default for XenditConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_XENDIT_BASE_URL.to_string(),
            secret_key: Secret::new(String::default()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl XenditConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("LPS_XENDIT_BASE_URL").unwrap_or_else(|_| {
            info!("LPS_XENDIT_BASE_URL not set, using {DEFAULT_XENDIT_BASE_URL}");
            DEFAULT_XENDIT_BASE_URL.to_string()
        });
        let secret_key = Secret::new(std::env::var("LPS_XENDIT_SECRET_KEY").unwrap_or_else(|_| {
            warn!("LPS_XENDIT_SECRET_KEY not set, using (probably useless) default");
            "xnd_development_00000000000000".to_string()
        }));
        let timeout_secs = std::env::var("LPS_XENDIT_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self { base_url, secret_key, timeout_secs }
    }
}
