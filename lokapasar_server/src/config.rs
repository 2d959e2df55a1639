use std::env;

use chrono::Duration;
use log::*;
use lp_common::Secret;
use xendit_tools::XenditConfig;

const DEFAULT_LPS_HOST: &str = "127.0.0.1";
const DEFAULT_LPS_PORT: u16 = 8360;
const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::seconds(30);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The shared secret the provider sends in the `x-callback-token` header on every webhook call.
    pub callback_token: Secret<String>,
    /// The outer time budget for one payment-initiation call to the provider. When it is exceeded, the caller gets a
    /// 503 and may retry; the order number keys the request at the provider so a retry cannot double-charge.
    pub gateway_timeout: Duration,
    /// Payment provider configuration.
    pub xendit_config: XenditConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LPS_HOST.to_string(),
            port: DEFAULT_LPS_PORT,
            database_url: String::default(),
            callback_token: Secret::new(String::default()),
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            xendit_config: XenditConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("LPS_HOST").ok().unwrap_or_else(|| DEFAULT_LPS_HOST.into());
        let port = env::var("LPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for LPS_PORT. {e} Using the default, {DEFAULT_LPS_PORT}, instead."
                    );
                    DEFAULT_LPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_LPS_PORT);
        let database_url = env::var("LPS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ LPS_DATABASE_URL is not set. Please set it to the URL for the orders database.");
            String::default()
        });
        let callback_token = env::var("LPS_CALLBACK_TOKEN").ok().unwrap_or_else(|| {
            error!(
                "🚨️ LPS_CALLBACK_TOKEN is not set. Every webhook callback will be rejected, and no payment will ever \
                 be marked as settled. Set it to the callback verification token from the provider dashboard."
            );
            String::default()
        });
        let gateway_timeout = env::var("LPS_GATEWAY_TIMEOUT")
            .map_err(|_| {
                info!(
                    "🪛️ LPS_GATEWAY_TIMEOUT is not set. Using the default value of {} s.",
                    DEFAULT_GATEWAY_TIMEOUT.num_seconds()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::seconds)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for LPS_GATEWAY_TIMEOUT. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_GATEWAY_TIMEOUT);
        let xendit_config = XenditConfig::new_from_env_or_default();
        Self { host, port, database_url, callback_token: callback_token.into(), gateway_timeout, xendit_config }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that route handlers need. Generally we try to keep this as small as possible,
/// and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub gateway_timeout: Duration,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { gateway_timeout: config.gateway_timeout }
    }
}
