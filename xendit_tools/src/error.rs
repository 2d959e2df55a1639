use lokapasar_engine::traits::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XenditApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Request to Xendit timed out: {0}")]
    Timeout(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Unsupported channel: {0}")]
    UnsupportedChannel(String),
}

impl From<XenditApiError> for GatewayError {
    fn from(e: XenditApiError) -> Self {
        match e {
            // Client-side errors: the request as posed will never succeed, so a retry is pointless.
            XenditApiError::QueryError { status, message } if (400..500).contains(&status) => {
                GatewayError::Rejected(format!("Error {status}. {message}"))
            },
            XenditApiError::UnsupportedChannel(c) => GatewayError::Rejected(format!("Unsupported channel: {c}")),
            // Everything else (timeouts, 5xx, transport failures) is transient from our point of view.
            e => GatewayError::Unavailable(e.to_string()),
        }
    }
}
