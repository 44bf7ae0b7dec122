//! Error taxonomy shared by every operation of the SDK.

use crate::constants::{NETWORK_ERROR_CODE, PARAM_ERROR_CODE, SERVER_ERROR_CODE};

/// Errors produced by SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum VodError {
    /// Invalid caller input. Never retried.
    #[error("invalid parameter: {0}")]
    Param(String),

    /// Transport failure after the transport's own retry budget.
    #[error("network error: {0}")]
    Network(String),

    /// Error reported by the service, or a reply the SDK cannot interpret.
    #[error("server error {code}: {message}")]
    Server { code: i64, message: String },

    /// Local file read failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VodError {
    pub fn param(message: impl Into<String>) -> Self {
        VodError::Param(message.into())
    }

    pub fn server(code: i64, message: impl Into<String>) -> Self {
        VodError::Server {
            code,
            message: message.into(),
        }
    }

    /// A reply that is missing fields or has an unexpected shape.
    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        VodError::Server {
            code: SERVER_ERROR_CODE,
            message: format!("malformed response: {detail}"),
        }
    }

    /// Numeric code of the error: the server's code for server errors,
    /// otherwise the SDK's code for the error kind.
    pub fn code(&self) -> i64 {
        match self {
            VodError::Param(_) => PARAM_ERROR_CODE,
            VodError::Network(_) => NETWORK_ERROR_CODE,
            VodError::Server { code, .. } => *code,
            VodError::Io(_) => PARAM_ERROR_CODE,
        }
    }

    /// Always `false`: retryable replies are retried before they surface.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

impl From<serde_json::Error> for VodError {
    fn from(e: serde_json::Error) -> Self {
        VodError::malformed(e)
    }
}
