use vodsdk_protocol::VodError;

/// Errors from a [`Transport`](crate::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<TransportError> for VodError {
    fn from(e: TransportError) -> Self {
        VodError::Network(e.to_string())
    }
}
