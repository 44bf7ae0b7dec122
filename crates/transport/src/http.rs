//! reqwest-backed [`Transport`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, warn};
use vodsdk_protocol::HttpMethod;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::request::{HttpRequest, RequestBody, Transport, encode_pairs};

/// HTTP transport with bounded retry on connection failures and timeouts.
///
/// A 2xx or 400 status yields the body; the service reports its own
/// errors inside a 400 body. Any other status fails without retry.
pub struct HttpTransport {
    http: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.socket_timeout_ms))
            .pool_max_idle_per_host(config.max_idle_connections)
            .pool_idle_timeout(Duration::from_millis(config.idle_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    async fn send_once(&self, request: &HttpRequest) -> Result<String, TransportError> {
        let url = request.full_url();
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Bytes(data) => builder
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(data.clone()),
            RequestBody::Form(fields) => builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encode_pairs(fields)),
        };

        let resp = builder.send().await?;
        let status = resp.status();
        debug!(method = %request.method, status = status.as_u16(), "server response");

        if status.is_success() || status == reqwest::StatusCode::BAD_REQUEST {
            return Ok(resp.text().await?);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Connection, timeout and body-transfer failures are worth another try.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, TransportError>> + Send + '_>> {
        Box::pin(async move {
            let mut attempt = 0;
            loop {
                attempt += 1;
                match self.send_once(&request).await {
                    Ok(body) => return Ok(body),
                    Err(TransportError::Http(e)) if is_transient(&e) => {
                        if attempt >= self.max_retries {
                            return Err(TransportError::Exhausted {
                                attempts: attempt,
                                last: e.to_string(),
                            });
                        }
                        warn!(attempt, error = %e, "transport failure, retrying");
                        if !self.retry_delay.is_zero() {
                            tokio::time::sleep(self.retry_delay).await;
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
        })
    }
}
