//! Retry of upload calls on retryable server faults.
//!
//! Every attempt goes through the caller's `attempt` closure, which signs a
//! fresh request (new nonce and timestamp) before sending it. Only replies
//! with `code < 0` and `canRetry == 1` are retried; transport failures have
//! already been retried by the transport and surface immediately.

use std::future::Future;

use tracing::{debug, warn};
use vodsdk_protocol::{Action, Reply, VodError};
use vodsdk_transport::{Call, Dispatcher};

/// Runs `attempt` until `decode` yields a result, a non-retryable fault,
/// or `max_attempts` attempts have been made.
pub async fn with_resign<T, F, Fut, D>(
    action: Action,
    max_attempts: u32,
    mut attempt: F,
    decode: D,
) -> Result<T, VodError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, VodError>>,
    D: Fn(&str) -> Result<Reply<T>, VodError>,
{
    let max_attempts = max_attempts.max(1);
    let mut n = 0;
    loop {
        n += 1;
        let raw = attempt().await?;
        match decode(&raw)? {
            Reply::Done(value) => {
                debug!(%action, attempt = n, "call succeeded");
                return Ok(value);
            }
            Reply::Fault(fault) => {
                debug!(
                    %action,
                    attempt = n,
                    code = fault.code,
                    message = %fault.message,
                    can_retry = fault.can_retry,
                    "server fault"
                );
                if !fault.can_retry || n >= max_attempts {
                    return Err(fault.into_error());
                }
                warn!(%action, attempt = n, code = fault.code, "retryable fault, retrying");
            }
        }
    }
}

/// [`with_resign`] over a dispatcher call, using the configured budget.
pub async fn send_with_retry<T, D>(
    dispatcher: &Dispatcher,
    call: &Call,
    decode: D,
) -> Result<T, VodError>
where
    D: Fn(&str) -> Result<Reply<T>, VodError>,
{
    with_resign(
        call.action,
        dispatcher.config().max_retries,
        move || dispatcher.send(call),
        decode,
    )
    .await
}
