//! Recording [`Transport`] for operator tests.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use vodsdk_sign::Credential;
use vodsdk_transport::{ClientConfig, Dispatcher, HttpRequest, Transport, TransportError};

/// Answers requests with queued replies; the last one repeats.
#[derive(Default)]
pub(crate) struct FakeApi {
    replies: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl FakeApi {
    pub(crate) fn replying(replies: &[&str]) -> Arc<Self> {
        let fake = Self::default();
        *fake.replies.lock().unwrap() = replies.iter().map(|r| r.to_string()).collect();
        Arc::new(fake)
    }

    pub(crate) fn seen(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// The single request sent so far.
    pub(crate) fn last(&self) -> HttpRequest {
        let seen = self.seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "expected exactly one request");
        seen[0].clone()
    }
}

impl Transport for FakeApi {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, TransportError>> + Send + '_>> {
        self.seen.lock().unwrap().push(request);
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            }
        };
        Box::pin(async move {
            reply.ok_or_else(|| TransportError::InvalidRequest("no reply queued".into()))
        })
    }
}

pub(crate) fn dispatcher(fake: Arc<FakeApi>) -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(
        fake,
        Credential::new(1, "AKID", "secret"),
        ClientConfig::default(),
    ))
}
