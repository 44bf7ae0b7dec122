//! Scripted [`Transport`] for engine tests.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use vodsdk_sign::Credential;
use vodsdk_transport::{
    ClientConfig, Dispatcher, HttpRequest, RequestBody, Transport, TransportError,
};

type Hook = Box<dyn Fn(&str) + Send + Sync>;

/// Replies per action, in order; the last reply repeats.
#[derive(Default)]
pub(crate) struct FakeVod {
    replies: Mutex<HashMap<String, VecDeque<String>>>,
    log: Mutex<Vec<HttpRequest>>,
    hook: Mutex<Option<Hook>>,
}

impl FakeVod {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn script(&self, action: &str, replies: &[&str]) {
        self.replies.lock().unwrap().insert(
            action.to_string(),
            replies.iter().map(|r| r.to_string()).collect(),
        );
    }

    /// Runs `f` with the action name of every request before replying.
    pub(crate) fn on_request(&self, f: impl Fn(&str) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(f));
    }

    /// Requests seen for `action`, in order.
    pub(crate) fn requests(&self, action: &str) -> Vec<HttpRequest> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| param(r, "Action").as_deref() == Some(action))
            .cloned()
            .collect()
    }

    pub(crate) fn total(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

/// Reads a signed parameter from the query or the form body.
pub(crate) fn param(request: &HttpRequest, key: &str) -> Option<String> {
    if let Some(v) = request.query_param(key) {
        return Some(v.to_string());
    }
    match &request.body {
        RequestBody::Form(fields) => fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()),
        _ => None,
    }
}

impl Transport for FakeVod {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, TransportError>> + Send + '_>> {
        let action = param(&request, "Action").unwrap_or_default();
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook(&action);
        }
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(&action) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        self.log.lock().unwrap().push(request);
        Box::pin(async move {
            reply.ok_or_else(|| {
                TransportError::InvalidRequest(format!("no reply scripted for {action}"))
            })
        })
    }
}

pub(crate) fn dispatcher(fake: Arc<FakeVod>, max_retries: u32) -> Arc<Dispatcher> {
    let config = ClientConfig {
        max_retries,
        ..ClientConfig::default()
    };
    Arc::new(Dispatcher::new(fake, Credential::new(1, "AKID", "secret"), config))
}
