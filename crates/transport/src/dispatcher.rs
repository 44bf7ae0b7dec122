//! Signed request dispatch.
//!
//! A [`Call`] names an action and its parameters. The [`Dispatcher`] adds
//! the common parameters with a fresh nonce and timestamp, signs the set,
//! and hands the request to the transport. Sending the same `Call` twice
//! produces two differently signed requests.

use std::sync::Arc;

use tracing::debug;
use vodsdk_protocol::{Action, ApiReply, Endpoint, HttpMethod, VodError};
use vodsdk_sign::{Credential, Params, common_params, sign_params};

use crate::config::ClientConfig;
use crate::request::{HttpRequest, RequestBody, Transport};

/// Which configured endpoint a call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Api,
    Upload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Payload {
    #[default]
    None,
    Bytes(Vec<u8>),
    /// Signed parameters travel in a form body instead of the query.
    Form,
}

/// One remote action with its action-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub action: Action,
    pub method: HttpMethod,
    pub target: Target,
    /// Whether the configured region is sent.
    pub regional: bool,
    pub params: Params,
    payload: Payload,
}

impl Call {
    /// A GET on the API endpoint, without region.
    pub fn api(action: Action) -> Self {
        Self {
            action,
            method: HttpMethod::Get,
            target: Target::Api,
            regional: false,
            params: Params::new(),
            payload: Payload::None,
        }
    }

    /// A POST on the upload endpoint, with region.
    pub fn upload(action: Action) -> Self {
        Self {
            action,
            method: HttpMethod::Post,
            target: Target::Upload,
            regional: true,
            params: Params::new(),
            payload: Payload::None,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn param_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Adds `prefix.1`, `prefix.2`, ... for each value.
    pub fn indexed<S: AsRef<str>>(mut self, prefix: &str, values: &[S]) -> Self {
        for (i, value) in values.iter().enumerate() {
            self.params
                .insert(format!("{prefix}.{}", i + 1), value.as_ref().to_string());
        }
        self
    }

    /// Raw request body. Parameters stay in the query string.
    pub fn bytes(mut self, data: Vec<u8>) -> Self {
        self.payload = Payload::Bytes(data);
        self
    }

    /// POSTs all signed parameters as a urlencoded form.
    pub fn form(mut self) -> Self {
        self.method = HttpMethod::Post;
        self.payload = Payload::Form;
        self
    }

    pub fn regional(mut self, regional: bool) -> Self {
        self.regional = regional;
        self
    }
}

/// Signs and sends [`Call`]s over a shared [`Transport`].
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    credential: Credential,
    config: ClientConfig,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        credential: Credential,
        config: ClientConfig,
    ) -> Self {
        Self {
            transport,
            credential,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    fn endpoint(&self, target: Target) -> &Endpoint {
        match target {
            Target::Api => &self.config.api_endpoint,
            Target::Upload => &self.config.upload_endpoint,
        }
    }

    /// Builds the signed transport request for one attempt of `call`.
    pub fn build(&self, call: &Call) -> Result<HttpRequest, VodError> {
        let region = if call.regional { self.config.region } else { None };
        let mut params = common_params(call.action, region, &self.credential.secret_id);
        params.extend(call.params.clone());

        let endpoint = self.endpoint(call.target);
        sign_params(&self.credential, call.method, endpoint, &mut params)?;

        let mut request = HttpRequest::new(call.method, endpoint.url());
        let pairs: Vec<(String, String)> = params.into_iter().collect();
        match &call.payload {
            Payload::None => request.query = pairs,
            Payload::Bytes(data) => {
                request.query = pairs;
                request.body = RequestBody::Bytes(data.clone());
            }
            Payload::Form => request.body = RequestBody::Form(pairs),
        }
        Ok(request)
    }

    /// Signs and sends `call`, returning the raw response body.
    pub async fn send(&self, call: &Call) -> Result<String, VodError> {
        let request = self.build(call)?;
        debug!(action = %call.action, url = %request.url, "sending request");
        Ok(self.transport.send(request).await?)
    }

    /// Sends `call` and parses the reply header.
    pub async fn call(&self, call: &Call) -> Result<ApiReply, VodError> {
        let raw = self.send(call).await?;
        let reply = ApiReply::parse(&raw)?;
        debug!(action = %call.action, code = reply.code, message = reply.message(), "reply");
        Ok(reply)
    }

    /// Like [`call`](Self::call), failing unless `code == 0`.
    pub async fn call_checked(&self, call: &Call) -> Result<ApiReply, VodError> {
        self.call(call).await?.ensure_success()
    }
}
