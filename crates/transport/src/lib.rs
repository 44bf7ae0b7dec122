//! HTTP transport, client configuration and signed request dispatch.
//!
//! [`Transport`] is the seam between the SDK's operations and the network:
//! [`HttpTransport`] implements it over reqwest, tests implement it with
//! scripted replies. [`Dispatcher`] signs each call before handing it over.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod request;

pub use config::{ClientConfig, ConfigError};
pub use dispatcher::{Call, Dispatcher, Target};
pub use error::TransportError;
pub use http::HttpTransport;
pub use request::{HttpRequest, RequestBody, Transport};
