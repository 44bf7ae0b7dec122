//! Wire protocol for the VOD cloud API.
//!
//! Shared by every other crate in the workspace: request parameter names,
//! action identifiers, endpoints, the [`VodError`] taxonomy and the
//! decoder that turns upload replies into typed results.

pub mod constants;
pub mod envelope;
pub mod error;
pub mod response;
pub mod types;

// Re-export primary types for convenience.
pub use constants::Action;
pub use envelope::ApiReply;
pub use error::VodError;
pub use response::{InitResult, Reply, ServerFault};
pub use types::{
    Endpoint, HttpMethod, PartInfo, Priority, PullRequest, Region, UploadOptions,
    UploadSuccess,
};
