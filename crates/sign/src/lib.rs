//! Request signing for the VOD cloud API.
//!
//! Every request carries a set of common parameters (action, timestamp,
//! nonce, secret id) and a `Signature` computed over the sorted parameter
//! set with the account's secret key. Nonce and timestamp change per call,
//! so a retried request must be signed again.

mod credential;
mod nonce;
mod signature;

pub use credential::Credential;
pub use nonce::{generate_nonce, unix_timestamp};
pub use signature::{SignatureMethod, common_params, sign, sign_params, string_to_sign};

/// Ordered request parameters. Keys sort in byte order, which is the order
/// the service expects in the string to sign.
pub type Params = std::collections::BTreeMap<String, String>;
