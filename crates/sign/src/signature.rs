use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

use vodsdk_protocol::constants::keys;
use vodsdk_protocol::{Action, Endpoint, HttpMethod, Region, VodError};

use crate::Params;
use crate::credential::Credential;
use crate::nonce::{generate_nonce, unix_timestamp};

/// Digest used for the request signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureMethod {
    #[default]
    HmacSha1,
    HmacSha256,
}

impl SignatureMethod {
    /// Wire value of the `SignatureMethod` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            SignatureMethod::HmacSha1 => "HmacSHA1",
            SignatureMethod::HmacSha256 => "HmacSHA256",
        }
    }

    /// Picks the method requested by the parameter set. Anything other
    /// than `HmacSHA256` signs with SHA-1.
    pub fn from_params(params: &Params) -> Self {
        match params.get(keys::SIGNATURE_METHOD).map(String::as_str) {
            Some("HmacSHA256") => SignatureMethod::HmacSha256,
            _ => SignatureMethod::HmacSha1,
        }
    }
}

/// Builds the canonical string to sign:
/// `METHOD` + host + path + `?` + `k=v` pairs joined by `&`, keys in
/// ascending order, `_` in values replaced by `.`.
pub fn string_to_sign(method: HttpMethod, host: &str, path: &str, params: &Params) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={}", v.replace('_', ".")))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}{host}{path}?{query}", method.as_str())
}

/// Signs `params` with `secret_key`, returning the Base64 digest.
///
/// Deterministic for identical inputs.
pub fn sign(
    secret_key: &str,
    method: HttpMethod,
    host: &str,
    path: &str,
    params: &Params,
) -> Result<String, VodError> {
    let plain = string_to_sign(method, host, path, params);
    let digest = match SignatureMethod::from_params(params) {
        SignatureMethod::HmacSha1 => {
            let mut mac = Hmac::<Sha1>::new_from_slice(secret_key.as_bytes())
                .map_err(|e| VodError::param(format!("secret key: {e}")))?;
            mac.update(plain.as_bytes());
            mac.finalize().into_bytes().to_vec()
        }
        SignatureMethod::HmacSha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret_key.as_bytes())
                .map_err(|e| VodError::param(format!("secret key: {e}")))?;
            mac.update(plain.as_bytes());
            mac.finalize().into_bytes().to_vec()
        }
    };
    Ok(STANDARD.encode(digest))
}

/// Common parameters every request starts from. A fresh nonce and
/// timestamp are drawn on each call.
pub fn common_params(action: Action, region: Option<Region>, secret_id: &str) -> Params {
    let mut params = Params::new();
    params.insert(keys::ACTION.into(), action.as_str().into());
    if let Some(region) = region {
        params.insert(keys::REGION.into(), region.as_str().into());
    }
    params.insert(keys::TIMESTAMP.into(), unix_timestamp().to_string());
    params.insert(keys::NONCE.into(), generate_nonce());
    params.insert(keys::SECRET_ID.into(), secret_id.into());
    params
}

/// Signs `params` for `endpoint` and stores the result under `Signature`.
///
/// Any previous signature is dropped first; it is never part of the
/// signed string.
pub fn sign_params(
    credential: &Credential,
    method: HttpMethod,
    endpoint: &Endpoint,
    params: &mut Params,
) -> Result<(), VodError> {
    params.remove(keys::SIGNATURE);
    let signature = sign(
        credential.secret_key(),
        method,
        &endpoint.host,
        &endpoint.path,
        params,
    )?;
    params.insert(keys::SIGNATURE.into(), signature);
    Ok(())
}
