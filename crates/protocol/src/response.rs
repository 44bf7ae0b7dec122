//! Typed decoding of upload replies.
//!
//! The upload service reports outcome through `code`:
//! - `code < 0`: failure, retryable when `canRetry == 1`
//! - `0`: fresh upload (init) or success (part, finish)
//! - `1`: init only, the server holds some parts already
//! - `2`: init only, the whole file is already stored

use serde::Deserialize;

use crate::envelope::ApiReply;
use crate::error::VodError;
use crate::types::{PartInfo, UploadSuccess};

/// A negative-code reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerFault {
    pub code: i64,
    pub message: String,
    pub can_retry: bool,
}

impl ServerFault {
    pub fn into_error(self) -> VodError {
        VodError::server(self.code, self.message)
    }
}

/// Outcome of one attempt: either a usable result or a server fault
/// the caller may retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Done(T),
    Fault(ServerFault),
}

/// Decoded reply to `InitUpload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitResult {
    /// Nothing stored yet; upload every part.
    FreshUpload,
    /// Upload was interrupted earlier; `parts` are already stored.
    Resume { data_size: u64, parts: Vec<PartInfo> },
    /// The file is already stored.
    AlreadyUploaded(UploadSuccess),
    Error(ServerFault),
}

impl InitResult {
    /// Splits the fault case off for the retry loop.
    pub fn into_reply(self) -> Reply<InitResult> {
        match self {
            InitResult::Error(fault) => Reply::Fault(fault),
            other => Reply::Done(other),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResumeBody {
    data_size: u64,
    #[serde(default)]
    list_parts: Option<Vec<PartInfo>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedBody {
    file_id: String,
    url: String,
}

/// Decodes an `InitUpload` reply.
pub fn decode_init(raw: &str) -> Result<InitResult, VodError> {
    let reply = ApiReply::parse(raw)?;
    match reply.code {
        code if code < 0 => Ok(InitResult::Error(reply.fault())),
        0 => Ok(InitResult::FreshUpload),
        1 => {
            let body: ResumeBody = reply.into_body()?;
            Ok(InitResult::Resume {
                data_size: body.data_size,
                parts: body.list_parts.unwrap_or_default(),
            })
        }
        2 => Ok(InitResult::AlreadyUploaded(uploaded(reply)?)),
        code => Err(VodError::server(
            code,
            format!("unexpected init code: {}", reply.message()),
        )),
    }
}

/// Decodes an `UploadPart` reply.
pub fn decode_ack(raw: &str) -> Result<Reply<()>, VodError> {
    let reply = ApiReply::parse(raw)?;
    if reply.code < 0 {
        return Ok(Reply::Fault(reply.fault()));
    }
    Ok(Reply::Done(()))
}

/// Decodes a reply that carries the stored file identity
/// (`FinishUpload`, `SmallFileUpload`).
pub fn decode_uploaded(raw: &str) -> Result<Reply<UploadSuccess>, VodError> {
    let reply = ApiReply::parse(raw)?;
    if reply.code < 0 {
        return Ok(Reply::Fault(reply.fault()));
    }
    Ok(Reply::Done(uploaded(reply)?))
}

fn uploaded(reply: ApiReply) -> Result<UploadSuccess, VodError> {
    let body: UploadedBody = reply.into_body()?;
    Ok(UploadSuccess {
        file_id: body.file_id,
        url: body.url,
    })
}
