//! Chunked file transfer with server-driven resume.
//!
//! Splits a local file into fixed-size parts, checksums the file (SHA-1)
//! and each part (MD5), and plans which parts still need uploading when
//! the server reports a partial upload.

mod chunked;
mod plan;
mod types;
mod validation;

use vodsdk_protocol::VodError;

pub use chunked::{Part, PartReader, file_sha1, md5_hex, sha1_hex};
pub use plan::{PartRange, PlanStep, UploadPlan, fresh_plan, last_part_len, resume_plan};
pub use types::{UploadSession, UploadState};
pub use validation::{LocalFile, inspect_file, validate_file_name};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid part size: {0}")]
    InvalidPartSize(u64),

    #[error("part size changed mid-session: {expected} -> {actual}")]
    PartSizeMismatch { expected: u64, actual: u64 },

    #[error("inconsistent resume state: {0}")]
    InconsistentParts(String),

    #[error("invalid file: {0}")]
    InvalidFile(String),

    #[error("invalid session transition: {from:?} -> {to:?}")]
    InvalidTransition { from: UploadState, to: UploadState },
}

impl From<TransferError> for VodError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::Io(io) => VodError::Io(io),
            other => VodError::Param(other.to_string()),
        }
    }
}
