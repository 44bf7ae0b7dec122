//! Data types for the upload flow.

use vodsdk_protocol::UploadSuccess;

/// Progress event emitted by
/// [`UploadEngine::upload_vod_file`](crate::UploadEngine::upload_vod_file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// Init answered; `parts` and `bytes` are what this call will send.
    Initialized {
        file_sha: String,
        resumed: bool,
        parts: usize,
        bytes: u64,
    },
    /// A part was acknowledged by the server.
    PartUploaded { offset: u64, length: u64 },
    /// A part the server already held was skipped.
    PartSkipped { offset: u64, length: u64 },
    Completed(UploadSuccess),
    Failed { error: String },
}
