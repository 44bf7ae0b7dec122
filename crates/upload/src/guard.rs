//! Refuses concurrent uploads of the same file from one engine.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use vodsdk_protocol::VodError;

/// Checksums with an upload in flight.
#[derive(Debug, Default, Clone)]
pub(crate) struct ActiveUploads {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl ActiveUploads {
    /// Claims `file_sha`, failing if another upload holds it.
    pub(crate) fn claim(&self, file_sha: &str) -> Result<UploadClaim, VodError> {
        let mut active = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(file_sha.to_string()) {
            return Err(VodError::param(format!(
                "an upload of {file_sha} is already in progress"
            )));
        }
        Ok(UploadClaim {
            owner: self.clone(),
            file_sha: file_sha.to_string(),
        })
    }

    pub(crate) fn is_active(&self, file_sha: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(file_sha)
    }
}

/// Releases the checksum on drop.
#[derive(Debug)]
pub(crate) struct UploadClaim {
    owner: ActiveUploads,
    file_sha: String,
}

impl Drop for UploadClaim {
    fn drop(&mut self) {
        self.owner
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.file_sha);
    }
}
