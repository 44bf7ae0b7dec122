use vodsdk_protocol::{PartInfo, UploadSuccess};

use crate::TransferError;
use crate::plan::{UploadPlan, fresh_plan, resume_plan};

/// Lifecycle of one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Uninitialized,
    FreshUpload,
    Resuming,
    Finalizing,
    Complete,
    Failed,
}

/// State of a single chunked upload, owned by the engine for one call.
#[derive(Debug)]
pub struct UploadSession {
    file_name: String,
    file_type: String,
    file_sha: String,
    file_size: u64,
    part_size: u64,
    state: UploadState,
    /// Parts the server acknowledged at init (resume only).
    completed: Vec<PartInfo>,
    /// End of the contiguous range known to be on the server.
    cursor: u64,
    uploaded_bytes: u64,
    result: Option<UploadSuccess>,
}

impl UploadSession {
    pub fn new(
        file_name: impl Into<String>,
        file_type: impl Into<String>,
        file_sha: impl Into<String>,
        file_size: u64,
        part_size: u64,
    ) -> Result<Self, TransferError> {
        if part_size == 0 {
            return Err(TransferError::InvalidPartSize(part_size));
        }
        Ok(Self {
            file_name: file_name.into(),
            file_type: file_type.into(),
            file_sha: file_sha.into(),
            file_size,
            part_size,
            state: UploadState::Uninitialized,
            completed: Vec::new(),
            cursor: 0,
            uploaded_bytes: 0,
            result: None,
        })
    }

    fn transition(
        &mut self,
        allowed: &[UploadState],
        to: UploadState,
    ) -> Result<(), TransferError> {
        if !allowed.contains(&self.state) {
            return Err(TransferError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    /// Init reported nothing stored: every part is planned.
    pub fn begin_fresh(&mut self) -> Result<UploadPlan, TransferError> {
        let plan = fresh_plan(self.file_size, self.part_size)?;
        self.transition(&[UploadState::Uninitialized], UploadState::FreshUpload)?;
        Ok(plan)
    }

    /// Init reported a partial upload.
    ///
    /// The server's part size must equal the session's; a session never
    /// changes part size.
    pub fn begin_resume(
        &mut self,
        data_size: u64,
        parts: Vec<PartInfo>,
    ) -> Result<UploadPlan, TransferError> {
        self.ensure_part_size(data_size)?;
        let plan = resume_plan(self.file_size, self.part_size, &parts)?;
        self.transition(&[UploadState::Uninitialized], UploadState::Resuming)?;
        self.completed = plan.skipped.clone();
        Ok(plan)
    }

    /// Init reported the file already stored.
    pub fn complete_existing(&mut self, result: UploadSuccess) -> Result<(), TransferError> {
        self.transition(&[UploadState::Uninitialized], UploadState::Complete)?;
        self.cursor = self.file_size;
        self.result = Some(result);
        Ok(())
    }

    /// Fails unless `part_size` matches the session's.
    pub fn ensure_part_size(&self, part_size: u64) -> Result<(), TransferError> {
        if part_size != self.part_size {
            return Err(TransferError::PartSizeMismatch {
                expected: self.part_size,
                actual: part_size,
            });
        }
        Ok(())
    }

    fn advance(&mut self, offset: u64, length: u64) -> Result<(), TransferError> {
        if !matches!(self.state, UploadState::FreshUpload | UploadState::Resuming) {
            return Err(TransferError::InvalidTransition {
                from: self.state,
                to: self.state,
            });
        }
        let end = offset.checked_add(length).filter(|end| *end <= self.file_size);
        let end = match end {
            Some(end) if offset == self.cursor => end,
            _ => {
                return Err(TransferError::InconsistentParts(format!(
                    "part at {offset} with length {length} does not continue at {}",
                    self.cursor
                )));
            }
        };
        self.cursor = end;
        Ok(())
    }

    /// Records a part acknowledged by the server during this call.
    pub fn record_uploaded(&mut self, offset: u64, length: u64) -> Result<(), TransferError> {
        self.advance(offset, length)?;
        self.uploaded_bytes += length;
        Ok(())
    }

    /// Moves the cursor over a part the server held before this call.
    pub fn record_skipped(&mut self, part: &PartInfo) -> Result<(), TransferError> {
        self.advance(part.offset, part.length)
    }

    /// All bytes are on the server; ready to finish.
    pub fn begin_finalize(&mut self) -> Result<(), TransferError> {
        if self.cursor != self.file_size {
            return Err(TransferError::InconsistentParts(format!(
                "finalizing at {} of {} bytes",
                self.cursor, self.file_size
            )));
        }
        self.transition(
            &[UploadState::FreshUpload, UploadState::Resuming],
            UploadState::Finalizing,
        )
    }

    pub fn complete(&mut self, result: UploadSuccess) -> Result<(), TransferError> {
        self.transition(&[UploadState::Finalizing], UploadState::Complete)?;
        self.result = Some(result);
        Ok(())
    }

    pub fn fail(&mut self) {
        self.state = UploadState::Failed;
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    pub fn file_sha(&self) -> &str {
        &self.file_sha
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn part_size(&self) -> u64 {
        self.part_size
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn completed_parts(&self) -> &[PartInfo] {
        &self.completed
    }

    /// Bytes sent during this call, excluding acknowledged parts.
    pub fn uploaded_bytes(&self) -> u64 {
        self.uploaded_bytes
    }

    pub fn result(&self) -> Option<&UploadSuccess> {
        self.result.as_ref()
    }
}
