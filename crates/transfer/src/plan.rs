//! Which parts of a file still need uploading.

use tracing::debug;
use vodsdk_protocol::PartInfo;

use crate::TransferError;

/// A byte range to upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    pub offset: u64,
    pub length: u64,
}

impl PartRange {
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Parts to upload and parts the server already holds, both in offset order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPlan {
    pub upload: Vec<PartRange>,
    pub skipped: Vec<PartInfo>,
}

/// One step of executing a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    Upload(PartRange),
    Skip(PartInfo),
}

impl PlanStep {
    pub fn offset(&self) -> u64 {
        match self {
            PlanStep::Upload(r) => r.offset,
            PlanStep::Skip(p) => p.offset,
        }
    }
}

impl UploadPlan {
    pub fn upload_bytes(&self) -> u64 {
        self.upload.iter().map(|p| p.length).sum()
    }

    /// Uploads and skips merged in file order.
    pub fn steps(&self) -> Vec<PlanStep> {
        let mut steps: Vec<PlanStep> = self
            .upload
            .iter()
            .copied()
            .map(PlanStep::Upload)
            .chain(self.skipped.iter().cloned().map(PlanStep::Skip))
            .collect();
        steps.sort_by_key(PlanStep::offset);
        steps
    }
}

/// Length of the final part: `file_size mod part_size`, or a full part
/// when the file divides evenly.
pub fn last_part_len(file_size: u64, part_size: u64) -> u64 {
    match file_size % part_size {
        0 => part_size.min(file_size),
        rem => rem,
    }
}

/// Ranges covering `[start, end)` in `part_size` steps.
fn ranges(start: u64, end: u64, part_size: u64) -> impl Iterator<Item = PartRange> {
    (start..end)
        .step_by(part_size as usize)
        .map(move |offset| PartRange {
            offset,
            length: part_size.min(end - offset),
        })
}

/// Every part of a fresh upload.
pub fn fresh_plan(file_size: u64, part_size: u64) -> Result<UploadPlan, TransferError> {
    if part_size == 0 {
        return Err(TransferError::InvalidPartSize(part_size));
    }
    Ok(UploadPlan {
        upload: ranges(0, file_size, part_size).collect(),
        skipped: Vec::new(),
    })
}

/// Plans a resumed upload around the parts the server reports.
///
/// Gaps before each acknowledged part are filled with full-size parts,
/// then the tail is uploaded to end of file. Each byte is either
/// acknowledged or planned exactly once. Fails when the reported parts
/// cannot be reconciled with `part_size`: a gap that is not a whole
/// number of parts, an overlap, a short part that is not the last one,
/// or a part extending past the file.
pub fn resume_plan(
    file_size: u64,
    part_size: u64,
    acknowledged: &[PartInfo],
) -> Result<UploadPlan, TransferError> {
    if part_size == 0 {
        return Err(TransferError::InvalidPartSize(part_size));
    }

    let mut sorted = acknowledged.to_vec();
    sorted.sort_by_key(|p| p.offset);

    let mut plan = UploadPlan::default();
    let mut cursor = 0u64;
    for part in sorted {
        if part.offset < cursor {
            return Err(TransferError::InconsistentParts(format!(
                "part at {} overlaps data ending at {cursor}",
                part.offset
            )));
        }
        let gap = part.offset - cursor;
        if gap % part_size != 0 {
            return Err(TransferError::InconsistentParts(format!(
                "gap of {gap} bytes before offset {} is not a multiple of {part_size}",
                part.offset
            )));
        }
        let end = match part.offset.checked_add(part.length) {
            Some(end) if end <= file_size => end,
            _ => {
                return Err(TransferError::InconsistentParts(format!(
                    "part at {} with length {} exceeds file size {file_size}",
                    part.offset, part.length
                )));
            }
        };
        if part.length != part_size && end != file_size {
            return Err(TransferError::InconsistentParts(format!(
                "part at {} has length {}, expected {part_size}",
                part.offset, part.length
            )));
        }

        plan.upload.extend(ranges(cursor, part.offset, part_size));
        cursor = end;
        plan.skipped.push(part);
    }
    plan.upload.extend(ranges(cursor, file_size, part_size));

    debug!(
        acknowledged = plan.skipped.len(),
        to_upload = plan.upload.len(),
        bytes = plan.upload_bytes(),
        "resume plan"
    );
    Ok(plan)
}
