use std::path::{Path, PathBuf};

use vodsdk_protocol::constants::MAX_FILE_NAME_BYTES;

use crate::TransferError;

/// Characters the service refuses in file names.
const FORBIDDEN_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// A local file checked and named for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    /// Upload name, without the type extension.
    pub file_name: String,
    pub file_type: String,
    pub size: u64,
}

/// Checks that `path` is a regular file and derives its upload name and type.
///
/// Without an explicit `file_type` the extension is used and the name is
/// the file stem. With one, a trailing `.{file_type}` is stripped from the
/// file name, falling back to the stem when the name ends differently.
pub fn inspect_file(path: &Path, file_type: Option<&str>) -> Result<LocalFile, TransferError> {
    let meta = std::fs::metadata(path)
        .map_err(|e| TransferError::InvalidFile(format!("{}: {e}", path.display())))?;
    if !meta.is_file() {
        return Err(TransferError::InvalidFile(format!(
            "{} is not a regular file",
            path.display()
        )));
    }

    let full_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            TransferError::InvalidFile(format!("{} has no usable name", path.display()))
        })?;
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(full_name);

    let (file_name, file_type) = match file_type.map(str::trim).filter(|t| !t.is_empty()) {
        Some(ty) => {
            let name = full_name
                .strip_suffix(&format!(".{ty}"))
                .unwrap_or(stem);
            (name.to_string(), ty.to_string())
        }
        None => {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .filter(|e| !e.is_empty())
                .ok_or_else(|| {
                    TransferError::InvalidFile(format!(
                        "cannot determine file type of {}",
                        path.display()
                    ))
                })?;
            (stem.to_string(), ext.to_string())
        }
    };

    validate_file_name(&file_name)?;

    Ok(LocalFile {
        path: path.to_path_buf(),
        file_name,
        file_type,
        size: meta.len(),
    })
}

/// Rejects names the service would refuse: blank, longer than
/// [`MAX_FILE_NAME_BYTES`] or containing a reserved character.
pub fn validate_file_name(name: &str) -> Result<(), TransferError> {
    if name.trim().is_empty() {
        return Err(TransferError::InvalidFile("file name is blank".into()));
    }
    if name.len() > MAX_FILE_NAME_BYTES {
        return Err(TransferError::InvalidFile(format!(
            "file name is {} bytes, limit is {MAX_FILE_NAME_BYTES}",
            name.len()
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(TransferError::InvalidFile(format!(
            "file name contains '{c}': {name}"
        )));
    }
    Ok(())
}
