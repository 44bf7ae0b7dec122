use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use md5::Md5;
use sha1::{Digest, Sha1};

use crate::TransferError;

// ---------------------------------------------------------------------------
// Checksum helpers
// ---------------------------------------------------------------------------

/// MD5 of `data`, lowercase hex. Identifies a single part.
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// SHA-1 of `data`, lowercase hex.
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// SHA-1 of an entire file, lowercase hex. Identifies the upload session.
pub fn file_sha1(path: &Path) -> Result<String, TransferError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// PartReader
// ---------------------------------------------------------------------------

/// A part read from disk, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub offset: u64,
    /// Bytes actually read. Shorter than the part size at end of file.
    pub length: u64,
    /// MD5 over exactly `data`.
    pub md5: String,
    pub data: Vec<u8>,
}

/// Reads a file in fixed-size parts.
pub struct PartReader {
    file: File,
    part_size: u64,
    offset: u64,
    file_size: u64,
}

impl PartReader {
    /// Opens `path` for part-wise reading.
    pub fn new(path: &Path, part_size: u64) -> Result<Self, TransferError> {
        if part_size == 0 {
            return Err(TransferError::InvalidPartSize(part_size));
        }
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        Ok(Self {
            file,
            part_size,
            offset: 0,
            file_size,
        })
    }

    /// Seeks to `offset`; the next part starts there.
    pub fn seek_to(&mut self, offset: u64) -> Result<(), TransferError> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.offset = offset;
        Ok(())
    }

    /// Reads the next part. Returns `None` at end of file.
    ///
    /// A part never extends past the end of the file; a short read shrinks
    /// the part and its MD5 covers only the bytes read.
    pub fn next_part(&mut self) -> Result<Option<Part>, TransferError> {
        let want = self.part_size.min(self.remaining());
        self.read_up_to(want)
    }

    /// Reads the part starting at `offset`.
    pub fn read_at(&mut self, offset: u64) -> Result<Option<Part>, TransferError> {
        if offset != self.offset {
            self.seek_to(offset)?;
        }
        self.next_part()
    }

    /// Reads at most `length` bytes starting at `offset`, even if the file
    /// has grown since it was opened.
    pub fn read_range(&mut self, offset: u64, length: u64) -> Result<Option<Part>, TransferError> {
        if offset != self.offset {
            self.seek_to(offset)?;
        }
        self.read_up_to(length)
    }

    fn read_up_to(&mut self, want: u64) -> Result<Option<Part>, TransferError> {
        if want == 0 {
            return Ok(None);
        }

        let mut data = Vec::with_capacity(want as usize);
        (&mut self.file).take(want).read_to_end(&mut data)?;
        if data.is_empty() {
            return Ok(None);
        }

        let part = Part {
            offset: self.offset,
            length: data.len() as u64,
            md5: md5_hex(&data),
            data,
        };
        self.offset += part.length;
        Ok(Some(part))
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn part_size(&self) -> u64 {
        self.part_size
    }

    /// File size at open time.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn remaining(&self) -> u64 {
        self.file_size.saturating_sub(self.offset)
    }
}
