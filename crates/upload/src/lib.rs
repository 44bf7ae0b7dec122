//! Chunked, resumable upload engine for the VOD service.
//!
//! # Flow
//!
//! 1. **Inspect** - validate the local file, derive name and type
//! 2. **Checksum** - SHA-1 of the whole file, the server's session key
//! 3. **Init** - the server answers fresh, resume or already stored
//! 4. **Upload** - send missing parts one after another, with retry
//! 5. **Finish** - the server assembles the file and returns its id

pub mod engine;
mod guard;
pub mod retry;
pub mod types;

#[cfg(test)]
mod fake;

pub use engine::UploadEngine;
pub use retry::{send_with_retry, with_resign};
pub use types::UploadEvent;
