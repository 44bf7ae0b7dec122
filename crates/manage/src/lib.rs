//! Category and media metadata operations.
//!
//! Plain request/response calls on the API endpoint. Every reply must
//! carry `code == 0`; anything else surfaces as a server error with the
//! service's code and message.

pub mod class;
pub mod media;

#[cfg(test)]
mod fake;

pub use class::{ClassInfo, ClassManager, ClassNode, ClassSummary, ClassTree};
pub use media::{FileInfo, InfoFilter, MediaManager, ModifyVodInfo, PlayInfo};
