//! crates/stats_io/src/lib.rs
//! I/O crate for the statistics page.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - `loader`: the resource-loader seam that supplies a `StatsBundle`.
//! - `canonical_json` / `hasher`: sorted-key atomic JSON writes and SHA-256 digests.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod canonical_json;
pub mod hasher;
pub mod loader;

pub use loader::{
    load_bundle_from_path, parse_bundle, FileLoader, LoadedBundle, ResourceLoader,
    SessionDirLoader, StatsBundle, MAX_BUNDLE_BYTES,
};

/// Unified error for stats_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// No bundle at the resolved location.
    #[error("not found: {0}")]
    NotFound(String),

    /// Read failures other than a missing file.
    #[error("read error: {0}")]
    Read(String),

    /// Write / path errors (create_dir_all, rename, ...).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON deserialization errors, with a best-effort location.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Input exceeds the size bound.
    #[error("limit exceeded: {0}")]
    Limit(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json reports line/column rather than a pointer
        IoError::Json {
            pointer: format!("line {} column {}", e.line(), e.column()),
            msg: e.to_string(),
        }
    }
}
