//! crates/stats_io/src/hasher.rs
//!
//! SHA-256 digests of bundles and written reports. Hex digests are **lowercase**.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::{IoError, IoResult};

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 of a file's contents, read in chunks.
pub fn sha256_file(path: &Path) -> IoResult<String> {
    let read_err = |e: std::io::Error| IoError::Read(format!("{}: {e}", path.display()));
    let mut file = File::open(path).map_err(read_err)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(read_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Leading `n` hex digits of a digest, for log lines.
pub fn short_hex(hex64: &str, n: usize) -> &str {
    hex64.get(..n.min(hex64.len())).unwrap_or(hex64)
}
