//! Loader: read a local statistics bundle (selected variables, per-variable
//! statistics, time-step range, Monte Carlo runs, scale) and hand it to the
//! renderer together with its source label and SHA-256 digest. No network I/O.
//!
//! Bundle shape (JSON):
//! `{"selected": [..], "stats": {var: {stat: value}}, "first": n, "last": n,
//!   "mc_runs": n, "linear": bool}`

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use stats_core::{ReportMetadata, SessionId, StatsTable};
use tracing::debug;

use crate::{hasher, IoError, IoResult};

/// Upper bound on bundle size.
pub const MAX_BUNDLE_BYTES: u64 = 16 * 1024 * 1024;

/// Everything the statistics page needs, as produced by the computation layer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatsBundle {
    /// Variables chosen for display; defines row order.
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default)]
    pub stats: StatsTable,
    #[serde(flatten)]
    pub meta: ReportMetadata,
}

/// A bundle plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedBundle {
    pub bundle: StatsBundle,
    pub source: String,
    /// Lowercase hex SHA-256 of the raw bundle bytes.
    pub sha256: String,
}

/// Supplies the statistics bundle for a request.
pub trait ResourceLoader {
    fn load(&self, session: &SessionId) -> IoResult<LoadedBundle>;
}

/// Always serves the same bundle file, whatever the session.
#[derive(Debug, Clone)]
pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResourceLoader for FileLoader {
    fn load(&self, _session: &SessionId) -> IoResult<LoadedBundle> {
        load_bundle_from_path(&self.path)
    }
}

/// Serves `<root>/<session-id>.json`.
#[derive(Debug, Clone)]
pub struct SessionDirLoader {
    root: PathBuf,
}

impl SessionDirLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Bundle path for a session. Session ids are `[0-9a-zA-Z]` only, so the
    /// file always lands directly under `root`.
    pub fn bundle_path(&self, session: &SessionId) -> PathBuf {
        self.root.join(format!("{}.json", session.as_str()))
    }
}

impl ResourceLoader for SessionDirLoader {
    fn load(&self, session: &SessionId) -> IoResult<LoadedBundle> {
        if session.as_str().is_empty() {
            return Err(IoError::NotFound("empty session id".into()));
        }
        load_bundle_from_path(&self.bundle_path(session))
    }
}

/// Read, bound-check, parse and digest a bundle file.
pub fn load_bundle_from_path(path: &Path) -> IoResult<LoadedBundle> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IoError::NotFound(path.display().to_string()),
        _ => IoError::Read(format!("{}: {e}", path.display())),
    })?;

    let mut bytes = Vec::new();
    file.take(MAX_BUNDLE_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| IoError::Read(format!("{}: {e}", path.display())))?;
    if bytes.len() as u64 > MAX_BUNDLE_BYTES {
        return Err(IoError::Limit(format!(
            "{} exceeds {MAX_BUNDLE_BYTES} bytes",
            path.display()
        )));
    }

    let bundle = parse_bundle(&bytes)?;
    let sha256 = hasher::sha256_hex(&bytes);
    debug!(
        source = %path.display(),
        sha256 = hasher::short_hex(&sha256, 12),
        selected = bundle.selected.len(),
        variables = bundle.stats.len(),
        "bundle loaded"
    );

    Ok(LoadedBundle {
        bundle,
        source: path.display().to_string(),
        sha256,
    })
}

/// Parse bundle JSON bytes.
pub fn parse_bundle(bytes: &[u8]) -> IoResult<StatsBundle> {
    Ok(serde_json::from_slice(bytes)?)
}
