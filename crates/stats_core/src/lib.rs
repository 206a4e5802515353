//! stats_core — Core types for the time-series statistics page.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! workspace (`stats_io`, `stats_report`, `stats_cli`):
//!
//! - `SessionId`: cookie-derived, `[0-9a-zA-Z]`-only session identifier
//! - `StatName` / `StatValue`: the six displayed statistics and loosely typed values
//! - `ReportMetadata`: time-step range, Monte Carlo runs, linear/log flag
//! - `format_g5`: `%.5G` general number formatting
//!
//! Deserialization of bundle-facing types is gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod format;
pub mod session;
pub mod stats;

pub use format::{format_g, format_g5};
pub use session::{SessionId, FALLBACK_SESSION_ID, SHORT_ID_LEN};
pub use stats::{displayable, stat, ReportMetadata, StatName, StatValue, StatsTable, VariableStats};
