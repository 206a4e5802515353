// crates/stats_cli/src/args.rs
//
// CLI argument surface (types + validation helpers).
//
// Rules:
// - No networked paths (reject any scheme:// like http/https/file)
// - `render` needs an existing local bundle file; `serve` an existing data directory
// - `--render` may be given up to twice (html, json); defaults to html

use clap::{Parser, Subcommand};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "lwi-stats",
    disable_help_subcommand = true,
    about = "Time-series descriptive statistics page: render offline or serve over HTTP"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Only log warnings and errors.
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render the page for one statistics bundle into files.
    Render(RenderArgs),
    /// Serve the page, loading `<data-dir>/<session-id>.json` per request.
    Serve(ServeArgs),
}

#[derive(Debug, clap::Args, Clone)]
pub struct RenderArgs {
    /// Statistics bundle JSON path.
    #[arg(long)]
    pub bundle: PathBuf,

    /// Raw session cookie value; omit to render as a request without cookie.
    #[arg(long)]
    pub cookie: Option<String>,

    /// Output directory (default: current directory).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Renderer(s) to emit (html, json).
    #[arg(long, value_parser = ["json", "html"], num_args = 1..=2, default_value = "html")]
    pub render: Vec<String>,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ServeArgs {
    /// Directory holding one `<session-id>.json` bundle per session.
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Name of the session cookie.
    #[arg(long, default_value = "session_id")]
    pub cookie_name: String,
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
    BadCookieName(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local (no scheme): {p}"),
            NotFound(p) => write!(f, "not found: {p}"),
            BadCookieName(n) => write!(f, "invalid cookie name: {n:?}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

/// Locality and existence checks.
pub fn validate(mut args: Args) -> Result<Args, CliError> {
    match &mut args.command {
        Command::Render(r) => {
            require_local(&r.bundle)?;
            require_local(&r.out)?;
            if !fs::metadata(&r.bundle).map(|m| m.is_file()).unwrap_or(false) {
                return Err(CliError::NotFound(format!("--bundle {}", r.bundle.display())));
            }
            r.render.sort();
            r.render.dedup();
        }
        Command::Serve(s) => {
            require_local(&s.data_dir)?;
            if !fs::metadata(&s.data_dir).map(|m| m.is_dir()).unwrap_or(false) {
                return Err(CliError::NotFound(format!("--data-dir {}", s.data_dir.display())));
            }
            if !is_cookie_name(&s.cookie_name) {
                return Err(CliError::BadCookieName(s.cookie_name.clone()));
            }
        }
    }
    Ok(args)
}

/// Paths written as URLs (`https://…`, `file:…`) are refused.
fn require_local(p: &Path) -> Result<(), CliError> {
    let s = p.to_string_lossy();
    let lower = s.trim_start().to_ascii_lowercase();
    let is_url = lower.contains("://")
        || ["http:", "https:", "file:"].iter().any(|scheme| lower.starts_with(scheme));
    if is_url {
        return Err(CliError::NonLocalPath(s.into_owned()));
    }
    Ok(())
}

/// Cookie names are HTTP tokens.
fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}
