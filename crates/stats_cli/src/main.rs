// crates/stats_cli/src/main.rs
//
// Exit codes, typed error mapping, logging setup, and the two run paths:
// `render` (bundle → html/json files) and `serve` (HTTP, cookie → bundle → page).

mod args;
mod serve;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
}

use std::path::Path;
use std::process::ExitCode;

use args::{parse_and_validate as parse_cli, Args, Command, RenderArgs, ServeArgs};
use stats_core::SessionId;
use stats_io::{
    canonical_json, hasher, FileLoader, IoError, LoadedBundle, ResourceLoader, SessionDirLoader,
};
use stats_report::{build_model_from_loaded, render_html, PageAssets, StatsPageModel};
use tracing::info;
use tracing_subscriber::EnvFilter;

const HTML_FILE: &str = "show_stats.html";
const JSON_FILE: &str = "stats_report.json";

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Bundle JSON shape / size failures
    Validation(String),
    /// Read/write/bind errors
    Io(String),
    /// Rendering errors (e.g. renderer not compiled in)
    Render(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::Render(m) => write!(f, "render: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("lwi-stats: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_logging(&args);

    let res = match &args.command {
        Command::Render(r) => run_render(r),
        Command::Serve(s) => run_serve(s),
    };
    let rc = match res {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            tracing::error!("{e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// stderr logging; `RUST_LOG` wins over `--quiet`.
fn init_logging(args: &Args) {
    let default = if args.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Map our typed errors to the exit-code table.
fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) | MainError::Render(_) => IO,
    }
}

/// Translate stats_io::IoError into MainError buckets.
fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Json { pointer, msg } => MainError::Validation(format!("bundle json {pointer}: {msg}")),
        IoError::Limit(m) => MainError::Validation(format!("limit: {m}")),
        IoError::NotFound(m) => MainError::Io(format!("not found: {m}")),
        IoError::Read(m) => MainError::Io(format!("read: {m}")),
        IoError::Path(m) => MainError::Io(format!("path: {m}")),
    }
}

fn run_render(args: &RenderArgs) -> Result<(), MainError> {
    let session = SessionId::from_cookie(args.cookie.as_deref());
    let loaded: LoadedBundle = FileLoader::new(&args.bundle).load(&session).map_err(map_io_err)?;
    let model = build_model_from_loaded(&session, &loaded);
    info!(
        session = session.short(),
        rows = model.rows.len(),
        selected = loaded.bundle.selected.len(),
        "statistics model built"
    );

    for fmt in &args.render {
        match fmt.as_str() {
            "html" => write_html(&model, &args.out)?,
            "json" => write_json(&model, &args.out)?,
            other => return Err(MainError::Render(format!("unknown renderer: {other}"))),
        }
    }
    Ok(())
}

fn write_html(model: &StatsPageModel, out_dir: &Path) -> Result<(), MainError> {
    let path = out_dir.join(HTML_FILE);
    let html = render_html(model, &PageAssets::default());
    canonical_json::write_bytes_atomic(&path, html.as_bytes())
        .map_err(|e| MainError::Io(format!("write {HTML_FILE}: {e}")))?;
    log_written(&path, "page written")
}

// Always accept the concrete model type; gate body by feature.
fn write_json(model: &StatsPageModel, out_dir: &Path) -> Result<(), MainError> {
    #[cfg(feature = "report-json")]
    {
        let path = out_dir.join(JSON_FILE);
        let value = stats_report::render_report_json(model);
        canonical_json::write_canonical_file(&path, &value)
            .map_err(|e| MainError::Io(format!("write {JSON_FILE}: {e}")))?;
        log_written(&path, "json report written")
    }
    #[cfg(not(feature = "report-json"))]
    {
        let _ = (model, out_dir);
        Err(MainError::Render(format!(
            "json renderer not enabled (build with feature `report-json`) for {JSON_FILE}"
        )))
    }
}

/// Digest the file as it landed on disk.
fn log_written(path: &Path, what: &str) -> Result<(), MainError> {
    let digest = hasher::sha256_file(path).map_err(map_io_err)?;
    info!(path = %path.display(), sha256 = hasher::short_hex(&digest, 12), "{what}");
    Ok(())
}

fn run_serve(args: &ServeArgs) -> Result<(), MainError> {
    let loader = SessionDirLoader::new(&args.data_dir);
    serve::run(args.bind, &args.cookie_name, &loader, &PageAssets::default())
        .map_err(|e| MainError::Io(format!("serve {}: {e}", args.bind)))
}
