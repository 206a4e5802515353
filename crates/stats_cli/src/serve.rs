// crates/stats_cli/src/serve.rs
//
// Minimal HTTP front for the statistics page. One request at a time:
// read the session cookie → load `<data-dir>/<session-id>.json` → render.

use std::io;
use std::net::SocketAddr;

use percent_encoding::percent_decode_str;
use stats_core::SessionId;
use stats_io::{hasher, IoError, ResourceLoader};
use stats_report::{build_model_from_loaded, render_html, PageAssets, CONTENT_SECURITY_POLICY};
use tiny_http::{Header, Method, Response, Server};
use tracing::{debug, error, info, warn};

const HTML_UTF8: &str = "text/html; charset=UTF-8";
const TEXT_PLAIN: &str = "text/plain; charset=UTF-8";

/// Status, content type and body of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl PageResponse {
    fn text(status: u16, body: &str) -> Self {
        Self { status, content_type: TEXT_PLAIN, body: body.to_string() }
    }
}

/// Value of the first cookie called `name` in a `Cookie` header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim())
}

/// Route one request. `cookie_header` is the (joined) `Cookie` header, if any.
pub fn respond(
    url: &str,
    cookie_header: Option<&str>,
    cookie_name: &str,
    loader: &dyn ResourceLoader,
    assets: &PageAssets,
) -> PageResponse {
    let route = url.split('?').next().unwrap_or_default();
    if !matches!(route, "/" | "/show_stats" | "/show_stats.html") {
        return PageResponse::text(404, "Not found");
    }

    // cookie values arrive URL-encoded; decode before sanitizing
    let raw = cookie_header
        .and_then(|h| cookie_value(h, cookie_name))
        .map(|v| percent_decode_str(v).decode_utf8_lossy());
    let session = SessionId::from_cookie(raw.as_deref());
    if session.is_fallback() {
        debug!(cookie = cookie_name, "no session cookie; using fallback id");
    }
    match loader.load(&session) {
        Ok(loaded) => {
            let model = build_model_from_loaded(&session, &loaded);
            debug!(
                session = session.short(),
                rows = model.rows.len(),
                sha256 = hasher::short_hex(&loaded.sha256, 12),
                "statistics page rendered"
            );
            PageResponse { status: 200, content_type: HTML_UTF8, body: render_html(&model, assets) }
        }
        Err(IoError::NotFound(what)) => {
            warn!(session = session.short(), %what, "no statistics bundle");
            PageResponse::text(404, "No statistics available for this session")
        }
        Err(e) => {
            error!(session = session.short(), error = %e, "statistics bundle failed to load");
            PageResponse::text(500, "Statistics could not be loaded")
        }
    }
}

/// Dispatch on method: GET and HEAD are routed, anything else is 405.
/// `cookie_headers` holds every `Cookie` header of the request.
pub fn handle(
    method: &Method,
    url: &str,
    cookie_headers: &[&str],
    cookie_name: &str,
    loader: &dyn ResourceLoader,
    assets: &PageAssets,
) -> PageResponse {
    match method {
        Method::Get | Method::Head => {
            let joined = (!cookie_headers.is_empty()).then(|| cookie_headers.join("; "));
            respond(url, joined.as_deref(), cookie_name, loader, assets)
        }
        _ => PageResponse::text(405, "Method not allowed"),
    }
}

/// Headers sent with every response, whatever the status.
pub fn response_headers(content_type: &str) -> Vec<Header> {
    [("Content-Type", content_type), ("Content-Security-Policy", CONTENT_SECURITY_POLICY)]
        .into_iter()
        .filter_map(|(field, value)| match Header::from_bytes(field.as_bytes(), value.as_bytes()) {
            Ok(h) => Some(h),
            Err(()) => {
                warn!(field, "invalid response header skipped");
                None
            }
        })
        .collect()
}

/// Serve until the process is stopped.
pub fn run(
    bind: SocketAddr,
    cookie_name: &str,
    loader: &dyn ResourceLoader,
    assets: &PageAssets,
) -> io::Result<()> {
    let server = Server::http(bind).map_err(io::Error::other)?;
    info!(%bind, cookie = cookie_name, "serving statistics page");

    for request in server.incoming_requests() {
        let cookies: Vec<&str> = request
            .headers()
            .iter()
            .filter(|h| h.field.equiv("Cookie"))
            .map(|h| h.value.as_str())
            .collect();
        let page = handle(request.method(), request.url(), &cookies, cookie_name, loader, assets);

        let mut response = Response::from_string(page.body).with_status_code(page.status);
        for header in response_headers(page.content_type) {
            response.add_header(header);
        }

        if let Err(e) = request.respond(response) {
            error!(error = %e, "failed to send response");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stats_io::SessionDirLoader;
    use std::fs;

    const BUNDLE: &str = r#"{"selected": ["gdp"], "stats": {"gdp": {"Mean": 2.5, "Obs": 100}},
                             "first": 0, "last": 50}"#;

    #[test]
    fn cookie_lookup_takes_first_match() {
        let h = "theme=dark; session_id=abc123; session_id=zzz";
        assert_eq!(cookie_value(h, "session_id"), Some("abc123"));
        assert_eq!(cookie_value(h, "theme"), Some("dark"));
        assert_eq!(cookie_value(h, "missing"), None);
        assert_eq!(cookie_value("flag; a=", "a"), Some(""));
    }

    #[test]
    fn routes_session_to_its_bundle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("abc123.json"), BUNDLE).unwrap();
        let loader = SessionDirLoader::new(dir.path());
        let assets = PageAssets::default();

        let ok = respond("/show_stats?x=1", Some("session_id=abc-123"), "session_id", &loader, &assets);
        assert_eq!(ok.status, 200);
        assert_eq!(ok.content_type, HTML_UTF8);
        assert!(ok.body.contains("<td><b>gdp</b></td>"));
        assert!(ok.body.contains("Time step range: from 1 to 50. "));

        let other = respond("/", Some("session_id=other"), "session_id", &loader, &assets);
        assert_eq!(other.status, 404);

        let unknown = respond("/admin", Some("session_id=abc123"), "session_id", &loader, &assets);
        assert_eq!(unknown.status, 404);
        assert_eq!(unknown.body, "Not found");
    }

    #[test]
    fn missing_cookie_uses_fallback_bundle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("NOCOOKIE.json"), BUNDLE).unwrap();
        let loader = SessionDirLoader::new(dir.path());

        let page = respond("/", None, "session_id", &loader, &PageAssets::default());
        assert_eq!(page.status, 200);
    }

    #[test]
    fn encoded_cookie_is_decoded_before_sanitizing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("abc123.json"), BUNDLE).unwrap();
        let loader = SessionDirLoader::new(dir.path());
        let assets = PageAssets::default();

        let page = respond("/", Some("session_id=abc%3D123"), "session_id", &loader, &assets);
        assert_eq!(page.status, 200);
        let page = respond("/", Some("session_id=%61bc%31%323"), "session_id", &loader, &assets);
        assert_eq!(page.status, 200);
    }

    #[test]
    fn only_get_and_head_are_routed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("abc123.json"), BUNDLE).unwrap();
        let loader = SessionDirLoader::new(dir.path());
        let assets = PageAssets::default();
        let cookies = ["theme=dark", "session_id=abc123"];

        for method in [Method::Get, Method::Head] {
            let page = handle(&method, "/show_stats.html", &cookies, "session_id", &loader, &assets);
            assert_eq!(page.status, 200, "{method:?}");
        }
        let post = handle(&Method::Post, "/", &cookies, "session_id", &loader, &assets);
        assert_eq!(post.status, 405);
        assert_eq!(post.content_type, TEXT_PLAIN);
    }

    #[test]
    fn every_response_carries_type_and_csp() {
        for content_type in [HTML_UTF8, TEXT_PLAIN] {
            let headers = response_headers(content_type);
            let find = |name: &'static str| {
                headers
                    .iter()
                    .find(|h| h.field.equiv(name))
                    .map(|h| h.value.as_str().to_string())
            };
            assert_eq!(find("Content-Type").as_deref(), Some(content_type));
            assert_eq!(find("Content-Security-Policy").as_deref(), Some(CONTENT_SECURITY_POLICY));
            assert!(CONTENT_SECURITY_POLICY.starts_with("default-src 'self'"));
        }
    }

    #[test]
    fn broken_bundle_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("abc.json"), "{not json").unwrap();
        let loader = SessionDirLoader::new(dir.path());

        let page = respond("/", Some("session_id=abc"), "session_id", &loader, &PageAssets::default());
        assert_eq!(page.status, 500);
        assert_eq!(page.content_type, TEXT_PLAIN);
    }
}
