//! stats_report/src/lib.rs — Pure report model + renderers (HTML/JSON) for the
//! time-series statistics page.
//!
//! Rules:
//! - No I/O here. Callers pass the cookie value and the already-loaded bundle.
//! - No recomputation: statistics are echoed, only formatted (`%.5G`).
//! - Missing data degrades to `N/A` cells or omitted rows; rendering never fails.

#![deny(unsafe_code)]

use stats_core::{displayable, format_g5, ReportMetadata, SessionId, StatName};
use stats_io::{LoadedBundle, StatsBundle};
use tracing::debug;

#[cfg(feature = "render_html")]
pub mod render_html;
#[cfg(feature = "render_json")]
pub mod render_json;

#[cfg(feature = "render_html")]
pub use render_html::{render_html, PageAssets, CONTENT_SECURITY_POLICY};
#[cfg(feature = "render_json")]
pub use render_json::render_report_json;

/// Marker shown for statistics that are missing, non-numeric, or computed
/// from zero observations.
pub const NOT_AVAILABLE: &str = "N/A";

// ===== Model =====

#[derive(Clone, Debug, PartialEq)]
pub struct StatsPageModel {
    /// Trailing characters of the session id (display/debug only).
    pub session_short: String,
    pub rows: Vec<StatsRow>,
    pub footnote: Footnote,
    pub source: Option<SourceInfo>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatsRow {
    pub variable: String,
    /// One cell per `StatName::ALL` entry, same order.
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Value(String),
    NotAvailable,
}

impl Cell {
    pub fn as_display(&self) -> &str {
        match self {
            Cell::Value(s) => s,
            Cell::NotAvailable => NOT_AVAILABLE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Footnote {
    pub first: u64,
    pub last: u64,
    pub mc_runs: u64,
    pub linear: bool,
}

impl Footnote {
    /// Footnote paragraph contents. The log marker carries its own `<em>` markup.
    pub fn text(&self) -> String {
        let mut s = format!(
            "Time step range: from {} to {}. ",
            self.first.saturating_add(1),
            self.last
        );
        if self.mc_runs > 1 {
            s.push_str(&format!("Monte Carlo runs: {}. ", self.mc_runs));
        }
        if !self.linear {
            s.push_str("  <em>Log values</em>.");
        }
        s
    }
}

impl From<ReportMetadata> for Footnote {
    fn from(m: ReportMetadata) -> Self {
        Footnote { first: m.first, last: m.last, mc_runs: m.mc_runs, linear: m.linear }
    }
}

/// Where the bundle came from; only the JSON report shows it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceInfo {
    pub path: String,
    pub sha256: String,
}

// ===== Assembly =====

/// Build the page model from a session id and a statistics bundle.
///
/// Rows follow `bundle.selected`; variables without statistics are skipped.
pub fn build_model(session: &SessionId, bundle: &StatsBundle) -> StatsPageModel {
    let mut rows = Vec::with_capacity(bundle.selected.len());
    for var in &bundle.selected {
        let Some(vars) = bundle.stats.get(var) else {
            debug!(session = session.short(), variable = %var, "no statistics; row skipped");
            continue;
        };
        let cells = StatName::ALL
            .into_iter()
            .map(|name| match displayable(vars, name) {
                Some(v) => Cell::Value(format_g5(v)),
                None => Cell::NotAvailable,
            })
            .collect();
        rows.push(StatsRow { variable: var.clone(), cells });
    }

    StatsPageModel {
        session_short: session.short().to_string(),
        rows,
        footnote: bundle.meta.into(),
        source: None,
    }
}

/// Same as [`build_model`], keeping the bundle's source and digest.
pub fn build_model_from_loaded(session: &SessionId, loaded: &LoadedBundle) -> StatsPageModel {
    let mut model = build_model(session, &loaded.bundle);
    model.source = Some(SourceInfo { path: loaded.source.clone(), sha256: loaded.sha256.clone() });
    model
}

/// Render the whole page from explicit request inputs: raw cookie value,
/// loaded statistics, and asset paths.
#[cfg(feature = "render_html")]
pub fn render_stats_page(cookie: Option<&str>, bundle: &StatsBundle, assets: &PageAssets) -> String {
    let session = SessionId::from_cookie(cookie);
    let model = build_model(&session, bundle);
    debug!(session = session.short(), rows = model.rows.len(), "rendering statistics page");
    render_html(&model, assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stats_core::{StatValue, VariableStats};

    fn stats(pairs: &[(&str, f64)]) -> VariableStats {
        pairs.iter().map(|(k, v)| (k.to_string(), StatValue::Number(*v))).collect()
    }

    fn full_gdp() -> VariableStats {
        stats(&[
            ("Mean", 2.5),
            ("Std. Deviation", 0.25),
            ("Minimum", 1.0),
            ("Maximum", 4.0),
            ("Obs", 100.0),
            ("MC Std. Error", 0.0000123),
        ])
    }

    fn bundle(selected: &[&str], table: Vec<(&str, VariableStats)>, meta: ReportMetadata) -> StatsBundle {
        StatsBundle {
            selected: selected.iter().map(|s| s.to_string()).collect(),
            stats: table.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            meta,
        }
    }

    fn meta(first: u64, last: u64, mc_runs: u64, linear: bool) -> ReportMetadata {
        ReportMetadata { first, last, mc_runs, linear }
    }

    #[test]
    fn single_variable_all_stats_shown() {
        let b = bundle(&["gdp"], vec![("gdp", full_gdp())], meta(0, 50, 1, true));
        let m = build_model(&SessionId::from_cookie(None), &b);

        assert_eq!(m.session_short, "COOKIE");
        assert_eq!(m.rows.len(), 1);
        assert_eq!(m.rows[0].variable, "gdp");
        let shown: Vec<_> = m.rows[0].cells.iter().map(Cell::as_display).collect();
        assert_eq!(shown, ["2.5", "0.25", "1", "4", "100", "1.23E-5"]);
        assert_eq!(m.footnote.text(), "Time step range: from 1 to 50. ");
    }

    #[test]
    fn zero_observations_hide_derived_stats() {
        let mut gdp = full_gdp();
        gdp.insert("Obs".into(), StatValue::Number(0.0));
        let b = bundle(&["gdp"], vec![("gdp", gdp)], meta(0, 10, 1, true));
        let m = build_model(&SessionId::default(), &b);

        let shown: Vec<_> = m.rows[0].cells.iter().map(Cell::as_display).collect();
        assert_eq!(shown, ["N/A", "N/A", "N/A", "N/A", "0", "N/A"]);
    }

    #[test]
    fn rows_follow_selection_and_skip_missing() {
        let b = bundle(
            &["zeta", "missing", "alpha", "zeta"],
            vec![("alpha", full_gdp()), ("zeta", full_gdp()), ("unselected", full_gdp())],
            meta(0, 1, 1, true),
        );
        let m = build_model(&SessionId::default(), &b);
        let vars: Vec<_> = m.rows.iter().map(|r| r.variable.as_str()).collect();
        assert_eq!(vars, ["zeta", "alpha", "zeta"]);
    }

    #[test]
    fn missing_and_non_numeric_stats_are_not_available() {
        let mut v = stats(&[("Mean", 1234.5678), ("Obs", 3.0)]);
        v.insert("Maximum".into(), StatValue::Text("n/a".into()));
        v.insert("Minimum".into(), StatValue::Null);
        v.insert("Std. Deviation".into(), StatValue::Other);
        v.insert("Median".into(), StatValue::Number(7.0));
        let b = bundle(&["x"], vec![("x", v)], meta(0, 1, 1, true));
        let m = build_model(&SessionId::default(), &b);

        assert_eq!(
            m.rows[0].cells,
            vec![
                Cell::Value("1234.6".into()),
                Cell::NotAvailable,
                Cell::NotAvailable,
                Cell::NotAvailable,
                Cell::Value("3".into()),
                Cell::NotAvailable,
            ]
        );
    }

    #[test]
    fn nested_stat_value_renders_not_available() {
        let b = stats_io::parse_bundle(
            br#"{"selected": ["cpi"], "stats": {"cpi": {"Mean": [1, 2], "Obs": 10}}, "first": 0, "last": 5}"#,
        )
        .unwrap();
        let m = build_model(&SessionId::default(), &b);
        let shown: Vec<_> = m.rows[0].cells.iter().map(Cell::as_display).collect();
        assert_eq!(shown, ["N/A", "N/A", "N/A", "N/A", "10", "N/A"]);
    }

    #[test]
    fn footnote_variants() {
        let mc_log = Footnote { first: 9, last: 100, mc_runs: 5, linear: false };
        assert_eq!(
            mc_log.text(),
            "Time step range: from 10 to 100. Monte Carlo runs: 5.   <em>Log values</em>."
        );
        let single_log = Footnote { first: 0, last: 1, mc_runs: 1, linear: false };
        assert!(!single_log.text().contains("Monte Carlo"));
        assert!(single_log.text().ends_with("<em>Log values</em>."));
        let saturated = Footnote { first: u64::MAX, last: 0, mc_runs: 0, linear: true };
        assert_eq!(saturated.text(), format!("Time step range: from {} to 0. ", u64::MAX));
    }

    #[test]
    fn loaded_bundle_keeps_source() {
        let loaded = LoadedBundle {
            bundle: bundle(&[], vec![], meta(0, 1, 1, true)),
            source: "data/abc.json".into(),
            sha256: "00".repeat(32),
        };
        let m = build_model_from_loaded(&SessionId::default(), &loaded);
        assert!(m.rows.is_empty());
        assert_eq!(m.source.unwrap().path, "data/abc.json");
    }
}
