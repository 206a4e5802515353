//! render_json.rs
//! Report JSON renderer: session → columns → rows → footnote → source?
//!
//! `N/A` cells are emitted as `null`; formatted values stay strings so the
//! JSON shows exactly what the page shows.

use serde_json::{Map as JsonMap, Value};
use stats_core::StatName;

use crate::{Cell, Footnote, SourceInfo, StatsPageModel, StatsRow};

/// Build the top-level report object.
pub fn render_report_json(m: &StatsPageModel) -> Value {
    let mut root = obj();

    root.insert("session".into(), Value::String(m.session_short.clone()));
    root.insert(
        "columns".into(),
        Value::Array(StatName::ALL.iter().map(|s| Value::from(s.key())).collect()),
    );
    root.insert("rows".into(), Value::Array(m.rows.iter().map(row_json).collect()));
    root.insert("footnote".into(), footnote_json(&m.footnote));
    if let Some(src) = &m.source {
        root.insert("source".into(), source_json(src));
    }

    Value::Object(root)
}

/* ----------------------- sections ----------------------- */

fn row_json(r: &StatsRow) -> Value {
    let mut o = obj();
    o.insert("variable".into(), Value::String(r.variable.clone()));
    let cells = r
        .cells
        .iter()
        .map(|c| match c {
            Cell::Value(s) => Value::String(s.clone()),
            Cell::NotAvailable => Value::Null,
        })
        .collect();
    o.insert("cells".into(), Value::Array(cells));
    Value::Object(o)
}

fn footnote_json(f: &Footnote) -> Value {
    let mut o = obj();
    o.insert("first".into(), f.first.into());
    o.insert("last".into(), f.last.into());
    o.insert("mc_runs".into(), f.mc_runs.into());
    o.insert("linear".into(), f.linear.into());
    o.insert("text".into(), Value::String(f.text()));
    Value::Object(o)
}

fn source_json(s: &SourceInfo) -> Value {
    let mut o = obj();
    o.insert("path".into(), Value::String(s.path.clone()));
    o.insert("sha256".into(), Value::String(s.sha256.clone()));
    Value::Object(o)
}

#[inline]
fn obj() -> JsonMap<String, Value> {
    JsonMap::new()
}
