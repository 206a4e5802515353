// crates/stats_report/src/render_html.rs
//
// Statistics page HTML renderer.
// Layout: head (CSP, charset, favicon, stylesheets) → title card →
// statistics table → footnote → Close button.
// All variable names are HTML-escaped; the footnote's `<em>` marker is the
// only markup coming from the model.

use std::fmt::Write as _;

use stats_core::StatName;

use crate::StatsPageModel;

/// Scripts and styles restricted to same-origin plus inline.
pub const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'";

const PAGE_TITLE: &str = "Statistics";
const TABLE_TITLE: &str = "Time series descriptive statistics";

/// Relative paths of the static resources the page references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageAssets {
    pub favicon: String,
    pub stylesheets: Vec<String>,
}

impl Default for PageAssets {
    fn default() -> Self {
        Self {
            favicon: "favicon.ico".into(),
            stylesheets: vec!["w3.css".into(), "lwi.css".into()],
        }
    }
}

// ------------------------- formatting helpers -------------------------

/// Escape text for HTML (minimal, deterministic).
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

// ------------------------- HTML builder -------------------------

pub struct HtmlBuilder {
    buf: String,
}

impl HtmlBuilder {
    pub fn new() -> Self {
        Self { buf: String::with_capacity(8 * 1024) }
    }

    /// Document head and the opening of the page card.
    pub fn start(&mut self, title: &str, assets: &PageAssets) {
        let _ = write!(
            self.buf,
            "<!DOCTYPE html>\n<html>\n<head>\n\
             <title>{}</title>\n\
             <meta http-equiv=\"Content-Security-Policy\" content=\"{}\">\n\
             <meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <link rel=\"icon\" href=\"{}\">\n",
            esc(title),
            CONTENT_SECURITY_POLICY,
            esc(&assets.favicon),
        );
        for css in &assets.stylesheets {
            let _ = writeln!(self.buf, "<link rel=\"stylesheet\" href=\"{}\">", esc(css));
        }
        let _ = write!(
            self.buf,
            "</head>\n<body>\n\
             <div class='w3-main' style='margin-left:10px; margin-right:10px'>\n\
             <div class='w3-container w3-card-2 w3-margin-bottom' style='margin-top:10px'>\n\
             <h1 class='w3-xxxlarge w3-text-blue'><b>{}</b></h1>\n",
            esc(title),
        );
    }

    /// Statistics table: heading, column header and one row per variable.
    pub fn section_table(&mut self, heading: &str, model: &StatsPageModel) {
        let _ = write!(
            self.buf,
            "<div class='w3-container' style='margin-top: 30px'>\n\
             <h2 class='w3-xxlarge w3-text-blue'>{}</h2>\n\
             <table class='w3-table w3-striped w3-white'>\n\
             <col style='width:22%'>\n",
            esc(heading),
        );
        for _ in StatName::ALL {
            self.buf.push_str("<col style='width:13%'>\n");
        }

        self.buf.push_str("<thead>\n<td><em>Variable</em></td>\n");
        for stat in StatName::ALL {
            let _ = writeln!(self.buf, "<td><em>{}</em></td>", esc(stat.heading()));
        }
        self.buf.push_str("</thead>\n");

        for row in &model.rows {
            let _ = write!(self.buf, "<tr>\n<td><b>{}</b></td>\n", esc(&row.variable));
            for cell in &row.cells {
                let _ = writeln!(self.buf, "<td>{}</td>", esc(cell.as_display()));
            }
            self.buf.push_str("</tr>\n");
        }
        self.buf.push_str("</table>\n");
    }

    /// Footnote paragraph; closes the table container.
    pub fn section_footnote(&mut self, text: &str) {
        let _ = write!(self.buf, "<p>{text}</p>\n</div>\n");
    }

    /// Close button (client side only).
    pub fn close_button(&mut self) {
        self.buf.push_str(
            "<div class=\"w3-container w3-center\" style=\"margin-top: 30px\">\n\
             <button onclick='window.close( )' class='w3-button w3-blue w3-padding-large \
             w3-margin-right w3-margin-bottom w3-hover-black'>Close</button>\n\
             </div>\n",
        );
    }

    /// Close document.
    pub fn finish(mut self) -> String {
        self.buf.push_str("</div>\n</div>\n</body>\n</html>\n");
        self.buf
    }
}

impl Default for HtmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ------------------------- entry -------------------------

/// Render the statistics page for an assembled model.
pub fn render_html(model: &StatsPageModel, assets: &PageAssets) -> String {
    let mut h = HtmlBuilder::new();
    h.start(PAGE_TITLE, assets);
    h.section_table(TABLE_TITLE, model);
    h.section_footnote(&model.footnote.text());
    h.close_button();
    h.finish()
}
