//! crates/stats_core/src/session.rs
//! Session identifier derived from the incoming session cookie.
//! ASCII-only, `[0-9a-zA-Z]` charset; no I/O.

use core::fmt;

/// Identifier used when the request carries no usable session cookie.
pub const FALLBACK_SESSION_ID: &str = "NOCOOKIE";

/// Number of trailing characters kept for the short display identifier.
pub const SHORT_ID_LEN: usize = 6;

/// Sanitized session identifier.
///
/// Display/debug only: it never changes which statistics the page shows.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SessionId(String);

impl SessionId {
    /// Derive the identifier from the raw cookie value.
    ///
    /// `None` falls back to [`FALLBACK_SESSION_ID`]; otherwise every character
    /// outside `[0-9a-zA-Z]` is dropped. An all-invalid cookie yields an empty id.
    pub fn from_cookie(raw: Option<&str>) -> Self {
        match raw {
            Some(value) => Self(sanitize(value)),
            None => Self(FALLBACK_SESSION_ID.to_string()),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing [`SHORT_ID_LEN`] characters (the whole id when shorter).
    pub fn short(&self) -> &str {
        // sanitized ids are ASCII, so byte offsets are char offsets
        let start = self.0.len().saturating_sub(SHORT_ID_LEN);
        &self.0[start..]
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_SESSION_ID
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::from_cookie(None)
    }
}

impl fmt::Display for SessionId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keep only ASCII letters and digits.
fn sanitize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}
