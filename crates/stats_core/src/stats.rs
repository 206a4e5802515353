//! crates/stats_core/src/stats.rs
//! Statistic names (fixed column order), loosely typed values, and the
//! per-report metadata supplied alongside them.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// The six statistics shown per variable, in table column order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum StatName {
    Mean,
    StdDev,
    Min,
    Max,
    Obs,
    McStdError,
}

impl StatName {
    /// Column order of the statistics table.
    pub const ALL: [StatName; 6] = [
        StatName::Mean,
        StatName::StdDev,
        StatName::Min,
        StatName::Max,
        StatName::Obs,
        StatName::McStdError,
    ];

    /// Key used by the resource loader for this statistic.
    pub const fn key(self) -> &'static str {
        match self {
            StatName::Mean => "Mean",
            StatName::StdDev => "Std. Deviation",
            StatName::Min => "Minimum",
            StatName::Max => "Maximum",
            StatName::Obs => "Obs",
            StatName::McStdError => "MC Std. Error",
        }
    }

    /// Column heading text.
    pub const fn heading(self) -> &'static str {
        match self {
            StatName::Obs => "Observations",
            other => other.key(),
        }
    }
}

/// A statistic value as handed over by the loader: numbers, numeric strings,
/// or anything else that must render as not available.
#[derive(Clone, PartialEq, Debug, Default)]
pub enum StatValue {
    Number(f64),
    Text(String),
    Bool(bool),
    #[default]
    Null,
    /// Arrays and objects. Kept only so one odd entry cannot reject a bundle.
    Other,
}

impl StatValue {
    /// Numeric view of the value. Only finite numbers count; text counts when
    /// it parses as a finite number once surrounding whitespace is trimmed.
    pub fn as_number(&self) -> Option<f64> {
        let v = match self {
            StatValue::Number(n) => *n,
            StatValue::Text(s) => s.trim_matches(is_php_space).parse::<f64>().ok()?,
            StatValue::Bool(_) | StatValue::Null | StatValue::Other => return None,
        };
        v.is_finite().then_some(v)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Number(v)
    }
}

impl From<&str> for StatValue {
    fn from(s: &str) -> Self {
        StatValue::Text(s.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for StatValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};

        struct StatValueVisitor;

        impl<'de> Visitor<'de> for StatValueVisitor {
            type Value = StatValue;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("any JSON value")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<StatValue, E> {
                Ok(StatValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<StatValue, E> {
                Ok(StatValue::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<StatValue, E> {
                Ok(StatValue::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<StatValue, E> {
                Ok(StatValue::Number(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<StatValue, E> {
                Ok(StatValue::Text(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<StatValue, E> {
                Ok(StatValue::Text(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<StatValue, E> {
                Ok(StatValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<StatValue, E> {
                Ok(StatValue::Null)
            }

            fn visit_some<D2>(self, inner: D2) -> Result<StatValue, D2::Error>
            where
                D2: serde::Deserializer<'de>,
            {
                StatValue::deserialize(inner)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<StatValue, A::Error> {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(StatValue::Other)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<StatValue, A::Error> {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(StatValue::Other)
            }
        }

        deserializer.deserialize_any(StatValueVisitor)
    }
}

#[inline]
fn is_php_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}')
}

/// Statistic key → value for one variable.
pub type VariableStats = BTreeMap<String, StatValue>;

/// Variable name → its statistics.
pub type StatsTable = BTreeMap<String, VariableStats>;

/// Look up one statistic of a variable.
#[inline]
pub fn stat<'a>(vars: &'a VariableStats, name: StatName) -> Option<&'a StatValue> {
    vars.get(name.key())
}

/// Whether `name` may be shown for this variable: numeric, and either the
/// observation count itself or backed by a non-zero observation count.
pub fn displayable(vars: &VariableStats, name: StatName) -> Option<f64> {
    let v = stat(vars, name)?.as_number()?;
    if name == StatName::Obs {
        return Some(v);
    }
    let obs = stat(vars, StatName::Obs).and_then(StatValue::as_number)?;
    (obs != 0.0).then_some(v)
}

fn default_mc_runs() -> u64 {
    1
}

fn default_linear() -> bool {
    true
}

/// Time-step range, Monte Carlo run count and scale of the statistics.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct ReportMetadata {
    /// First time step (zero based).
    pub first: u64,
    pub last: u64,
    #[cfg_attr(feature = "serde", serde(default = "default_mc_runs"))]
    pub mc_runs: u64,
    /// `false` when the statistics were computed on log values.
    #[cfg_attr(feature = "serde", serde(default = "default_linear"))]
    pub linear: bool,
}

impl Default for ReportMetadata {
    fn default() -> Self {
        Self { first: 0, last: 0, mc_runs: default_mc_runs(), linear: default_linear() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, StatValue)]) -> VariableStats {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn keys_round_trip_in_column_order() {
        let keys: Vec<_> = StatName::ALL.iter().map(|s| s.key()).collect();
        assert_eq!(
            keys,
            ["Mean", "Std. Deviation", "Minimum", "Maximum", "Obs", "MC Std. Error"]
        );
        assert_eq!(StatName::Obs.heading(), "Observations");
    }

    #[test]
    fn numeric_detection() {
        assert_eq!(StatValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(StatValue::from(" 1e3\n").as_number(), Some(1000.0));
        assert_eq!(StatValue::from("-.5").as_number(), Some(-0.5));
        assert_eq!(StatValue::from("abc").as_number(), None);
        assert_eq!(StatValue::from("").as_number(), None);
        assert_eq!(StatValue::from("inf").as_number(), None);
        assert_eq!(StatValue::Number(f64::NAN).as_number(), None);
        assert_eq!(StatValue::Bool(true).as_number(), None);
        assert_eq!(StatValue::Null.as_number(), None);
        assert_eq!(StatValue::Other.as_number(), None);
    }

    #[test]
    fn zero_obs_hides_derived_stats() {
        let v = vars(&[("Mean", 3.0.into()), ("Obs", 0.0.into())]);
        assert_eq!(displayable(&v, StatName::Mean), None);
        assert_eq!(displayable(&v, StatName::Obs), Some(0.0));
    }

    #[test]
    fn missing_obs_hides_derived_stats() {
        let v = vars(&[("Mean", 3.0.into())]);
        assert_eq!(displayable(&v, StatName::Mean), None);
        assert_eq!(displayable(&v, StatName::Obs), None);
    }

    #[test]
    fn nonzero_obs_shows_numeric_stats_only() {
        let v = vars(&[("Mean", 3.0.into()), ("Minimum", "n/a".into()), ("Obs", "12".into())]);
        assert_eq!(displayable(&v, StatName::Mean), Some(3.0));
        assert_eq!(displayable(&v, StatName::Min), None);
        assert_eq!(displayable(&v, StatName::Max), None);
        assert_eq!(displayable(&v, StatName::Obs), Some(12.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn values_deserialize_from_loose_json() {
        let v: VariableStats = serde_json::from_str(
            r#"{"Mean": 1, "Minimum": "0.5", "Maximum": null, "Obs": true}"#,
        )
        .unwrap();
        assert_eq!(v["Mean"], StatValue::Number(1.0));
        assert_eq!(v["Minimum"], StatValue::Text("0.5".into()));
        assert_eq!(v["Maximum"], StatValue::Null);
        assert_eq!(v["Obs"], StatValue::Bool(true));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn nested_values_deserialize_as_other() {
        let v: VariableStats = serde_json::from_str(
            r#"{"Mean": [1, 2], "Minimum": {"v": [3]}, "Obs": 10}"#,
        )
        .unwrap();
        assert_eq!(v["Mean"], StatValue::Other);
        assert_eq!(v["Minimum"], StatValue::Other);
        assert_eq!(displayable(&v, StatName::Mean), None);
        assert_eq!(displayable(&v, StatName::Obs), Some(10.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn metadata_defaults() {
        let m: ReportMetadata = serde_json::from_str(r#"{"first": 0, "last": 50}"#).unwrap();
        assert_eq!(m, ReportMetadata { first: 0, last: 50, mc_runs: 1, linear: true });
    }
}
