use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar exactly as a provider sent it.
///
/// Providers disagree on whether `weight` is `220` or `"220"`, and some send
/// empty strings for unknown ages. Adapters keep the raw value; coercion to a
/// number happens during featurization where bad values fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    /// Interpret the value as a finite number, if possible
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Int(v) => *v as f64,
            RawNumber::Float(v) => *v,
            RawNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Lift a JSON scalar into a raw number. Nulls, arrays and objects are dropped.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(RawNumber::Int(i))
                } else {
                    n.as_f64().map(RawNumber::Float)
                }
            }
            serde_json::Value::String(s) if !s.trim().is_empty() => {
                Some(RawNumber::Text(s.clone()))
            }
            _ => None,
        }
    }
}

impl From<i64> for RawNumber {
    fn from(value: i64) -> Self {
        RawNumber::Int(value)
    }
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawNumber::Int(v) => write!(f, "{v}"),
            RawNumber::Float(v) => write!(f, "{v}"),
            RawNumber::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A player as reported by one upstream provider, mapped to the common shape
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPlayerRecord {
    /// Provider-scoped identifier (e.g. "4984", "espn_3918298", "nfl_32004")
    pub player_id: String,
    /// Full display name (e.g. "Josh Allen")
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Position as the provider spells it (QB, RB, WR, TE, K, DEF, D/ST, ...)
    pub position: Option<String>,
    /// Team abbreviation (e.g. "BUF")
    pub team: Option<String>,
    pub jersey_number: Option<RawNumber>,
    pub height: Option<String>,
    pub weight: Option<RawNumber>,
    pub age: Option<RawNumber>,
    pub years_exp: Option<RawNumber>,
    pub rookie_year: Option<RawNumber>,
    pub college: Option<String>,
    pub injury_status: Option<String>,
    pub depth_chart_position: Option<String>,
    /// 1 = starter, 2 = primary backup, ...
    pub depth_chart_order: Option<RawNumber>,
    #[serde(default)]
    pub fantasy_positions: Vec<String>,
    /// Provenance tag of the adapter that emitted this record
    pub source: String,
}

impl RawPlayerRecord {
    /// Create a record carrying only identity fields
    pub fn new(
        source: impl Into<String>,
        player_id: impl Into<String>,
        name: impl Into<String>,
        position: impl Into<String>,
        team: impl Into<String>,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            name: Some(name.into()),
            position: Some(position.into()),
            team: Some(team.into()),
            source: source.into(),
            ..Default::default()
        }
    }
}

/// Where the winning dataset of an acquisition came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// A real upstream provider returned data
    Source(String),
    /// Every provider failed; the built-in fixture set was used
    Fixture,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Source(name) => write!(f, "{name}"),
            Provenance::Fixture => write!(f, "{}", crate::fixture::FIXTURE_SOURCE),
        }
    }
}

/// Non-empty string helper shared by the adapters
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Join first and last name the way the providers' display names read
pub(crate) fn join_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let joined = format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default());
    non_empty(Some(joined.as_str()))
}
