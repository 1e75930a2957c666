use roster_sources::{RawNumber, RawPlayerRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of fantasy-relevant positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FantasyPosition {
    QB,
    RB,
    WR,
    TE,
    K,
    DEF,
    #[serde(rename = "D/ST")]
    DST,
}

impl FantasyPosition {
    pub const ALL: [FantasyPosition; 7] = [
        FantasyPosition::QB,
        FantasyPosition::RB,
        FantasyPosition::WR,
        FantasyPosition::TE,
        FantasyPosition::K,
        FantasyPosition::DEF,
        FantasyPosition::DST,
    ];

    /// Parse an already canonicalized position; anything outside the set is `None`
    pub fn parse(position: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == position)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FantasyPosition::QB => "QB",
            FantasyPosition::RB => "RB",
            FantasyPosition::WR => "WR",
            FantasyPosition::TE => "TE",
            FantasyPosition::K => "K",
            FantasyPosition::DEF => "DEF",
            FantasyPosition::DST => "D/ST",
        }
    }

    /// Team defense, however the provider spelled it
    pub fn is_defense(&self) -> bool {
        matches!(self, FantasyPosition::DEF | FantasyPosition::DST)
    }
}

impl fmt::Display for FantasyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fused, canonicalized player row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPlayerRecord {
    pub player_id: String,
    /// Trimmed display name, never empty
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: FantasyPosition,
    /// Canonical team abbreviation, "FA" for free agents
    pub team: String,
    pub jersey_number: Option<RawNumber>,
    pub height: Option<String>,
    pub weight: Option<RawNumber>,
    pub age: Option<RawNumber>,
    pub years_exp: Option<RawNumber>,
    pub rookie_year: Option<RawNumber>,
    pub college: Option<String>,
    pub injury_status: Option<String>,
    pub depth_chart_position: Option<String>,
    pub depth_chart_order: Option<RawNumber>,
    #[serde(default)]
    pub fantasy_positions: Vec<String>,
    /// Provenance tag of the provider the row came from
    pub source: String,
}

impl From<NormalizedPlayerRecord> for RawPlayerRecord {
    fn from(record: NormalizedPlayerRecord) -> Self {
        RawPlayerRecord {
            player_id: record.player_id,
            name: Some(record.name),
            first_name: record.first_name,
            last_name: record.last_name,
            position: Some(record.position.as_str().to_string()),
            team: Some(record.team),
            jersey_number: record.jersey_number,
            height: record.height,
            weight: record.weight,
            age: record.age,
            years_exp: record.years_exp,
            rookie_year: record.rookie_year,
            college: record.college,
            injury_status: record.injury_status,
            depth_chart_position: record.depth_chart_position,
            depth_chart_order: record.depth_chart_order,
            fantasy_positions: record.fantasy_positions,
            source: record.source,
        }
    }
}
