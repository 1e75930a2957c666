//! Built-in dataset used when every provider fails

use crate::types::{RawNumber, RawPlayerRecord};

/// Provenance tag carried by fixture records
pub const FIXTURE_SOURCE: &str = "fallback";

// (name, position, team, age, years_exp, weight)
const FIXTURE_PLAYERS: [(&str, &str, &str, i64, i64, i64); 8] = [
    ("Josh Allen", "QB", "BUF", 28, 6, 237),
    ("Lamar Jackson", "QB", "BAL", 27, 6, 215),
    ("Christian McCaffrey", "RB", "SF", 28, 7, 210),
    ("Derrick Henry", "RB", "TEN", 30, 8, 247),
    ("Davante Adams", "WR", "LV", 31, 10, 215),
    ("Tyreek Hill", "WR", "MIA", 30, 8, 191),
    ("Travis Kelce", "TE", "KC", 33, 11, 250),
    ("Mark Andrews", "TE", "BAL", 25, 2, 247),
];

/// Eight well-known starters across QB/RB/WR/TE
pub fn fixture_players() -> Vec<RawPlayerRecord> {
    FIXTURE_PLAYERS
        .iter()
        .enumerate()
        .map(|(i, &(name, position, team, age, years_exp, weight))| {
            let mut record = RawPlayerRecord::new(FIXTURE_SOURCE, format!("fallback_{}", i + 1), name, position, team);
            record.age = Some(RawNumber::Int(age));
            record.years_exp = Some(RawNumber::Int(years_exp));
            record.weight = Some(RawNumber::Int(weight));
            record.depth_chart_order = Some(RawNumber::Int(1));
            record.depth_chart_position = Some(position.to_string());
            record.fantasy_positions = vec![position.to_string()];
            record
        })
        .collect()
}
