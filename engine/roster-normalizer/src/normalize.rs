use crate::types::{FantasyPosition, NormalizedPlayerRecord};
use crate::vocab::{canonical_position, canonical_team};
use roster_sources::RawPlayerRecord;
use std::collections::HashSet;
use tracing::{debug, info};

/// Display name given to records that carry no usable name at all
pub const UNKNOWN_PLAYER: &str = "Unknown Player";

/// Normalize fused provider records into the canonical dataset.
///
/// Steps, in order:
/// 1. default-fill (trim names, build a missing full name from first + last,
///    missing position `UNK`, missing team `FA`)
/// 2. upper-case and canonicalize position and team
/// 3. keep fantasy positions only (others are dropped silently)
/// 4. deduplicate on (name, team), first seen wins
/// 5. stable sort by (team, position, name)
///
/// Pure and idempotent: feeding the output back in returns it unchanged.
pub fn normalize(raw: &[RawPlayerRecord]) -> Vec<NormalizedPlayerRecord> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut dropped_positions = 0usize;
    let mut duplicates = 0usize;
    let mut records = Vec::with_capacity(raw.len());

    for record in raw {
        let first_name = trimmed(record.first_name.as_deref());
        let last_name = trimmed(record.last_name.as_deref());
        let name = trimmed(record.name.as_deref())
            .or_else(|| {
                let joined = format!("{} {}", first_name.as_deref().unwrap_or(""), last_name.as_deref().unwrap_or(""));
                trimmed(Some(joined.as_str()))
            })
            .unwrap_or_else(|| UNKNOWN_PLAYER.to_string());

        let Some(position) = FantasyPosition::parse(&canonical_position(record.position.as_deref())) else {
            dropped_positions += 1;
            continue;
        };
        let team = canonical_team(record.team.as_deref());

        if !seen.insert((name.clone(), team.clone())) {
            debug!("Dropping duplicate {} ({}) from {}", name, team, record.source);
            duplicates += 1;
            continue;
        }

        records.push(NormalizedPlayerRecord {
            player_id: record.player_id.clone(),
            name,
            first_name,
            last_name,
            position,
            team,
            jersey_number: record.jersey_number.clone(),
            height: record.height.clone(),
            weight: record.weight.clone(),
            age: record.age.clone(),
            years_exp: record.years_exp.clone(),
            rookie_year: record.rookie_year.clone(),
            college: record.college.clone(),
            injury_status: record.injury_status.clone(),
            depth_chart_position: record.depth_chart_position.clone(),
            depth_chart_order: record.depth_chart_order.clone(),
            fantasy_positions: record.fantasy_positions.clone(),
            source: record.source.clone(),
        });
    }

    records.sort_by(|a, b| {
        a.team
            .cmp(&b.team)
            .then_with(|| a.position.as_str().cmp(b.position.as_str()))
            .then_with(|| a.name.cmp(&b.name))
    });

    info!(
        "Normalized {} raw records into {} players ({} non-fantasy, {} duplicates dropped)",
        raw.len(),
        records.len(),
        dropped_positions,
        duplicates
    );
    records
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use roster_sources::RawNumber;

    fn raw(source: &str, name: &str, position: &str, team: &str) -> RawPlayerRecord {
        RawPlayerRecord::new(source, format!("{source}_{name}"), name, position, team)
    }

    fn renormalize(records: &[NormalizedPlayerRecord]) -> Vec<NormalizedPlayerRecord> {
        let raw: Vec<RawPlayerRecord> = records.iter().cloned().map(RawPlayerRecord::from).collect();
        normalize(&raw)
    }

    #[test]
    fn test_duplicate_across_sources_keeps_first() {
        let records = normalize(&[
            raw("sleeper", "Josh Allen", "QB", "BUF"),
            raw("espn", "Josh Allen", "QB", "BUF"),
            raw("espn", "Josh Allen", "LB", "JAX"),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "sleeper");
    }

    #[test]
    fn test_default_fill_and_canonicalization() {
        let mut nameless = RawPlayerRecord::default();
        nameless.first_name = Some("  Jayden ".to_string());
        nameless.last_name = Some("Daniels".to_string());
        nameless.position = Some("qb".to_string());
        nameless.team = Some("wsh".to_string());
        nameless.age = Some(RawNumber::Int(24));

        let mut anonymous = RawPlayerRecord::default();
        anonymous.position = Some("dst".to_string());

        let records = normalize(&[nameless, anonymous]);
        assert_eq!(records.len(), 2);

        // FA sorts before WAS
        assert_eq!(records[0].name, UNKNOWN_PLAYER);
        assert_eq!(records[0].team, "FA");
        assert_eq!(records[0].position, FantasyPosition::DST);

        assert_eq!(records[1].name, "Jayden Daniels");
        assert_eq!(records[1].first_name.as_deref(), Some("Jayden"));
        assert_eq!(records[1].team, "WAS");
        assert_eq!(records[1].position, FantasyPosition::QB);
        assert_eq!(records[1].age, Some(RawNumber::Int(24)));
    }

    #[test]
    fn test_non_fantasy_positions_are_dropped() {
        let mut unknown = RawPlayerRecord::default();
        unknown.name = Some("Mystery Man".to_string());

        let records = normalize(&[
            raw("sleeper", "Fred Warner", "LB", "SF"),
            raw("sleeper", "Justin Tucker", "PK", "BAL"),
            unknown,
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].position, FantasyPosition::K);
    }

    #[test]
    fn test_sort_is_team_position_name() {
        let records = normalize(&[
            raw("s", "Zay Flowers", "WR", "BAL"),
            raw("s", "Tyreek Hill", "WR", "MIA"),
            raw("s", "Lamar Jackson", "QB", "BAL"),
            raw("s", "Mark Andrews", "TE", "BAL"),
            raw("s", "Derrick Henry", "RB", "BAL"),
        ]);
        let order: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["Lamar Jackson", "Derrick Henry", "Mark Andrews", "Zay Flowers", "Tyreek Hill"]);
    }

    #[test]
    fn test_fixture_survives_normalization() {
        let fixture = roster_sources::fixture_players();
        let records = normalize(&fixture);
        assert_eq!(records.len(), fixture.len());
        assert_eq!(renormalize(&records), records);
    }

    fn arb_raw() -> impl Strategy<Value = RawPlayerRecord> {
        let names = prop::option::of(prop::sample::select(vec![
            "Josh Allen", " Josh Allen ", "Tyreek Hill", "", "  ", "Derrick Henry",
        ]));
        let positions = prop::option::of(prop::sample::select(vec![
            "QB", "rb", "WR", "TE", "PK", "K", "DEF", "DST", "D/ST", "LB", "", "ot",
        ]));
        let teams = prop::option::of(prop::sample::select(vec![
            "BUF", "buf", "WSH", "WAS", "OAK", "LV", "LA", "STL", "", "KC",
        ]));
        let sources = prop::sample::select(vec!["sleeper", "espn", "nfl"]);
        (names, positions, teams, sources).prop_map(|(name, position, team, source)| RawPlayerRecord {
            player_id: format!("{source}_x"),
            name: name.map(str::to_string),
            first_name: Some("First".to_string()),
            last_name: None,
            position: position.map(str::to_string),
            team: team.map(str::to_string),
            source: source.to_string(),
            ..Default::default()
        })
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(input in prop::collection::vec(arb_raw(), 0..40)) {
            let once = normalize(&input);
            prop_assert_eq!(renormalize(&once), once);
        }

        #[test]
        fn prop_output_is_unique_and_closed(input in prop::collection::vec(arb_raw(), 0..40)) {
            let records = normalize(&input);
            let mut keys = HashSet::new();
            for record in &records {
                prop_assert!(FantasyPosition::parse(record.position.as_str()).is_some());
                prop_assert!(keys.insert((record.name.clone(), record.team.clone())));
                prop_assert!(!record.name.is_empty());
            }
        }
    }
}
