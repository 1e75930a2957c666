//! ESPN fantasy API adapter, fanned out per fantasy position bucket

use crate::error::{Result, SourceError};
use crate::fanout;
use crate::mappings::{espn_position, espn_team, ESPN_FANTASY_POSITION_IDS};
use crate::source::SourceAdapter;
use crate::transport::JsonTransport;
use crate::types::{non_empty, RawNumber, RawPlayerRecord};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub const ESPN_SOURCE: &str = "espn";
const ESPN_PAGE_LIMIT: u32 = 1000;

pub struct EspnAdapter {
    transport: Arc<dyn JsonTransport>,
    parallel: bool,
}

impl EspnAdapter {
    pub fn new(transport: Arc<dyn JsonTransport>, parallel: bool) -> Self {
        Self { transport, parallel }
    }

    fn players_url(season: i32) -> String {
        format!("https://fantasy.espn.com/apis/v3/games/ffl/seasons/{season}/players")
    }

    async fn fetch_bucket(&self, season: i32, position_id: u32) -> Result<Vec<RawPlayerRecord>> {
        let filter = format!(
            "{{\"filterActive\":true,\"filterPosition\":[\"{}\"]}}",
            espn_position(position_id)
        );
        let query = [
            ("view", "players_wl".to_string()),
            ("limit", ESPN_PAGE_LIMIT.to_string()),
            ("filter", filter),
        ];
        let payload = self.transport.get_json(&Self::players_url(season), &query).await?;
        parse_players(&payload, Some(position_id))
    }
}

#[async_trait]
impl SourceAdapter for EspnAdapter {
    fn name(&self) -> &str {
        ESPN_SOURCE
    }

    async fn fetch(&self, season: i32) -> Result<Vec<RawPlayerRecord>> {
        info!("Fetching ESPN players for {} across {} position buckets", season, ESPN_FANTASY_POSITION_IDS.len());
        let report = fanout::collect(ESPN_SOURCE, &ESPN_FANTASY_POSITION_IDS, self.parallel, |id| {
            self.fetch_bucket(season, id)
        })
        .await;
        if !report.failures.is_empty() {
            info!("ESPN: {} of {} buckets failed", report.failures.len(), report.attempted);
        }
        report.into_result()
    }
}

/// Parse an ESPN `players_wl` payload.
///
/// The endpoint does not always honour the position filter, so rows whose
/// `defaultPositionId` differs from `bucket` are dropped here.
pub fn parse_players(payload: &Value, bucket: Option<u32>) -> Result<Vec<RawPlayerRecord>> {
    // The endpoint answers either a bare array or {"players": [...]}
    let rows = payload
        .as_array()
        .or_else(|| payload.get("players").and_then(Value::as_array))
        .ok_or_else(|| SourceError::payload("ESPN payload has no players array"))?;

    let mut players = Vec::new();
    for row in rows {
        let info = row.get("player").unwrap_or(row);
        let position_id = info.get("defaultPositionId").and_then(Value::as_u64).unwrap_or(0) as u32;
        if bucket.is_some_and(|b| b != position_id) {
            continue;
        }
        let Some(id) = info.get("id").and_then(RawNumber::from_json) else {
            continue;
        };
        let team_id = info.get("proTeamId").and_then(Value::as_u64).unwrap_or(0) as u32;

        players.push(RawPlayerRecord {
            player_id: format!("espn_{id}"),
            name: non_empty(info.get("fullName").and_then(Value::as_str)),
            first_name: non_empty(info.get("firstName").and_then(Value::as_str)),
            last_name: non_empty(info.get("lastName").and_then(Value::as_str)),
            position: Some(espn_position(position_id).to_string()),
            team: Some(espn_team(team_id).to_string()),
            jersey_number: info.get("jersey").and_then(RawNumber::from_json),
            injury_status: non_empty(info.get("injuryStatus").and_then(Value::as_str)),
            source: ESPN_SOURCE.to_string(),
            ..Default::default()
        });
    }
    Ok(players)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    /// Answers by position filter; the WR bucket is down
    struct BucketTransport;

    #[async_trait]
    impl JsonTransport for BucketTransport {
        async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
            let filter = query.iter().find(|(k, _)| *k == "filter").map(|(_, v)| v.clone()).unwrap();
            if filter.contains("\"WR\"") {
                return Err(SourceError::Http { status: 503, url: url.to_string() });
            }
            Ok(json!({"players": [
                {"player": {"id": 1, "fullName": "Josh Allen", "defaultPositionId": 1, "proTeamId": 2}},
                {"player": {"id": 2, "fullName": "Christian McCaffrey", "defaultPositionId": 2, "proTeamId": 25}}
            ]}))
        }
    }

    #[test]
    fn test_parse_maps_ids_through_tables() {
        let payload = json!([
            {"player": {"id": 3918298, "fullName": "Josh Allen", "firstName": "Josh",
                        "lastName": "Allen", "defaultPositionId": 1, "proTeamId": 2,
                        "jersey": "17", "injuryStatus": "ACTIVE"}},
            {"player": {"id": 77, "fullName": "Nobody", "defaultPositionId": 99, "proTeamId": 0}}
        ]);
        let players = parse_players(&payload, None).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].player_id, "espn_3918298");
        assert_eq!(players[0].position.as_deref(), Some("QB"));
        assert_eq!(players[0].team.as_deref(), Some("BUF"));
        assert_eq!(players[1].position.as_deref(), Some("UNK"));
        assert_eq!(players[1].team.as_deref(), Some("FA"));
    }

    #[tokio::test]
    async fn test_failed_bucket_does_not_abort_others() {
        let adapter = EspnAdapter::new(Arc::new(BucketTransport), false);
        let players = adapter.fetch(2024).await.unwrap();

        // QB and RB buckets each keep only their own row; WR failed; TE/K/DST match nothing
        let names: Vec<_> = players.iter().filter_map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Josh Allen", "Christian McCaffrey"]);
    }
}
