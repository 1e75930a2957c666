//! NFL.com team roster adapter

use crate::error::{Result, SourceError};
use crate::fanout;
use crate::mappings::NFL_TEAMS;
use crate::source::SourceAdapter;
use crate::transport::JsonTransport;
use crate::types::{join_name, non_empty, RawNumber, RawPlayerRecord};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub const NFL_SOURCE: &str = "nfl";
const NFL_ROSTER_BASE_URL: &str = "https://www.nfl.com/api/roster/team";

/// One request per team; the team abbreviation of the request is the team of every row
pub struct NflAdapter {
    transport: Arc<dyn JsonTransport>,
    parallel: bool,
}

impl NflAdapter {
    pub fn new(transport: Arc<dyn JsonTransport>, parallel: bool) -> Self {
        Self { transport, parallel }
    }

    async fn fetch_team(&self, team: &'static str) -> Result<Vec<RawPlayerRecord>> {
        let url = format!("{NFL_ROSTER_BASE_URL}/{team}");
        let payload = self.transport.get_json(&url, &[]).await?;
        parse_roster(&payload, team)
    }
}

#[async_trait]
impl SourceAdapter for NflAdapter {
    fn name(&self) -> &str {
        NFL_SOURCE
    }

    async fn fetch(&self, season: i32) -> Result<Vec<RawPlayerRecord>> {
        info!("Fetching NFL.com rosters for {} ({} teams)", season, NFL_TEAMS.len());
        fanout::collect(NFL_SOURCE, &NFL_TEAMS, self.parallel, |team| self.fetch_team(team))
            .await
            .into_result()
    }
}

/// Parse one team's `{"players": [...]}` roster document
pub fn parse_roster(payload: &Value, team: &str) -> Result<Vec<RawPlayerRecord>> {
    let Some(rows) = payload.get("players") else {
        return Ok(Vec::new());
    };
    let rows = rows
        .as_array()
        .ok_or_else(|| SourceError::payload(format!("NFL roster for {team}: players is not an array")))?;

    let players = rows
        .iter()
        .map(|row| {
            let first_name = non_empty(row.get("firstName").and_then(Value::as_str));
            let last_name = non_empty(row.get("lastName").and_then(Value::as_str));
            let id = row.get("id").and_then(RawNumber::from_json).map(|id| id.to_string()).unwrap_or_default();
            RawPlayerRecord {
                player_id: format!("nfl_{id}"),
                name: join_name(first_name.as_deref(), last_name.as_deref()),
                first_name,
                last_name,
                position: non_empty(row.get("position").and_then(Value::as_str)),
                team: Some(team.to_string()),
                jersey_number: row.get("jerseyNumber").and_then(RawNumber::from_json),
                height: row.get("height").and_then(RawNumber::from_json).map(|h| h.to_string()),
                weight: row.get("weight").and_then(RawNumber::from_json),
                college: non_empty(row.get("college").and_then(Value::as_str)),
                source: NFL_SOURCE.to_string(),
                ..Default::default()
            }
        })
        .collect();
    Ok(players)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves one player per team and records the URLs it saw
    struct RosterTransport {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl JsonTransport for RosterTransport {
        async fn get_json(&self, url: &str, _query: &[(&str, String)]) -> Result<Value> {
            self.seen.lock().unwrap().push(url.to_string());
            if url.ends_with("/NYJ") {
                return Err(SourceError::Http { status: 404, url: url.to_string() });
            }
            let team = url.rsplit('/').next().unwrap();
            Ok(json!({"players": [{"id": team, "firstName": "Starter", "lastName": team, "position": "QB"}]}))
        }
    }

    #[test]
    fn test_parse_roster_takes_team_from_request() {
        let payload = json!({"players": [
            {"id": 32004, "firstName": "Josh", "lastName": "Allen", "position": "QB",
             "jerseyNumber": 17, "height": "6-5", "weight": 237, "college": "Wyoming"}
        ]});
        let players = parse_roster(&payload, "BUF").unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].player_id, "nfl_32004");
        assert_eq!(players[0].name.as_deref(), Some("Josh Allen"));
        assert_eq!(players[0].team.as_deref(), Some("BUF"));
        assert_eq!(players[0].height.as_deref(), Some("6-5"));
    }

    #[test]
    fn test_parse_roster_without_players_is_empty() {
        assert!(parse_roster(&json!({}), "KC").unwrap().is_empty());
        assert!(parse_roster(&json!({"players": "oops"}), "KC").is_err());
    }

    #[tokio::test]
    async fn test_fetch_visits_every_team_and_skips_failures() {
        let transport = Arc::new(RosterTransport { seen: Mutex::new(Vec::new()) });
        let adapter = NflAdapter::new(transport.clone(), false);

        let players = adapter.fetch(2024).await.unwrap();
        assert_eq!(transport.seen.lock().unwrap().len(), 32);
        assert_eq!(players.len(), 31);
        assert!(players.iter().all(|p| p.team.as_deref() != Some("NYJ")));
        assert_eq!(players[0].team.as_deref(), Some("ARI"));
    }
}
