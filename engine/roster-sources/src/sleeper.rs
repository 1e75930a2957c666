//! Sleeper player database adapter

use crate::error::{Result, SourceError};
use crate::source::SourceAdapter;
use crate::transport::JsonTransport;
use crate::types::{join_name, non_empty, RawNumber, RawPlayerRecord};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub const SLEEPER_SOURCE: &str = "sleeper";
const SLEEPER_PLAYERS_URL: &str = "https://api.sleeper.app/v1/players/nfl";

/// Sleeper serves its whole NFL player universe in one document, so this
/// adapter has no sub-units. The season argument is ignored upstream.
pub struct SleeperAdapter {
    transport: Arc<dyn JsonTransport>,
    url: String,
}

impl SleeperAdapter {
    pub fn new(transport: Arc<dyn JsonTransport>) -> Self {
        Self { transport, url: SLEEPER_PLAYERS_URL.to_string() }
    }
}

#[async_trait]
impl SourceAdapter for SleeperAdapter {
    fn name(&self) -> &str {
        SLEEPER_SOURCE
    }

    async fn fetch(&self, season: i32) -> Result<Vec<RawPlayerRecord>> {
        info!("Fetching Sleeper player database for {}", season);
        let payload = self.transport.get_json(&self.url, &[]).await?;
        let players = parse_players(&payload)?;
        info!("Sleeper returned {} active rostered players", players.len());
        Ok(players)
    }
}

/// Parse the `{player_id: {...}}` document, keeping active players with a team
pub fn parse_players(payload: &Value) -> Result<Vec<RawPlayerRecord>> {
    let map = payload
        .as_object()
        .ok_or_else(|| SourceError::payload("Sleeper payload is not an object"))?;

    let mut players = Vec::new();
    for (player_id, data) in map {
        if !data.get("active").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }
        let team = non_empty(data.get("team").and_then(Value::as_str));
        if team.is_none() {
            continue;
        }

        let first_name = non_empty(data.get("first_name").and_then(Value::as_str));
        let last_name = non_empty(data.get("last_name").and_then(Value::as_str));
        let fantasy_positions = data
            .get("fantasy_positions")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();

        players.push(RawPlayerRecord {
            player_id: player_id.clone(),
            name: join_name(first_name.as_deref(), last_name.as_deref()),
            first_name,
            last_name,
            position: non_empty(data.get("position").and_then(Value::as_str)),
            team,
            jersey_number: data.get("number").and_then(RawNumber::from_json),
            height: data.get("height").and_then(scalar_text),
            weight: data.get("weight").and_then(RawNumber::from_json),
            age: data.get("age").and_then(RawNumber::from_json),
            years_exp: data.get("years_exp").and_then(RawNumber::from_json),
            rookie_year: data.get("rookie_year").and_then(RawNumber::from_json),
            college: non_empty(data.get("college").and_then(Value::as_str)),
            injury_status: non_empty(data.get("injury_status").and_then(Value::as_str)),
            depth_chart_position: non_empty(data.get("depth_chart_position").and_then(Value::as_str)),
            depth_chart_order: data.get("depth_chart_order").and_then(RawNumber::from_json),
            fantasy_positions,
            source: SLEEPER_SOURCE.to_string(),
        });
    }

    // serde_json maps iterate in key order; keep that explicit for stable output
    players.sort_by(|a, b| a.player_id.cmp(&b.player_id));
    Ok(players)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(Some(s.as_str())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
