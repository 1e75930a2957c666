//! Yahoo Fantasy adapter over the authenticated API collaborator

use crate::error::{Result, SourceError};
use crate::oauth::FantasyApi;
use crate::source::SourceAdapter;
use crate::types::{non_empty, RawNumber, RawPlayerRecord};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub const YAHOO_SOURCE: &str = "yahoo";

pub struct YahooAdapter {
    api: Arc<dyn FantasyApi>,
}

impl YahooAdapter {
    pub fn new(api: Arc<dyn FantasyApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SourceAdapter for YahooAdapter {
    fn name(&self) -> &str {
        YAHOO_SOURCE
    }

    async fn fetch(&self, season: i32) -> Result<Vec<RawPlayerRecord>> {
        let path = format!("/game/nfl.{season}/players");
        info!("Fetching Yahoo players from {}", path);
        let payload = self.api.get(&path, &[("format", "json".to_string())]).await?;
        parse_players(&payload)
    }
}

/// Parse `fantasy_content.game.players.player[]`.
///
/// Yahoo sometimes wraps `game` in an array of fragments; the first fragment
/// carrying `players` is used.
pub fn parse_players(payload: &Value) -> Result<Vec<RawPlayerRecord>> {
    let game = payload
        .get("fantasy_content")
        .and_then(|c| c.get("game"))
        .ok_or_else(|| SourceError::payload("Yahoo payload has no fantasy_content.game"))?;
    let game = match game {
        Value::Array(fragments) => fragments.iter().find(|f| f.get("players").is_some()).unwrap_or(game),
        other => other,
    };

    let rows = match game.get("players").and_then(|p| p.get("player")) {
        Some(Value::Array(rows)) => rows.as_slice(),
        Some(single) if single.is_object() => std::slice::from_ref(single),
        _ => return Ok(Vec::new()),
    };

    let players = rows
        .iter()
        .filter(|row| row.is_object())
        .map(|row| {
            let name = row.get("name");
            let text = |field: &str| non_empty(row.get(field).and_then(Value::as_str));
            let key = text("player_key").unwrap_or_default();
            RawPlayerRecord {
                player_id: format!("yahoo_{key}"),
                name: non_empty(name.and_then(|n| n.get("full")).and_then(Value::as_str)),
                first_name: non_empty(name.and_then(|n| n.get("first")).and_then(Value::as_str)),
                last_name: non_empty(name.and_then(|n| n.get("last")).and_then(Value::as_str)),
                position: text("display_position"),
                team: text("editorial_team_abbr"),
                jersey_number: row.get("uniform_number").and_then(RawNumber::from_json),
                injury_status: text("status").or_else(|| text("injury_note")),
                source: YAHOO_SOURCE.to_string(),
                ..Default::default()
            }
        })
        .collect();
    Ok(players)
}
