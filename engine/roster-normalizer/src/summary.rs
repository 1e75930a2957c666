use crate::types::NormalizedPlayerRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Position and team breakdown of a normalized roster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterSummary {
    pub total: usize,
    pub by_position: BTreeMap<String, usize>,
    /// Largest teams first, ties broken alphabetically
    pub top_teams: Vec<(String, usize)>,
}

impl RosterSummary {
    pub const TOP_TEAMS: usize = 10;

    pub fn from_records(records: &[NormalizedPlayerRecord]) -> Self {
        let mut by_position = BTreeMap::new();
        let mut by_team: HashMap<&str, usize> = HashMap::new();
        for record in records {
            *by_position.entry(record.position.as_str().to_string()).or_insert(0) += 1;
            *by_team.entry(record.team.as_str()).or_insert(0) += 1;
        }

        let mut top_teams: Vec<(String, usize)> =
            by_team.into_iter().map(|(team, count)| (team.to_string(), count)).collect();
        top_teams.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_teams.truncate(Self::TOP_TEAMS);

        Self { total: records.len(), by_position, top_teams }
    }

    pub fn log(&self) {
        info!("Player summary: {} total", self.total);
        for (position, count) in &self.by_position {
            info!("  {:<5} {}", position, count);
        }
        let teams: Vec<String> = self.top_teams.iter().map(|(team, count)| format!("{team}={count}")).collect();
        info!("  top teams: {}", teams.join(", "));
    }
}
