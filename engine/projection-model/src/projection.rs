//! Ranked projections from a trained ensemble

use crate::error::{ModelError, Result};
use crate::features::{feature_matrix, PlayerAttributes, FEATURE_COUNT};
use crate::model::{ModelFamily, TrainedModel};
use crate::sampling::SeededSampler;
use roster_normalizer::{FantasyPosition, NormalizedPlayerRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

const ADP_FLOOR: f64 = 20.0;
const ADP_CEILING: f64 = 300.0;
const TIER_COUNT: usize = 5;
const GAMES_PER_SEASON: f64 = 17.0;
const HEALTHY: &str = "Healthy";
const INJURY_DISPLAY_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Number of players kept after ranking
    pub top_n: usize,
    /// Seed of the presentation-only generator (usage, schedule, bye week)
    pub seed: u64,
    /// Headline projection as a share of the ensemble score
    pub projection_factor: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { top_n: 300, seed: 42, projection_factor: 0.8 }
    }
}

/// One ranked row of the published draft board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPlayer {
    pub id: usize,
    pub name: String,
    #[serde(rename = "pos")]
    pub position: String,
    pub team: String,
    pub score: f64,
    pub proj: f64,
    pub snap: u32,
    pub injury: String,
    pub tier: u8,
    pub adp: f64,
    pub targets: f64,
    pub carries: f64,
    pub redzone_touches: f64,
    pub strength_of_schedule: f64,
    pub bye_week: u32,
    pub age: i64,
    pub experience: i64,
    pub last_season_points: f64,
    pub consistency_rating: f64,
    pub ceiling_projection: f64,
    pub floor_projection: f64,
}

/// Scores a batch with all three families of one run and derives the
/// presentation metrics.
#[derive(Debug)]
pub struct ProjectionSynthesizer {
    run_id: Uuid,
    models: Vec<TrainedModel>,
    config: ProjectionConfig,
}

impl ProjectionSynthesizer {
    /// Refuses to build a degraded ensemble: every family must be present,
    /// filed under its own family, from the same run, with the expected width.
    pub fn new(mut models: BTreeMap<ModelFamily, TrainedModel>, config: ProjectionConfig) -> Result<Self> {
        let mut ordered = Vec::with_capacity(ModelFamily::ALL.len());
        for family in ModelFamily::ALL {
            let model = models.remove(&family).ok_or(ModelError::MissingFamily(family))?;
            if model.family != family || model.model.family() != family {
                return Err(ModelError::FamilyMismatch { expected: family, found: model.model.family() });
            }
            for width in [model.n_features(), model.scaler.n_features()] {
                if width != FEATURE_COUNT {
                    return Err(ModelError::ShapeMismatch { expected: FEATURE_COUNT, found: width });
                }
            }
            ordered.push(model);
        }

        let run_id = ordered[0].run_id;
        if let Some(stray) = ordered.iter().find(|m| m.run_id != run_id) {
            return Err(ModelError::RunMismatch { expected: run_id, found: stray.run_id });
        }

        Ok(Self { run_id, models: ordered, config })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Mean of the three per-family predictions, in input order
    pub fn ensemble_scores(&self, records: &[NormalizedPlayerRecord]) -> Result<Vec<f64>> {
        let x = feature_matrix(records);
        let mut totals = vec![0.0; records.len()];
        for model in &self.models {
            for (total, prediction) in totals.iter_mut().zip(model.predict_matrix(&x)?) {
                *total += prediction;
            }
        }
        let n_models = self.models.len() as f64;
        Ok(totals.into_iter().map(|t| t / n_models).collect())
    }

    /// Project, rank by score (descending, stable) and keep the top `top_n`
    pub fn project(&self, records: &[NormalizedPlayerRecord]) -> Result<Vec<ProjectedPlayer>> {
        let scores = self.ensemble_scores(records)?;
        let ranks = BatchRanks::new(&scores);
        let mut sampler = SeededSampler::new(self.config.seed);

        let mut players: Vec<(f64, ProjectedPlayer)> = records
            .iter()
            .zip(&scores)
            .enumerate()
            .map(|(idx, (record, &score))| {
                let player = self.project_one(idx, record, score, &ranks, &mut sampler);
                (score, player)
            })
            .collect();

        players.sort_by(|a, b| b.0.total_cmp(&a.0));
        players.truncate(self.config.top_n);
        info!("Projected {} players, kept top {}", records.len(), players.len());
        Ok(players.into_iter().map(|(_, p)| p).collect())
    }

    fn project_one(
        &self,
        idx: usize,
        record: &NormalizedPlayerRecord,
        score: f64,
        ranks: &BatchRanks,
        sampler: &mut SeededSampler,
    ) -> ProjectedPlayer {
        let attributes = PlayerAttributes::from_record(record);
        let depth = attributes.depth;
        let age = attributes.age.trunc() as i64;
        let experience = attributes.years_exp.trunc() as i64;
        let proj = score * self.config.projection_factor;

        let consistency = consistency_rating(age, experience);
        let spread = 11.0 - consistency;
        let usage = Usage::draw(record.position, depth, sampler);
        let strength_of_schedule = round2(0.7 + 0.6 * sampler.uniform());
        let bye_week = 4 + (11.0 * sampler.uniform()).floor() as u32;
        let last_season_points = round1(GAMES_PER_SEASON * proj + sampler.normal(0.0, 30.0)).max(0.0);

        ProjectedPlayer {
            id: idx + 1,
            name: record.name.clone(),
            position: record.position.as_str().to_string(),
            team: record.team.clone(),
            score: round1(score),
            proj: round1(proj),
            snap: snap_share(depth),
            injury: injury_display(record.injury_status.as_deref()),
            tier: ranks.tier(score),
            adp: round1(ranks.adp(score)),
            targets: round1(usage.targets),
            carries: round1(usage.carries),
            redzone_touches: round1(usage.redzone_touches),
            strength_of_schedule,
            bye_week,
            age,
            experience,
            last_season_points,
            consistency_rating: round1(consistency),
            ceiling_projection: round1(proj + 2.5 * spread),
            floor_projection: round1((proj - 2.0 * spread).max(0.0)),
        }
    }
}

/// Score distribution of the whole batch, for rank-relative metrics
struct BatchRanks {
    sorted: Vec<f64>,
}

impl BatchRanks {
    fn new(scores: &[f64]) -> Self {
        let mut sorted = scores.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    fn strictly_lower(&self, score: f64) -> usize {
        self.sorted.partition_point(|s| *s < score)
    }

    fn strictly_higher(&self, score: f64) -> usize {
        self.sorted.len() - self.sorted.partition_point(|s| *s <= score)
    }

    /// `300 - 280 * pct` where `pct` is the share of the rest of the batch scoring lower
    fn adp(&self, score: f64) -> f64 {
        let others = self.sorted.len().saturating_sub(1);
        if others == 0 {
            return ADP_FLOOR;
        }
        let pct = self.strictly_lower(score) as f64 / others as f64;
        ADP_CEILING - (ADP_CEILING - ADP_FLOOR) * pct
    }

    /// Rank quintile, 1 for the top fifth
    fn tier(&self, score: f64) -> u8 {
        let n = self.sorted.len().max(1);
        let band = TIER_COUNT * self.strictly_higher(score) / n;
        (band + 1).min(TIER_COUNT) as u8
    }
}

struct Usage {
    targets: f64,
    carries: f64,
    redzone_touches: f64,
}

impl Usage {
    /// Synthetic usage; the draw order is part of the reproducibility contract
    fn draw(position: FantasyPosition, depth: f64, sampler: &mut SeededSampler) -> Self {
        let (carries, targets) = match position {
            FantasyPosition::QB | FantasyPosition::RB => {
                let carries = (20.0 - 8.0 * depth + sampler.normal(0.0, 3.0)).max(0.0);
                let targets = (3.0 + sampler.normal(0.0, 2.0)).max(0.0);
                (carries, targets)
            }
            FantasyPosition::WR | FantasyPosition::TE => (0.0, (8.0 - 2.0 * depth + sampler.normal(0.0, 2.0)).max(0.0)),
            _ => (0.0, 0.0),
        };
        let redzone_touches = match position {
            FantasyPosition::RB | FantasyPosition::TE => 3.0 - depth + sampler.normal(0.0, 0.5),
            FantasyPosition::WR => 2.5 - depth + sampler.normal(0.0, 0.5),
            _ => 1.0 + sampler.normal(0.0, 0.3),
        }
        .max(0.0);
        Self { targets, carries, redzone_touches }
    }
}

/// 1..=10, higher for experienced players in their prime
pub fn consistency_rating(age: i64, years_exp: i64) -> f64 {
    let age_term = if (25..=29).contains(&age) {
        8.0
    } else if age < 25 {
        6.0
    } else {
        (8.0 - (age - 29) as f64).max(2.0)
    };
    (1.5 * years_exp as f64 + age_term).clamp(1.0, 10.0)
}

pub fn snap_share(depth: f64) -> u32 {
    ((3.0 - depth) * 30.0 + 40.0).trunc().clamp(1.0, 100.0) as u32
}

fn injury_display(status: Option<&str>) -> String {
    let shown: String = status.unwrap_or_default().chars().take(INJURY_DISPLAY_CHARS).collect();
    if shown.is_empty() {
        HEALTHY.to_string()
    } else {
        shown
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
