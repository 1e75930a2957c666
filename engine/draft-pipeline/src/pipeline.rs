//! Stage orchestration
//!
//! Each stage reads its inputs from the artifact store and writes its outputs
//! back, so `fetch`, `train` and `project` can run as separate invocations.

use crate::config::PipelineConfig;
use anyhow::{Context, Result};
use artifact_store::{publish_app_data, ArtifactStore};
use chrono::{DateTime, Utc};
use projection_model::{
    featurize, EnsembleTrainer, ProjectedPlayer, ProjectionSynthesizer, TimeSeriesSplit, TrainingMetrics,
    LABEL_VERSION,
};
use roster_normalizer::{normalize, NormalizedPlayerRecord, RosterSummary};
use roster_sources::{AcquisitionChain, Provenance, YahooCredentials};
use serde::Serialize;
use tracing::{info, warn};

/// Players listed in the end-of-run log
const LEADERBOARD_SIZE: usize = 10;

/// Outcome of a full run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub season: i32,
    pub provenance: Provenance,
    pub normalized_players: usize,
    pub training: TrainingMetrics,
    pub projected_players: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct Pipeline {
    config: PipelineConfig,
    store: ArtifactStore,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let store = ArtifactStore::open(&config.output.dir)
            .with_context(|| format!("Failed to open output directory {:?}", config.output.dir))?;
        Ok(Self { config, store })
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Build the provider chain from configuration and credentials in the environment
    pub fn acquisition_chain(&self) -> Result<AcquisitionChain> {
        AcquisitionChain::from_config(&self.config.sources, YahooCredentials::from_env())
            .context("Failed to build acquisition chain")
    }

    /// Acquire, audit, normalize and store the roster
    pub async fn fetch(&self, chain: &AcquisitionChain) -> Result<(Provenance, Vec<NormalizedPlayerRecord>)> {
        info!("Fetching rosters for season {} from {:?}", self.config.season, chain.source_names());
        // A source only wins if enough of its players survive normalization to train on
        let min_rows = TimeSeriesSplit::new(self.config.training.n_splits).min_rows();
        let acquisition = chain
            .acquire_usable(self.config.season, |records| normalize(records).len() >= min_rows)
            .await;
        self.store.save_acquisition(&acquisition).context("Failed to store acquisition")?;
        if acquisition.used_fixture() {
            warn!("No upstream source produced data, continuing with {} fallback players", acquisition.records.len());
        }

        let records = normalize(&acquisition.records);
        RosterSummary::from_records(&records).log();
        self.store.save_clean(&records).context("Failed to store normalized roster")?;
        Ok((acquisition.provenance, records))
    }

    pub fn load_roster(&self) -> Result<Vec<NormalizedPlayerRecord>> {
        self.store.load_clean().context("No normalized roster found, run `fetch` first")
    }

    /// Train and persist a new model run. Nothing is written if any family fails.
    pub fn train(&self, records: &[NormalizedPlayerRecord]) -> Result<TrainingMetrics> {
        let (x, y) = featurize(records, self.config.training.label_seed);
        let trainer = EnsembleTrainer::new(self.config.model.clone(), self.config.training.n_splits);
        let ensemble = trainer.train(&x, &y).context("Model training failed")?;

        self.store.save_run(&ensemble).context("Failed to store model run")?;
        self.store.save_metrics(&ensemble.metrics).context("Failed to store metrics")?;
        for (family, rmse) in &ensemble.metrics.rmse {
            info!("{} validation RMSE: {:.3}", family, rmse);
        }
        Ok(ensemble.metrics)
    }

    /// Project with the current model run and publish the ranking
    pub fn project(&self, records: &[NormalizedPlayerRecord]) -> Result<Vec<ProjectedPlayer>> {
        let (manifest, models) = self.store.load_current_run().context("Failed to load model run")?;
        if manifest.label_version != LABEL_VERSION {
            warn!("Model run {} was trained on label {}, current label is {}", manifest.run_id, manifest.label_version, LABEL_VERSION);
        }

        let synthesizer = ProjectionSynthesizer::new(models, self.config.projection.clone())
            .context("Model run is incomplete or inconsistent")?;
        info!("Projecting {} players with model run {}", records.len(), synthesizer.run_id());
        let players = synthesizer.project(records).context("Projection failed")?;

        self.store.save_predictions(&players).context("Failed to store predictions")?;
        if let Some(path) = &self.config.output.app_data_path {
            publish_app_data(path, &players).with_context(|| format!("Failed to publish app data to {:?}", path))?;
        }
        log_leaderboard(&players);
        Ok(players)
    }

    /// All stages in order
    pub async fn run(&self, chain: &AcquisitionChain) -> Result<RunSummary> {
        let started_at = Utc::now();
        let (provenance, records) = self.fetch(chain).await?;
        let training = self.train(&records)?;
        let players = self.project(&records)?;

        let summary = RunSummary {
            season: self.config.season,
            provenance,
            normalized_players: records.len(),
            training,
            projected_players: players.len(),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            "Run complete: {} players normalized, {} projected in {}s",
            summary.normalized_players,
            summary.projected_players,
            (summary.finished_at - summary.started_at).num_seconds()
        );
        Ok(summary)
    }
}

fn log_leaderboard(players: &[ProjectedPlayer]) {
    info!("Top {} projections:", LEADERBOARD_SIZE.min(players.len()));
    for player in players.iter().take(LEADERBOARD_SIZE) {
        info!(
            "  {:<24} {:<4} {:<4} score {:>5.1}  proj {:>5.1}  tier {}  adp {:>5.1}",
            player.name, player.position, player.team, player.score, player.proj, player.tier, player.adp
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use projection_model::ModelFamily;
    use roster_sources::{RawPlayerRecord, SourceAdapter, SourceError};
    use tempfile::TempDir;

    /// Stands in for an unreachable provider
    struct FailingAdapter;

    #[async_trait]
    impl SourceAdapter for FailingAdapter {
        fn name(&self) -> &str {
            "sleeper"
        }

        async fn fetch(&self, _season: i32) -> roster_sources::Result<Vec<RawPlayerRecord>> {
            Err(SourceError::payload("connection refused"))
        }
    }

    /// Answers with defensive players only
    struct LinebackerAdapter;

    #[async_trait]
    impl SourceAdapter for LinebackerAdapter {
        fn name(&self) -> &str {
            "espn"
        }

        async fn fetch(&self, _season: i32) -> roster_sources::Result<Vec<RawPlayerRecord>> {
            Ok((0..3)
                .map(|i| RawPlayerRecord::new("espn", i.to_string(), format!("Linebacker {i}"), "LB", "DAL"))
                .collect())
        }
    }

    fn test_config(dir: &TempDir) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.output.dir = dir.path().join("data");
        config.output.app_data_path = Some(dir.path().join("app/src/data.json"));
        config.model.rf.n_trees = 10;
        config.model.xgb.n_rounds = 20;
        config.model.lgb.n_rounds = 20;
        config
    }

    #[tokio::test]
    async fn test_offline_run_uses_fixture_and_publishes() {
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::new(test_config(&dir)).unwrap();
        let chain = AcquisitionChain::new(vec![Box::new(FailingAdapter)]);

        let summary = pipeline.run(&chain).await.unwrap();
        assert_eq!(summary.provenance, Provenance::Fixture);
        assert_eq!(summary.normalized_players, 8);
        assert_eq!(summary.projected_players, 8);
        assert_eq!(summary.training.rmse.len(), ModelFamily::ALL.len());

        let data = dir.path().join("data");
        assert!(data.join("raw/acquisition_report.json").exists());
        assert!(data.join("raw/nfl_players_fallback.json").exists());
        assert!(data.join("nfl_players_clean.json").exists());
        assert!(data.join("models/manifest.json").exists());
        assert!(data.join("metrics.json").exists());

        let published: Vec<ProjectedPlayer> =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("app/src/data.json")).unwrap()).unwrap();
        assert_eq!(published.len(), 8);
        assert!(published.iter().all(|p| (1..=5).contains(&p.tier)));
    }

    #[tokio::test]
    async fn test_source_without_fantasy_players_falls_back() {
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::new(test_config(&dir)).unwrap();
        let chain = AcquisitionChain::new(vec![Box::new(LinebackerAdapter)]);

        let summary = pipeline.run(&chain).await.unwrap();
        assert_eq!(summary.provenance, Provenance::Fixture);
        assert_eq!(summary.normalized_players, 8);
        assert_eq!(summary.projected_players, 8);

        let data = dir.path().join("data");
        assert!(data.join("raw/nfl_players_espn.json").exists());
        assert!(data.join("raw/nfl_players_fallback.json").exists());
        let metrics = pipeline.store().load_run_metrics(summary.training.run_id).unwrap();
        assert_eq!(metrics.n_samples, 8);
    }

    #[tokio::test]
    async fn test_stages_run_separately() {
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::new(test_config(&dir)).unwrap();
        pipeline.fetch(&AcquisitionChain::new(Vec::new())).await.unwrap();

        let roster = pipeline.load_roster().unwrap();
        pipeline.train(&roster).unwrap();
        let first = pipeline.project(&roster).unwrap();
        let second = pipeline.project(&pipeline.load_roster().unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_project_without_models_fails() {
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::new(test_config(&dir)).unwrap();
        let roster = normalize(&roster_sources::fixture_players());
        assert!(pipeline.project(&roster).is_err());
        assert!(!dir.path().join("data/predictions.json").exists());
    }
}
