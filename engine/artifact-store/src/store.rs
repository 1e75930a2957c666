//! Output directory layout
//!
//! ```text
//! <root>/raw/nfl_players_<source>.json
//! <root>/raw/acquisition_report.json
//! <root>/nfl_players_clean.json
//! <root>/models/<run_id>/<family>.bin.gz
//! <root>/models/<run_id>/metrics.json
//! <root>/models/manifest.json
//! <root>/metrics.json
//! <root>/predictions.json
//! ```

use crate::atomic::{read_compressed, read_json, write_compressed, write_json};
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use projection_model::{ModelFamily, ProjectedPlayer, TrainedEnsemble, TrainedModel, TrainingMetrics};
use roster_normalizer::NormalizedPlayerRecord;
use roster_sources::{Acquisition, Provenance, RawPlayerRecord, SourceAttempt, FIXTURE_SOURCE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

const RAW_DIR: &str = "raw";
const MODELS_DIR: &str = "models";
const MANIFEST_FILE: &str = "manifest.json";
const REPORT_FILE: &str = "acquisition_report.json";
const CLEAN_FILE: &str = "nfl_players_clean.json";
const METRICS_FILE: &str = "metrics.json";
const PREDICTIONS_FILE: &str = "predictions.json";

/// Audit record of one acquisition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionReport {
    pub season: i32,
    pub provenance: Provenance,
    pub record_count: usize,
    pub used_fixture: bool,
    pub attempts: Vec<SourceAttempt>,
    pub written_at: DateTime<Utc>,
}

/// Pointer to the current model run. Written last, so a run is only visible
/// once all of its artifacts are in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub label_version: String,
    pub families: Vec<ModelFamily>,
    pub feature_names: Vec<String>,
    pub trained_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open (and create if needed) an output directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(RAW_DIR))?;
        fs::create_dir_all(root.join(MODELS_DIR))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_path(&self, source: &str) -> PathBuf {
        self.root.join(RAW_DIR).join(format!("nfl_players_{}.json", source))
    }

    pub fn clean_path(&self) -> PathBuf {
        self.root.join(CLEAN_FILE)
    }

    pub fn predictions_path(&self) -> PathBuf {
        self.root.join(PREDICTIONS_FILE)
    }

    fn run_dir(&self, run_id: Uuid) -> PathBuf {
        self.root.join(MODELS_DIR).join(run_id.to_string())
    }

    fn model_path(&self, run_id: Uuid, family: ModelFamily) -> PathBuf {
        self.run_dir(run_id).join(format!("{}.bin.gz", family.tag()))
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MODELS_DIR).join(MANIFEST_FILE)
    }

    /// Persist what every attempted source returned, plus the attempt log
    pub fn save_acquisition(&self, acquisition: &Acquisition) -> Result<AcquisitionReport> {
        for attempt in &acquisition.attempts {
            self.save_raw(&attempt.source, &attempt.records)?;
        }
        if acquisition.used_fixture() {
            self.save_raw(FIXTURE_SOURCE, &acquisition.records)?;
        }

        let report = AcquisitionReport {
            season: acquisition.season,
            provenance: acquisition.provenance.clone(),
            record_count: acquisition.records.len(),
            used_fixture: acquisition.used_fixture(),
            attempts: acquisition.attempts.clone(),
            written_at: Utc::now(),
        };
        write_json(&self.root.join(RAW_DIR).join(REPORT_FILE), &report)?;
        Ok(report)
    }

    pub fn save_raw(&self, source: &str, records: &[RawPlayerRecord]) -> Result<PathBuf> {
        let path = self.raw_path(source);
        write_json(&path, records)?;
        info!("Wrote {} raw records from {} to {}", records.len(), source, path.display());
        Ok(path)
    }

    pub fn save_clean(&self, records: &[NormalizedPlayerRecord]) -> Result<PathBuf> {
        let path = self.clean_path();
        write_json(&path, records)?;
        info!("Wrote {} normalized records to {}", records.len(), path.display());
        Ok(path)
    }

    pub fn load_clean(&self) -> Result<Vec<NormalizedPlayerRecord>> {
        read_json(&self.clean_path())
    }

    /// Persist all models of a run into a fresh run directory, then point the
    /// manifest at it.
    pub fn save_run(&self, ensemble: &TrainedEnsemble) -> Result<RunManifest> {
        let run_dir = self.run_dir(ensemble.run_id);
        if run_dir.exists() {
            return Err(StoreError::already_exists(run_dir.display().to_string()));
        }
        fs::create_dir_all(&run_dir)?;

        let mut feature_names = None;
        let mut label_version = None;
        for (family, model) in &ensemble.models {
            write_compressed(&self.model_path(ensemble.run_id, *family), model)?;
            feature_names.get_or_insert_with(|| model.feature_names.clone());
            label_version.get_or_insert_with(|| model.label_version.clone());
        }
        write_json(&self.run_dir(ensemble.run_id).join(METRICS_FILE), &ensemble.metrics)?;

        let manifest = RunManifest {
            run_id: ensemble.run_id,
            label_version: label_version.unwrap_or_else(|| ensemble.metrics.label_version.clone()),
            families: ensemble.models.keys().copied().collect(),
            feature_names: feature_names.unwrap_or_default(),
            trained_at: ensemble.trained_at,
            created_at: Utc::now(),
        };
        write_json(&self.manifest_path(), &manifest)?;
        info!("Saved model run {} ({} families) to {}", manifest.run_id, manifest.families.len(), run_dir.display());
        Ok(manifest)
    }

    pub fn load_manifest(&self) -> Result<RunManifest> {
        read_json(&self.manifest_path()).map_err(|e| match e {
            StoreError::NotFound(_) => StoreError::not_found("no trained model run (models/manifest.json)"),
            other => other,
        })
    }

    /// Load every model of the current run, checking each artifact against
    /// the manifest.
    pub fn load_current_run(&self) -> Result<(RunManifest, BTreeMap<ModelFamily, TrainedModel>)> {
        let manifest = self.load_manifest()?;
        let mut models = BTreeMap::new();

        for family in &manifest.families {
            let path = self.model_path(manifest.run_id, *family);
            let model: TrainedModel = read_compressed(&path)?;
            if model.run_id != manifest.run_id {
                return Err(StoreError::mismatch(format!(
                    "{} belongs to run {}, manifest names {}",
                    path.display(),
                    model.run_id,
                    manifest.run_id
                )));
            }
            if model.family != *family {
                return Err(StoreError::mismatch(format!("{} holds a {} model", path.display(), model.family)));
            }
            if model.feature_names != manifest.feature_names {
                return Err(StoreError::mismatch(format!("{} has different feature names", path.display())));
            }
            if model.label_version != manifest.label_version {
                warn!(
                    "Model {} was trained on label {} but manifest records {}",
                    family, model.label_version, manifest.label_version
                );
            }
            models.insert(*family, model);
        }

        info!("Loaded model run {} ({} families)", manifest.run_id, models.len());
        Ok((manifest, models))
    }

    pub fn save_metrics(&self, metrics: &TrainingMetrics) -> Result<PathBuf> {
        let path = self.root.join(METRICS_FILE);
        write_json(&path, metrics)?;
        Ok(path)
    }

    pub fn load_metrics(&self) -> Result<TrainingMetrics> {
        read_json(&self.root.join(METRICS_FILE))
    }

    /// Metrics stored alongside the models of one run
    pub fn load_run_metrics(&self, run_id: Uuid) -> Result<TrainingMetrics> {
        read_json(&self.run_dir(run_id).join(METRICS_FILE))
    }

    pub fn save_predictions(&self, players: &[ProjectedPlayer]) -> Result<PathBuf> {
        let path = self.predictions_path();
        write_json(&path, players)?;
        info!("Wrote {} projections to {}", players.len(), path.display());
        Ok(path)
    }

    pub fn load_predictions(&self) -> Result<Vec<ProjectedPlayer>> {
        read_json(&self.predictions_path())
    }
}

/// Copy of the projections for the web app
pub fn publish_app_data(path: &Path, players: &[ProjectedPlayer]) -> Result<()> {
    write_json(path, players)?;
    info!("Published {} projections to {}", players.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection_model::{featurize, EnsembleTrainer, ModelConfig, ProjectionConfig, ProjectionSynthesizer, LABEL_SEED};
    use roster_normalizer::normalize;
    use roster_sources::{fixture_players, AttemptOutcome};
    use tempfile::TempDir;

    fn fixture_records() -> Vec<NormalizedPlayerRecord> {
        normalize(&fixture_players())
    }

    fn train_fixture() -> TrainedEnsemble {
        let mut config = ModelConfig::default();
        config.rf.n_trees = 5;
        config.xgb.n_rounds = 10;
        config.lgb.n_rounds = 10;
        let (x, y) = featurize(&fixture_records(), LABEL_SEED);
        EnsembleTrainer::new(config, 3).train(&x, &y).unwrap()
    }

    #[test]
    fn test_layout() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        assert!(dir.path().join("raw").is_dir());
        assert!(dir.path().join("models").is_dir());
        assert_eq!(store.raw_path("sleeper"), dir.path().join("raw/nfl_players_sleeper.json"));
    }

    #[test]
    fn test_acquisition_report_and_raw_files() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let records = fixture_players();
        let acquisition = Acquisition {
            season: 2025,
            records: records.clone(),
            provenance: Provenance::Fixture,
            attempts: vec![SourceAttempt {
                source: "sleeper".into(),
                outcome: AttemptOutcome::Failed { error: "timeout".into() },
                fetched_at: Utc::now(),
                records: vec![],
            }],
        };

        let report = store.save_acquisition(&acquisition).unwrap();
        assert!(report.used_fixture);
        assert_eq!(report.record_count, 8);
        let failed: Vec<RawPlayerRecord> = read_json(&store.raw_path("sleeper")).unwrap();
        assert!(failed.is_empty());

        let saved: Vec<RawPlayerRecord> = read_json(&store.raw_path(FIXTURE_SOURCE)).unwrap();
        assert_eq!(saved, records);
        let report: serde_json::Value = read_json(&dir.path().join("raw/acquisition_report.json")).unwrap();
        assert_eq!(report["attempts"][0]["outcome"]["status"], "failed");
    }

    #[test]
    fn test_clean_records_load_back() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let records = fixture_records();
        store.save_clean(&records).unwrap();
        assert_eq!(store.load_clean().unwrap(), records);
    }

    #[test]
    fn test_saved_run_projects_like_the_original() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let ensemble = train_fixture();

        let manifest = store.save_run(&ensemble).unwrap();
        assert_eq!(manifest.families, ModelFamily::ALL.to_vec());
        assert!(dir.path().join(format!("models/{}/lgb.bin.gz", ensemble.run_id)).exists());

        let (loaded_manifest, models) = store.load_current_run().unwrap();
        assert_eq!(loaded_manifest, manifest);

        let records = fixture_records();
        let before = ProjectionSynthesizer::new(ensemble.models, ProjectionConfig::default()).unwrap();
        let after = ProjectionSynthesizer::new(models, ProjectionConfig::default()).unwrap();
        assert_eq!(before.project(&records).unwrap(), after.project(&records).unwrap());
    }

    #[test]
    fn test_missing_manifest_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        assert!(matches!(store.load_current_run(), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_swapped_model_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let first = train_fixture();
        let second = train_fixture();
        store.save_run(&first).unwrap();

        // Plant a model from another run under the current run's directory
        let stray = &second.models[&ModelFamily::RandomForest];
        write_compressed(&store.model_path(first.run_id, ModelFamily::RandomForest), stray).unwrap();

        assert!(matches!(store.load_current_run(), Err(StoreError::Mismatch(_))));
    }

    #[test]
    fn test_published_run_carries_its_metrics() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let ensemble = train_fixture();
        let manifest = store.save_run(&ensemble).unwrap();

        let metrics = store.load_run_metrics(manifest.run_id).unwrap();
        assert_eq!(metrics.run_id, ensemble.run_id);
        assert_eq!(metrics.rmse.len(), ModelFamily::ALL.len());
        assert!(!dir.path().join(METRICS_FILE).exists());
    }

    #[test]
    fn test_run_directory_must_be_fresh() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let ensemble = train_fixture();
        store.save_run(&ensemble).unwrap();
        assert!(matches!(store.save_run(&ensemble), Err(StoreError::AlreadyExists(_))));
    }

    #[test]
    fn test_predictions_and_app_copy() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let ensemble = train_fixture();
        store.save_metrics(&ensemble.metrics).unwrap();
        let metrics = store.load_metrics().unwrap();
        assert_eq!(metrics.run_id, ensemble.run_id);
        assert_eq!(metrics.n_samples, 8);

        let players = ProjectionSynthesizer::new(ensemble.models, ProjectionConfig::default())
            .unwrap()
            .project(&fixture_records())
            .unwrap();
        store.save_predictions(&players).unwrap();
        assert_eq!(store.load_predictions().unwrap(), players);

        let app_data = dir.path().join("app/src/data.json");
        publish_app_data(&app_data, &players).unwrap();
        let json: serde_json::Value = read_json(&app_data).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 8);
        assert!(json[0].get("pos").is_some());
        assert!(json[0].get("strength_of_schedule").is_some());
    }
}
