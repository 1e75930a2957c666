use crate::dataset::Matrix;
use crate::error::{ModelError, Result};
use crate::features::FEATURE_NAMES;
use crate::label::LABEL_VERSION;
use crate::model::{ModelConfig, ModelFamily, Regressor, TrainedModel};
use crate::scaler::StandardScaler;
use crate::splitter::TimeSeriesSplit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

/// Cross-validation results of one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub run_id: Uuid,
    /// Mean validation RMSE across folds
    pub rmse: BTreeMap<ModelFamily, f64>,
    pub fold_rmse: BTreeMap<ModelFamily, Vec<f64>>,
    pub n_samples: usize,
    pub n_features: usize,
    pub n_splits: usize,
    pub label_version: String,
}

/// All three families from one run, each refit on the full dataset
#[derive(Debug, Clone)]
pub struct TrainedEnsemble {
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub models: BTreeMap<ModelFamily, TrainedModel>,
    pub metrics: TrainingMetrics,
}

pub struct EnsembleTrainer {
    config: ModelConfig,
    splitter: TimeSeriesSplit,
}

impl EnsembleTrainer {
    pub fn new(config: ModelConfig, n_splits: usize) -> Self {
        Self { config, splitter: TimeSeriesSplit::new(n_splits) }
    }

    /// Cross-validate every family, then refit each on all rows.
    ///
    /// Any failure aborts the whole run; nothing is returned for the
    /// families that did succeed.
    pub fn train(&self, x: &Matrix, y: &[f64]) -> Result<TrainedEnsemble> {
        self.config.validate()?;
        if x.n_rows() != y.len() {
            return Err(ModelError::ShapeMismatch { expected: x.n_rows(), found: y.len() });
        }
        if x.n_cols() != FEATURE_NAMES.len() {
            return Err(ModelError::ShapeMismatch { expected: FEATURE_NAMES.len(), found: x.n_cols() });
        }
        let folds = self.splitter.split(x.n_rows())?;

        let run_id = Uuid::new_v4();
        let trained_at = Utc::now();
        info!("Training run {} on {} rows x {} features, {} folds", run_id, x.n_rows(), x.n_cols(), folds.len());

        let mut rmse = BTreeMap::new();
        let mut fold_rmse = BTreeMap::new();
        let mut models = BTreeMap::new();

        for family in ModelFamily::ALL {
            let mut scores = Vec::with_capacity(folds.len());
            for fold in &folds {
                // Scaler sees the fold's training rows only
                let x_train = x.slice_rows(fold.train.clone());
                let x_test = x.slice_rows(fold.test.clone());
                let scaler = StandardScaler::fit(&x_train)?;
                let model = self.config.fit(family, &scaler.transform(&x_train)?, &y[fold.train.clone()])?;
                let predictions = model.predict(&scaler.transform(&x_test)?);
                scores.push(root_mean_squared_error(&predictions, &y[fold.test.clone()]));
            }
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            info!("{} cross-validated RMSE {:.3} (folds: {:?})", family, mean, scores);

            let scaler = StandardScaler::fit(x)?;
            let model = self.config.fit(family, &scaler.transform(x)?, y)?;
            models.insert(
                family,
                TrainedModel {
                    family,
                    run_id,
                    trained_at,
                    feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                    label_version: LABEL_VERSION.to_string(),
                    scaler,
                    model,
                },
            );
            rmse.insert(family, mean);
            fold_rmse.insert(family, scores);
        }

        let metrics = TrainingMetrics {
            run_id,
            rmse,
            fold_rmse,
            n_samples: x.n_rows(),
            n_features: x.n_cols(),
            n_splits: folds.len(),
            label_version: LABEL_VERSION.to_string(),
        };
        Ok(TrainedEnsemble { run_id, trained_at, models, metrics })
    }
}

pub fn root_mean_squared_error(predictions: &[f64], targets: &[f64]) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let sse: f64 = predictions.iter().zip(targets).map(|(p, t)| (p - t).powi(2)).sum();
    (sse / targets.len() as f64).sqrt()
}
