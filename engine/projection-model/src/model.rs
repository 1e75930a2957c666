use crate::boosting::{BoostingParams, GradientBoostedTrees};
use crate::dataset::Matrix;
use crate::error::{ModelError, Result};
use crate::forest::{ForestParams, RandomForest};
use crate::histogram::{HistogramBoostedTrees, HistogramParams};
use crate::scaler::StandardScaler;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A fitted regression model
pub trait Regressor {
    fn predict_row(&self, row: &[f64]) -> f64;

    fn predict(&self, x: &Matrix) -> Vec<f64> {
        x.rows().map(|row| self.predict_row(row)).collect()
    }
}

/// The three differently-biased families averaged by the ensemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelFamily {
    /// Bagged regression trees
    #[serde(rename = "rf")]
    RandomForest,
    /// Depth-wise second-order gradient boosting
    #[serde(rename = "xgb")]
    GradientBoosting,
    /// Leaf-wise histogram gradient boosting
    #[serde(rename = "lgb")]
    HistogramBoosting,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 3] =
        [ModelFamily::RandomForest, ModelFamily::GradientBoosting, ModelFamily::HistogramBoosting];

    /// Short tag used in file names and metrics keys
    pub fn tag(&self) -> &'static str {
        match self {
            ModelFamily::RandomForest => "rf",
            ModelFamily::GradientBoosting => "xgb",
            ModelFamily::HistogramBoosting => "lgb",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Fixed hyperparameters for every family
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub rf: ForestParams,
    pub xgb: BoostingParams,
    pub lgb: HistogramParams,
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        self.rf.validate()?;
        self.xgb.validate()?;
        self.lgb.validate()
    }

    pub fn fit(&self, family: ModelFamily, x: &Matrix, y: &[f64]) -> Result<FittedModel> {
        if x.n_rows() != y.len() {
            return Err(ModelError::ShapeMismatch { expected: x.n_rows(), found: y.len() });
        }
        if x.n_rows() == 0 {
            return Err(ModelError::InsufficientData { rows: 0, required: 1 });
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("labels".to_string()));
        }
        if x.rows().flatten().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("features".to_string()));
        }

        Ok(match family {
            ModelFamily::RandomForest => FittedModel::RandomForest(self.rf.fit(x, y)?),
            ModelFamily::GradientBoosting => FittedModel::GradientBoosting(self.xgb.fit(x, y)?),
            ModelFamily::HistogramBoosting => FittedModel::HistogramBoosting(self.lgb.fit(x, y)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedModel {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoostedTrees),
    HistogramBoosting(HistogramBoostedTrees),
}

impl FittedModel {
    pub fn family(&self) -> ModelFamily {
        match self {
            FittedModel::RandomForest(_) => ModelFamily::RandomForest,
            FittedModel::GradientBoosting(_) => ModelFamily::GradientBoosting,
            FittedModel::HistogramBoosting(_) => ModelFamily::HistogramBoosting,
        }
    }
}

impl Regressor for FittedModel {
    fn predict_row(&self, row: &[f64]) -> f64 {
        match self {
            FittedModel::RandomForest(m) => m.predict_row(row),
            FittedModel::GradientBoosting(m) => m.predict_row(row),
            FittedModel::HistogramBoosting(m) => m.predict_row(row),
        }
    }
}

/// A fitted model bundled with the scaler that produced its inputs.
///
/// The pair is persisted as one artifact so neither can be loaded without
/// the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub family: ModelFamily,
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub label_version: String,
    pub scaler: StandardScaler,
    pub model: FittedModel,
}

impl TrainedModel {
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn predict_matrix(&self, x: &Matrix) -> Result<Vec<f64>> {
        let scaled = self.scaler.transform(x)?;
        Ok(self.model.predict(&scaled))
    }
}
