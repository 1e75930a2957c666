//! Projection Model - From normalized rosters to ranked draft projections
//!
//! Synthesizes a feature vector and a heuristic fantasy-points label per
//! player, cross-validates three tree-ensemble regressors on a forward-only
//! split, refits them on all rows, and averages their predictions into the
//! published, ranked projection list.

pub mod boosting;
pub mod dataset;
pub mod error;
pub mod features;
pub mod forest;
pub mod histogram;
pub mod label;
pub mod model;
pub mod projection;
pub mod sampling;
pub mod scaler;
pub mod splitter;
pub mod trainer;
pub mod tree;

pub use dataset::Matrix;
pub use error::{ModelError, Result};
pub use features::{feature_matrix, featurize, PlayerAttributes, FEATURE_COUNT, FEATURE_NAMES};
pub use label::{SyntheticLabeler, LABEL_SEED, LABEL_VERSION};
pub use model::{FittedModel, ModelConfig, ModelFamily, Regressor, TrainedModel};
pub use projection::{ProjectedPlayer, ProjectionConfig, ProjectionSynthesizer};
pub use scaler::StandardScaler;
pub use splitter::TimeSeriesSplit;
pub use trainer::{EnsembleTrainer, TrainedEnsemble, TrainingMetrics};
