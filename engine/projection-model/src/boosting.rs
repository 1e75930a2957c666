//! Depth-wise second-order gradient boosting with exact splits

use crate::dataset::Matrix;
use crate::error::{ModelError, Result};
use crate::model::Regressor;
use crate::tree::{grow_depthwise, GradStats, SplitRules, Tree};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    pub n_rounds: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// L2 penalty on leaf weights
    pub lambda: f64,
    /// Minimum hessian sum on each side of a split
    pub min_child_weight: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self { n_rounds: 100, max_depth: 6, learning_rate: 0.1, lambda: 1.0, min_child_weight: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    base_score: f64,
    /// Leaf values already carry the learning rate
    trees: Vec<Tree>,
}

impl BoostingParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_rounds == 0 {
            return Err(ModelError::hyperparameter("xgb.n_rounds must be positive"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ModelError::hyperparameter("xgb.learning_rate must be in (0, 1]"));
        }
        if self.lambda < 0.0 || self.min_child_weight < 0.0 {
            return Err(ModelError::hyperparameter("xgb.lambda and xgb.min_child_weight must be non-negative"));
        }
        Ok(())
    }

    /// Squared-error boosting: `g = pred - y`, `h = 1`
    pub fn fit(&self, x: &Matrix, y: &[f64]) -> Result<GradientBoostedTrees> {
        self.validate()?;
        let n = x.n_rows();
        let base_score = y.iter().sum::<f64>() / n.max(1) as f64;
        let mut predictions = vec![base_score; n];
        let hess = vec![1.0; n];
        let indices: Vec<usize> = (0..n).collect();
        let rules = SplitRules { lambda: self.lambda, min_rows_leaf: 1, min_child_weight: self.min_child_weight };
        let (lambda, eta) = (self.lambda, self.learning_rate);
        let leaf = move |s: &GradStats| eta * s.weight(lambda);

        let mut trees = Vec::with_capacity(self.n_rounds);
        for _ in 0..self.n_rounds {
            let grad: Vec<f64> = predictions.iter().zip(y).map(|(p, t)| p - t).collect();
            let tree = grow_depthwise(x, &indices, &grad, &hess, &rules, self.max_depth, &leaf);
            for (prediction, row) in predictions.iter_mut().zip(x.rows()) {
                *prediction += tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(GradientBoostedTrees { base_score, trees })
    }
}

impl Regressor for GradientBoostedTrees {
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }
}
