//! Bagged regression trees

use crate::dataset::Matrix;
use crate::error::{ModelError, Result};
use crate::model::Regressor;
use crate::sampling::SeededSampler;
use crate::tree::{grow_depthwise, GradStats, SplitRules, Tree};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Fit each tree on a bootstrap resample instead of the full training set
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self { n_trees: 100, max_depth: 10, min_samples_leaf: 1, bootstrap: true, seed: 42 }
    }
}

/// Average of independently grown CART trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<Tree>,
}

impl ForestParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(ModelError::hyperparameter("rf.n_trees must be positive"));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::hyperparameter("rf.min_samples_leaf must be positive"));
        }
        Ok(())
    }

    pub fn fit(&self, x: &Matrix, y: &[f64]) -> Result<RandomForest> {
        self.validate()?;
        let n = x.n_rows();
        let hess = vec![1.0; n];
        let rules = SplitRules { lambda: 0.0, min_rows_leaf: self.min_samples_leaf, min_child_weight: 0.0 };
        let mean = |s: &GradStats| if s.count == 0 { 0.0 } else { s.grad / s.hess };
        let mut sampler = SeededSampler::new(self.seed);

        let trees = (0..self.n_trees)
            .map(|_| {
                let indices: Vec<usize> =
                    if self.bootstrap { (0..n).map(|_| sampler.index(n)).collect() } else { (0..n).collect() };
                grow_depthwise(x, &indices, y, &hess, &rules, self.max_depth, &mean)
            })
            .collect();

        Ok(RandomForest { trees })
    }
}

impl RandomForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
    }
}
