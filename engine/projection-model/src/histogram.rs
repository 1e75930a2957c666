//! Leaf-wise histogram gradient boosting
//!
//! Features are bucketed once into at most `max_bins` bins. Each round grows
//! one tree best-first: the leaf whose best split gains the most is split
//! next, until the tree has `num_leaves` leaves or no leaf can be split.

use crate::dataset::Matrix;
use crate::error::{ModelError, Result};
use crate::model::Regressor;
use crate::tree::{GradStats, Node, SplitRules, Tree, MIN_GAIN};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramParams {
    pub n_rounds: usize,
    pub max_depth: usize,
    pub num_leaves: usize,
    pub learning_rate: f64,
    pub min_data_in_leaf: usize,
    pub max_bins: usize,
    pub lambda: f64,
    pub min_sum_hessian: f64,
}

impl Default for HistogramParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            max_depth: 6,
            num_leaves: 31,
            learning_rate: 0.1,
            min_data_in_leaf: 20,
            max_bins: 255,
            lambda: 0.0,
            min_sum_hessian: 1e-3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBoostedTrees {
    base_score: f64,
    trees: Vec<Tree>,
}

/// Per-feature bin upper bounds; value `v` falls in the first bin with `v <= bound`
#[derive(Debug, Clone)]
struct BinMapper {
    bounds: Vec<Vec<f64>>,
}

impl BinMapper {
    fn fit(x: &Matrix, max_bins: usize) -> Self {
        let bounds = (0..x.n_cols())
            .map(|feature| {
                let mut values: Vec<f64> = (0..x.n_rows()).map(|i| x.get(i, feature)).collect();
                values.sort_by(f64::total_cmp);
                values.dedup();
                if values.len() <= max_bins {
                    values.windows(2).map(|w| w[0] + (w[1] - w[0]) / 2.0).collect()
                } else {
                    // Quantile cut points over the distinct values
                    let mut cuts: Vec<f64> = (1..max_bins)
                        .map(|b| {
                            let at = b * values.len() / max_bins;
                            values[at - 1] + (values[at] - values[at - 1]) / 2.0
                        })
                        .collect();
                    cuts.dedup();
                    cuts
                }
            })
            .collect();
        Self { bounds }
    }

    fn bin(&self, feature: usize, value: f64) -> usize {
        self.bounds[feature].partition_point(|bound| *bound < value)
    }

    fn n_bins(&self, feature: usize) -> usize {
        self.bounds[feature].len() + 1
    }

    fn threshold(&self, feature: usize, bin: usize) -> f64 {
        self.bounds[feature][bin]
    }
}

struct OpenLeaf {
    node: usize,
    depth: usize,
    indices: Vec<usize>,
    best: Option<HistogramSplit>,
}

#[derive(Debug, Clone, Copy)]
struct HistogramSplit {
    feature: usize,
    bin: usize,
    gain: f64,
}

impl HistogramParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_rounds == 0 {
            return Err(ModelError::hyperparameter("lgb.n_rounds must be positive"));
        }
        if self.num_leaves < 2 {
            return Err(ModelError::hyperparameter("lgb.num_leaves must be at least 2"));
        }
        if self.max_bins < 2 {
            return Err(ModelError::hyperparameter("lgb.max_bins must be at least 2"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ModelError::hyperparameter("lgb.learning_rate must be in (0, 1]"));
        }
        if self.lambda < 0.0 {
            return Err(ModelError::hyperparameter("lgb.lambda must be non-negative"));
        }
        Ok(())
    }

    pub fn fit(&self, x: &Matrix, y: &[f64]) -> Result<HistogramBoostedTrees> {
        self.validate()?;
        let n = x.n_rows();
        let mapper = BinMapper::fit(x, self.max_bins);
        let binned: Vec<Vec<usize>> =
            x.rows().map(|row| row.iter().enumerate().map(|(f, v)| mapper.bin(f, *v)).collect()).collect();

        let base_score = y.iter().sum::<f64>() / n.max(1) as f64;
        let mut predictions = vec![base_score; n];
        let hess = vec![1.0; n];
        let mut trees = Vec::with_capacity(self.n_rounds);

        for _ in 0..self.n_rounds {
            let grad: Vec<f64> = predictions.iter().zip(y).map(|(p, t)| p - t).collect();
            let tree = self.grow_leafwise(&mapper, &binned, &grad, &hess);
            for (prediction, row) in predictions.iter_mut().zip(x.rows()) {
                *prediction += tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(HistogramBoostedTrees { base_score, trees })
    }

    fn rules(&self) -> SplitRules {
        SplitRules { lambda: self.lambda, min_rows_leaf: self.min_data_in_leaf.max(1), min_child_weight: self.min_sum_hessian }
    }

    fn grow_leafwise(&self, mapper: &BinMapper, binned: &[Vec<usize>], grad: &[f64], hess: &[f64]) -> Tree {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let root: Vec<usize> = (0..binned.len()).collect();
        let best = self.best_split(mapper, binned, &root, grad, hess, 0);
        let mut open = vec![OpenLeaf { node: 0, depth: 0, indices: root, best }];
        let mut n_leaves = 1;

        while n_leaves < self.num_leaves {
            // Strictly greater keeps the earliest leaf on ties
            let mut chosen: Option<(usize, HistogramSplit)> = None;
            for (i, leaf) in open.iter().enumerate() {
                if let Some(split) = leaf.best {
                    if chosen.map_or(true, |(_, c)| split.gain > c.gain) {
                        chosen = Some((i, split));
                    }
                }
            }
            let Some((chosen, split)) = chosen else { break };

            let leaf = open.swap_remove(chosen);
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
                leaf.indices.iter().copied().partition(|&i| binned[i][split.feature] <= split.bin);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[leaf.node] = Node::Split {
                feature: split.feature,
                threshold: mapper.threshold(split.feature, split.bin),
                left,
                right,
            };

            let depth = leaf.depth + 1;
            let left_best = self.best_split(mapper, binned, &left_rows, grad, hess, depth);
            let right_best = self.best_split(mapper, binned, &right_rows, grad, hess, depth);
            open.push(OpenLeaf { node: left, depth, indices: left_rows, best: left_best });
            open.push(OpenLeaf { node: right, depth, indices: right_rows, best: right_best });
            n_leaves += 1;
        }

        for leaf in open {
            let stats = GradStats::of(&leaf.indices, grad, hess);
            nodes[leaf.node] = Node::Leaf { value: self.learning_rate * stats.weight(self.lambda) };
        }
        Tree::from_nodes(nodes)
    }

    fn best_split(
        &self,
        mapper: &BinMapper,
        binned: &[Vec<usize>],
        indices: &[usize],
        grad: &[f64],
        hess: &[f64],
        depth: usize,
    ) -> Option<HistogramSplit> {
        let rules = self.rules();
        if depth >= self.max_depth || indices.len() < 2 * rules.min_rows_leaf {
            return None;
        }
        let parent = GradStats::of(indices, grad, hess);
        let mut best: Option<HistogramSplit> = None;

        for feature in 0..mapper.bounds.len() {
            let mut histogram = vec![GradStats::default(); mapper.n_bins(feature)];
            for &i in indices {
                histogram[binned[i][feature]].add(grad[i], hess[i]);
            }

            let mut left = GradStats::default();
            // The last bin has no upper bound to split on
            for (bin, bucket) in histogram.iter().enumerate().take(histogram.len() - 1) {
                left.grad += bucket.grad;
                left.hess += bucket.hess;
                left.count += bucket.count;
                if bucket.count == 0 {
                    continue;
                }
                let right = GradStats {
                    grad: parent.grad - left.grad,
                    hess: parent.hess - left.hess,
                    count: parent.count - left.count,
                };
                if !rules.admits(&left) || !rules.admits(&right) {
                    continue;
                }
                let gain = rules.gain(&left, &right, &parent);
                if gain > MIN_GAIN && best.map_or(true, |b| gain > b.gain) {
                    best = Some(HistogramSplit { feature, bin, gain });
                }
            }
        }
        best
    }
}

impl Regressor for HistogramBoostedTrees {
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }
}
