//! Binary regression trees and the exact greedy split search
//!
//! Every model family in the ensemble is a collection of these trees. Splits
//! are scored with the second-order gain `G_L^2/(H_L+l) + G_R^2/(H_R+l) - G^2/(H+l)`;
//! with `g = y`, `h = 1` and `l = 0` that is exactly CART's variance reduction,
//! so one search serves bagged trees and boosted trees alike.

use crate::dataset::Matrix;
use serde::{Deserialize, Serialize};

/// Gains at or below this are treated as "no useful split"
pub(crate) const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf { value: f64 },
    /// Rows with `row[feature] <= threshold` go left
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn leaf(value: f64) -> Self {
        Self { nodes: vec![Node::Leaf { value }] }
    }

    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

/// Gradient statistics of a set of rows
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct GradStats {
    pub grad: f64,
    pub hess: f64,
    pub count: usize,
}

impl GradStats {
    pub fn of(indices: &[usize], grad: &[f64], hess: &[f64]) -> Self {
        let mut stats = GradStats::default();
        for &i in indices {
            stats.add(grad[i], hess[i]);
        }
        stats
    }

    pub fn add(&mut self, g: f64, h: f64) {
        self.grad += g;
        self.hess += h;
        self.count += 1;
    }

    pub fn score(&self, lambda: f64) -> f64 {
        let denominator = self.hess + lambda;
        if denominator <= 0.0 {
            0.0
        } else {
            self.grad * self.grad / denominator
        }
    }

    /// Newton step `-G/(H+l)`
    pub fn weight(&self, lambda: f64) -> f64 {
        let denominator = self.hess + lambda;
        if denominator <= 0.0 {
            0.0
        } else {
            -self.grad / denominator
        }
    }
}

/// Constraints a split has to satisfy on both sides
#[derive(Debug, Clone, Copy)]
pub(crate) struct SplitRules {
    pub lambda: f64,
    pub min_rows_leaf: usize,
    pub min_child_weight: f64,
}

impl SplitRules {
    pub fn admits(&self, side: &GradStats) -> bool {
        side.count >= self.min_rows_leaf && side.hess >= self.min_child_weight
    }

    pub fn gain(&self, left: &GradStats, right: &GradStats, parent: &GradStats) -> f64 {
        left.score(self.lambda) + right.score(self.lambda) - parent.score(self.lambda)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SplitCandidate {
    pub feature: usize,
    pub threshold: f64,
    pub gain: f64,
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

/// Exact greedy search over every distinct value of every feature.
///
/// Thresholds are midpoints between consecutive distinct values. Ties in gain
/// keep the earliest (feature, threshold) so results do not depend on hashing
/// or thread scheduling.
pub(crate) fn best_exact_split(
    x: &Matrix,
    indices: &[usize],
    grad: &[f64],
    hess: &[f64],
    rules: &SplitRules,
) -> Option<SplitCandidate> {
    let parent = GradStats::of(indices, grad, hess);
    let mut best: Option<(usize, f64, f64)> = None;
    let mut order = indices.to_vec();

    for feature in 0..x.n_cols() {
        order.sort_by(|&a, &b| x.get(a, feature).total_cmp(&x.get(b, feature)).then(a.cmp(&b)));

        let mut left = GradStats::default();
        for pos in 0..order.len().saturating_sub(1) {
            let i = order[pos];
            left.add(grad[i], hess[i]);

            let here = x.get(i, feature);
            let next = x.get(order[pos + 1], feature);
            if here == next {
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
            if gain > MIN_GAIN && best.map_or(true, |(_, _, g)| gain > g) {
                best = Some((feature, here + (next - here) / 2.0, gain));
            }
        }
    }

    let (feature, threshold, gain) = best?;
    let (left, right) = indices.iter().copied().partition(|&i| x.get(i, feature) <= threshold);
    Some(SplitCandidate { feature, threshold, gain, left, right })
}

/// Grow a tree level by level with exact splits.
///
/// `leaf_value` turns a leaf's gradient statistics into its output.
pub(crate) fn grow_depthwise(
    x: &Matrix,
    indices: &[usize],
    grad: &[f64],
    hess: &[f64],
    rules: &SplitRules,
    max_depth: usize,
    leaf_value: &dyn Fn(&GradStats) -> f64,
) -> Tree {
    let mut nodes = Vec::new();
    grow_node(&mut nodes, x, indices, grad, hess, rules, 0, max_depth, leaf_value);
    Tree::from_nodes(nodes)
}

#[allow(clippy::too_many_arguments)]
fn grow_node(
    nodes: &mut Vec<Node>,
    x: &Matrix,
    indices: &[usize],
    grad: &[f64],
    hess: &[f64],
    rules: &SplitRules,
    depth: usize,
    max_depth: usize,
    leaf_value: &dyn Fn(&GradStats) -> f64,
) -> usize {
    let index = nodes.len();
    nodes.push(Node::Leaf { value: leaf_value(&GradStats::of(indices, grad, hess)) });

    if depth >= max_depth || indices.len() < 2 * rules.min_rows_leaf.max(1) {
        return index;
    }
    let Some(split) = best_exact_split(x, indices, grad, hess, rules) else {
        return index;
    };

    let left = grow_node(nodes, x, &split.left, grad, hess, rules, depth + 1, max_depth, leaf_value);
    let right = grow_node(nodes, x, &split.right, grad, hess, rules, depth + 1, max_depth, leaf_value);
    nodes[index] = Node::Split { feature: split.feature, threshold: split.threshold, left, right };
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart_rules() -> SplitRules {
        SplitRules { lambda: 0.0, min_rows_leaf: 1, min_child_weight: 0.0 }
    }

    #[test]
    fn test_exact_split_finds_step() {
        let x = Matrix::from_rows(&[[1.0, 9.0], [2.0, 9.0], [3.0, 9.0], [4.0, 9.0]]);
        let y = [10.0, 10.0, 30.0, 30.0];
        let ones = [1.0; 4];

        let split = best_exact_split(&x, &[0, 1, 2, 3], &y, &ones, &cart_rules()).unwrap();
        assert_eq!(split.feature, 0);
        assert_eq!(split.threshold, 2.5);
        assert_eq!(split.left, vec![0, 1]);
        // SSE 400 -> 0
        assert!((split.gain - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_target_does_not_split() {
        let x = Matrix::from_rows(&[[1.0], [2.0], [3.0]]);
        let y = [5.0; 3];
        assert!(best_exact_split(&x, &[0, 1, 2], &y, &[1.0; 3], &cart_rules()).is_none());
    }

    #[test]
    fn test_depthwise_tree_fits_step_function() {
        let x = Matrix::from_rows(&[[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]]);
        let y = [1.0, 1.0, 5.0, 5.0, 9.0, 9.0];
        let mean = |s: &GradStats| s.grad / s.hess;
        let tree = grow_depthwise(&x, &[0, 1, 2, 3, 4, 5], &y, &[1.0; 6], &cart_rules(), 4, &mean);

        for (row, expected) in x.rows().zip(y) {
            assert!((tree.predict(row) - expected).abs() < 1e-9);
        }
        assert_eq!(tree.n_leaves(), 3);
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_max_depth_zero_is_a_stump() {
        let x = Matrix::from_rows(&[[1.0], [2.0]]);
        let mean = |s: &GradStats| s.grad / s.hess;
        let tree = grow_depthwise(&x, &[0, 1], &[0.0, 10.0], &[1.0; 2], &cart_rules(), 0, &mean);
        assert_eq!(tree, Tree::leaf(5.0));
    }
}
