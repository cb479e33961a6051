//! CART decision tree used as the forest base learner.
//!
//! Exact-greedy construction: every candidate feature is sorted and swept
//! once, thresholds sit halfway between consecutive distinct values. Leaves
//! store the mean target (regression) or the class distribution
//! (classification).

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Values closer than this are treated as equal when placing thresholds.
const FEATURE_THRESHOLD: f64 = 1e-7;
/// Nodes with impurity at or below this are not split further.
const IMPURITY_EPSILON: f64 = 1e-12;

/// Number of features considered at each split.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `Sqrt` for classification, `All` for regression.
    Auto,
    All,
    Sqrt,
    Fraction(f64),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize, classification: bool) -> usize {
        let k = match self {
            MaxFeatures::Auto if classification => (n_features as f64).sqrt() as usize,
            MaxFeatures::Auto | MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Fraction(f) => (f * n_features as f64) as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Growth parameters for a single tree. The split criterion follows the
/// target kind: squared error for continuous targets, Gini for classes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_features: MaxFeatures,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams {
            max_features: MaxFeatures::Auto,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Training targets for a tree.
#[derive(Clone, Copy, Debug)]
pub enum Targets<'a> {
    Continuous(&'a [f64]),
    /// Encoded class indices in `0..n_classes`.
    Classes { labels: &'a [usize], n_classes: usize },
}

impl Targets<'_> {
    fn is_classification(&self) -> bool {
        matches!(self, Targets::Classes { .. })
    }

    fn len(&self) -> usize {
        match self {
            Targets::Continuous(y) => y.len(),
            Targets::Classes { labels, .. } => labels.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Mean target, or per-class proportions.
        value: Vec<f64>,
    },
}

/// A fitted tree; node 0 is the root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on the rows of `x` listed in `sample` (duplicates allowed,
    /// as produced by bootstrap sampling).
    pub fn fit(
        x: &Array2<f64>,
        targets: Targets<'_>,
        sample: Vec<usize>,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        assert_eq!(x.nrows(), targets.len(), "feature rows and targets must have equal lengths");
        let mut builder = TreeBuilder {
            x,
            targets,
            params,
            max_features: params
                .max_features
                .resolve(x.ncols(), targets.is_classification()),
            rng,
            nodes: Vec::new(),
        };
        builder.build_node(sample, 0);
        DecisionTree {
            nodes: builder.nodes,
        }
    }

    /// Leaf value reached by one feature row.
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { value } => return value,
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                Node::Leaf { .. } => 0,
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// Weighted child impurity; lower is better.
    cost: f64,
}

struct TreeBuilder<'a, 'r> {
    x: &'a Array2<f64>,
    targets: Targets<'a>,
    params: &'a TreeParams,
    max_features: usize,
    rng: &'r mut StdRng,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_, '_> {
    fn build_node(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let current = self.nodes.len();
        let (value, impurity) = self.leaf_value(&indices);

        let depth_reached = self.params.max_depth.map_or(false, |d| depth >= d);
        if depth_reached
            || indices.len() < self.params.min_samples_split
            || indices.len() < 2 * self.params.min_samples_leaf
            || impurity <= IMPURITY_EPSILON
        {
            self.nodes.push(Node::Leaf { value });
            return current;
        }

        let split = match self.find_best_split(&indices) {
            Some(split) => split,
            None => {
                self.nodes.push(Node::Leaf { value });
                return current;
            }
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.x[[i, split.feature]] <= split.threshold);

        // Reserve the slot; children are patched in once they exist.
        self.nodes.push(Node::Leaf { value });
        let left_idx = self.build_node(left, depth + 1);
        let right_idx = self.build_node(right, depth + 1);
        self.nodes[current] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_idx,
            right: right_idx,
        };
        current
    }

    /// Visit features in random order until `max_features` non-constant ones
    /// have been evaluated.
    fn find_best_split(&mut self, indices: &[usize]) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(&mut *self.rng);

        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;
        let mut order: Vec<usize> = indices.to_vec();

        for feature in features {
            if visited >= self.max_features {
                break;
            }
            order.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));
            let lo = self.x[[order[0], feature]];
            let hi = self.x[[order[order.len() - 1], feature]];
            if hi - lo <= FEATURE_THRESHOLD {
                continue;
            }
            visited += 1;

            if let Some(candidate) = self.sweep(&order, feature) {
                if best.as_ref().map_or(true, |b| candidate.cost < b.cost) {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Evaluate every threshold of `feature` over indices sorted by it.
    fn sweep(&self, order: &[usize], feature: usize) -> Option<SplitCandidate> {
        let n = order.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<SplitCandidate> = None;

        match self.targets {
            Targets::Continuous(y) => {
                let (total_sum, total_sq) = order
                    .iter()
                    .fold((0.0, 0.0), |(s, q), &i| (s + y[i], q + y[i] * y[i]));
                let (mut left_sum, mut left_sq) = (0.0, 0.0);

                for k in 1..n {
                    let yi = y[order[k - 1]];
                    left_sum += yi;
                    left_sq += yi * yi;
                    let Some(threshold) = self.threshold_at(order, feature, k, min_leaf) else {
                        continue;
                    };
                    let (nl, nr) = (k as f64, (n - k) as f64);
                    let right_sum = total_sum - left_sum;
                    let right_sq = total_sq - left_sq;
                    let cost = (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);
                    keep_better(&mut best, feature, threshold, cost);
                }
            }
            Targets::Classes { labels, n_classes } => {
                let mut total = vec![0.0; n_classes];
                for &i in order {
                    total[labels[i]] += 1.0;
                }
                let mut left = vec![0.0; n_classes];

                for k in 1..n {
                    left[labels[order[k - 1]]] += 1.0;
                    let Some(threshold) = self.threshold_at(order, feature, k, min_leaf) else {
                        continue;
                    };
                    let (nl, nr) = (k as f64, (n - k) as f64);
                    let (mut left_sq, mut right_sq) = (0.0, 0.0);
                    for c in 0..n_classes {
                        let r = total[c] - left[c];
                        left_sq += left[c] * left[c];
                        right_sq += r * r;
                    }
                    let gini_left = 1.0 - left_sq / (nl * nl);
                    let gini_right = 1.0 - right_sq / (nr * nr);
                    let cost = nl * gini_left + nr * gini_right;
                    keep_better(&mut best, feature, threshold, cost);
                }
            }
        }

        best
    }

    /// Threshold between positions `k - 1` and `k`, if that boundary is a
    /// valid split.
    fn threshold_at(&self, order: &[usize], feature: usize, k: usize, min_leaf: usize) -> Option<f64> {
        if k < min_leaf || order.len() - k < min_leaf {
            return None;
        }
        let prev = self.x[[order[k - 1], feature]];
        let next = self.x[[order[k], feature]];
        if next - prev <= FEATURE_THRESHOLD {
            return None;
        }
        let mid = prev + (next - prev) / 2.0;
        Some(if mid >= next { prev } else { mid })
    }

    /// Leaf value and impurity of a node.
    fn leaf_value(&self, indices: &[usize]) -> (Vec<f64>, f64) {
        let n = indices.len().max(1) as f64;
        match self.targets {
            Targets::Continuous(y) => {
                let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n;
                let var = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f64>() / n;
                (vec![mean], var)
            }
            Targets::Classes { labels, n_classes } => {
                let mut dist = vec![0.0; n_classes];
                for &i in indices {
                    dist[labels[i]] += 1.0;
                }
                for p in dist.iter_mut() {
                    *p /= n;
                }
                let gini = 1.0 - dist.iter().map(|p| p * p).sum::<f64>();
                (dist, gini)
            }
        }
    }
}

fn keep_better(best: &mut Option<SplitCandidate>, feature: usize, threshold: f64, cost: f64) {
    if best.as_ref().map_or(true, |b| cost < b.cost) {
        *best = Some(SplitCandidate {
            feature,
            threshold,
            cost,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    #[test]
    fn regression_tree_fits_step_function() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = [5.0, 5.0, 5.0, 50.0, 50.0, 50.0];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(
            &x,
            Targets::Continuous(&y),
            (0..6).collect(),
            &TreeParams::default(),
            &mut rng,
        );

        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_row(x.row(0)), &[5.0]);
        assert_eq!(tree.predict_row(array![6.4].view()), &[5.0]);
        assert_eq!(tree.predict_row(array![6.6].view()), &[50.0]);
    }

    #[test]
    fn classification_tree_separates_classes() {
        let x = array![[0.0, 1.0], [0.1, 1.0], [0.9, 1.0], [1.0, 1.0]];
        let labels = [0usize, 0, 1, 1];
        let params = TreeParams::default();
        let mut rng = StdRng::seed_from_u64(7);
        let tree = DecisionTree::fit(
            &x,
            Targets::Classes {
                labels: &labels,
                n_classes: 2,
            },
            (0..4).collect(),
            &params,
            &mut rng,
        );

        assert_eq!(tree.predict_row(x.row(0)), &[1.0, 0.0]);
        assert_eq!(tree.predict_row(x.row(3)), &[0.0, 1.0]);
    }

    #[test]
    fn constant_features_produce_single_leaf() {
        let x = array![[1.0], [1.0], [1.0]];
        let y = [1.0, 2.0, 3.0];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(
            &x,
            Targets::Continuous(&y),
            vec![0, 1, 2],
            &TreeParams::default(),
            &mut rng,
        );
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_row(x.row(0)), &[2.0]);
    }

    #[test]
    fn max_depth_limits_growth() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = [1.0, 2.0, 3.0, 4.0];
        let params = TreeParams {
            max_depth: Some(1),
            ..TreeParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTree::fit(&x, Targets::Continuous(&y), (0..4).collect(), &params, &mut rng);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(18, false), 4);
        assert_eq!(MaxFeatures::All.resolve(18, true), 18);
        assert_eq!(MaxFeatures::Auto.resolve(18, true), 4);
        assert_eq!(MaxFeatures::Auto.resolve(18, false), 18);
        assert_eq!(MaxFeatures::Sqrt.resolve(1, true), 1);
        assert_eq!(MaxFeatures::Fraction(0.01).resolve(10, false), 1);
    }
}
