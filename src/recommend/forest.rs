//! Randomized ensemble of decision trees over the three meal-context
//! features. Trees are grown on bootstrap samples with gini-impurity
//! splits; probabilities are the mean of per-tree leaf distributions.
//!
//! The RNG is a seeded ChaCha8 stream, so a fixed seed and a fixed
//! training sequence always produce the same forest.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const FEATURE_COUNT: usize = 3;

/// Candidate features examined per split. One, the usual sqrt-of-feature-count
/// default; later features in the node's shuffle order are only consulted when
/// the earlier ones have a single distinct value and cannot split.
const MAX_SPLIT_FEATURES: usize = 1;

#[derive(Debug)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

#[derive(Debug)]
struct DecisionTree {
    root: Node,
}

#[derive(Debug)]
enum Node {
    Leaf {
        distribution: Vec<f32>,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl RandomForest {
    /// Grow `tree_count` trees on bootstrap resamples of the training set.
    /// `labels` are class indices in `0..n_classes`.
    pub fn fit(
        samples: &[[f32; FEATURE_COUNT]],
        labels: &[usize],
        n_classes: usize,
        tree_count: usize,
        seed: u64,
    ) -> Self {
        debug_assert_eq!(samples.len(), labels.len());

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let trees = (0..tree_count)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..samples.len())
                    .map(|_| rng.random_range(0..samples.len()))
                    .collect();
                DecisionTree::fit(samples, labels, &bootstrap, n_classes, &mut rng)
            })
            .collect();

        Self { trees, n_classes }
    }

    /// Mean leaf distribution across all trees; sums to 1.0 over the full
    /// class set (up to float rounding).
    pub fn predict_proba(&self, features: &[f32; FEATURE_COUNT]) -> Vec<f32> {
        let mut probabilities = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let distribution = tree.predict(features);
            for (acc, p) in probabilities.iter_mut().zip(distribution) {
                *acc += p;
            }
        }

        let tree_count = self.trees.len() as f32;
        for p in &mut probabilities {
            *p /= tree_count;
        }
        probabilities
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

impl DecisionTree {
    fn fit(
        samples: &[[f32; FEATURE_COUNT]],
        labels: &[usize],
        indices: &[usize],
        n_classes: usize,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let root = build_node(samples, labels, indices, n_classes, rng);
        Self { root }
    }

    fn predict(&self, features: &[f32; FEATURE_COUNT]) -> &[f32] {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] < *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn build_node(
    samples: &[[f32; FEATURE_COUNT]],
    labels: &[usize],
    indices: &[usize],
    n_classes: usize,
    rng: &mut ChaCha8Rng,
) -> Node {
    let counts = class_counts(labels, indices, n_classes);

    if counts.iter().filter(|&&c| c > 0).count() <= 1 {
        return leaf(&counts, indices.len());
    }

    let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
    features.shuffle(rng);

    // Examine up to MAX_SPLIT_FEATURES splittable features; a feature with a
    // single distinct value in this node does not count against the budget.
    let mut best: Option<(usize, f32, f32)> = None;
    let mut examined = 0;
    for &feature in &features {
        if examined >= MAX_SPLIT_FEATURES {
            break;
        }
        if let Some((threshold, impurity)) =
            best_split_for_feature(samples, labels, indices, feature, n_classes)
        {
            examined += 1;
            if best.is_none() || impurity < best.map(|(_, _, g)| g).unwrap_or(f32::MAX) {
                best = Some((feature, threshold, impurity));
            }
        }
    }

    let Some((feature, threshold, _)) = best else {
        // Identical feature vectors with mixed labels; keep the mixture.
        return leaf(&counts, indices.len());
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| samples[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_node(samples, labels, &left_indices, n_classes, rng)),
        right: Box::new(build_node(samples, labels, &right_indices, n_classes, rng)),
    }
}

fn leaf(counts: &[usize], total: usize) -> Node {
    let distribution = counts
        .iter()
        .map(|&c| {
            if total == 0 {
                0.0
            } else {
                c as f32 / total as f32
            }
        })
        .collect();
    Node::Leaf { distribution }
}

fn class_counts(labels: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in indices {
        counts[labels[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let sum_squared: f32 = counts
        .iter()
        .map(|&c| {
            let p = c as f32 / total as f32;
            p * p
        })
        .sum();
    1.0 - sum_squared
}

/// Best threshold for one feature within a node, as (threshold, weighted
/// child gini). None when the feature has a single distinct value here.
fn best_split_for_feature(
    samples: &[[f32; FEATURE_COUNT]],
    labels: &[usize],
    indices: &[usize],
    feature: usize,
    n_classes: usize,
) -> Option<(f32, f32)> {
    let mut values: Vec<f32> = indices.iter().map(|&i| samples[i][feature]).collect();
    values.sort_by(f32::total_cmp);
    values.dedup();
    if values.len() < 2 {
        return None;
    }

    let total = indices.len();
    let mut best: Option<(f32, f32)> = None;

    for pair in values.windows(2) {
        let threshold = (pair[0] + pair[1]) / 2.0;

        let mut left_counts = vec![0usize; n_classes];
        let mut left_total = 0usize;
        for &i in indices {
            if samples[i][feature] < threshold {
                left_counts[labels[i]] += 1;
                left_total += 1;
            }
        }
        let right_total = total - left_total;
        let mut right_counts = class_counts(labels, indices, n_classes);
        for (r, l) in right_counts.iter_mut().zip(&left_counts) {
            *r -= l;
        }

        let weighted = (left_total as f32 * gini(&left_counts, left_total)
            + right_total as f32 * gini(&right_counts, right_total))
            / total as f32;

        if best.is_none() || weighted < best.map(|(_, g)| g).unwrap_or(f32::MAX) {
            best = Some((threshold, weighted));
        }
    }

    best
}
