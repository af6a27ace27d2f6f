//! CART decision trees stored as node arenas.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeId};
use crate::split::SplitContext;

/// Growth limits for one tree, resolved and validated by the forest config.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GrowthLimits {
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
}

/// A fitted classification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
}

impl DecisionTree {
    /// Grow a tree over `rows` (indices into the context's columns).
    ///
    /// Inputs are assumed valid: `rows` non-empty and every label below
    /// `ctx.n_classes`.
    pub(crate) fn grow(
        ctx: &SplitContext<'_>,
        limits: GrowthLimits,
        rows: Vec<usize>,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut grower = Grower {
            ctx,
            limits,
            rng,
            nodes: Vec::new(),
        };
        grower.grow(rows, 0);
        Self {
            nodes: grower.nodes,
            n_features: ctx.columns.len(),
            n_classes: ctx.n_classes,
        }
    }

    /// Return the leaf class distribution reached by `sample`.
    ///
    /// The caller checks the sample width.
    pub(crate) fn class_weights(&self, sample: &[f64]) -> &[f64] {
        let mut id = NodeId::ROOT;
        loop {
            match &self.nodes[id.index()] {
                Node::Leaf { class_weights, .. } => return class_weights,
                Node::Branch {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    id = if sample[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Per-feature impurity decrease, normalized to sum to 1.
    ///
    /// All zeros when the tree is a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for node in &self.nodes {
            if let Node::Branch { feature, gain, .. } = node {
                totals[*feature] += gain;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            for t in &mut totals {
                *t /= sum;
            }
        }
        totals
    }

    /// Return the nodes in arena order; index 0 is the root.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the length of the longest root-to-leaf path; a lone leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(NodeId::ROOT, 0usize)];
        while let Some((id, d)) = stack.pop() {
            match &self.nodes[id.index()] {
                Node::Leaf { .. } => deepest = deepest.max(d),
                Node::Branch { left, right, .. } => {
                    stack.push((*left, d + 1));
                    stack.push((*right, d + 1));
                }
            }
        }
        deepest
    }

    /// Return the number of classes the leaves describe.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

struct Grower<'c, 'r> {
    ctx: &'c SplitContext<'c>,
    limits: GrowthLimits,
    rng: &'r mut ChaCha8Rng,
    nodes: Vec<Node>,
}

impl Grower<'_, '_> {
    /// Add the subtree for `rows` to the arena and return its root.
    ///
    /// A placeholder leaf reserves the branch slot before the children are
    /// grown, so the root of every subtree precedes its descendants.
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> NodeId {
        let mut counts = vec![0usize; self.ctx.n_classes];
        for &r in &rows {
            counts[self.ctx.labels[r]] += 1;
        }
        let n = rows.len();

        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let at_depth = self.limits.max_depth.is_some_and(|max| depth >= max);
        let too_small = n < self.limits.min_samples_split;
        let split = if is_pure || at_depth || too_small {
            None
        } else {
            self.ctx.best_split(&rows, &counts, &mut *self.rng)
        };

        let Some(split) = split else {
            return self.push_leaf(&counts, n);
        };

        let id = self.push_leaf(&counts, n);
        let column = &self.ctx.columns[split.feature];
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| column[r] <= split.threshold);
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);

        self.nodes[id.index()] = Node::Branch {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            gain: split.gain,
            n_samples: n,
        };
        id
    }

    fn push_leaf(&mut self, counts: &[usize], n: usize) -> NodeId {
        let total = n.max(1) as f64;
        self.nodes.push(Node::Leaf {
            class_weights: counts.iter().map(|&c| c as f64 / total).collect(),
            n_samples: n,
        });
        NodeId::new(self.nodes.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::impurity::Impurity;

    fn fit(columns: &[Vec<f64>], labels: &[usize], max_depth: Option<usize>) -> DecisionTree {
        let n_classes = labels.iter().max().map_or(1, |m| m + 1);
        let ctx = SplitContext {
            columns,
            labels,
            n_classes,
            impurity: Impurity::Gini,
            max_features: columns.len(),
            min_samples_leaf: 1,
        };
        let limits = GrowthLimits {
            max_depth,
            min_samples_split: 2,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        DecisionTree::grow(&ctx, limits, (0..labels.len()).collect(), &mut rng)
    }

    #[test]
    fn pure_labels_give_single_leaf() {
        let tree = fit(&[vec![1.0, 2.0, 3.0]], &[1, 1, 1], None);
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.class_weights(&[9.0]), &[0.0, 1.0]);
    }

    #[test]
    fn xor_needs_two_levels() {
        let columns = vec![vec![0.0, 0.0, 1.0, 1.0], vec![0.0, 1.0, 0.0, 1.0]];
        let labels = [0, 1, 1, 0];
        let tree = fit(&columns, &labels, None);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.n_leaves(), 4);
        for (i, &label) in labels.iter().enumerate() {
            let sample = [columns[0][i], columns[1][i]];
            assert_eq!(tree.class_weights(&sample)[label], 1.0);
        }
    }

    #[test]
    fn depth_limit_respected() {
        let columns = vec![vec![0.0, 0.0, 1.0, 1.0], vec![0.0, 1.0, 0.0, 1.0]];
        let tree = fit(&columns, &[0, 1, 1, 0], Some(1));
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn root_precedes_children() {
        let columns = vec![vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let tree = fit(&columns, &[0, 0, 0, 1, 1, 1], None);
        match &tree.nodes()[0] {
            Node::Branch { left, right, .. } => {
                assert!(left.index() > 0 && right.index() > 0);
            }
            Node::Leaf { .. } => panic!("expected a branch at the root"),
        }
    }

    #[test]
    fn importances_point_at_informative_feature() {
        let columns = vec![
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0],
        ];
        let tree = fit(&columns, &[0, 0, 0, 1, 1, 1], None);
        assert_eq!(tree.feature_importances(), vec![0.0, 1.0]);
    }
}
