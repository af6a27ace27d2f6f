use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// The root of every tree.
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of a decision tree.
///
/// Children are arena indices rather than boxes, so a tree is a flat
/// `Vec<Node>` that serializes without recursion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Interior node: rows with `x[feature] <= threshold` go left.
    Branch {
        /// Feature column tested.
        feature: usize,
        /// Split threshold, midway between two adjacent training values.
        threshold: f64,
        /// Left child.
        left: NodeId,
        /// Right child.
        right: NodeId,
        /// Weighted impurity decrease `n·I − n_l·I_l − n_r·I_r`.
        gain: f64,
        /// Training rows (bootstrap draws) reaching this node.
        n_samples: usize,
    },
    /// Terminal node.
    Leaf {
        /// Fraction of training rows in each class; sums to 1.
        class_weights: Vec<f64>,
        /// Training rows (bootstrap draws) reaching this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Return the number of training rows that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Branch { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` for a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
