//! Node impurity measures.

use serde::{Deserialize, Serialize};

/// How node impurity is measured when scoring candidate splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impurity {
    /// `1 − Σ p²`
    Gini,
    /// `−Σ p·ln p` over classes with `p > 0`
    Entropy,
}

impl Impurity {
    /// Impurity of a node with the given per-class counts summing to `total`.
    ///
    /// An empty node has impurity 0.
    #[must_use]
    pub fn measure(self, counts: &[usize], total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let n = total as f64;
        let proportions = counts.iter().filter(|&&c| c > 0).map(|&c| c as f64 / n);
        match self {
            Impurity::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
            Impurity::Entropy => -proportions.map(|p| p * p.ln()).sum::<f64>(),
        }
    }
}
