//! Best-split search over a random feature subset.

use rand::Rng;
use rand::seq::index;

use crate::impurity::Impurity;

/// Shared, read-only inputs for split search within one tree.
///
/// `columns` is column-major: `columns[feature][row]`. Row indices passed
/// to [`SplitContext::best_split`] index into these columns and into
/// `labels`; they may repeat (bootstrap draws).
pub(crate) struct SplitContext<'a> {
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) impurity: Impurity,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

/// The winning split of a node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) feature: usize,
    pub(crate) threshold: f64,
    pub(crate) gain: f64,
}

impl SplitContext<'_> {
    /// Search `max_features` randomly chosen features for the split with the
    /// largest weighted impurity decrease.
    ///
    /// `counts` are the class counts of `rows`. Returns `None` when every
    /// sampled feature is constant over `rows` or no boundary leaves
    /// `min_samples_leaf` rows on both sides.
    pub(crate) fn best_split(
        &self,
        rows: &[usize],
        counts: &[usize],
        rng: &mut impl Rng,
    ) -> Option<Candidate> {
        let n = rows.len();
        if n < 2 {
            return None;
        }
        let parent = n as f64 * self.impurity.measure(counts, n);
        let n_features = self.columns.len();
        let take = self.max_features.min(n_features);

        let mut best: Option<Candidate> = None;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n);
        let mut left = vec![0usize; self.n_classes];
        let mut right = vec![0usize; self.n_classes];

        for feature in index::sample(rng, n_features, take).iter() {
            let column = &self.columns[feature];
            sorted.clear();
            sorted.extend(rows.iter().map(|&r| (column[r], self.labels[r])));
            sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            left.iter_mut().for_each(|c| *c = 0);
            right.copy_from_slice(counts);

            for i in 0..n - 1 {
                let (value, label) = sorted[i];
                left[label] += 1;
                right[label] -= 1;

                let next = sorted[i + 1].0;
                if value == next {
                    continue;
                }
                let n_left = i + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let gain = parent
                    - n_left as f64 * self.impurity.measure(&left, n_left)
                    - n_right as f64 * self.impurity.measure(&right, n_right);
                if best.as_ref().is_none_or(|b| gain > b.gain) {
                    let mut threshold = value + (next - value) / 2.0;
                    // Midpoint can round up onto `next` for adjacent floats.
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(Candidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}
