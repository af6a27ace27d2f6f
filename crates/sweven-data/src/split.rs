//! Seeded train/test partitioning.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::dataset::Dataset;
use crate::DataError;

/// A disjoint, exhaustive partition of a dataset.
#[derive(Debug, Clone)]
pub struct Split<T> {
    /// Rows used for fitting.
    pub train: Dataset<T>,
    /// Held-out rows used for evaluation.
    pub test: Dataset<T>,
}

/// Shuffle the rows with `seed` and hold out `ceil(test_fraction * n)` of them.
///
/// The first `n_test` indices of the shuffled permutation form the test set
/// and the remainder the train set; both keep permutation order.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::InvalidTestFraction`] | `test_fraction` is not inside (0, 1) |
/// | [`DataError::EmptyDataset`] | the dataset has no rows |
/// | [`DataError::DegenerateSplit`] | either side would be empty |
#[instrument(skip(dataset), fields(n_samples = dataset.n_samples()))]
pub fn train_test_split<T: Clone>(
    dataset: &Dataset<T>,
    test_fraction: f64,
    seed: u64,
) -> Result<Split<T>, DataError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DataError::InvalidTestFraction {
            fraction: test_fraction,
        });
    }
    let n_samples = dataset.n_samples();
    if n_samples == 0 {
        return Err(DataError::EmptyDataset);
    }

    let n_test = (test_fraction * n_samples as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(DataError::DegenerateSplit { n_samples, n_test });
    }

    let mut order: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let (test_idx, train_idx) = order.split_at(n_test);
    debug!(n_train = train_idx.len(), n_test, "dataset split");

    Ok(Split {
        train: dataset.select(train_idx),
        test: dataset.select(test_idx),
    })
}
