//! What a forest fit returns.

use serde::Serialize;

use crate::forest::RandomForest;
use crate::importance::RankedFeature;

/// Shape of a training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingInfo {
    /// Trees grown.
    pub n_trees: usize,
    /// Training rows.
    pub n_samples: usize,
    /// Feature columns.
    pub n_features: usize,
    /// Classes (largest label + 1).
    pub n_classes: usize,
    /// Features sampled at each split.
    pub max_features: usize,
}

/// A fitted forest with its importances and run metadata.
#[derive(Debug, Clone)]
pub struct ForestFit {
    forest: RandomForest,
    importances: Vec<RankedFeature>,
    info: TrainingInfo,
}

impl ForestFit {
    pub(crate) fn new(
        forest: RandomForest,
        importances: Vec<RankedFeature>,
        info: TrainingInfo,
    ) -> Self {
        Self {
            forest,
            importances,
            info,
        }
    }

    /// Borrow the fitted forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Consume the fit and keep only the forest.
    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// Return features ranked by mean decrease in impurity.
    #[must_use]
    pub fn importances(&self) -> &[RankedFeature] {
        &self.importances
    }

    /// Return run metadata.
    #[must_use]
    pub fn info(&self) -> &TrainingInfo {
        &self.info
    }
}
