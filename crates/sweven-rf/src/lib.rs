//! Random forest classification: fit, predict, evaluate, persist.
//!
//! Trees are CART classifiers grown on bootstrap samples with a random
//! feature subset at every node, trained in parallel with rayon. A forest
//! predicts by averaging leaf class distributions. Evaluation covers
//! stratified k-fold cross-validation, confusion matrices and per-class
//! precision/recall/F1 reports. Fitted forests round-trip through a
//! versioned bincode file.

mod config;
mod error;
mod eval;
mod forest;
mod impurity;
mod importance;
mod metrics;
mod node;
mod persist;
mod predict;
mod result;
mod split;
mod tree;

pub use config::{MaxFeatures, RandomForestConfig};
pub use error::RfError;
pub use eval::{CrossValidation, CrossValidationResult};
pub use forest::RandomForest;
pub use impurity::Impurity;
pub use importance::RankedFeature;
pub use metrics::{
    AverageScores, ClassScores, ClassificationReport, ConfusionMatrix, accuracy_score,
};
pub use node::{Node, NodeId};
pub use result::{ForestFit, TrainingInfo};
pub use tree::DecisionTree;
