//! Classification metrics: accuracy, confusion matrix, per-class report.

use std::fmt;

use serde::Serialize;

use crate::error::RfError;

/// Fraction of positions where `predicted` equals `truth`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`RfError::LengthMismatch`] | slices differ in length |
/// | [`RfError::EmptyDataset`] | both slices are empty |
pub fn accuracy_score(truth: &[usize], predicted: &[usize]) -> Result<f64, RfError> {
    check_pair(truth, predicted)?;
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / truth.len() as f64)
}

fn check_pair(truth: &[usize], predicted: &[usize]) -> Result<(), RfError> {
    if truth.len() != predicted.len() {
        return Err(RfError::LengthMismatch {
            n_rows: predicted.len(),
            n_labels: truth.len(),
        });
    }
    if truth.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    Ok(())
}

/// Counts of (true class, predicted class) pairs.
///
/// `counts[t][p]` is the number of rows with true class `t` predicted as `p`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// An all-zero matrix over `n_classes` classes.
    #[must_use]
    pub fn new(n_classes: usize) -> Self {
        Self {
            counts: vec![vec![0; n_classes]; n_classes],
        }
    }

    /// Tally `truth` against `predicted` over classes `0..n_classes`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::LengthMismatch`] | slices differ in length |
    /// | [`RfError::EmptyDataset`] | both slices are empty |
    /// | [`RfError::LabelOutOfRange`] | a label is `>= n_classes` |
    pub fn from_labels(
        truth: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, RfError> {
        check_pair(truth, predicted)?;
        let mut matrix = Self::new(n_classes);
        for (&t, &p) in truth.iter().zip(predicted) {
            if let Some(label) = [t, p].into_iter().find(|&l| l >= n_classes) {
                return Err(RfError::LabelOutOfRange { label, n_classes });
            }
            matrix.counts[t][p] += 1;
        }
        Ok(matrix)
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    /// Return the rows of the matrix, indexed by true class.
    #[must_use]
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Return the number of rows tallied.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Fraction of tallied rows on the diagonal.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes()).map(|c| self.counts[c][c]).sum();
        correct as f64 / total as f64
    }

    /// Add another matrix of the same size into this one.
    pub fn merge(&mut self, other: &ConfusionMatrix) {
        for (row, other_row) in self.counts.iter_mut().zip(&other.counts) {
            for (c, o) in row.iter_mut().zip(other_row) {
                *c += o;
            }
        }
    }

    /// Per-class precision, recall, F1 and support with macro and weighted averages.
    #[must_use]
    pub fn report(&self) -> ClassificationReport {
        let k = self.n_classes();
        let classes: Vec<ClassScores> = (0..k)
            .map(|c| {
                let tp = self.counts[c][c];
                let support: usize = self.counts[c].iter().sum();
                let predicted: usize = self.counts.iter().map(|row| row[c]).sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassScores {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let total = self.total();
        let macro_avg = average(&classes, total, |_| 1.0 / k.max(1) as f64);
        let weighted_avg = average(&classes, total, |s| ratio(s.support, total));

        ClassificationReport {
            classes,
            accuracy: self.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn average(
    classes: &[ClassScores],
    total: usize,
    weight: impl Fn(&ClassScores) -> f64,
) -> AverageScores {
    let mut avg = AverageScores {
        precision: 0.0,
        recall: 0.0,
        f1: 0.0,
        support: total,
    };
    for s in classes {
        let w = weight(s);
        avg.precision += w * s.precision;
        avg.recall += w * s.recall;
        avg.f1 += w * s.f1;
    }
    avg
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "true\\pred")?;
        for p in 0..self.n_classes() {
            write!(f, " {p:>7}")?;
        }
        writeln!(f)?;
        for (t, row) in self.counts.iter().enumerate() {
            write!(f, "{t:>10}")?;
            for n in row {
                write!(f, " {n:>7}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Scores for one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassScores {
    /// Class index.
    pub class: usize,
    /// `TP / (TP + FP)`; 0 when the class is never predicted.
    pub precision: f64,
    /// `TP / (TP + FN)`; 0 when the class never occurs.
    pub recall: f64,
    /// Harmonic mean of precision and recall; 0 when both are 0.
    pub f1: f64,
    /// Rows whose true class is this one.
    pub support: usize,
}

/// Averaged precision, recall and F1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageScores {
    /// Averaged precision.
    pub precision: f64,
    /// Averaged recall.
    pub recall: f64,
    /// Averaged F1.
    pub f1: f64,
    /// Total rows.
    pub support: usize,
}

/// A per-class precision/recall/F1 table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// One entry per class, in class order.
    pub classes: Vec<ClassScores>,
    /// Overall accuracy.
    pub accuracy: f64,
    /// Unweighted mean over classes.
    pub macro_avg: AverageScores,
    /// Mean over classes weighted by support.
    pub weighted_avg: AverageScores,
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for s in &self.classes {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                s.class, s.precision, s.recall, s.f1, s.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        Ok(())
    }
}
