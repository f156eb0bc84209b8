//! Confusion matrix and per-label classification metrics.

use std::fmt;

use tracing::{info, instrument};

use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::node::LabelIndex;
use crate::tree::DecisionTree;

/// A confusion matrix for multi-class classification.
///
/// Entry `matrix[actual][predicted]` counts how many records with label
/// `actual` were predicted as `predicted`. Rows and columns follow the
/// canonical (first-seen) label order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    matrix: Vec<Vec<usize>>,
}

/// Per-label precision, recall, and F1 score.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClassMetrics {
    /// The label name.
    pub label: String,
    /// Precision: TP / (TP + FP). 0.0 if the label was never predicted.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if no record carries this label.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of records carrying this label.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from paired actual and predicted labels.
    ///
    /// Pairs beyond the shorter of the two slices are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::LabelOutOfRange`] if any index does not address
    /// one of `labels`.
    pub fn from_labels(
        actual: &[LabelIndex],
        predicted: &[LabelIndex],
        labels: &[String],
    ) -> Result<Self, TreeError> {
        let n_labels = labels.len();
        let mut matrix = vec![vec![0usize; n_labels]; n_labels];
        for (&a, &p) in actual.iter().zip(predicted) {
            for label in [a, p] {
                if label.index() >= n_labels {
                    return Err(TreeError::LabelOutOfRange {
                        label: label.index(),
                        n_labels,
                    });
                }
            }
            matrix[a.index()][p.index()] += 1;
        }
        Ok(Self {
            labels: labels.to_vec(),
            matrix,
        })
    }

    /// Reclassify every record of `dataset` with `tree` and tally the results.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::LabelSetMismatch`] if the tree was built over a
    /// different label set than the one `dataset` carries.
    #[instrument(skip_all, fields(n_records = dataset.n_records()))]
    pub fn evaluate(tree: &DecisionTree, dataset: &Dataset) -> Result<Self, TreeError> {
        if tree.label_names() != dataset.label_names() {
            return Err(TreeError::LabelSetMismatch {
                tree: tree.label_names().to_vec(),
                dataset: dataset.label_names().to_vec(),
            });
        }
        let predicted = tree.predict_batch(dataset.rows());
        let cm = Self::from_labels(dataset.labels(), &predicted, dataset.label_names())?;
        info!(accuracy = cm.accuracy(), "evaluation complete");
        Ok(cm)
    }

    /// Overall accuracy: trace over total. 0.0 for an empty matrix.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64
        }
    }

    /// Number of correctly classified records (the trace).
    #[must_use]
    pub fn correct(&self) -> usize {
        (0..self.labels.len()).map(|i| self.matrix[i][i]).sum()
    }

    /// Total number of records tallied.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flat_map(|row| row.iter()).sum()
    }

    /// Count of records with label `actual` predicted as `predicted`, 0 for
    /// indices outside the matrix.
    #[must_use]
    pub fn count(&self, actual: LabelIndex, predicted: LabelIndex) -> usize {
        self.matrix
            .get(actual.index())
            .and_then(|row| row.get(predicted.index()))
            .copied()
            .unwrap_or(0)
    }

    /// Per-label precision, recall, F1, and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.labels.len();
        (0..n)
            .map(|c| {
                let tp = self.matrix[c][c];
                let fp: usize = (0..n).filter(|&i| i != c).map(|i| self.matrix[i][c]).sum();
                let fn_: usize = (0..n).filter(|&j| j != c).map(|j| self.matrix[c][j]).sum();
                let support = tp + fn_;
                let precision = if tp + fp == 0 {
                    0.0
                } else {
                    tp as f64 / (tp + fp) as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    label: self.labels[c].clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Return the label names indexing rows and columns.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Return the number of labels.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.labels.len()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(String::len)
            .chain(self.matrix.iter().flatten().map(|v| v.to_string().len()))
            .max()
            .unwrap_or(1)
            .max(6);

        // Header row
        write!(f, "{:>width$}", "actual")?;
        for label in &self.labels {
            write!(f, " {label:>width$}")?;
        }
        writeln!(f)?;

        // Data rows
        for (label, row) in self.labels.iter().zip(&self.matrix) {
            write!(f, "{label:>width$}")?;
            for val in row {
                write!(f, " {val:>width$}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
