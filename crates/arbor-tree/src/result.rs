//! Induction result types.

use crate::confusion::ConfusionMatrix;
use crate::dataset::Dataset;
use crate::display::DisplayNode;
use crate::error::TreeError;
use crate::tree::DecisionTree;

/// Summary statistics about one induction run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct InductionMetadata {
    /// Number of labeled records used for training.
    pub n_records: usize,
    /// Number of raw rows dropped for lacking a decision value.
    pub n_dropped: usize,
    /// Number of retained attributes.
    pub n_attributes: usize,
    /// Number of distinct labels.
    pub n_labels: usize,
    /// Total number of tree nodes.
    pub n_nodes: usize,
    /// Number of leaves.
    pub n_leaves: usize,
    /// Longest root-to-leaf path.
    pub depth: usize,
}

/// Result of [`TreeConfig::fit`](crate::TreeConfig::fit).
///
/// Holds the normalized dataset, the fitted tree, and the confusion matrix
/// of the tree reclassifying its own training records.
#[derive(Debug)]
pub struct InductionResult {
    dataset: Dataset,
    tree: DecisionTree,
    confusion_matrix: ConfusionMatrix,
}

impl InductionResult {
    /// Evaluate `tree` on `dataset` and bundle the result.
    pub(crate) fn new(dataset: Dataset, tree: DecisionTree) -> Result<Self, TreeError> {
        let confusion_matrix = ConfusionMatrix::evaluate(&tree, &dataset)?;
        Ok(Self {
            dataset,
            tree,
            confusion_matrix,
        })
    }

    /// Borrow the fitted tree.
    #[must_use]
    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    /// Consume the result and return the fitted tree.
    #[must_use]
    pub fn into_tree(self) -> DecisionTree {
        self.tree
    }

    /// Borrow the normalized training dataset.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Return the training-set confusion matrix.
    #[must_use]
    pub fn confusion_matrix(&self) -> &ConfusionMatrix {
        &self.confusion_matrix
    }

    /// Return the training-set accuracy.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.confusion_matrix.accuracy()
    }

    /// Convert the tree into its display shape.
    #[must_use]
    pub fn display_tree(&self) -> DisplayNode {
        self.tree.to_display_tree()
    }

    /// Return summary statistics.
    #[must_use]
    pub fn metadata(&self) -> InductionMetadata {
        InductionMetadata {
            n_records: self.dataset.n_records(),
            n_dropped: self.dataset.n_dropped(),
            n_attributes: self.dataset.n_attributes(),
            n_labels: self.dataset.n_labels(),
            n_nodes: self.tree.n_nodes(),
            n_leaves: self.tree.n_leaves(),
            depth: self.tree.depth(),
        }
    }
}
