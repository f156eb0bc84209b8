//! Configuration builder for decision tree induction.

use std::collections::BTreeSet;

use tracing::instrument;

use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::raw::RawDataset;
use crate::result::InductionResult;
use crate::tree::DecisionTree;

/// Configuration for one induction run.
///
/// Construct via [`TreeConfig::new`], then chain `with_*` methods. The
/// value is immutable input to [`TreeConfig::fit`]; nothing is cached on it.
///
/// # Defaults
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `skip_attributes`   | empty   |
/// | `max_depth`         | 5       |
/// | `entropy_threshold` | 0.1     |
#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub(crate) decision_attribute: String,
    pub(crate) skip_attributes: BTreeSet<String>,
    pub(crate) max_depth: usize,
    pub(crate) entropy_threshold: f64,
}

impl TreeConfig {
    /// Create a new config predicting the given decision attribute.
    #[must_use]
    pub fn new(decision_attribute: impl Into<String>) -> Self {
        Self {
            decision_attribute: decision_attribute.into(),
            skip_attributes: BTreeSet::new(),
            max_depth: 5,
            entropy_threshold: 0.1,
        }
    }

    // --- Setters ---

    /// Set the attributes excluded from splitting.
    #[must_use]
    pub fn with_skip_attributes<I, S>(mut self, skip_attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_attributes = skip_attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the maximum tree depth (root is depth 0; leaves sit at most this deep).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum information gain, in bits, required to split a node.
    #[must_use]
    pub fn with_entropy_threshold(mut self, entropy_threshold: f64) -> Self {
        self.entropy_threshold = entropy_threshold;
        self
    }

    // --- Getters ---

    /// Return the decision attribute.
    #[must_use]
    pub fn decision_attribute(&self) -> &str {
        &self.decision_attribute
    }

    /// Return the skipped attributes.
    #[must_use]
    pub fn skip_attributes(&self) -> &BTreeSet<String> {
        &self.skip_attributes
    }

    /// Return the maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the minimum information gain required to split.
    #[must_use]
    pub fn entropy_threshold(&self) -> f64 {
        self.entropy_threshold
    }

    /// Check the configuration without touching any data.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::InvalidMaxDepth`] | `max_depth` is zero |
    /// | [`TreeError::InvalidEntropyThreshold`] | threshold is negative or not finite |
    /// | [`TreeError::DecisionAttributeSkipped`] | decision attribute is in `skip_attributes` |
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.max_depth == 0 {
            return Err(TreeError::InvalidMaxDepth {
                max_depth: self.max_depth,
            });
        }
        if !self.entropy_threshold.is_finite() || self.entropy_threshold < 0.0 {
            return Err(TreeError::InvalidEntropyThreshold {
                threshold: self.entropy_threshold,
            });
        }
        if self.skip_attributes.contains(&self.decision_attribute) {
            return Err(TreeError::DecisionAttributeSkipped {
                attribute: self.decision_attribute.clone(),
            });
        }
        Ok(())
    }

    /// Normalize `raw`, induce a tree, and reclassify the training rows.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::InvalidMaxDepth`] | `max_depth` is zero |
    /// | [`TreeError::InvalidEntropyThreshold`] | threshold negative or non-finite |
    /// | [`TreeError::DecisionAttributeSkipped`] | decision attribute also skipped |
    /// | [`TreeError::UnknownDecisionAttribute`] | decision attribute not a column |
    /// | [`TreeError::EmptyDataset`] | no labeled rows |
    #[instrument(skip_all, fields(decision = %self.decision_attribute, n_rows = raw.n_rows()))]
    pub fn fit(&self, raw: &RawDataset) -> Result<InductionResult, TreeError> {
        let dataset = Dataset::normalize(raw, self)?;
        let tree = DecisionTree::build(&dataset, self)?;
        InductionResult::new(dataset, tree)
    }
}
