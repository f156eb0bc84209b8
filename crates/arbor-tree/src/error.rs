/// Broad classification of a [`TreeError`].
///
/// Callers that only need to know whether the dataset, the configuration,
/// or the builder itself was at fault can match on this instead of the
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The dataset cannot be used for induction.
    InvalidDataset,
    /// The configuration was rejected before any computation started.
    InvalidConfiguration,
    /// The builder was asked to grow a node from zero records.
    EmptyPartition,
}

/// Errors from decision tree induction.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when the decision attribute is not one of the dataset columns.
    #[error("decision attribute \"{attribute}\" is not a column of the dataset")]
    UnknownDecisionAttribute {
        /// The requested decision attribute.
        attribute: String,
    },

    /// Returned when no labeled rows remain after normalization.
    #[error("dataset has no labeled rows ({n_rows} read, {n_dropped} dropped without a label)")]
    EmptyDataset {
        /// Number of raw rows supplied.
        n_rows: usize,
        /// Number of rows dropped because the decision value was empty.
        n_dropped: usize,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when entropy_threshold is negative, NaN, or infinite.
    #[error("entropy_threshold must be a finite non-negative number, got {threshold}")]
    InvalidEntropyThreshold {
        /// The invalid threshold value provided.
        threshold: f64,
    },

    /// Returned when the decision attribute is also listed as skipped.
    #[error("decision attribute \"{attribute}\" is also listed in skip_attributes")]
    DecisionAttributeSkipped {
        /// The conflicting attribute name.
        attribute: String,
    },

    /// Returned when a tree is evaluated on a dataset with a different label set.
    #[error("tree labels {tree:?} differ from dataset labels {dataset:?}")]
    LabelSetMismatch {
        /// Labels the tree was built with, in canonical order.
        tree: Vec<String>,
        /// Labels of the evaluated dataset, in canonical order.
        dataset: Vec<String>,
    },

    /// Returned when a label index does not address one of the known labels.
    #[error("label index {label} out of range for {n_labels} labels")]
    LabelOutOfRange {
        /// The offending label index.
        label: usize,
        /// Number of known labels.
        n_labels: usize,
    },

    /// Returned when the builder is invoked on a partition with zero records.
    #[error("cannot grow a node from an empty partition at depth {depth}")]
    EmptyPartition {
        /// Depth at which the empty partition was encountered.
        depth: usize,
    },
}

impl TreeError {
    /// Return the broad kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            TreeError::UnknownDecisionAttribute { .. }
            | TreeError::EmptyDataset { .. }
            | TreeError::LabelSetMismatch { .. }
            | TreeError::LabelOutOfRange { .. } => ErrorKind::InvalidDataset,
            TreeError::InvalidMaxDepth { .. }
            | TreeError::InvalidEntropyThreshold { .. }
            | TreeError::DecisionAttributeSkipped { .. } => ErrorKind::InvalidConfiguration,
            TreeError::EmptyPartition { .. } => ErrorKind::EmptyPartition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_errors_map_to_invalid_dataset() {
        let err = TreeError::UnknownDecisionAttribute {
            attribute: "play".into(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidDataset);
        let err = TreeError::EmptyDataset {
            n_rows: 3,
            n_dropped: 3,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidDataset);
    }

    #[test]
    fn config_errors_map_to_invalid_configuration() {
        assert_eq!(
            TreeError::InvalidMaxDepth { max_depth: 0 }.kind(),
            ErrorKind::InvalidConfiguration
        );
        assert_eq!(
            TreeError::InvalidEntropyThreshold { threshold: -0.5 }.kind(),
            ErrorKind::InvalidConfiguration
        );
    }

    #[test]
    fn label_errors_map_to_invalid_dataset() {
        let err = TreeError::LabelSetMismatch {
            tree: vec!["no".into(), "yes".into()],
            dataset: vec!["yes".into(), "no".into()],
        };
        assert_eq!(err.kind(), ErrorKind::InvalidDataset);
        let err = TreeError::LabelOutOfRange {
            label: 2,
            n_labels: 2,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidDataset);
    }

    #[test]
    fn empty_partition_maps_to_its_own_kind() {
        let err = TreeError::EmptyPartition { depth: 3 };
        assert_eq!(err.kind(), ErrorKind::EmptyPartition);
        assert_eq!(
            err.to_string(),
            "cannot grow a node from an empty partition at depth 3"
        );
    }

    #[test]
    fn message_names_the_attribute() {
        let err = TreeError::DecisionAttributeSkipped {
            attribute: "play".into(),
        };
        assert_eq!(
            err.to_string(),
            "decision attribute \"play\" is also listed in skip_attributes"
        );
    }
}
