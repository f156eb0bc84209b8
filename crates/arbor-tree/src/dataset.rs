//! Dataset normalization: raw rows to a typed, labeled table.

use std::collections::HashMap;

use tracing::{debug, info, instrument, warn};

use crate::cell::Cell;
use crate::config::TreeConfig;
use crate::error::TreeError;
use crate::node::{AttributeIndex, LabelIndex};
use crate::raw::{RawDataset, RawValue};

/// A normalized training table.
///
/// `rows[record][attribute]` holds the [`Cell`] of each retained attribute,
/// positionally aligned with [`Dataset::attributes`]. `labels[record]`
/// indexes into [`Dataset::label_names`], which lists labels in first-seen
/// order.
#[derive(Debug, Clone)]
pub struct Dataset {
    attributes: Vec<String>,
    rows: Vec<Vec<Cell>>,
    labels: Vec<LabelIndex>,
    label_names: Vec<String>,
    n_dropped: usize,
}

impl Dataset {
    /// Normalize raw rows under the given configuration.
    ///
    /// Retained attributes are the raw columns minus the decision attribute
    /// minus the skipped attributes, in header order. Rows with an empty
    /// decision value are dropped.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::InvalidMaxDepth`] | configuration rejected |
    /// | [`TreeError::InvalidEntropyThreshold`] | configuration rejected |
    /// | [`TreeError::DecisionAttributeSkipped`] | configuration rejected |
    /// | [`TreeError::UnknownDecisionAttribute`] | decision attribute not in the header |
    /// | [`TreeError::EmptyDataset`] | no labeled rows remain |
    #[instrument(skip_all, fields(n_rows = raw.n_rows(), decision = %config.decision_attribute()))]
    pub fn normalize(raw: &RawDataset, config: &TreeConfig) -> Result<Self, TreeError> {
        config.validate()?;

        let decision = config.decision_attribute();
        if !raw.columns().iter().any(|c| c == decision) {
            return Err(TreeError::UnknownDecisionAttribute {
                attribute: decision.to_string(),
            });
        }

        for skipped in config.skip_attributes() {
            if !raw.columns().contains(skipped) {
                warn!(attribute = %skipped, "skip attribute is not a column, ignoring");
            }
        }

        let skip = config.skip_attributes();
        let attributes: Vec<String> = raw
            .columns()
            .iter()
            .filter(|c| c.as_str() != decision && !skip.contains(*c))
            .cloned()
            .collect();

        let mut rows = Vec::with_capacity(raw.n_rows());
        let mut labels = Vec::with_capacity(raw.n_rows());
        let mut label_names: Vec<String> = Vec::new();
        let mut label_lookup: HashMap<String, usize> = HashMap::new();
        let mut n_dropped = 0usize;

        for raw_row in raw.rows() {
            let Some(label) = raw_row.get(decision).and_then(label_text) else {
                n_dropped += 1;
                continue;
            };

            let label_idx = *label_lookup.entry(label.clone()).or_insert_with(|| {
                label_names.push(label);
                label_names.len() - 1
            });

            let cells: Vec<Cell> = attributes
                .iter()
                .map(|a| raw_row.get(a).map_or(Cell::Missing, Cell::from_raw))
                .collect();

            rows.push(cells);
            labels.push(LabelIndex::new(label_idx));
        }

        if rows.is_empty() {
            return Err(TreeError::EmptyDataset {
                n_rows: raw.n_rows(),
                n_dropped,
            });
        }

        if n_dropped > 0 {
            debug!(n_dropped, "dropped rows without a decision value");
        }

        info!(
            n_records = rows.len(),
            n_attributes = attributes.len(),
            n_labels = label_names.len(),
            "dataset normalized"
        );

        Ok(Self {
            attributes,
            rows,
            labels,
            label_names,
            n_dropped,
        })
    }

    /// Return the retained attribute names in header order.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Return the name of a retained attribute.
    #[must_use]
    pub fn attribute_name(&self, attribute: AttributeIndex) -> &str {
        &self.attributes[attribute.index()]
    }

    /// Look up a retained attribute by name.
    #[must_use]
    pub fn attribute_index(&self, name: &str) -> Option<AttributeIndex> {
        self.attributes
            .iter()
            .position(|a| a == name)
            .map(AttributeIndex::new)
    }

    /// Return the normalized rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Return one attribute's cell for one record.
    #[must_use]
    pub fn cell(&self, record: usize, attribute: AttributeIndex) -> &Cell {
        &self.rows[record][attribute.index()]
    }

    /// Return each record's label.
    #[must_use]
    pub fn labels(&self) -> &[LabelIndex] {
        &self.labels
    }

    /// Return the distinct labels in first-seen order.
    #[must_use]
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Return the number of records.
    #[must_use]
    pub fn n_records(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of retained attributes.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Return the number of distinct labels.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.label_names.len()
    }

    /// Return the number of raw rows dropped for lacking a decision value.
    #[must_use]
    pub fn n_dropped(&self) -> usize {
        self.n_dropped
    }

    /// Count labels among the given records, indexed by [`LabelIndex`].
    pub(crate) fn label_counts(&self, records: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.label_names.len()];
        for &r in records {
            counts[self.labels[r].index()] += 1;
        }
        counts
    }
}

/// Text form of a decision value, or `None` when the value is empty.
fn label_text(value: &RawValue) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    match value {
        RawValue::Number(v) => Some(format!("{v}")),
        RawValue::Text(s) => Some(s.trim().to_string()),
        RawValue::Empty => None,
    }
}
