use std::collections::HashMap;

use crate::cell::Cell;
use crate::dataset::Dataset;
use crate::entropy::gain_from_groups;
use crate::node::{AttributeIndex, Condition};

/// How a candidate partitions records on its attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitRule {
    /// One equality edge per distinct observed value, in first-seen order.
    Categorical {
        /// Distinct values, one edge each.
        values: Vec<Cell>,
    },
    /// Two edges: `<= threshold` and `> threshold`.
    Threshold(f64),
}

/// One potential partitioning of a set of records.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitCandidate {
    /// Attribute the records are partitioned on.
    pub attribute: AttributeIndex,
    /// Partitioning rule.
    pub rule: SplitRule,
}

/// Records grouped by the edge they match.
#[derive(Debug, Clone)]
pub(crate) struct Partition {
    /// `groups[i]` holds the records matching `conditions()[i]`.
    pub(crate) groups: Vec<Vec<usize>>,
    /// Records matching no edge (missing values).
    pub(crate) unmatched: Vec<usize>,
}

impl SplitCandidate {
    /// Return the edge conditions in order.
    #[must_use]
    pub fn conditions(&self) -> Vec<Condition> {
        match &self.rule {
            SplitRule::Categorical { values } => {
                values.iter().cloned().map(Condition::Equals).collect()
            }
            SplitRule::Threshold(t) => vec![Condition::AtMost(*t), Condition::Above(*t)],
        }
    }

    /// Return `true` if the attribute is used up by this split.
    ///
    /// Categorical splits exhaust their attribute; a numeric attribute may be
    /// split again deeper in the tree at a different threshold.
    #[must_use]
    pub fn consumes_attribute(&self) -> bool {
        matches!(self.rule, SplitRule::Categorical { .. })
    }

    /// Group `records` by the condition they satisfy.
    pub(crate) fn partition(&self, dataset: &Dataset, records: &[usize]) -> Partition {
        let conditions = self.conditions();
        let mut groups = vec![Vec::new(); conditions.len()];
        let mut unmatched = Vec::new();
        for &r in records {
            let cell = dataset.cell(r, self.attribute);
            match conditions.iter().position(|c| c.matches(cell)) {
                Some(i) => groups[i].push(r),
                None => unmatched.push(r),
            }
        }
        Partition { groups, unmatched }
    }
}

/// A candidate together with its information gain.
#[derive(Debug, Clone)]
pub(crate) struct ScoredSplit {
    pub(crate) candidate: SplitCandidate,
    pub(crate) gain: f64,
}

/// Observed kind of an attribute within a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    /// Every present cell is numeric.
    Numeric,
    /// At least one present cell is categorical (mixed columns included).
    Categorical,
    /// Every cell is missing.
    Absent,
}

fn column_kind(dataset: &Dataset, records: &[usize], attribute: AttributeIndex) -> ColumnKind {
    let mut kind = ColumnKind::Absent;
    for &r in records {
        match dataset.cell(r, attribute) {
            Cell::Categorical(_) => return ColumnKind::Categorical,
            Cell::Numeric(_) => kind = ColumnKind::Numeric,
            Cell::Missing => {}
        }
    }
    kind
}

/// Hashable identity of a present cell. Numbers compare by value with
/// `-0.0` folded onto `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Numeric(u64),
    Categorical(&'a str),
}

fn cell_key(cell: &Cell) -> Option<CellKey<'_>> {
    match cell {
        Cell::Numeric(v) => Some(CellKey::Numeric(if *v == 0.0 { 0 } else { v.to_bits() })),
        Cell::Categorical(s) => Some(CellKey::Categorical(s)),
        Cell::Missing => None,
    }
}

/// Best equality split: one edge per distinct present value.
///
/// Returns `None` when fewer than two distinct values are present.
fn best_categorical_split(
    dataset: &Dataset,
    records: &[usize],
    attribute: AttributeIndex,
    parent_counts: &[usize],
) -> Option<ScoredSplit> {
    let n_labels = parent_counts.len();
    let mut slot_of: HashMap<CellKey<'_>, usize> = HashMap::new();
    let mut values: Vec<Cell> = Vec::new();
    let mut group_counts: Vec<Vec<usize>> = Vec::new();
    let mut unmatched_counts = vec![0usize; n_labels];

    for &r in records {
        let cell = dataset.cell(r, attribute);
        let label = dataset.labels()[r].index();
        let Some(key) = cell_key(cell) else {
            unmatched_counts[label] += 1;
            continue;
        };
        let slot = *slot_of.entry(key).or_insert_with(|| {
            values.push(cell.clone());
            group_counts.push(vec![0usize; n_labels]);
            values.len() - 1
        });
        group_counts[slot][label] += 1;
    }

    if values.len() < 2 {
        return None;
    }

    let gain = gain_from_groups(
        parent_counts,
        group_counts
            .iter()
            .chain(std::iter::once(&unmatched_counts))
            .map(Vec::as_slice),
    );

    Some(ScoredSplit {
        candidate: SplitCandidate {
            attribute,
            rule: SplitRule::Categorical { values },
        },
        gain,
    })
}

/// Best single-threshold split over midpoints of consecutive distinct values.
///
/// Sorts the present `(value, label)` pairs, scans left-to-right with
/// incremental label counts, and keeps the first threshold reaching the
/// highest gain. Returns `None` when fewer than two distinct values are
/// present.
fn best_threshold_split(
    dataset: &Dataset,
    records: &[usize],
    attribute: AttributeIndex,
    parent_counts: &[usize],
) -> Option<ScoredSplit> {
    let n_labels = parent_counts.len();
    let mut missing_counts = vec![0usize; n_labels];
    let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(records.len());
    for &r in records {
        let label = dataset.labels()[r].index();
        match dataset.cell(r, attribute).as_f64() {
            Some(v) => sorted.push((v, label)),
            None => missing_counts[label] += 1,
        }
    }
    if sorted.len() < 2 {
        return None;
    }
    sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    // Left grows from empty, right shrinks from all present records.
    let mut left_counts = vec![0usize; n_labels];
    let mut right_counts = vec![0usize; n_labels];
    for &(_, label) in &sorted {
        right_counts[label] += 1;
    }

    let mut best: Option<(f64, f64)> = None;
    for i in 0..(sorted.len() - 1) {
        let (val_i, label_i) = sorted[i];
        left_counts[label_i] += 1;
        right_counts[label_i] -= 1;

        let val_next = sorted[i + 1].0;
        if val_i == val_next {
            continue;
        }

        let gain = gain_from_groups(
            parent_counts,
            [
                left_counts.as_slice(),
                right_counts.as_slice(),
                missing_counts.as_slice(),
            ],
        );

        if best.is_none_or(|(best_gain, _)| gain > best_gain) {
            let mid = (val_i + val_next) / 2.0;
            // Adjacent floats can round the midpoint up onto `val_next`.
            let threshold = if mid < val_next { mid } else { val_i };
            best = Some((gain, threshold));
        }
    }

    let (gain, threshold) = best?;
    Some(ScoredSplit {
        candidate: SplitCandidate {
            attribute,
            rule: SplitRule::Threshold(threshold),
        },
        gain,
    })
}

/// Best candidate for one attribute, chosen by the attribute's observed kind.
pub(crate) fn best_split_for_attribute(
    dataset: &Dataset,
    records: &[usize],
    attribute: AttributeIndex,
    parent_counts: &[usize],
) -> Option<ScoredSplit> {
    match column_kind(dataset, records, attribute) {
        ColumnKind::Numeric => best_threshold_split(dataset, records, attribute, parent_counts),
        ColumnKind::Categorical => {
            best_categorical_split(dataset, records, attribute, parent_counts)
        }
        ColumnKind::Absent => None,
    }
}

/// Find the highest-gain split among `attributes`.
///
/// Ties go to the attribute listed first. Returns `None` when no attribute
/// has at least two distinct present values.
pub(crate) fn find_best_split(
    dataset: &Dataset,
    records: &[usize],
    attributes: &[AttributeIndex],
    parent_counts: &[usize],
) -> Option<ScoredSplit> {
    let mut best: Option<ScoredSplit> = None;
    for &attribute in attributes {
        let Some(scored) = best_split_for_attribute(dataset, records, attribute, parent_counts)
        else {
            continue;
        };
        if best.as_ref().is_none_or(|b| scored.gain > b.gain) {
            best = Some(scored);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use crate::entropy::information_gain;
    use crate::raw::{RawDataset, RawRow};

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        let columns: Vec<String> = columns.iter().map(|s| s.to_string()).collect();
        let rows = rows
            .iter()
            .map(|values| {
                columns
                    .iter()
                    .zip(values.iter())
                    .fold(RawRow::new(), |row, (c, v)| row.with(c.clone(), *v))
            })
            .collect();
        let raw = RawDataset::new(columns, rows);
        Dataset::normalize(&raw, &TreeConfig::new("label")).unwrap()
    }

    fn all(ds: &Dataset) -> Vec<usize> {
        (0..ds.n_records()).collect()
    }

    #[test]
    fn separable_numeric_finds_midpoint() {
        let ds = dataset(
            &["x", "label"],
            &[
                &["1", "a"],
                &["2", "a"],
                &["3", "a"],
                &["10", "b"],
                &["11", "b"],
                &["12", "b"],
            ],
        );
        let records = all(&ds);
        let counts = ds.label_counts(&records);
        let split = best_split_for_attribute(&ds, &records, AttributeIndex::new(0), &counts)
            .expect("should find a split");
        assert_eq!(split.candidate.rule, SplitRule::Threshold(6.5));
        assert!((split.gain - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_numeric_returns_none() {
        let ds = dataset(&["x", "label"], &[&["5", "a"], &["5", "b"], &["5", "a"]]);
        let records = all(&ds);
        let counts = ds.label_counts(&records);
        let split = best_split_for_attribute(&ds, &records, AttributeIndex::new(0), &counts);
        assert!(split.is_none());
    }

    #[test]
    fn categorical_edges_in_first_seen_order() {
        let ds = dataset(
            &["w", "label"],
            &[
                &["sunny", "no"],
                &["rainy", "yes"],
                &["overcast", "yes"],
                &["sunny", "no"],
            ],
        );
        let records = all(&ds);
        let counts = ds.label_counts(&records);
        let split =
            best_split_for_attribute(&ds, &records, AttributeIndex::new(0), &counts).unwrap();
        let names: Vec<String> = split
            .candidate
            .conditions()
            .iter()
            .map(|c| c.describe("w"))
            .collect();
        assert_eq!(names, ["w = sunny", "w = rainy", "w = overcast"]);
        assert!(split.candidate.consumes_attribute());
    }

    #[test]
    fn mixed_column_splits_by_own_value() {
        let ds = dataset(
            &["m", "label"],
            &[&["1", "a"], &["high", "b"], &["1", "a"], &["low", "b"]],
        );
        let records = all(&ds);
        let counts = ds.label_counts(&records);
        let split =
            best_split_for_attribute(&ds, &records, AttributeIndex::new(0), &counts).unwrap();
        match &split.candidate.rule {
            SplitRule::Categorical { values } => {
                assert_eq!(values[0], Cell::Numeric(1.0));
                assert_eq!(values.len(), 3);
            }
            SplitRule::Threshold(_) => panic!("mixed column must split categorically"),
        }
    }

    #[test]
    fn tie_goes_to_first_attribute() {
        // Both columns separate the labels perfectly.
        let ds = dataset(
            &["p", "q", "label"],
            &[&["x", "u", "a"], &["y", "v", "b"], &["x", "u", "a"]],
        );
        let records = all(&ds);
        let counts = ds.label_counts(&records);
        let attrs = [AttributeIndex::new(0), AttributeIndex::new(1)];
        let best = find_best_split(&ds, &records, &attrs, &counts).unwrap();
        assert_eq!(best.candidate.attribute.index(), 0);
    }

    #[test]
    fn missing_cells_go_unmatched() {
        let ds = dataset(
            &["x", "label"],
            &[&["1", "a"], &["", "a"], &["9", "b"]],
        );
        let records = all(&ds);
        let candidate = SplitCandidate {
            attribute: AttributeIndex::new(0),
            rule: SplitRule::Threshold(5.0),
        };
        let partition = candidate.partition(&ds, &records);
        assert_eq!(partition.groups, vec![vec![0], vec![2]]);
        assert_eq!(partition.unmatched, vec![1]);
    }

    #[test]
    fn scan_gain_matches_partition_gain() {
        let ds = dataset(
            &["x", "label"],
            &[
                &["1", "a"],
                &["2", "b"],
                &["", "a"],
                &["4", "b"],
                &["5", "b"],
                &["6", "a"],
            ],
        );
        let records = all(&ds);
        let counts = ds.label_counts(&records);
        let split =
            best_split_for_attribute(&ds, &records, AttributeIndex::new(0), &counts).unwrap();
        let recomputed = information_gain(&ds, &records, &split.candidate);
        assert!((split.gain - recomputed).abs() < 1e-12);
    }
}
