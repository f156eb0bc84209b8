//! Shannon entropy and information gain over label distributions.

use crate::dataset::Dataset;
use crate::node::Entropy;
use crate::split::SplitCandidate;

/// Entropy, in bits, of a label distribution given as per-label counts.
///
/// `H = -Σ p_i · log2(p_i)` summed only over labels with a non-zero count,
/// so `0 · log2(0)` contributes exactly zero. An empty distribution has
/// entropy zero.
#[must_use]
pub fn entropy_of_counts(label_counts: &[usize]) -> Entropy {
    let n: usize = label_counts.iter().sum();
    if n == 0 {
        return Entropy::new(0.0);
    }
    let n = n as f64;
    let value = -label_counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * p.log2()
        })
        .sum::<f64>();
    // A single-label distribution evaluates to -0.0.
    Entropy::new(value.max(0.0))
}

/// Entropy of the labels of `records` in `dataset`.
#[must_use]
pub fn entropy(dataset: &Dataset, records: &[usize]) -> Entropy {
    entropy_of_counts(&dataset.label_counts(records))
}

/// Parent entropy minus the size-weighted entropy of the groups.
///
/// `groups` must partition the parent: their counts sum to `parent_counts`.
/// The result is clamped at zero to absorb rounding.
pub(crate) fn gain_from_groups<'a>(
    parent_counts: &[usize],
    groups: impl IntoIterator<Item = &'a [usize]>,
) -> f64 {
    let n: usize = parent_counts.iter().sum();
    if n == 0 {
        return 0.0;
    }
    let parent = entropy_of_counts(parent_counts).value();
    let weighted: f64 = groups
        .into_iter()
        .map(|counts| {
            let size: usize = counts.iter().sum();
            size as f64 / n as f64 * entropy_of_counts(counts).value()
        })
        .sum();
    (parent - weighted).max(0.0)
}

/// Information gain, in bits, of partitioning `records` by `candidate`.
///
/// Records matching no edge of the candidate (missing values) form one
/// extra group in the weighted child entropy.
#[must_use]
pub fn information_gain(dataset: &Dataset, records: &[usize], candidate: &SplitCandidate) -> f64 {
    let partition = candidate.partition(dataset, records);
    let parent_counts = dataset.label_counts(records);
    let group_counts: Vec<Vec<usize>> = partition
        .groups
        .iter()
        .chain(std::iter::once(&partition.unmatched))
        .map(|g| dataset.label_counts(g))
        .collect();
    gain_from_groups(&parent_counts, group_counts.iter().map(Vec::as_slice))
}
