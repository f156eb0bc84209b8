use std::fmt;

use crate::cell::Cell;

/// Zero-based position of a retained attribute in the dataset's attribute list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct AttributeIndex(usize);

impl AttributeIndex {
    /// Create a new attribute index from a zero-based column position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based attribute position.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AttributeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-based position of a label in first-seen order.
///
/// The ordering of label indices is the canonical label ordering used for
/// every majority-vote tie-break.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct LabelIndex(usize);

impl LabelIndex {
    /// Create a new label index from its first-seen position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based label position.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LabelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shannon entropy of a label distribution, in bits.
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd,
    serde::Serialize, serde::Deserialize,
)]
pub struct Entropy(f64);

impl Entropy {
    /// Create a new entropy value.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw entropy value in bits.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// The matching condition on an outgoing branch edge.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Condition {
    /// Matches cells equal to the given value (categorical splits).
    Equals(Cell),
    /// Matches numeric cells `<= threshold`.
    AtMost(f64),
    /// Matches numeric cells `> threshold`.
    Above(f64),
}

impl Condition {
    /// Return `true` if `cell` satisfies this condition.
    ///
    /// Missing cells never match. Numeric conditions never match a
    /// categorical cell and vice versa.
    #[must_use]
    pub fn matches(&self, cell: &Cell) -> bool {
        match (self, cell) {
            (_, Cell::Missing) => false,
            (Condition::Equals(expected), actual) => expected == actual,
            (Condition::AtMost(t), Cell::Numeric(v)) => v <= t,
            (Condition::Above(t), Cell::Numeric(v)) => v > t,
            (Condition::AtMost(_) | Condition::Above(_), Cell::Categorical(_)) => false,
        }
    }

    /// Render the condition against a named attribute, e.g. `temp <= 77.5`.
    #[must_use]
    pub fn describe(&self, attribute: &str) -> String {
        match self {
            Condition::Equals(value) => format!("{attribute} = {value}"),
            Condition::AtMost(t) => format!("{attribute} <= {t}"),
            Condition::Above(t) => format!("{attribute} > {t}"),
        }
    }
}

/// An outgoing edge of a branch node.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Edge {
    /// Condition a record must satisfy to follow this edge.
    pub condition: Condition,
    /// Child reached through this edge.
    pub child: NodeIndex,
}

/// A node in a decision tree arena.
///
/// Trees are stored as `Vec<Node>` where children are referenced by
/// [`NodeIndex`] rather than pointers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// An interior split node.
    Branch {
        /// Attribute the records are partitioned on.
        attribute: AttributeIndex,
        /// Outgoing edges in deterministic order, one per non-empty partition.
        edges: Vec<Edge>,
        /// Label predicted when a record matches no edge.
        fallback: LabelIndex,
        /// Entropy of the records that reached this node.
        entropy: Entropy,
        /// Information gain achieved by this split, in bits.
        information_gain: f64,
        /// Number of training records that reached this node.
        n_samples: usize,
    },
    /// A terminal leaf node.
    Leaf {
        /// Predicted label (majority of the records that reached the leaf).
        label: LabelIndex,
        /// Entropy of the records that reached this leaf.
        entropy: Entropy,
        /// Number of training records that reached this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Return the entropy of the records that reached this node.
    #[must_use]
    pub fn entropy(&self) -> Entropy {
        match self {
            Node::Branch { entropy, .. } | Node::Leaf { entropy, .. } => *entropy,
        }
    }

    /// Return the number of training records that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Branch { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
