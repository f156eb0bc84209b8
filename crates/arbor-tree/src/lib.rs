//! Decision tree induction: normalize, split by information gain, evaluate.
//!
//! Provides an ID3-style classifier over mixed numeric/categorical tables
//! with two pre-pruning rules (maximum depth and minimum information
//! gain), fallback prediction for unseen values, a training-set confusion
//! matrix, and a renderer-neutral display tree.

mod cell;
mod config;
mod confusion;
mod dataset;
mod display;
mod entropy;
mod error;
mod node;
mod raw;
mod result;
mod split;
mod tree;

pub use cell::Cell;
pub use config::TreeConfig;
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use dataset::Dataset;
pub use display::{DisplayAttributes, DisplayNode};
pub use entropy::{entropy, entropy_of_counts, information_gain};
pub use error::{ErrorKind, TreeError};
pub use node::{AttributeIndex, Condition, Edge, Entropy, LabelIndex, Node, NodeIndex};
pub use raw::{RawDataset, RawRow, RawValue};
pub use result::{InductionMetadata, InductionResult};
pub use split::{SplitCandidate, SplitRule};
pub use tree::DecisionTree;
