//! Conversion of a fitted tree into a generic display shape.
//!
//! The output mirrors what hierarchical tree renderers commonly accept:
//! a `name`, an optional `attributes` map, and ordered `children`.

use std::fmt;

use crate::node::{Node, NodeIndex};
use crate::tree::DecisionTree;

/// Annotations attached to a display node.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DisplayAttributes {
    /// Edge condition leading into this node; absent on the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Number of training records at a leaf; absent on branches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl DisplayAttributes {
    fn is_empty(&self) -> bool {
        self.condition.is_none() && self.count.is_none()
    }
}

/// A labeled node with ordered children, ready for rendering.
///
/// Leaves are named by their predicted label, branches by their splitting
/// attribute.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DisplayNode {
    /// Label (leaf) or attribute name (branch).
    pub name: String,
    /// Edge condition and leaf count.
    #[serde(default, skip_serializing_if = "DisplayAttributes::is_empty")]
    pub attributes: DisplayAttributes,
    /// Children in edge order; empty for leaves.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DisplayNode>,
}

impl DecisionTree {
    /// Convert the tree into its display shape, preserving edge order.
    #[must_use]
    pub fn to_display_tree(&self) -> DisplayNode {
        self.display_node(NodeIndex::new(0), None)
    }

    fn display_node(&self, index: NodeIndex, condition: Option<String>) -> DisplayNode {
        match self.node(index) {
            Node::Leaf {
                label, n_samples, ..
            } => DisplayNode {
                name: self.label_name(*label).to_string(),
                attributes: DisplayAttributes {
                    condition,
                    count: Some(*n_samples),
                },
                children: Vec::new(),
            },
            Node::Branch {
                attribute, edges, ..
            } => {
                let name = self.attribute_name(*attribute);
                DisplayNode {
                    name: name.to_string(),
                    attributes: DisplayAttributes {
                        condition,
                        count: None,
                    },
                    children: edges
                        .iter()
                        .map(|e| {
                            let condition = e.condition.describe(name);
                            self.display_node(e.child, Some(condition))
                        })
                        .collect(),
                }
            }
        }
    }
}

impl DisplayNode {
    fn write_outline(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}", "", indent = depth * 2)?;
        if let Some(condition) = &self.attributes.condition {
            write!(f, "[{condition}] ")?;
        }
        match self.attributes.count {
            Some(count) => writeln!(f, "{} ({count})", self.name)?,
            None => writeln!(f, "{}", self.name)?,
        }
        for child in &self.children {
            child.write_outline(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented outline, one node per line.
impl fmt::Display for DisplayNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_outline(f, 0)
    }
}
