use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, instrument};

use crate::{
    TreeError,
    cell::Cell,
    config::TreeConfig,
    dataset::Dataset,
    entropy::entropy_of_counts,
    node::{AttributeIndex, Edge, Entropy, LabelIndex, Node, NodeIndex},
    raw::RawRow,
    split::find_best_split,
};

/// A fitted information-gain decision tree.
///
/// Stored as an arena-based `Vec<Node>` with the root at index 0. The tree
/// carries the attribute and label names it was built with, so it can
/// predict and render without the training [`Dataset`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) attributes: Vec<String>,
    pub(crate) label_names: Vec<String>,
}

/// Builder state shared across one induction run.
struct Builder<'a> {
    dataset: &'a Dataset,
    max_depth: usize,
    entropy_threshold: f64,
    arena: Vec<Node>,
}

/// A subtree waiting to be grown into a reserved arena slot.
struct Pending {
    slot: usize,
    records: Vec<usize>,
    attributes: Vec<AttributeIndex>,
    depth: usize,
}

/// Label with the highest count; ties go to the lowest label index.
fn majority(counts: &[usize]) -> LabelIndex {
    let mut best = 0usize;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    LabelIndex::new(best)
}

/// Stand-in for a node whose slot is reserved but not yet grown.
fn placeholder() -> Node {
    Node::Leaf {
        label: LabelIndex::new(0),
        entropy: Entropy::new(0.0),
        n_samples: 0,
    }
}

impl Builder<'_> {
    /// Grow the whole tree from `records` into the arena, root at index 0.
    ///
    /// Uses an explicit worklist: numeric attributes may be re-split, so the
    /// depth of a tree is bounded only by the record count and `max_depth`.
    fn grow(
        &mut self,
        records: Vec<usize>,
        attributes: Vec<AttributeIndex>,
    ) -> Result<(), TreeError> {
        self.arena.clear();
        self.arena.push(placeholder());

        let mut pending = vec![Pending {
            slot: 0,
            records,
            attributes,
            depth: 0,
        }];
        while let Some(task) = pending.pop() {
            self.expand(task, &mut pending)?;
        }

        self.resolve_fallbacks();
        Ok(())
    }

    /// Fill one reserved slot with a leaf or a branch. A branch reserves one
    /// slot per non-empty child group and queues the children.
    fn expand(&mut self, task: Pending, pending: &mut Vec<Pending>) -> Result<(), TreeError> {
        let Pending {
            slot,
            records,
            attributes,
            depth,
        } = task;
        if records.is_empty() {
            return Err(TreeError::EmptyPartition { depth });
        }

        let n_samples = records.len();
        let counts = self.dataset.label_counts(&records);
        let entropy = entropy_of_counts(&counts);
        let leaf = Node::Leaf {
            label: majority(&counts),
            entropy,
            n_samples,
        };

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if pure || attributes.is_empty() || depth >= self.max_depth {
            self.arena[slot] = leaf;
            return Ok(());
        }

        let Some(best) = find_best_split(self.dataset, &records, &attributes, &counts) else {
            debug!(depth, n_samples, "no attribute can split, making leaf");
            self.arena[slot] = leaf;
            return Ok(());
        };

        if best.gain < self.entropy_threshold {
            debug!(
                depth,
                n_samples,
                gain = best.gain,
                threshold = self.entropy_threshold,
                "best gain below threshold, making leaf"
            );
            self.arena[slot] = leaf;
            return Ok(());
        }

        let attribute = best.candidate.attribute;
        debug!(
            depth,
            n_samples,
            attribute = %self.dataset.attribute_name(attribute),
            gain = best.gain,
            "splitting"
        );

        let child_attributes: Vec<AttributeIndex> = if best.candidate.consumes_attribute() {
            attributes.into_iter().filter(|&a| a != attribute).collect()
        } else {
            attributes
        };

        let partition = best.candidate.partition(self.dataset, &records);
        let conditions = best.candidate.conditions();

        let mut edges = Vec::with_capacity(conditions.len());
        let mut children = Vec::with_capacity(conditions.len());
        for (condition, group) in conditions.into_iter().zip(partition.groups) {
            if group.is_empty() {
                continue;
            }
            let child = self.arena.len();
            self.arena.push(placeholder());
            edges.push(Edge {
                condition,
                child: NodeIndex::new(child),
            });
            children.push(Pending {
                slot: child,
                records: group,
                attributes: child_attributes.clone(),
                depth: depth + 1,
            });
        }

        if edges.is_empty() {
            self.arena[slot] = leaf;
            return Ok(());
        }

        // The fallback is provisional until every descendant leaf exists.
        self.arena[slot] = Node::Branch {
            attribute,
            edges,
            fallback: majority(&counts),
            entropy,
            information_gain: best.gain,
            n_samples,
        };

        // Reversed so the first edge is grown first.
        pending.extend(children.into_iter().rev());
        Ok(())
    }

    /// Set each branch's fallback to the majority over its descendant
    /// leaves, weighted by leaf counts.
    ///
    /// Children always sit at higher arena indices than their parent, so a
    /// single reverse sweep sees every child tally before its parent.
    fn resolve_fallbacks(&mut self) {
        let n_labels = self.dataset.n_labels();
        let mut tallies: Vec<Vec<usize>> = vec![Vec::new(); self.arena.len()];

        for idx in (0..self.arena.len()).rev() {
            let mut tally = vec![0usize; n_labels];
            match &mut self.arena[idx] {
                Node::Leaf {
                    label, n_samples, ..
                } => tally[label.index()] = *n_samples,
                Node::Branch {
                    edges, fallback, ..
                } => {
                    for edge in edges.iter() {
                        let child = std::mem::take(&mut tallies[edge.child.index()]);
                        for (total, c) in tally.iter_mut().zip(child) {
                            *total += c;
                        }
                    }
                    *fallback = majority(&tally);
                }
            }
            tallies[idx] = tally;
        }
    }
}

impl DecisionTree {
    /// Induce a tree from a normalized dataset.
    ///
    /// Grows from the root at depth 0. A node becomes a leaf when its
    /// records share one label, no attributes remain, the depth limit is
    /// reached, no attribute can split, or the best information gain is
    /// below the configured threshold.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::InvalidMaxDepth`] | `max_depth` is zero |
    /// | [`TreeError::InvalidEntropyThreshold`] | threshold negative or non-finite |
    /// | [`TreeError::DecisionAttributeSkipped`] | decision attribute also skipped |
    #[instrument(
        skip_all,
        fields(
            n_records = dataset.n_records(),
            n_attributes = dataset.n_attributes()
        )
    )]
    pub fn build(dataset: &Dataset, config: &TreeConfig) -> Result<Self, TreeError> {
        config.validate()?;

        let records: Vec<usize> = (0..dataset.n_records()).collect();
        let attributes: Vec<AttributeIndex> =
            (0..dataset.n_attributes()).map(AttributeIndex::new).collect();

        let mut builder = Builder {
            dataset,
            max_depth: config.max_depth,
            entropy_threshold: config.entropy_threshold,
            arena: Vec::new(),
        };
        builder.grow(records, attributes)?;

        debug!(n_nodes = builder.arena.len(), "decision tree built");

        Ok(Self {
            nodes: builder.arena,
            attributes: dataset.attributes().to_vec(),
            label_names: dataset.label_names().to_vec(),
        })
    }

    /// Predict the label of one row of cells aligned with [`DecisionTree::attributes`].
    ///
    /// Never fails: when a row's value matches no edge of a branch (unseen
    /// value, missing value, or a row too short to hold the attribute) the
    /// branch's fallback label is returned.
    #[must_use]
    pub fn predict(&self, row: &[Cell]) -> LabelIndex {
        let missing = Cell::Missing;
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { label, .. } => return *label,
                Node::Branch {
                    attribute,
                    edges,
                    fallback,
                    ..
                } => {
                    let cell = row.get(attribute.index()).unwrap_or(&missing);
                    match edges.iter().find(|e| e.condition.matches(cell)) {
                        Some(edge) => idx = edge.child.index(),
                        None => return *fallback,
                    }
                }
            }
        }
    }

    /// Predict and return the label name.
    #[must_use]
    pub fn predict_label(&self, row: &[Cell]) -> &str {
        self.label_name(self.predict(row))
    }

    /// Predict the label of a raw row keyed by attribute name.
    ///
    /// Fields are normalized the same way as during training; attributes
    /// absent from the row are treated as missing.
    #[must_use]
    pub fn predict_raw(&self, row: &RawRow) -> &str {
        let cells: Vec<Cell> = self
            .attributes
            .iter()
            .map(|a| row.get(a).map_or(Cell::Missing, Cell::from_raw))
            .collect();
        self.predict_label(&cells)
    }

    /// Predict labels for a batch of rows in parallel, preserving order.
    #[must_use]
    pub fn predict_batch(&self, rows: &[Vec<Cell>]) -> Vec<LabelIndex> {
        rows.par_iter().map(|row| self.predict(row)).collect()
    }

    /// Return the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Return the node at `index`.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.index()]
    }

    /// Return all nodes in arena order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the attribute names the tree was built over.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Return the name of an attribute.
    #[must_use]
    pub fn attribute_name(&self, attribute: AttributeIndex) -> &str {
        &self.attributes[attribute.index()]
    }

    /// Return the labels in canonical (first-seen) order.
    #[must_use]
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Return the name of a label.
    #[must_use]
    pub fn label_name(&self, label: LabelIndex) -> &str {
        &self.label_names[label.index()]
    }

    /// Return the total number of nodes in the tree (both branches and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    /// Uses an iterative BFS approach.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((0usize, 0usize));

        while let Some((node_idx, d)) = queue.pop_front() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Branch { edges, .. } => {
                    for edge in edges {
                        queue.push_back((edge.child.index(), d + 1));
                    }
                }
            }
        }

        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawDataset;

    fn weather_raw() -> RawDataset {
        let rows = [
            ("sunny", 85.0, "no"),
            ("rainy", 65.0, "yes"),
            ("rainy", 70.0, "yes"),
            ("sunny", 90.0, "no"),
        ]
        .into_iter()
        .map(|(w, t, p)| {
            RawRow::new()
                .with("weather", w)
                .with("temp", t)
                .with("play", p)
        })
        .collect();
        RawDataset::new(
            vec!["weather".into(), "temp".into(), "play".into()],
            rows,
        )
    }

    fn fit(raw: &RawDataset, config: &TreeConfig) -> (Dataset, DecisionTree) {
        let ds = Dataset::normalize(raw, config).unwrap();
        let tree = DecisionTree::build(&ds, config).unwrap();
        (ds, tree)
    }

    #[test]
    fn weather_splits_on_weather() {
        let config = TreeConfig::new("play")
            .with_max_depth(3)
            .with_entropy_threshold(0.05);
        let (ds, tree) = fit(&weather_raw(), &config);

        match tree.root() {
            Node::Branch {
                attribute,
                edges,
                information_gain,
                ..
            } => {
                assert_eq!(tree.attribute_name(*attribute), "weather");
                assert!((information_gain - 1.0).abs() < 1e-12);
                assert_eq!(edges.len(), 2);
                let leaves: Vec<&str> = edges
                    .iter()
                    .map(|e| match tree.node(e.child) {
                        Node::Leaf { label, .. } => tree.label_name(*label),
                        Node::Branch { .. } => panic!("expected leaf"),
                    })
                    .collect();
                assert_eq!(leaves, ["no", "yes"]);
            }
            Node::Leaf { .. } => panic!("expected a branch at the root"),
        }

        for (row, label) in ds.rows().iter().zip(ds.labels()) {
            assert_eq!(tree.predict(row), *label);
        }
    }

    #[test]
    fn single_row_is_single_leaf() {
        let raw = RawDataset::new(
            vec!["x".into(), "y".into()],
            vec![RawRow::new().with("x", "a").with("y", "only")],
        );
        let (_, tree) = fit(&raw, &TreeConfig::new("y"));
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.root().n_samples(), 1);
        assert_eq!(tree.root().entropy().value(), 0.0);
    }

    #[test]
    fn high_threshold_yields_root_leaf() {
        let config = TreeConfig::new("play")
            .with_max_depth(10)
            .with_entropy_threshold(1.5);
        let (_, tree) = fit(&weather_raw(), &config);
        assert_eq!(tree.n_nodes(), 1);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().n_samples(), 4);
    }

    #[test]
    fn majority_tie_prefers_first_seen_label() {
        let raw = RawDataset::new(
            vec!["x".into(), "y".into()],
            vec![
                RawRow::new().with("x", "a").with("y", "late"),
                RawRow::new().with("x", "a").with("y", "early"),
            ],
        );
        // x is constant so no split exists; the leaf must vote "late".
        let (_, tree) = fit(&raw, &TreeConfig::new("y").with_entropy_threshold(0.0));
        assert!(tree.root().is_leaf());
        assert_eq!(tree.predict_label(&[Cell::Categorical("a".into())]), "late");
    }

    #[test]
    fn numeric_attribute_can_split_twice() {
        // Labels alternate in bands: a | b | a along x.
        let xs = [1.0, 2.0, 5.0, 6.0, 9.0, 10.0];
        let ys = ["a", "a", "b", "b", "a", "a"];
        let rows = xs
            .into_iter()
            .zip(ys)
            .map(|(x, y)| RawRow::new().with("x", x).with("y", y))
            .collect();
        let raw = RawDataset::new(vec!["x".into(), "y".into()], rows);
        let config = TreeConfig::new("y").with_entropy_threshold(0.0);
        let (ds, tree) = fit(&raw, &config);
        assert!(tree.depth() >= 2);
        for (row, label) in ds.rows().iter().zip(ds.labels()) {
            assert_eq!(tree.predict(row), *label);
        }
    }

    #[test]
    fn max_depth_limits_tree() {
        // XOR over two categorical attributes needs depth 2.
        let rows = [
            ("0", "0", "f"),
            ("0", "1", "t"),
            ("1", "0", "t"),
            ("1", "1", "f"),
        ]
        .into_iter()
        .map(|(a, b, y)| {
            RawRow::new()
                .with("a", format!("v{a}"))
                .with("b", format!("v{b}"))
                .with("y", y)
        })
        .collect();
        let raw = RawDataset::new(vec!["a".into(), "b".into(), "y".into()], rows);
        let config = TreeConfig::new("y").with_entropy_threshold(0.0);
        let (_, shallow) = fit(&raw, &config.clone().with_max_depth(1));
        assert!(shallow.depth() <= 1);
        let (_, deep) = fit(&raw, &config.with_max_depth(2));
        assert_eq!(deep.depth(), 2);
    }

    #[test]
    fn unseen_value_uses_fallback() {
        let config = TreeConfig::new("play").with_skip_attributes(["temp"]);
        let (_, tree) = fit(&weather_raw(), &config);
        let Node::Branch { fallback, .. } = tree.root() else {
            panic!("expected a branch at the root");
        };
        let predicted = tree.predict(&[Cell::Categorical("foggy".into())]);
        assert_eq!(predicted, *fallback);
        assert_eq!(tree.predict(&[Cell::Missing]), *fallback);
        assert_eq!(tree.predict(&[]), *fallback);
    }

    #[test]
    fn fallback_weighs_leaf_counts() {
        let ws = ["r", "s", "s", "r", "s"];
        let ps = ["yes", "no", "no", "yes", "no"];
        let rows = ws
            .into_iter()
            .zip(ps)
            .map(|(w, p)| RawRow::new().with("w", w).with("p", p))
            .collect();
        let raw = RawDataset::new(vec!["w".into(), "p".into()], rows);
        let (_, tree) = fit(&raw, &TreeConfig::new("p"));
        let Node::Branch { fallback, .. } = tree.root() else {
            panic!("expected a branch at the root");
        };
        assert_eq!(tree.label_name(*fallback), "no");
    }

    #[test]
    fn predict_raw_normalizes_fields() {
        let config = TreeConfig::new("play")
            .with_max_depth(3)
            .with_entropy_threshold(0.05);
        let (_, tree) = fit(&weather_raw(), &config);
        let row = RawRow::new().with("weather", " rainy ").with("temp", "99");
        assert_eq!(tree.predict_raw(&row), "yes");
    }

    #[test]
    fn predict_batch_preserves_order() {
        let config = TreeConfig::new("play");
        let (ds, tree) = fit(&weather_raw(), &config);
        let batch = tree.predict_batch(ds.rows());
        let serial: Vec<LabelIndex> = ds.rows().iter().map(|r| tree.predict(r)).collect();
        assert_eq!(batch, serial);
    }

    #[test]
    fn deterministic_structure() {
        let config = TreeConfig::new("play").with_entropy_threshold(0.0);
        let (_, a) = fit(&weather_raw(), &config);
        let (_, b) = fit(&weather_raw(), &config);
        assert_eq!(a, b);
    }

    #[test]
    fn deep_numeric_chain_builds_without_overflow() {
        // Alternating labels along one numeric column force one re-split
        // per record, so depth grows with the row count.
        let n = 5000;
        let rows = (0..n)
            .map(|i| {
                let label = if i % 2 == 0 { "a" } else { "b" };
                RawRow::new().with("x", i as f64).with("y", label)
            })
            .collect();
        let raw = RawDataset::new(vec!["x".into(), "y".into()], rows);
        let config = TreeConfig::new("y")
            .with_max_depth(1_000_000)
            .with_entropy_threshold(0.0);
        let result = config.fit(&raw).unwrap();

        let tree = result.tree();
        assert!(tree.depth() >= 1000, "depth {}", tree.depth());
        assert_eq!(tree.n_nodes(), 2 * tree.n_leaves() - 1);
        assert!((result.accuracy() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn branch_children_follow_parent_in_arena() {
        let config = TreeConfig::new("y").with_entropy_threshold(0.0);
        let rows = [(1.0, "a"), (2.0, "b"), (3.0, "a"), (4.0, "b")]
            .into_iter()
            .map(|(x, y)| RawRow::new().with("x", x).with("y", y))
            .collect();
        let raw = RawDataset::new(vec!["x".into(), "y".into()], rows);
        let (_, tree) = fit(&raw, &config);
        for (idx, node) in tree.nodes().iter().enumerate() {
            if let Node::Branch { edges, .. } = node {
                assert!(edges.iter().all(|e| e.child.index() > idx));
            }
        }
        assert!(tree.nodes().iter().all(|n| n.n_samples() > 0));
    }
}
