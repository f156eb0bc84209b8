//! JSON result writer for induction outputs.

use std::fs;
use std::path::{Path, PathBuf};

use arbor_tree::{ClassMetrics, DisplayNode, InductionMetadata, InductionResult};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes the display tree and the training evaluation to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_tree.json` and
/// `{experiment}_evaluation.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Return the path of the tree artifact.
    #[must_use]
    pub fn tree_path(&self) -> PathBuf {
        self.output_dir.join(self.experiment.artifact("tree"))
    }

    /// Return the path of the evaluation artifact.
    #[must_use]
    pub fn evaluation_path(&self) -> PathBuf {
        self.output_dir.join(self.experiment.artifact("evaluation"))
    }

    /// Write the display tree to `{experiment}_tree.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`] on failure.
    #[instrument(skip_all)]
    pub fn write_tree(&self, tree: &DisplayNode) -> Result<(), IoError> {
        let path = self.tree_path();
        let artifact = TreeArtifact {
            experiment: self.experiment.as_str(),
            tree,
        };
        write_json(&path, &artifact)?;
        info!(path = %path.display(), "tree written");
        Ok(())
    }

    /// Write the training-set evaluation to `{experiment}_evaluation.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`] on failure.
    #[instrument(skip_all)]
    pub fn write_evaluation(&self, result: &InductionResult) -> Result<(), IoError> {
        let path = self.evaluation_path();
        let cm = result.confusion_matrix();
        let artifact = EvaluationArtifact {
            experiment: self.experiment.as_str(),
            labels: cm.labels(),
            confusion_matrix: cm.as_rows(),
            accuracy: cm.accuracy(),
            class_metrics: cm.class_metrics(),
            tree: result.metadata(),
        };
        write_json(&path, &artifact)?;
        info!(path = %path.display(), accuracy = cm.accuracy(), "evaluation written");
        Ok(())
    }
}

fn write_json<T: Serialize>(path: &Path, artifact: &T) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct TreeArtifact<'a> {
    experiment: &'a str,
    tree: &'a DisplayNode,
}

#[derive(Serialize)]
struct EvaluationArtifact<'a> {
    experiment: &'a str,
    labels: &'a [String],
    confusion_matrix: &'a [Vec<usize>],
    accuracy: f64,
    class_metrics: Vec<ClassMetrics>,
    tree: InductionMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_tree::{RawDataset, RawRow, TreeConfig};
    use tempfile::TempDir;

    fn fitted() -> InductionResult {
        let raw = RawDataset::new(
            vec!["weather".into(), "play".into()],
            vec![
                RawRow::new().with("weather", "sunny").with("play", "no"),
                RawRow::new().with("weather", "rainy").with("play", "yes"),
                RawRow::new().with("weather", "rainy").with("play", "yes"),
                RawRow::new().with("weather", "sunny").with("play", "no"),
            ],
        );
        TreeConfig::new("play").fit(&raw).unwrap()
    }

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn write_tree_json_structure() {
        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path(), ExperimentName::new("t1").unwrap()).unwrap();
        writer.write_tree(&fitted().display_tree()).unwrap();

        let path = dir.path().join("t1_tree.json");
        assert_eq!(writer.tree_path(), path);
        let content = read_json(&path);
        assert_eq!(content["experiment"], "t1");
        assert_eq!(content["tree"]["name"], "weather");
        let children = content["tree"]["children"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0]["name"], "no");
        assert_eq!(children[0]["attributes"]["condition"], "weather = sunny");
        assert_eq!(children[0]["attributes"]["count"], 2);
        assert!(children[0].get("children").is_none());
    }

    #[test]
    fn write_evaluation_json_structure() {
        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path(), ExperimentName::new("e1").unwrap()).unwrap();
        writer.write_evaluation(&fitted()).unwrap();

        let content = read_json(&dir.path().join("e1_evaluation.json"));
        assert_eq!(content["experiment"], "e1");
        assert_eq!(content["labels"], serde_json::json!(["no", "yes"]));
        let matrix = serde_json::json!([[2, 0], [0, 2]]);
        assert_eq!(content["confusion_matrix"], matrix);
        assert_eq!(content["accuracy"], 1.0);
        let metrics = content["class_metrics"].as_array().unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[1]["label"], "yes");
        assert_eq!(metrics[1]["support"], 2);
        assert_eq!(content["tree"]["n_nodes"], 3);
        assert_eq!(content["tree"]["depth"], 1);
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("deep");
        let writer = ResultWriter::new(&nested, ExperimentName::new("n1").unwrap()).unwrap();
        writer.write_tree(&fitted().display_tree()).unwrap();
        assert!(nested.join("n1_tree.json").exists());
    }

    #[test]
    fn output_dir_blocked_by_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = ResultWriter::new(&blocker.join("sub"), ExperimentName::new("b").unwrap())
            .err()
            .unwrap();
        assert!(matches!(err, IoError::OutputDirCreate { .. }));
    }
}
