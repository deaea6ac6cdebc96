//! JSON result writer for hold-out evaluations.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::DataError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, DataError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DataError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the rows were partitioned.
#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary<'a> {
    pub target: &'a str,
    pub test_fraction: f64,
    pub seed: u64,
    pub n_train: usize,
    pub n_test: usize,
    pub feature_names: &'a [String],
}

/// Precision, recall, F1 and support of one class or average.
#[derive(Debug, Clone, Serialize)]
pub struct MetricRow<'a> {
    pub name: &'a str,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// A feature with its importance score and 1-based rank.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureRow<'a> {
    pub name: &'a str,
    pub importance: f64,
    pub rank: usize,
}

/// Hold-out results of one model.
///
/// Plain numbers only; the writer has no dependency on `loanfit-rf`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetrics<'a> {
    pub model: &'a str,
    pub accuracy: f64,
    pub classes: Vec<MetricRow<'a>>,
    pub macro_avg: MetricRow<'a>,
    pub weighted_avg: MetricRow<'a>,
    /// `confusion_matrix[true][predicted]`.
    pub confusion_matrix: &'a [Vec<usize>],
    pub feature_importances: Vec<FeatureRow<'a>>,
}

#[derive(Serialize)]
struct EvaluateArtifact<'a> {
    experiment: &'a str,
    split: &'a SplitSummary<'a>,
    models: &'a [ModelMetrics<'a>],
}

/// Writes evaluation results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_evaluate.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, DataError> {
        fs::create_dir_all(output_dir).map_err(|e| DataError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write the split and every model's metrics to `{experiment}_evaluate.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::Serialize`] | The artifact cannot be encoded |
    /// | [`DataError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all)]
    pub fn write_evaluation(
        &self,
        split: &SplitSummary<'_>,
        models: &[ModelMetrics<'_>],
    ) -> Result<PathBuf, DataError> {
        let path = self
            .output_dir
            .join(format!("{}_evaluate.json", self.experiment.as_str()));

        let artifact = EvaluateArtifact {
            experiment: self.experiment.as_str(),
            split,
            models,
        };

        let json = serde_json::to_string_pretty(&artifact)?;
        fs::write(&path, &json).map_err(|e| DataError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), n_models = models.len(), "evaluation result written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(name: &str, value: f64, support: usize) -> MetricRow<'_> {
        MetricRow {
            name,
            precision: value,
            recall: value,
            f1: value,
            support,
        }
    }

    #[test]
    fn experiment_name_valid() {
        let name = ExperimentName::new("loans-2010_a".to_string()).unwrap();
        assert_eq!(name.as_str(), "loans-2010_a");
        assert_eq!(name.to_string(), "loans-2010_a");
    }

    #[test]
    fn experiment_name_rejects_empty_and_special_chars() {
        for bad in ["", "my experiment!", "../escape"] {
            assert!(matches!(
                ExperimentName::new(bad.to_string()),
                Err(DataError::InvalidExperimentName { .. })
            ));
        }
    }

    #[test]
    fn writes_split_and_models() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/results");
        let writer =
            ResultWriter::new(&out, ExperimentName::new("exp1".to_string()).unwrap()).unwrap();

        let names = vec!["fico".to_string(), "int.rate".to_string()];
        let split = SplitSummary {
            target: "not.fully.paid",
            test_fraction: 0.3,
            seed: 42,
            n_train: 7,
            n_test: 3,
            feature_names: &names,
        };
        let matrix = vec![vec![2, 0], vec![1, 0]];
        let model = ModelMetrics {
            model: "decision_tree",
            accuracy: 2.0 / 3.0,
            classes: vec![metric("0", 0.667, 2), metric("1", 0.0, 1)],
            macro_avg: metric("macro avg", 0.333, 3),
            weighted_avg: metric("weighted avg", 0.444, 3),
            confusion_matrix: &matrix,
            feature_importances: vec![
                FeatureRow {
                    name: "fico",
                    importance: 0.7,
                    rank: 1,
                },
                FeatureRow {
                    name: "int.rate",
                    importance: 0.3,
                    rank: 2,
                },
            ],
        };

        let path = writer.write_evaluation(&split, &[model]).unwrap();
        assert_eq!(path, out.join("exp1_evaluate.json"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["experiment"], "exp1");
        assert_eq!(json["split"]["seed"], 42);
        assert_eq!(json["split"]["feature_names"][1], "int.rate");
        assert_eq!(json["models"][0]["model"], "decision_tree");
        assert_eq!(json["models"][0]["confusion_matrix"][1][0], 1);
        assert_eq!(json["models"][0]["classes"][1]["support"], 1);
        assert_eq!(json["models"][0]["feature_importances"][0]["name"], "fico");
    }

    #[test]
    fn unwritable_directory_is_reported() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ResultWriter::new(
            &file.path().join("sub"),
            ExperimentName::new("x".to_string()).unwrap(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, DataError::OutputDirCreate { .. }));
    }
}
