//! Model artifact formats and loading for verdict.
//!
//! An artifact is a JSON document tagged by `kind`:
//!
//! ```json
//! {
//!   "kind": "random_forest",
//!   "n_features": 2,
//!   "classes": [0, 1],
//!   "trees": [{ "nodes": [
//!     { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
//!     { "value": [10, 0] },
//!     { "value": [0, 10] }
//!   ]}]
//! }
//! ```
//!
//! Artifacts are validated on load so that inference never has to deal
//! with dangling node references or mis-shaped leaves.

mod forest;
mod linear;
mod tree;

pub use forest::RandomForest;
pub use linear::LinearModel;
pub use tree::{DecisionTree, Tree, TreeNode};

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use verdict_core::{ClassLabel, Classifier, ModelError};

/// Every supported artifact format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    Linear(LinearModel),
}

impl ModelArtifact {
    /// Parses and validates an artifact from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_str(content)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Reads, parses and validates an artifact file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelArtifact::DecisionTree(m) => m.validate(),
            ModelArtifact::RandomForest(m) => m.validate(),
            ModelArtifact::Linear(m) => m.validate(),
        }
    }

    /// Converts the artifact into a shareable classifier handle.
    pub fn into_classifier(self) -> Arc<dyn Classifier> {
        match self {
            ModelArtifact::DecisionTree(m) => Arc::new(m),
            ModelArtifact::RandomForest(m) => Arc::new(m),
            ModelArtifact::Linear(m) => Arc::new(m),
        }
    }
}

/// Loads the model at `path`, ready to be shared across request handlers.
pub fn load_model(path: impl AsRef<Path>) -> Result<Arc<dyn Classifier>, ModelError> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading model artifact");

    let model = ModelArtifact::load(path)?.into_classifier();

    info!(
        kind = model.kind(),
        n_features = model.n_features(),
        n_classes = model.classes().len(),
        "Model loaded successfully"
    );
    Ok(model)
}

pub(crate) fn validate_header(
    n_features: usize,
    classes: &[ClassLabel],
    min_classes: usize,
) -> Result<(), ModelError> {
    if n_features == 0 {
        return Err(ModelError::InvalidArtifact("n_features must be positive".into()));
    }
    if classes.len() < min_classes {
        return Err(ModelError::InvalidArtifact(format!(
            "expected at least {} classes, got {}",
            min_classes,
            classes.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FOREST: &str = r#"{
        "kind": "random_forest",
        "n_features": 2,
        "classes": [0, 1],
        "trees": [
            { "nodes": [
                { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": [10, 0] },
                { "value": [0, 10] }
            ]},
            { "nodes": [
                { "feature": 1, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": [7, 1] },
                { "value": [2, 9] }
            ]}
        ]
    }"#;

    #[test]
    fn test_from_json_each_kind() {
        let forest = ModelArtifact::from_json(FOREST).unwrap();
        assert!(matches!(forest, ModelArtifact::RandomForest(_)));

        let tree = ModelArtifact::from_json(
            r#"{"kind": "decision_tree", "n_features": 1, "classes": [1.0, 2.0],
                "nodes": [{"value": [0.2, 0.8]}]}"#,
        )
        .unwrap();
        assert_eq!(tree.into_classifier().predict(&[5.0]).unwrap(), ClassLabel::Float(2.0));

        let linear = ModelArtifact::from_json(
            r#"{"kind": "linear", "n_features": 2, "classes": [0, 1],
                "coef": [[1.0, 1.0]], "intercept": [-1.0]}"#,
        )
        .unwrap();
        assert_eq!(linear.into_classifier().kind(), "linear");
    }

    #[test]
    fn test_unknown_kind_is_parse_error() {
        let err = ModelArtifact::from_json(r#"{"kind": "svm", "n_features": 2}"#).unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[test]
    fn test_invalid_structure_is_rejected() {
        let err = ModelArtifact::from_json(
            r#"{"kind": "decision_tree", "n_features": 0, "classes": [0],
                "nodes": [{"value": [1]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidArtifact(_)));
    }

    #[test]
    fn test_load_model_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FOREST.as_bytes()).unwrap();

        let model = load_model(file.path()).unwrap();
        assert_eq!(model.kind(), "random_forest");
        assert_eq!(model.n_features(), 2);
        assert_eq!(model.predict(&[0.3, 0.2]).unwrap(), ClassLabel::Int(0));
        assert_eq!(model.predict(&[0.9, 0.9]).unwrap(), ClassLabel::Int(1));
    }

    #[test]
    fn test_bundled_model() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../models/rf_model.json");
        let model = load_model(path).unwrap();
        assert_eq!(model.predict(&[0.3, 0.2]).unwrap(), ClassLabel::Int(0));
        assert_eq!(model.predict(&[0.9, 0.9]).unwrap(), ClassLabel::Int(1));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let Err(err) = load_model(dir.path().join("missing.json")) else {
            panic!("loading a missing file should fail");
        };
        assert!(matches!(err, ModelError::Io(_)));
    }
}
