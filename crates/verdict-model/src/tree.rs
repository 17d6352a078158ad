//! Decision tree artifacts.

use serde::{Deserialize, Serialize};
use verdict_core::{ClassLabel, Classifier, ModelError};

use crate::validate_header;

/// A node of a flattened decision tree.
///
/// Splits send a row left when `row[feature] <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Per-class weights (sample counts or probabilities).
        value: Vec<f64>,
    },
}

/// A tree as stored inside a forest artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    pub(crate) fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), ModelError> {
        validate_nodes(&self.nodes, n_features, n_classes)
    }

    pub(crate) fn class_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        normalize(leaf_value(&self.nodes, row)?)
    }
}

/// A standalone decision tree classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub n_features: usize,
    pub classes: Vec<ClassLabel>,
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_header(self.n_features, &self.classes, 1)?;
        validate_nodes(&self.nodes, self.n_features, self.classes.len())
    }
}

impl Classifier for DecisionTree {
    fn kind(&self) -> &'static str {
        "decision_tree"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        verdict_core::check_row(row, self.n_features)?;
        normalize(leaf_value(&self.nodes, row)?)
    }
}

/// Checks node references and leaf shapes.
///
/// Children must point strictly forward, which rules out cycles and
/// bounds traversal by the node count.
fn validate_nodes(nodes: &[TreeNode], n_features: usize, n_classes: usize) -> Result<(), ModelError> {
    if nodes.is_empty() {
        return Err(ModelError::InvalidArtifact("tree has no nodes".into()));
    }

    for (idx, node) in nodes.iter().enumerate() {
        match node {
            TreeNode::Split { feature, threshold, left, right } => {
                if *feature >= n_features {
                    return Err(ModelError::InvalidArtifact(format!(
                        "node {} splits on feature {} but the model has {} features",
                        idx, feature, n_features
                    )));
                }
                if !threshold.is_finite() {
                    return Err(ModelError::InvalidArtifact(format!(
                        "node {} has a non-finite threshold",
                        idx
                    )));
                }
                for child in [*left, *right] {
                    if child <= idx || child >= nodes.len() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "node {} references invalid child {}",
                            idx, child
                        )));
                    }
                }
            }
            TreeNode::Leaf { value } => {
                if value.len() != n_classes {
                    return Err(ModelError::InvalidArtifact(format!(
                        "leaf {} has {} values for {} classes",
                        idx,
                        value.len(),
                        n_classes
                    )));
                }
                if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(ModelError::InvalidArtifact(format!(
                        "leaf {} has negative or non-finite weights",
                        idx
                    )));
                }
                if value.iter().sum::<f64>() <= 0.0 {
                    return Err(ModelError::InvalidArtifact(format!(
                        "leaf {} has zero total weight",
                        idx
                    )));
                }
            }
        }
    }

    Ok(())
}

fn leaf_value<'a>(nodes: &'a [TreeNode], row: &[f64]) -> Result<&'a [f64], ModelError> {
    let mut idx = 0;
    for _ in 0..nodes.len() {
        match nodes.get(idx) {
            Some(TreeNode::Leaf { value }) => return Ok(value),
            Some(TreeNode::Split { feature, threshold, left, right }) => {
                let x = row.get(*feature).ok_or_else(|| {
                    ModelError::Inference(format!("feature {} missing from row", feature))
                })?;
                idx = if *x <= *threshold { *left } else { *right };
            }
            None => {
                return Err(ModelError::Inference(format!("node {} out of range", idx)));
            }
        }
    }
    Err(ModelError::Inference("tree traversal did not reach a leaf".into()))
}

fn normalize(value: &[f64]) -> Result<Vec<f64>, ModelError> {
    let total: f64 = value.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(ModelError::Inference("leaf has no usable weights".into()));
    }
    Ok(value.iter().map(|v| v / total).collect())
}
