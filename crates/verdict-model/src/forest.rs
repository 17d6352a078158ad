//! Random forest artifacts.

use serde::{Deserialize, Serialize};
use verdict_core::{ClassLabel, Classifier, ModelError};

use crate::tree::Tree;
use crate::validate_header;

/// An ensemble of decision trees.
///
/// Class probabilities are the mean of each tree's normalized leaf values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub classes: Vec<ClassLabel>,
    pub trees: Vec<Tree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_header(self.n_features, &self.classes, 1)?;
        if self.trees.is_empty() {
            return Err(ModelError::InvalidArtifact("forest has no trees".into()));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len()).map_err(|e| match e {
                ModelError::InvalidArtifact(msg) => {
                    ModelError::InvalidArtifact(format!("tree {}: {}", idx, msg))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        verdict_core::check_row(row, self.n_features)?;

        let mut totals = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let proba = tree.class_proba(row)?;
            for (total, p) in totals.iter_mut().zip(proba) {
                *total += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        Ok(totals.into_iter().map(|t| t / n_trees).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;

    fn split(feature: usize, threshold: f64) -> Tree {
        Tree {
            nodes: vec![
                TreeNode::Split { feature, threshold, left: 1, right: 2 },
                TreeNode::Leaf { value: vec![10.0, 0.0] },
                TreeNode::Leaf { value: vec![0.0, 10.0] },
            ],
        }
    }

    fn forest() -> RandomForest {
        RandomForest {
            n_features: 2,
            classes: vec![ClassLabel::Int(0), ClassLabel::Int(1)],
            trees: vec![split(0, 0.5), split(1, 0.5), split(0, 0.8)],
        }
    }

    #[test]
    fn test_forest_majority() {
        let forest = forest();
        forest.validate().unwrap();
        assert_eq!(forest.predict(&[0.3, 0.2]).unwrap(), ClassLabel::Int(0));
        assert_eq!(forest.predict(&[0.9, 0.9]).unwrap(), ClassLabel::Int(1));
        assert_eq!(forest.predict(&[0.6, 0.6]).unwrap(), ClassLabel::Int(1));
        assert_eq!(forest.predict(&[0.6, 0.1]).unwrap(), ClassLabel::Int(0));
    }

    #[test]
    fn test_forest_averages_probabilities() {
        let proba = forest().predict_proba(&[0.6, 0.6]).unwrap();
        assert!((proba[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((proba[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_forest_without_trees_is_invalid() {
        let mut forest = forest();
        forest.trees.clear();
        assert!(matches!(forest.validate(), Err(ModelError::InvalidArtifact(_))));
    }

    #[test]
    fn test_invalid_tree_is_named() {
        let mut forest = forest();
        forest.trees[1].nodes[1] = TreeNode::Leaf { value: vec![1.0, 2.0, 3.0] };
        let err = forest.validate().unwrap_err();
        assert!(err.to_string().contains("tree 1"));
    }
}
