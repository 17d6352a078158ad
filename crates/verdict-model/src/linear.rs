//! Linear classifier artifacts (logistic regression and friends).

use serde::{Deserialize, Serialize};
use verdict_core::{argmax, check_row, ClassLabel, Classifier, ModelError};

use crate::validate_header;

/// A linear decision function per class.
///
/// A single coefficient row describes a binary problem: the second class
/// wins when `w·x + b > 0`. Otherwise there is one row per class and the
/// highest score wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub n_features: usize,
    pub classes: Vec<ClassLabel>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LinearModel {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_header(self.n_features, &self.classes, 2)?;

        let rows = self.coef.len();
        let binary = rows == 1 && self.classes.len() == 2;
        if !binary && rows != self.classes.len() {
            return Err(ModelError::InvalidArtifact(format!(
                "{} coefficient rows for {} classes",
                rows,
                self.classes.len()
            )));
        }
        if self.intercept.len() != rows {
            return Err(ModelError::InvalidArtifact(format!(
                "{} intercepts for {} coefficient rows",
                self.intercept.len(),
                rows
            )));
        }
        for (idx, row) in self.coef.iter().enumerate() {
            if row.len() != self.n_features {
                return Err(ModelError::InvalidArtifact(format!(
                    "coefficient row {} has {} entries, expected {}",
                    idx,
                    row.len(),
                    self.n_features
                )));
            }
        }
        let all_finite = self
            .coef
            .iter()
            .flatten()
            .chain(self.intercept.iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelError::InvalidArtifact("non-finite coefficient".into()));
        }
        Ok(())
    }

    fn is_binary(&self) -> bool {
        self.coef.len() == 1
    }

    /// Raw decision scores, one per coefficient row.
    pub fn decision_function(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_row(row, self.n_features)?;
        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| w.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(ModelError::Inference("decision score overflowed".into()));
        }
        Ok(scores)
    }
}

impl Classifier for LinearModel {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        let scores = self.decision_function(row)?;
        if self.is_binary() {
            let p = sigmoid(scores[0]);
            return Ok(vec![1.0 - p, p]);
        }
        Ok(softmax(&scores))
    }

    // Decided on raw scores: sigmoid saturates near zero and would turn a
    // tiny positive margin into a tie.
    fn predict(&self, row: &[f64]) -> Result<ClassLabel, ModelError> {
        let scores = self.decision_function(row)?;
        let idx = if self.is_binary() {
            usize::from(scores[0] > 0.0)
        } else {
            argmax(&scores).ok_or_else(|| ModelError::Inference("no class scores".into()))?
        };
        self.classes
            .get(idx)
            .cloned()
            .ok_or_else(|| ModelError::Inference(format!("class index {} out of range", idx)))
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
