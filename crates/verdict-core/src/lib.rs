//! Core domain types and error definitions for verdict.
//!
//! This crate provides the fundamental types shared across the workspace:
//!
//! - [`ModelError`] — Error type for artifact loading and inference
//! - [`FeatureVector`] — The numeric inputs for one prediction
//! - [`ClassLabel`] — An entry of a model's class vocabulary
//! - [`Classifier`] — The capability every loaded model exposes
//!
//! # Example
//!
//! ```rust
//! use verdict_core::{ClassLabel, FeatureVector};
//!
//! let features = FeatureVector::new(vec![0.3, 0.2]);
//! assert_eq!(features.len(), 2);
//!
//! let label = ClassLabel::Float(1.0);
//! assert_eq!(label.to_int().unwrap(), 1);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a model or running inference.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Artifact file could not be read.
    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact is not valid JSON or does not match any known format.
    #[error("Failed to parse model artifact: {0}")]
    Parse(String),

    /// Artifact parsed but is structurally inconsistent.
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// Feature vector length differs from what the model expects.
    #[error("Feature count mismatch: model expects {expected}, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    /// Feature value is NaN or infinite.
    #[error("Feature at index {0} is not a finite number")]
    NonFiniteFeature(usize),

    /// Model produced no usable output.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Predicted label has no integer representation.
    #[error("Cannot convert class label {0} to an integer")]
    LabelCoercion(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Parse(err.to_string())
    }
}

/// Ordered numeric inputs for a single sample.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Returns the row if it has exactly `expected` finite values.
    pub fn as_row(&self, expected: usize) -> Result<&[f64], ModelError> {
        check_row(&self.0, expected)?;
        Ok(&self.0)
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Checks a feature row against the expected width.
pub fn check_row(row: &[f64], expected: usize) -> Result<(), ModelError> {
    if row.len() != expected {
        return Err(ModelError::FeatureMismatch {
            expected,
            actual: row.len(),
        });
    }
    match row.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(ModelError::NonFiniteFeature(idx)),
        None => Ok(()),
    }
}

/// A class label as stored in a model artifact.
///
/// Labels may be integers, floats or strings. Callers always receive the
/// integer form through [`ClassLabel::to_int`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ClassLabel {
    /// Converts the label to an integer.
    ///
    /// Floats truncate toward zero. Strings must hold a base-10 integer.
    pub fn to_int(&self) -> Result<i64, ModelError> {
        match self {
            ClassLabel::Int(v) => Ok(*v),
            ClassLabel::Float(v) => {
                let t = v.trunc();
                // i64::MAX as f64 rounds up to 2^63, hence the exclusive bound.
                if !t.is_finite() || t < i64::MIN as f64 || t >= i64::MAX as f64 {
                    return Err(ModelError::LabelCoercion(self.to_string()));
                }
                Ok(t as i64)
            }
            ClassLabel::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ModelError::LabelCoercion(self.to_string())),
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Int(v) => write!(f, "{}", v),
            ClassLabel::Float(v) => write!(f, "{}", v),
            ClassLabel::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Descriptive metadata of a loaded model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Artifact format, e.g. "random_forest".
    pub kind: String,
    /// Number of input features the model expects.
    pub n_features: usize,
    /// Class vocabulary in output order.
    pub classes: Vec<ClassLabel>,
}

/// A trained classifier that maps one feature row to a class label.
///
/// Implementations are immutable after construction and shared across
/// request handlers, hence the `Send + Sync` bound.
pub trait Classifier: Send + Sync {
    /// Artifact format name.
    fn kind(&self) -> &'static str;

    /// Number of features each row must have.
    fn n_features(&self) -> usize;

    /// Class vocabulary, indexed like [`Classifier::predict_proba`] output.
    fn classes(&self) -> &[ClassLabel];

    /// Per-class scores for a single row. Scores sum to one.
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError>;

    /// Predicts the class label for a single row.
    fn predict(&self, row: &[f64]) -> Result<ClassLabel, ModelError> {
        check_row(row, self.n_features())?;
        let proba = self.predict_proba(row)?;
        let idx = argmax(&proba).ok_or_else(|| {
            ModelError::Inference("model produced no finite class scores".into())
        })?;
        self.classes()
            .get(idx)
            .cloned()
            .ok_or_else(|| ModelError::Inference(format!("class index {} out of range", idx)))
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            kind: self.kind().to_string(),
            n_features: self.n_features(),
            classes: self.classes().to_vec(),
        }
    }
}

/// Runs one prediction and returns the integer class.
pub fn predict_class(model: &dyn Classifier, features: &FeatureVector) -> Result<i64, ModelError> {
    let row = features.as_row(model.n_features())?;
    model.predict(row)?.to_int()
}

/// Index of the largest score. The first maximum wins on ties.
///
/// Returns `None` for an empty slice or if any score is NaN or infinite.
pub fn argmax(scores: &[f64]) -> Option<usize> {
    if scores.iter().any(|s| !s.is_finite()) {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Threshold {
        classes: Vec<ClassLabel>,
    }

    impl Classifier for Threshold {
        fn kind(&self) -> &'static str {
            "threshold"
        }

        fn n_features(&self) -> usize {
            2
        }

        fn classes(&self) -> &[ClassLabel] {
            &self.classes
        }

        fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
            if row[0] + row[1] > 1.0 {
                Ok(vec![0.0, 1.0])
            } else {
                Ok(vec![1.0, 0.0])
            }
        }
    }

    fn threshold(classes: Vec<ClassLabel>) -> Threshold {
        Threshold { classes }
    }

    #[test]
    fn test_label_to_int() {
        assert_eq!(ClassLabel::Int(-3).to_int().unwrap(), -3);
        assert_eq!(ClassLabel::Float(2.9).to_int().unwrap(), 2);
        assert_eq!(ClassLabel::Float(-2.9).to_int().unwrap(), -2);
        assert_eq!(ClassLabel::Text(" 7 ".into()).to_int().unwrap(), 7);
    }

    #[test]
    fn test_label_to_int_rejects_unrepresentable() {
        assert!(matches!(
            ClassLabel::Float(f64::NAN).to_int(),
            Err(ModelError::LabelCoercion(_))
        ));
        assert!(matches!(
            ClassLabel::Float(1e20).to_int(),
            Err(ModelError::LabelCoercion(_))
        ));
        assert!(matches!(
            ClassLabel::Text("spam".into()).to_int(),
            Err(ModelError::LabelCoercion(_))
        ));
    }

    #[test]
    fn test_label_deserialize_untagged() {
        let labels: Vec<ClassLabel> = serde_json::from_str(r#"[0, 1.5, 2.0, "3"]"#).unwrap();
        assert_eq!(labels[0], ClassLabel::Int(0));
        assert_eq!(labels[1], ClassLabel::Float(1.5));
        assert_eq!(labels[2], ClassLabel::Float(2.0));
        assert_eq!(labels[3], ClassLabel::Text("3".into()));
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.2, 0.5, 0.3]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[0.1, f64::NAN]), None);
    }

    #[test]
    fn test_check_row() {
        assert!(check_row(&[1.0, 2.0], 2).is_ok());
        assert!(matches!(
            check_row(&[1.0], 2),
            Err(ModelError::FeatureMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            check_row(&[1.0, f64::INFINITY], 2),
            Err(ModelError::NonFiniteFeature(1))
        ));
    }

    #[test]
    fn test_predict_class() {
        let model = threshold(vec![ClassLabel::Int(0), ClassLabel::Int(1)]);
        let low = FeatureVector::new(vec![0.3, 0.2]);
        let high = FeatureVector::new(vec![0.9, 0.9]);
        assert_eq!(predict_class(&model, &low).unwrap(), 0);
        assert_eq!(predict_class(&model, &high).unwrap(), 1);
    }

    #[test]
    fn test_predict_class_coerces_labels() {
        let model = threshold(vec![ClassLabel::Text("10".into()), ClassLabel::Float(20.0)]);
        let high = FeatureVector::new(vec![0.9, 0.9]);
        assert_eq!(predict_class(&model, &high).unwrap(), 20);
    }

    #[test]
    fn test_predict_class_wrong_length() {
        let model = threshold(vec![ClassLabel::Int(0), ClassLabel::Int(1)]);
        let features = FeatureVector::new(vec![0.3, 0.2, 0.1]);
        let err = predict_class(&model, &features).unwrap_err();
        assert!(matches!(err, ModelError::FeatureMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_model_info() {
        let model = threshold(vec![ClassLabel::Int(0), ClassLabel::Int(1)]);
        let info = model.info();
        assert_eq!(info.kind, "threshold");
        assert_eq!(info.n_features, 2);
        assert_eq!(info.classes.len(), 2);
    }
}
