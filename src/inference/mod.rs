//! Model gateway - ONNX artifact loading and prediction
//!
//! Each artifact is an ONNX file plus a JSON sidecar (same stem, `.json`
//! extension) declaring the expected feature count and, for the classifier,
//! the label table. Artifacts are reloaded on every call: a model swapped on
//! disk takes effect on the next request, at the cost of repeated load
//! latency. Call volume is assumed low.

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model artifact unavailable: {0}")]
    ModelUnavailable(String),
    #[error("feature vector has {got} values, model expects {expected}")]
    InvalidFeatures { expected: usize, got: usize },
}

/// Sidecar metadata describing what the opaque artifact expects
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactMetadata {
    pub feature_count: usize,
    /// Class label table, classifier artifacts only
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Gateway over the two on-disk predictor artifacts
#[derive(Debug, Clone)]
pub struct ModelGateway {
    crop_model: PathBuf,
    price_model: PathBuf,
}

impl ModelGateway {
    pub fn new(model_dir: impl AsRef<Path>) -> Self {
        let dir = model_dir.as_ref();
        Self {
            crop_model: dir.join("crop_model.onnx"),
            price_model: dir.join("price_model.onnx"),
        }
    }

    /// Classify a feature vector into a crop label
    pub fn predict_crop(&self, features: &[f32]) -> Result<String, InferenceError> {
        let meta = load_metadata(&self.crop_model)?;
        if meta.labels.is_empty() {
            return Err(InferenceError::ModelUnavailable(format!(
                "classifier sidecar for {} declares no labels",
                self.crop_model.display()
            )));
        }

        let scores = run_model(&self.crop_model, &meta, features)?;
        if scores.len() != meta.labels.len() {
            return Err(InferenceError::ModelUnavailable(format!(
                "classifier produced {} scores for {} labels",
                scores.len(),
                meta.labels.len()
            )));
        }

        let best = argmax(&scores).ok_or_else(|| {
            InferenceError::ModelUnavailable("classifier produced no scores".to_string())
        })?;
        Ok(meta.labels[best].clone())
    }

    /// Run the regression artifact, returning the predicted scalar
    pub fn predict_price(&self, features: &[f32]) -> Result<f32, InferenceError> {
        let meta = load_metadata(&self.price_model)?;
        let output = run_model(&self.price_model, &meta, features)?;

        output.first().copied().ok_or_else(|| {
            InferenceError::ModelUnavailable("regressor produced no output".to_string())
        })
    }
}

/// Index of the highest score
fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx)
}

fn sidecar_path(model_path: &Path) -> PathBuf {
    model_path.with_extension("json")
}

fn load_metadata(model_path: &Path) -> Result<ArtifactMetadata, InferenceError> {
    let path = sidecar_path(model_path);
    let raw = std::fs::read_to_string(&path).map_err(|e| {
        InferenceError::ModelUnavailable(format!("cannot read sidecar {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        InferenceError::ModelUnavailable(format!("corrupt sidecar {}: {}", path.display(), e))
    })
}

/// Load the artifact and run a single inference over one feature vector.
/// Vector shape is checked against the sidecar before any session is built.
fn run_model(
    model_path: &Path,
    meta: &ArtifactMetadata,
    features: &[f32],
) -> Result<Vec<f32>, InferenceError> {
    if features.len() != meta.feature_count {
        return Err(InferenceError::InvalidFeatures {
            expected: meta.feature_count,
            got: features.len(),
        });
    }

    if !model_path.exists() {
        return Err(InferenceError::ModelUnavailable(format!(
            "model not found: {}",
            model_path.display()
        )));
    }

    tracing::debug!("Loading model artifact: {}", model_path.display());

    let mut session = Session::builder()
        .map_err(|e| InferenceError::ModelUnavailable(format!("session builder error: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| InferenceError::ModelUnavailable(format!("optimization error: {}", e)))?
        .commit_from_file(model_path)
        .map_err(|e| {
            InferenceError::ModelUnavailable(format!(
                "failed to load {}: {}",
                model_path.display(),
                e
            ))
        })?;

    let output_name = session
        .outputs
        .first()
        .map(|o| o.name.clone())
        .ok_or_else(|| {
            InferenceError::ModelUnavailable("model defines no outputs".to_string())
        })?;

    let input_array = Array2::<f32>::from_shape_vec((1, features.len()), features.to_vec())
        .map_err(|e| InferenceError::ModelUnavailable(format!("array error: {}", e)))?;

    let input_tensor = Value::from_array(input_array)
        .map_err(|e| InferenceError::ModelUnavailable(format!("tensor error: {}", e)))?;

    let outputs = session
        .run(ort::inputs![input_tensor])
        .map_err(|e| InferenceError::ModelUnavailable(format!("inference failed: {}", e)))?;

    let output = outputs
        .get(&output_name)
        .ok_or_else(|| InferenceError::ModelUnavailable("no output produced".to_string()))?;

    let output_tensor = output
        .try_extract_tensor::<f32>()
        .map_err(|e| InferenceError::ModelUnavailable(format!("extract error: {}", e)))?;

    Ok(output_tensor.1.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn gateway_with_sidecars(crop_json: Option<&str>, price_json: Option<&str>) -> (tempfile::TempDir, ModelGateway) {
        let dir = tempfile::tempdir().unwrap();
        if let Some(json) = crop_json {
            fs::write(dir.path().join("crop_model.json"), json).unwrap();
        }
        if let Some(json) = price_json {
            fs::write(dir.path().join("price_model.json"), json).unwrap();
        }
        let gateway = ModelGateway::new(dir.path());
        (dir, gateway)
    }

    #[test]
    fn missing_sidecar_is_model_unavailable() {
        let (_dir, gateway) = gateway_with_sidecars(None, None);
        let result = gateway.predict_crop(&[1.0, 2.0]);
        assert!(matches!(result, Err(InferenceError::ModelUnavailable(_))));
    }

    #[test]
    fn corrupt_sidecar_is_model_unavailable() {
        let (_dir, gateway) = gateway_with_sidecars(Some("not json {"), None);
        let result = gateway.predict_crop(&[1.0, 2.0]);
        assert!(matches!(result, Err(InferenceError::ModelUnavailable(_))));
    }

    #[test]
    fn classifier_sidecar_without_labels_is_rejected() {
        let (_dir, gateway) = gateway_with_sidecars(Some(r#"{"feature_count": 4}"#), None);
        let result = gateway.predict_crop(&[1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(result, Err(InferenceError::ModelUnavailable(_))));
    }

    #[test]
    fn wrong_dimensionality_is_invalid_features() {
        let sidecar = r#"{"feature_count": 7, "labels": ["rice", "maize"]}"#;
        let (_dir, gateway) = gateway_with_sidecars(Some(sidecar), None);

        let result = gateway.predict_crop(&[1.0, 2.0, 3.0]);
        match result {
            Err(InferenceError::InvalidFeatures { expected, got }) => {
                assert_eq!(expected, 7);
                assert_eq!(got, 3);
            }
            other => panic!("expected InvalidFeatures, got {:?}", other),
        }
    }

    #[test]
    fn missing_artifact_with_valid_sidecar_is_model_unavailable() {
        let sidecar = r#"{"feature_count": 2, "labels": ["rice", "maize"]}"#;
        let (_dir, gateway) = gateway_with_sidecars(Some(sidecar), None);

        // Dimensions match the sidecar, but there is no .onnx file on disk
        let result = gateway.predict_crop(&[1.0, 2.0]);
        assert!(matches!(result, Err(InferenceError::ModelUnavailable(_))));
    }

    #[test]
    fn regressor_dimension_check() {
        let sidecar = r#"{"feature_count": 3}"#;
        let (_dir, gateway) = gateway_with_sidecars(None, Some(sidecar));

        let result = gateway.predict_price(&[1.0]);
        assert!(matches!(
            result,
            Err(InferenceError::InvalidFeatures { expected: 3, got: 1 })
        ));
    }

    #[test]
    fn argmax_picks_highest_score() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[3.0]), Some(0));
        assert_eq!(argmax(&[]), None);
    }
}
