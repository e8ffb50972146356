//! ONNX inference using tract
//!
//! Loads the pre-trained dropout classifier once at startup. The plan is
//! immutable after loading, so concurrent requests score against it without
//! locking.

use super::RiskClassifier;
use crate::error::CoachError;
use crate::models::{FeatureVector, FEATURE_COUNT};
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, info, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Load the dropout classifier from an ONNX file.
///
/// Any failure here is fatal for the coaching feature.
pub fn load_model(path: impl AsRef<Path>) -> Result<OnnxClassifier, CoachError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        CoachError::ModelUnavailable(format!("failed to read {}: {}", path.display(), e))
    })?;
    let classifier = OnnxClassifier::from_bytes(&bytes)?;
    info!(
        path = %path.display(),
        model_version = %classifier.model_version,
        size_bytes = bytes.len(),
        "Dropout model loaded"
    );
    Ok(classifier)
}

/// Dropout classifier backed by a tract runnable plan
pub struct OnnxClassifier {
    model: TractModel,
    model_version: String,
}

impl OnnxClassifier {
    /// Parse and optimize a model from bytes
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, CoachError> {
        let model = Self::build_plan(model_bytes)
            .map_err(|e| CoachError::ModelUnavailable(format!("{:#}", e)))?;
        Ok(Self {
            model,
            model_version: fingerprint(model_bytes),
        })
    }

    fn build_plan(model_bytes: &[u8]) -> Result<TractModel> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    fn features_to_tensor(features: &FeatureVector) -> Result<Tensor> {
        let array =
            tract_ndarray::Array2::from_shape_vec((1, FEATURE_COUNT), features.to_array().to_vec())
                .context("Failed to shape feature tensor")?;
        Ok(array.into())
    }
}

impl RiskClassifier for OnnxClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<f64, CoachError> {
        let start = Instant::now();

        let input = Self::features_to_tensor(features)
            .map_err(|e| CoachError::ModelUnavailable(format!("{:#}", e)))?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| CoachError::ModelUnavailable(format!("inference failed: {:#}", e)))?;

        let probability = positive_class_probability(&outputs).ok_or_else(|| {
            CoachError::ModelUnavailable("model produced no float probability output".to_string())
        })?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(
                elapsed_ms = elapsed.as_millis(),
                "Inference exceeded {}ms target", MAX_INFERENCE_MS
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(probability)
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }
}

/// Probability of the positive ("fails tomorrow") class.
///
/// Classifier exports emit an integer label tensor and a float probability
/// tensor; the first float output is used. Two or more columns means one
/// column per class, so column 1 is taken.
fn positive_class_probability(outputs: &[TValue]) -> Option<f64> {
    outputs.iter().find_map(|value| {
        let view = value.to_array_view::<f32>().ok()?;
        let values: Vec<f32> = view.iter().copied().collect();
        let p = match values.len() {
            0 => return None,
            1 => values[0],
            _ => values[1],
        };
        if p.is_nan() {
            return None;
        }
        Some(f64::from(p).clamp(0.0, 1.0))
    })
}

/// Short SHA-256 fingerprint used as the model version
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hex::encode(hasher.finalize());
    format!("sha256:{}", &digest[..12])
}
