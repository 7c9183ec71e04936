//! Model artifact formats
//!
//! `.onnx` files are run through tract. `.json` files hold the
//! coefficients and intercept of a linear regression.

use super::Artifact;
use crate::models::{FeatureMatrix, NUM_FEATURES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tract_onnx::prelude::*;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Supported on-disk artifact formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Onnx,
    Linear,
}

impl ArtifactKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "onnx" => Ok(ArtifactKind::Onnx),
            "json" => Ok(ArtifactKind::Linear),
            other => anyhow::bail!(
                "Unsupported model format '{}' (expected .onnx or .json)",
                other
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Onnx => "onnx",
            ArtifactKind::Linear => "linear",
        }
    }

    /// Deserialize an artifact of this kind from raw bytes
    pub fn load(&self, bytes: &[u8]) -> Result<Box<dyn Artifact>> {
        match self {
            ArtifactKind::Onnx => Ok(Box::new(OnnxArtifact::from_bytes(bytes)?)),
            ArtifactKind::Linear => Ok(Box::new(LinearArtifact::from_bytes(bytes)?)),
        }
    }
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// ONNX regression model run with tract
pub struct OnnxArtifact {
    model: TractModel,
}

impl OnnxArtifact {
    /// Parse and optimize an ONNX model for a single `[quantity, price]` row
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, NUM_FEATURES]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(Self { model })
    }
}

impl Artifact for OnnxArtifact {
    fn predict(&self, input: &FeatureMatrix) -> Result<Vec<f64>> {
        if input.shape() != [1, NUM_FEATURES] {
            anyhow::bail!(
                "Model expects input of shape [1, {}], got {:?}",
                NUM_FEATURES,
                input.shape()
            );
        }

        // The graph takes float32; narrow here and widen the result back
        let tensor: Tensor = input.mapv(|x| x as f32).into();
        let result = self.model.run(tvec!(tensor.into()))?;
        let output = result.first().context("No output from model")?;
        let view = output.to_array_view::<f32>()?;

        Ok(view.iter().map(|&y| f64::from(y)).collect())
    }

    fn kind(&self) -> &str {
        ArtifactKind::Onnx.as_str()
    }
}

/// Linear regression stored as JSON: `{"coefficients": [..], "intercept": x}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearArtifact {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let artifact: Self =
            serde_json::from_slice(bytes).context("Failed to parse linear model JSON")?;

        if artifact.coefficients.is_empty() {
            anyhow::bail!("Linear model has no coefficients");
        }
        if !artifact.intercept.is_finite() || artifact.coefficients.iter().any(|c| !c.is_finite()) {
            anyhow::bail!("Linear model contains non-finite parameters");
        }

        Ok(artifact)
    }
}

impl Artifact for LinearArtifact {
    fn predict(&self, input: &FeatureMatrix) -> Result<Vec<f64>> {
        if input.ncols() != self.coefficients.len() {
            anyhow::bail!(
                "Model expects {} features, got {}",
                self.coefficients.len(),
                input.ncols()
            );
        }

        let predictions = input
            .rows()
            .into_iter()
            .map(|row| {
                let dot: f64 = row.iter().zip(&self.coefficients).map(|(x, w)| x * w).sum();
                dot + self.intercept
            })
            .collect();

        Ok(predictions)
    }

    fn kind(&self) -> &str {
        ArtifactKind::Linear.as_str()
    }
}
