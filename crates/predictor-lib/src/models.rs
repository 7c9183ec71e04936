//! Core data models for the sales predictor

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default quantity shown in the form
pub const DEFAULT_QUANTITY: u64 = 77;

/// Default unit price shown in the form
pub const DEFAULT_PRICE: f64 = 89.0;

/// Step used by the price input
pub const PRICE_STEP: f64 = 0.5;

/// Number of input columns the sales model was trained on: [quantity, price]
pub const NUM_FEATURES: usize = 2;

/// Row-major input matrix handed to a model artifact
pub type FeatureMatrix = tract_onnx::prelude::tract_ndarray::Array2<f64>;

/// A single prediction request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub quantity: f64,
    pub price: f64,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self {
            quantity: DEFAULT_QUANTITY as f64,
            price: DEFAULT_PRICE,
        }
    }
}

impl PredictionRequest {
    pub fn new(quantity: f64, price: f64) -> Self {
        Self { quantity, price }
    }

    /// Both inputs must be finite and non-negative. Zero is allowed.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [("quantity", self.quantity), ("price", self.price)];

        for (name, value) in fields.iter() {
            if !value.is_finite() {
                return Err(format!("{} must be a finite number (got {})", name, value));
            }
            if *value < 0.0 {
                return Err(format!("{} must be >= 0 (got {})", name, value));
            }
        }

        Ok(())
    }

    /// Build the single-row matrix `[[quantity, price]]`
    pub fn to_matrix(&self) -> FeatureMatrix {
        FeatureMatrix::from_shape_fn((1, NUM_FEATURES), |(_, col)| match col {
            0 => self.quantity,
            _ => self.price,
        })
    }
}

/// Prediction output returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub quantity: f64,
    pub price: f64,
    pub predicted_sales: f64,
    pub formatted: String,
    pub generated_at: i64,
}

/// Description of the loaded model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub kind: String,
    pub sha256: String,
    pub size_bytes: usize,
}
