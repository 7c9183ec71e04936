//! Error taxonomy for the predictor gateway

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the predictor gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The serialized model file does not exist at the expected location
    #[error("model file '{}' not found", .path.display())]
    ArtifactNotFound { path: PathBuf },

    /// The model file exists but could not be read or deserialized
    #[error("failed to load model '{}'", .path.display())]
    ArtifactLoadError {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The loaded model rejected or failed on the given input
    #[error("prediction failed")]
    PredictionError(#[source] anyhow::Error),

    /// The request violates the input contract (negative or non-finite values)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl GatewayError {
    /// Load-time errors end the session; no prediction can run without a model.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GatewayError::ArtifactNotFound { .. } | GatewayError::ArtifactLoadError { .. }
        )
    }

    /// Message suitable for showing to the person using the form, cause included
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::ArtifactNotFound { path } => format!(
                "Model file '{}' not found. Upload it to your repo!",
                path.display()
            ),
            GatewayError::ArtifactLoadError { source, .. } => {
                format!("Error loading model: {:#}", source)
            }
            GatewayError::PredictionError(e) => format!("Prediction failed: {:#}", e),
            GatewayError::InvalidInput(msg) => format!("Invalid input: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let not_found = GatewayError::ArtifactNotFound {
            path: PathBuf::from("model.onnx"),
        };
        let load = GatewayError::ArtifactLoadError {
            path: PathBuf::from("model.onnx"),
            source: anyhow::anyhow!("bad header"),
        };
        let predict = GatewayError::PredictionError(anyhow::anyhow!("shape mismatch"));
        let invalid = GatewayError::InvalidInput("price must be >= 0".to_string());

        assert!(not_found.is_fatal());
        assert!(load.is_fatal());
        assert!(!predict.is_fatal());
        assert!(!invalid.is_fatal());
    }

    #[test]
    fn test_user_messages() {
        let not_found = GatewayError::ArtifactNotFound {
            path: PathBuf::from("sales_prediction_model.onnx"),
        };
        assert_eq!(
            not_found.user_message(),
            "Model file 'sales_prediction_model.onnx' not found. Upload it to your repo!"
        );

        let load = GatewayError::ArtifactLoadError {
            path: PathBuf::from("m.json"),
            source: anyhow::anyhow!("bad header"),
        };
        assert_eq!(load.user_message(), "Error loading model: bad header");

        let predict = GatewayError::PredictionError(anyhow::anyhow!("shape mismatch"));
        assert_eq!(predict.user_message(), "Prediction failed: shape mismatch");
    }
}
