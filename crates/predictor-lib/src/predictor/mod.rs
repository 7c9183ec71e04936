//! Sales prediction engine

mod artifact;
mod gateway;
mod output;

pub use artifact::{compute_checksum, ArtifactKind, LinearArtifact, OnnxArtifact};
pub use gateway::{global, GatewayConfig, PredictorGateway, DEFAULT_MODEL_PATH};
pub use output::{format_currency, format_prediction};

use crate::models::FeatureMatrix;
use anyhow::Result;

/// A trained model loaded from storage.
///
/// The gateway only relies on `predict`: one output value per input row.
/// Implementations reject inputs whose column count differs from what the
/// model was trained on.
pub trait Artifact: Send + Sync {
    fn predict(&self, input: &FeatureMatrix) -> Result<Vec<f64>>;

    /// Short name of the artifact format, e.g. "onnx"
    fn kind(&self) -> &str;
}
