//! Predictor gateway
//!
//! Owns the model artifact for the lifetime of the process. The artifact is
//! read from storage on first use and the same instance serves every
//! prediction afterwards. Failed loads are not cached.

use super::artifact::{compute_checksum, ArtifactKind};
use super::output::format_currency;
use super::Artifact;
use crate::error::GatewayError;
use crate::models::{ArtifactInfo, FeatureMatrix, PredictionOutcome, PredictionRequest};
use crate::observability::{GatewayMetrics, StructuredLogger};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Instant;
use tracing::debug;

/// Model location relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "sales_prediction_model.onnx";

static GLOBAL_GATEWAY: OnceLock<Arc<PredictorGateway>> = OnceLock::new();

/// Process-wide gateway. The first caller's config wins.
pub fn global(config: GatewayConfig) -> Arc<PredictorGateway> {
    GLOBAL_GATEWAY
        .get_or_init(|| Arc::new(PredictorGateway::new(config)))
        .clone()
}

/// Where to find the model and how to verify it
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub model_path: PathBuf,
    /// Expected hex SHA256 of the artifact file
    pub expected_sha256: Option<String>,
    /// Instance name attached to structured log events
    pub instance: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            expected_sha256: None,
            instance: "sales-app".to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn with_model_path(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Self::default()
        }
    }
}

/// Bridge between raw (quantity, price) inputs and the loaded model
pub struct PredictorGateway {
    config: GatewayConfig,
    artifact: OnceLock<Arc<dyn Artifact>>,
    info: OnceLock<ArtifactInfo>,
    load_lock: Mutex<()>,
    load_count: AtomicU64,
    metrics: GatewayMetrics,
    logger: StructuredLogger,
}

impl PredictorGateway {
    /// Create an unloaded gateway; the artifact is read on first `load()`
    pub fn new(config: GatewayConfig) -> Self {
        let logger = StructuredLogger::new(config.instance.clone());
        Self {
            config,
            artifact: OnceLock::new(),
            info: OnceLock::new(),
            load_lock: Mutex::new(()),
            load_count: AtomicU64::new(0),
            metrics: GatewayMetrics::new(),
            logger,
        }
    }

    /// Create a gateway that is already loaded with the given artifact
    pub fn with_artifact(artifact: Arc<dyn Artifact>) -> Self {
        let gateway = Self::new(GatewayConfig::default());
        let _ = gateway.artifact.set(artifact);
        gateway
    }

    pub fn model_path(&self) -> &Path {
        &self.config.model_path
    }

    pub fn is_loaded(&self) -> bool {
        self.artifact.get().is_some()
    }

    /// Number of times the artifact was read from storage (0 or 1)
    pub fn load_count(&self) -> u64 {
        self.load_count.load(Ordering::Relaxed)
    }

    /// Details of the artifact read from storage, if any
    pub fn info(&self) -> Option<&ArtifactInfo> {
        self.info.get()
    }

    /// Load the artifact, reading storage only on the first successful call
    pub fn load(&self) -> Result<Arc<dyn Artifact>, GatewayError> {
        if let Some(artifact) = self.artifact.get() {
            return Ok(Arc::clone(artifact));
        }

        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(artifact) = self.artifact.get() {
            return Ok(Arc::clone(artifact));
        }

        match self.read_artifact() {
            Ok((artifact, info)) => {
                self.load_count.fetch_add(1, Ordering::Relaxed);
                self.metrics.record_model_load();
                self.logger
                    .log_model_loaded(&info.path, &info.kind, &info.sha256, info.size_bytes);

                let _ = self.info.set(info);
                Ok(Arc::clone(self.artifact.get_or_init(|| artifact)))
            }
            Err(e) => {
                self.logger
                    .log_model_load_failed(&self.config.model_path, &e.user_message());
                Err(e)
            }
        }
    }

    fn read_artifact(&self) -> Result<(Arc<dyn Artifact>, ArtifactInfo), GatewayError> {
        let path = &self.config.model_path;
        let load_error = |source: anyhow::Error| GatewayError::ArtifactLoadError {
            path: path.clone(),
            source,
        };

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(GatewayError::ArtifactNotFound { path: path.clone() });
            }
            Err(e) => {
                return Err(load_error(
                    anyhow::Error::new(e).context("Failed to read model file"),
                ))
            }
        };

        let checksum = compute_checksum(&bytes);
        if let Some(expected) = &self.config.expected_sha256 {
            if !expected.trim().eq_ignore_ascii_case(&checksum) {
                return Err(load_error(anyhow::anyhow!(
                    "Checksum mismatch: expected {}, got {}",
                    expected.trim(),
                    checksum
                )));
            }
        }

        let kind = ArtifactKind::from_path(path).map_err(load_error)?;
        let artifact: Arc<dyn Artifact> = Arc::from(kind.load(&bytes).map_err(load_error)?);

        let info = ArtifactInfo {
            path: path.clone(),
            kind: kind.as_str().to_string(),
            sha256: checksum,
            size_bytes: bytes.len(),
        };

        Ok((artifact, info))
    }

    /// Predict sales for one (quantity, price) pair
    pub fn predict(&self, quantity: f64, price: f64) -> Result<f64, GatewayError> {
        let request = PredictionRequest::new(quantity, price);
        request.validate().map_err(GatewayError::InvalidInput)?;

        let artifact = self.load()?;
        let start = Instant::now();

        let result = artifact
            .predict(&request.to_matrix())
            .map_err(GatewayError::PredictionError)
            .and_then(|outputs| match outputs.first() {
                Some(value) if value.is_finite() => Ok(*value),
                Some(value) => Err(GatewayError::PredictionError(anyhow::anyhow!(
                    "Model returned a non-finite value ({})",
                    value
                ))),
                None => Err(GatewayError::PredictionError(anyhow::anyhow!(
                    "Model returned no output"
                ))),
            });

        let elapsed = start.elapsed();
        self.metrics.observe_prediction_latency(elapsed.as_secs_f64());

        match result {
            Ok(value) => {
                self.metrics.inc_predictions();
                self.logger
                    .log_prediction(quantity, price, value, elapsed.as_micros());
                Ok(value)
            }
            Err(e) => {
                self.metrics.inc_prediction_errors();
                self.logger
                    .log_prediction_failed(quantity, price, &e.user_message());
                Err(e)
            }
        }
    }

    /// Predict and package the result with its display string
    pub fn predict_request(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionOutcome, GatewayError> {
        let predicted_sales = self.predict(request.quantity, request.price)?;
        Ok(PredictionOutcome {
            quantity: request.quantity,
            price: request.price,
            predicted_sales,
            formatted: format_currency(predicted_sales),
            generated_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Run the artifact on a caller-built matrix
    pub fn predict_matrix(&self, input: &FeatureMatrix) -> Result<Vec<f64>, GatewayError> {
        let artifact = self.load()?;
        debug!(shape = ?input.shape(), "Running model on raw matrix");

        artifact.predict(input).map_err(|e| {
            self.metrics.inc_prediction_errors();
            GatewayError::PredictionError(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NUM_FEATURES;
    use crate::predictor::{format_currency, LinearArtifact};
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    // Lets tests call `unwrap_err()` on `Result<Arc<dyn Artifact>, _>`
    impl std::fmt::Debug for dyn Artifact {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Artifact").field("kind", &self.kind()).finish()
        }
    }

    /// Returns a fixed value for every row and counts calls
    struct ConstantArtifact {
        value: f64,
        calls: AtomicUsize,
    }

    impl ConstantArtifact {
        fn new(value: f64) -> Self {
            Self {
                value,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Artifact for ConstantArtifact {
        fn predict(&self, input: &FeatureMatrix) -> anyhow::Result<Vec<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if input.ncols() != NUM_FEATURES {
                anyhow::bail!("expected {} columns, got {}", NUM_FEATURES, input.ncols());
            }
            Ok(vec![self.value; input.nrows()])
        }

        fn kind(&self) -> &str {
            "stub"
        }
    }

    /// Echoes quantity * price so tests can see what reached the model
    struct EchoArtifact;

    impl Artifact for EchoArtifact {
        fn predict(&self, input: &FeatureMatrix) -> anyhow::Result<Vec<f64>> {
            Ok(input.rows().into_iter().map(|r| r[0] * r[1]).collect())
        }

        fn kind(&self) -> &str {
            "echo"
        }
    }

    struct NanArtifact;

    impl Artifact for NanArtifact {
        fn predict(&self, _input: &FeatureMatrix) -> anyhow::Result<Vec<f64>> {
            Ok(vec![f64::NAN])
        }

        fn kind(&self) -> &str {
            "nan"
        }
    }

    fn write_linear_model(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, r#"{"coefficients":[2.0,3.0],"intercept":1.0}"#).unwrap();
        path
    }

    #[test]
    fn test_stub_prediction_formats_as_currency() {
        let gateway = PredictorGateway::with_artifact(Arc::new(ConstantArtifact::new(5000.0)));

        let value = gateway.predict(77.0, 89.0).unwrap();
        assert_eq!(value, 5000.0);
        assert_eq!(format_currency(value), "$5,000.00");

        let outcome = gateway
            .predict_request(&PredictionRequest::default())
            .unwrap();
        assert_eq!(outcome.formatted, "$5,000.00");
    }

    #[test]
    fn test_zero_inputs_reach_the_model() {
        let gateway = PredictorGateway::with_artifact(Arc::new(EchoArtifact));
        assert_eq!(gateway.predict(0.0, 0.0).unwrap(), 0.0);
        assert_eq!(gateway.predict(4.0, 2.5).unwrap(), 10.0);
    }

    #[test]
    fn test_values_keep_f64_precision_end_to_end() {
        let intercept_only = LinearArtifact::new(vec![0.0, 0.0], 1_234_567.89);
        let gateway = PredictorGateway::with_artifact(Arc::new(intercept_only));
        let value = gateway.predict(1.0, 1.0).unwrap();
        assert_eq!(value, 1_234_567.89);
        assert_eq!(format_currency(value), "$1,234,567.89");

        let quantity_only = LinearArtifact::new(vec![1.0, 0.0], 0.0);
        let gateway = PredictorGateway::with_artifact(Arc::new(quantity_only));
        assert_eq!(gateway.predict(16_777_217.0, 0.0).unwrap(), 16_777_217.0);

        let gateway = PredictorGateway::with_artifact(Arc::new(EchoArtifact));
        assert_eq!(gateway.predict(1.0, 89.1).unwrap(), 89.1);
    }

    #[test]
    fn test_onnx_model_file_loads_and_predicts() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/linear_sales.onnx");
        let gateway = PredictorGateway::new(GatewayConfig::with_model_path(&path));

        let artifact = gateway.load().unwrap();
        assert_eq!(artifact.kind(), "onnx");
        assert_eq!(gateway.info().unwrap().kind, "onnx");

        let value = gateway.predict(77.0, 89.0).unwrap();
        assert_eq!(value, 147.75);
        assert_eq!(format_currency(value), "$147.75");

        let err = gateway.predict_matrix(&FeatureMatrix::zeros((1, 3))).unwrap_err();
        assert!(matches!(err, GatewayError::PredictionError(_)));
        assert!(!err.is_fatal());
        assert_eq!(gateway.predict(0.0, 0.0).unwrap(), 10.0);
    }

    #[test]
    fn test_negative_input_rejected_before_model() {
        let stub = Arc::new(ConstantArtifact::new(1.0));
        let gateway = PredictorGateway::with_artifact(stub.clone());

        let err = gateway.predict(-1.0, 10.0).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_malformed_matrix_is_prediction_error_and_recoverable() {
        let gateway = PredictorGateway::with_artifact(Arc::new(ConstantArtifact::new(5000.0)));

        let bad = FeatureMatrix::zeros((1, 3));
        let err = gateway.predict_matrix(&bad).unwrap_err();
        assert!(matches!(err, GatewayError::PredictionError(_)));
        assert!(!err.is_fatal());

        // Later valid calls are unaffected
        assert_eq!(gateway.predict(77.0, 89.0).unwrap(), 5000.0);
    }

    #[test]
    fn test_non_finite_output_is_prediction_error() {
        let gateway = PredictorGateway::with_artifact(Arc::new(NanArtifact));
        let err = gateway.predict(1.0, 1.0).unwrap_err();
        assert!(matches!(err, GatewayError::PredictionError(_)));
    }

    #[test]
    fn test_missing_file_is_not_found_and_not_memoized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sales_prediction_model.json");
        let gateway = PredictorGateway::new(GatewayConfig::with_model_path(&path));

        for _ in 0..2 {
            let err = gateway.load().unwrap_err();
            assert!(matches!(err, GatewayError::ArtifactNotFound { .. }));
            assert!(err.is_fatal());
        }
        assert!(!gateway.is_loaded());
        assert!(matches!(
            gateway.predict(77.0, 89.0),
            Err(GatewayError::ArtifactNotFound { .. })
        ));

        // A model appearing later is picked up by the next attempt
        write_linear_model(&dir, "sales_prediction_model.json");
        assert!(gateway.load().is_ok());
        assert_eq!(gateway.load_count(), 1);
    }

    #[test]
    fn test_load_is_memoized() {
        let dir = TempDir::new().unwrap();
        let path = write_linear_model(&dir, "model.json");
        let gateway = PredictorGateway::new(GatewayConfig::with_model_path(&path));

        let first = gateway.load().unwrap();
        fs::remove_file(&path).unwrap();
        let second = gateway.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(gateway.load_count(), 1);
        assert_eq!(gateway.predict(10.0, 4.0).unwrap(), 33.0);
    }

    #[test]
    fn test_info_records_kind_and_checksum() {
        let dir = TempDir::new().unwrap();
        let path = write_linear_model(&dir, "model.json");
        let expected = compute_checksum(&fs::read(&path).unwrap());

        let gateway = PredictorGateway::new(GatewayConfig::with_model_path(&path));
        assert!(gateway.info().is_none());
        gateway.load().unwrap();

        let info = gateway.info().unwrap();
        assert_eq!(info.kind, "linear");
        assert_eq!(info.sha256, expected);
        assert_eq!(info.path, path);
    }

    #[test]
    fn test_checksum_mismatch_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = write_linear_model(&dir, "model.json");
        let config = GatewayConfig {
            expected_sha256: Some("00".repeat(32)),
            ..GatewayConfig::with_model_path(&path)
        };

        let err = PredictorGateway::new(config).load().unwrap_err();
        assert!(matches!(err, GatewayError::ArtifactLoadError { .. }));
        assert!(err.user_message().contains("Checksum mismatch"));
    }

    #[test]
    fn test_matching_checksum_loads() {
        let dir = TempDir::new().unwrap();
        let path = write_linear_model(&dir, "model.json");
        let checksum = compute_checksum(&fs::read(&path).unwrap());
        let config = GatewayConfig {
            expected_sha256: Some(checksum.to_uppercase()),
            ..GatewayConfig::with_model_path(&path)
        };

        assert!(PredictorGateway::new(config).load().is_ok());
    }

    #[test]
    fn test_corrupt_or_unsupported_files_are_load_errors() {
        let dir = TempDir::new().unwrap();

        let corrupt = dir.path().join("model.json");
        fs::write(&corrupt, "{ not json").unwrap();
        let err = PredictorGateway::new(GatewayConfig::with_model_path(&corrupt))
            .load()
            .unwrap_err();
        assert!(matches!(err, GatewayError::ArtifactLoadError { .. }));

        let pickle = dir.path().join("sales_prediction_model.pkl");
        fs::write(&pickle, [0x80u8, 0x04, 0x95]).unwrap();
        let err = PredictorGateway::new(GatewayConfig::with_model_path(&pickle))
            .load()
            .unwrap_err();
        assert!(matches!(err, GatewayError::ArtifactLoadError { .. }));
        assert!(err.user_message().contains("Unsupported model format"));
    }

    #[test]
    fn test_concurrent_first_loads_read_once() {
        let dir = TempDir::new().unwrap();
        let path = write_linear_model(&dir, "model.json");
        let gateway = Arc::new(PredictorGateway::new(GatewayConfig::with_model_path(&path)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gateway = Arc::clone(&gateway);
                std::thread::spawn(move || gateway.load().map(|_| ()))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(gateway.load_count(), 1);
    }
}
