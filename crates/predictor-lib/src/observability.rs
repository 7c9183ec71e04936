//! Observability infrastructure for the sales predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency, prediction/error counts, model state)
//! - Structured JSON logging with tracing

use prometheus::{register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Histogram buckets for inference latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<GatewayMetricsInner> = OnceLock::new();

struct GatewayMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounter,
    model_loads_total: IntCounter,
    model_loaded: IntGauge,
}

impl GatewayMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "sales_app_prediction_latency_seconds",
                "Time spent running model inference for one prediction",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "sales_app_predictions_total",
                "Total number of successful predictions"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter!(
                "sales_app_prediction_errors_total",
                "Total number of failed predictions"
            )
            .expect("Failed to register prediction_errors_total"),

            model_loads_total: register_int_counter!(
                "sales_app_model_loads_total",
                "Number of times the model artifact was read from storage"
            )
            .expect("Failed to register model_loads_total"),

            model_loaded: register_int_gauge!(
                "sales_app_model_loaded",
                "1 when the model artifact is loaded, 0 otherwise"
            )
            .expect("Failed to register model_loaded"),
        }
    }
}

/// Gateway metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct GatewayMetrics {
    _private: (),
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(GatewayMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &GatewayMetricsInner {
        GLOBAL_METRICS.get_or_init(GatewayMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    /// Record a successful read of the artifact from storage
    pub fn record_model_load(&self) {
        self.inner().model_loads_total.inc();
        self.inner().model_loaded.set(1);
    }

    pub fn predictions(&self) -> u64 {
        self.inner().predictions_total.get()
    }

    pub fn prediction_errors(&self) -> u64 {
        self.inner().prediction_errors_total.get()
    }
}

/// Structured logger for app events
///
/// Provides consistent JSON-formatted logging for model loads,
/// predictions and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_model_loaded(&self, path: &Path, kind: &str, sha256: &str, size_bytes: usize) {
        info!(
            event = "model_loaded",
            instance = %self.instance,
            path = %path.display(),
            kind = %kind,
            sha256 = %sha256,
            size_bytes = size_bytes,
            "Model loaded successfully"
        );
    }

    pub fn log_model_load_failed(&self, path: &Path, reason: &str) {
        error!(
            event = "model_load_failed",
            instance = %self.instance,
            path = %path.display(),
            reason = %reason,
            "Model could not be loaded, predictions disabled"
        );
    }

    pub fn log_prediction(&self, quantity: f64, price: f64, predicted_sales: f64, elapsed_us: u128) {
        info!(
            event = "prediction_generated",
            instance = %self.instance,
            quantity = quantity,
            price = price,
            predicted_sales = predicted_sales,
            elapsed_us = elapsed_us as u64,
            "Generated sales prediction"
        );
    }

    pub fn log_prediction_failed(&self, quantity: f64, price: f64, reason: &str) {
        warn!(
            event = "prediction_failed",
            instance = %self.instance,
            quantity = quantity,
            price = price,
            reason = %reason,
            "Sales prediction failed"
        );
    }

    pub fn log_startup(&self, version: &str, model_path: &Path) {
        info!(
            event = "app_started",
            instance = %self.instance,
            app_version = %version,
            model_path = %model_path.display(),
            "Sales prediction app started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "app_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Sales prediction app shutting down"
        );
    }
}
