//! HTTP API: the prediction form plus health checks and Prometheus metrics

use crate::page::{Notice, PageView};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use predictor_lib::{
    health::{HealthRegistry, HealthStatus},
    predictor::{format_prediction, Artifact, PredictorGateway},
    GatewayError, PredictionRequest,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<PredictorGateway>,
    pub health_registry: HealthRegistry,
    /// User-facing load error; when set the page is halted
    pub load_error: Option<String>,
}

impl AppState {
    pub fn new(
        gateway: Arc<PredictorGateway>,
        health_registry: HealthRegistry,
        load_error: Option<String>,
    ) -> Self {
        Self {
            gateway,
            health_registry,
            load_error,
        }
    }

    /// Load the model once and record the outcome in the health registry.
    ///
    /// A load failure is not an error here: the app keeps serving a halted
    /// page that explains what is missing.
    pub async fn bootstrap(gateway: Arc<PredictorGateway>) -> Self {
        let health_registry = HealthRegistry::new();

        let load_error = match gateway.load() {
            Ok(artifact) => {
                info!(kind = %artifact.kind(), "Model ready");
                health_registry.set_gateway_loaded().await;
                None
            }
            Err(e) => {
                health_registry.set_gateway_failed(e.user_message()).await;
                Some(e.user_message())
            }
        };

        health_registry.set_ready(true).await;
        Self::new(gateway, health_registry, load_error)
    }

    fn page(&self) -> PageView {
        PageView::default().halted(self.load_error.clone())
    }
}

/// Raw form fields; parsed by hand so bad input re-renders the page
#[derive(Debug, Default, Deserialize)]
pub struct PredictForm {
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub price: String,
}

impl PredictForm {
    pub fn parse(&self) -> Result<PredictionRequest, String> {
        let quantity: f64 = self
            .quantity
            .trim()
            .parse()
            .map_err(|_| format!("Quantity '{}' is not a number", self.quantity))?;
        if quantity.fract() != 0.0 {
            return Err(format!("Quantity must be a whole number (got {})", quantity));
        }

        let price: f64 = self
            .price
            .trim()
            .parse()
            .map_err(|_| format!("Price '{}' is not a number", self.price))?;

        let request = PredictionRequest::new(quantity, price);
        request.validate()?;
        Ok(request)
    }
}

/// Render the form
async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(state.page().render())
}

/// Handle a form submission
async fn predict(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PredictForm>,
) -> impl IntoResponse {
    if state.load_error.is_some() {
        return (StatusCode::SERVICE_UNAVAILABLE, Html(state.page().render()));
    }

    let view = PageView::with_inputs(form.quantity.clone(), form.price.clone());

    let request = match form.parse() {
        Ok(request) => request,
        Err(reason) => {
            warn!(reason = %reason, "Rejected form input");
            let view = view.notice(Notice::Error(format!("Invalid input: {}", reason)));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(view.render()));
        }
    };

    match state.gateway.predict(request.quantity, request.price) {
        Ok(value) => {
            let view = view.notice(Notice::Success(format_prediction(value)));
            (StatusCode::OK, Html(view.render()))
        }
        Err(e @ GatewayError::InvalidInput(_)) => {
            let view = view.notice(Notice::Error(e.user_message()));
            (StatusCode::UNPROCESSABLE_ENTITY, Html(view.render()))
        }
        Err(e) if e.is_fatal() => {
            let view = view.halted(Some(e.user_message()));
            (StatusCode::SERVICE_UNAVAILABLE, Html(view.render()))
        }
        Err(e) => {
            let view = view.notice(Notice::Error(e.user_message()));
            (StatusCode::OK, Html(view.render()))
        }
    }
}

/// Health check response - returns 503 once the model failed to load
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(addr: String, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
