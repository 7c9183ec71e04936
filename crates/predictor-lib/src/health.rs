//! Health reporting for the sales app
//!
//! The model gateway is the only part with a lifecycle: it is pending until
//! startup tries to load the model, then either loaded or failed for good.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Where the model gateway is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GatewayState {
    Pending,
    Loaded,
    Failed { message: String },
}

/// Liveness verdict derived from the gateway state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Body of `/healthz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub gateway: GatewayState,
    /// Unix time of the last gateway state change
    pub updated_at: i64,
}

/// Body of `/readyz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug)]
struct HealthState {
    gateway: GatewayState,
    updated_at: i64,
    started: bool,
}

/// Shared handle updated at startup and read by the probes
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    state: Arc<RwLock<HealthState>>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(HealthState {
                gateway: GatewayState::Pending,
                updated_at: chrono::Utc::now().timestamp(),
                started: false,
            })),
        }
    }

    async fn set_gateway(&self, gateway: GatewayState) {
        let mut state = self.state.write().await;
        state.gateway = gateway;
        state.updated_at = chrono::Utc::now().timestamp();
    }

    pub async fn set_gateway_loaded(&self) {
        self.set_gateway(GatewayState::Loaded).await;
    }

    pub async fn set_gateway_failed(&self, message: impl Into<String>) {
        self.set_gateway(GatewayState::Failed {
            message: message.into(),
        })
        .await;
    }

    /// Mark startup as finished
    pub async fn set_ready(&self, ready: bool) {
        self.state.write().await.started = ready;
    }

    pub async fn health(&self) -> HealthResponse {
        let state = self.state.read().await;
        let status = match state.gateway {
            GatewayState::Failed { .. } => HealthStatus::Unhealthy,
            GatewayState::Pending | GatewayState::Loaded => HealthStatus::Healthy,
        };

        HealthResponse {
            status,
            gateway: state.gateway.clone(),
            updated_at: state.updated_at,
        }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let state = self.state.read().await;

        let reason = if !state.started {
            Some("App not yet initialized")
        } else {
            match state.gateway {
                GatewayState::Loaded => None,
                GatewayState::Pending => Some("Model not loaded"),
                GatewayState::Failed { .. } => Some("Model gateway unavailable"),
            }
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason: reason.map(str::to_string),
        }
    }
}
