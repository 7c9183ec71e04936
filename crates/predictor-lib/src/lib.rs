//! Predictor library for the sales prediction app
//!
//! This crate provides the core functionality for:
//! - Loading a pre-trained sales model once per process
//! - Mapping (quantity, price) onto the model's predict capability
//! - Currency formatting of predictions
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;

pub use error::GatewayError;
pub use health::{GatewayState, HealthRegistry, HealthResponse, HealthStatus, ReadinessResponse};
pub use models::*;
pub use observability::{GatewayMetrics, StructuredLogger};
