//! Sales prediction web app
//!
//! Serves the single-page prediction form and the health/metrics endpoints
//! on top of the predictor gateway.

pub mod api;
pub mod config;
pub mod page;
