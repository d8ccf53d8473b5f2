//! Axum HTTP API for canvas video rendering.
//!
//! This crate provides:
//! - `POST /api/process-video`, the authenticated render call
//! - `GET /api/sources/classify`, video source classification
//! - Firebase ID token verification
//! - Security headers, request IDs and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod state;

pub use auth::{AuthUser, DenyAll, JwksCache, TokenVerifier};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
