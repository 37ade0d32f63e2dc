// ABOUTME: HTTP route assembly and shared server resources
// ABOUTME: Builds the axum router, wires middleware, and hosts the health endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

//! # HTTP routes
//!
//! Each area exposes a `*Routes` struct with a
//! `routes(Arc<ServerResources>) -> Router` constructor; [`build_router`]
//! merges them and layers tracing and CORS on top. Handlers are thin: they
//! authenticate, validate the payload, call a database manager, and shape the
//! JSON response.

pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod intake;
pub mod plans;
pub mod progress;
pub mod wellness;

use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{AuthManager, AuthResult};
use crate::config::ServerConfig;
use crate::database::Database;
use crate::email::EmailService;
use crate::errors::AppResult;
use crate::llm::LlmProvider;

/// Shared state handed to every route handler
pub struct ServerResources {
    pub database: Database,
    pub auth: AuthManager,
    pub email: EmailService,
    pub llm: Box<dyn LlmProvider>,
    pub config: ServerConfig,
}

/// Extract and authenticate the trainer from the `Authorization` header
///
/// # Errors
///
/// Returns `AuthRequired`/`AuthInvalid`/`AuthExpired` per token state
pub(crate) fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> AppResult<AuthResult> {
    let auth_value = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok());
    resources.auth.authenticate_request(auth_value)
}

/// Assemble the full application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = if resources.config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = resources
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any)
    };

    Router::new()
        .route("/api/health", get(handle_health))
        .merge(auth::AuthRoutes::routes(resources.clone()))
        .merge(clients::ClientsRoutes::routes(resources.clone()))
        .merge(intake::IntakeRoutes::routes(resources.clone()))
        .merge(plans::PlansRoutes::routes(resources.clone()))
        .merge(progress::ProgressRoutes::routes(resources.clone()))
        .merge(wellness::WellnessRoutes::routes(resources.clone()))
        .merge(dashboard::DashboardRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Handle GET /api/health - liveness probe
async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "smartgains-server",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
        .into_response()
}
