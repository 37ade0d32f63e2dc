// ABOUTME: Route handlers for the trainer dashboard
// ABOUTME: Client counts and the pinned "today" plan feed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use super::{authenticate, ServerResources};
use crate::database::clients::ClientsManager;
use crate::database::plans::PlansManager;
use crate::errors::AppError;

/// Dashboard routes handler
pub struct DashboardRoutes;

impl DashboardRoutes {
    /// Create all dashboard routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/total_clients", get(Self::handle_total_clients))
            .route("/api/get_pinned_plans", get(Self::handle_pinned_plans))
            .with_state(resources)
    }

    /// Handle GET /api/total_clients
    async fn handle_total_clients(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = ClientsManager::new(resources.database.pool().clone());
        let total = manager.count_by_trainer(auth.trainer_id).await?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "total_clients": total })),
        )
            .into_response())
    }

    /// Handle GET /api/get_pinned_plans - the "today" feed of actively
    /// pinned plans across the trainer's clients
    async fn handle_pinned_plans(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = PlansManager::new(resources.database.pool().clone());
        let pinned = manager.get_pinned_plans(auth.trainer_id).await?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "pinned_plans": pinned })),
        )
            .into_response())
    }
}
