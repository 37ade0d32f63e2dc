// ABOUTME: Route handlers for client management
// ABOUTME: Client CRUD plus emailing a stored plan to the client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{authenticate, ServerResources};
use crate::database::clients::{ClientsManager, UpsertClientRequest};
use crate::database::plans::{PlanKind, PlansManager};
use crate::errors::AppError;

/// Request to check for an existing client before adding
#[derive(Debug, Deserialize)]
pub struct CheckClientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

/// Request to email a stored plan to its client
#[derive(Debug, Deserialize)]
pub struct EmailPlanRequest {
    pub client_id: i64,
    pub plan_type: String,
    pub plan_id: i64,
}

/// Client routes handler
pub struct ClientsRoutes;

impl ClientsRoutes {
    /// Create all client routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/add_client", post(Self::handle_create))
            .route("/api/check_client", post(Self::handle_check))
            .route("/api/existing_clients", get(Self::handle_list))
            .route("/api/current_client/:id", get(Self::handle_get))
            .route("/api/update_client_data/:id", put(Self::handle_update))
            .route("/api/delete_client/:id", delete(Self::handle_delete))
            .route("/api/email_plan_to_client", post(Self::handle_email_plan))
            .with_state(resources)
    }

    fn manager(resources: &Arc<ServerResources>) -> ClientsManager {
        ClientsManager::new(resources.database.pool().clone())
    }

    /// Handle POST /api/add_client
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<UpsertClientRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
            return Err(AppError::missing_field("first_name/last_name"));
        }

        let manager = Self::manager(&resources);
        let client = manager.create(auth.trainer_id, &body).await?;

        info!(client_id = client.id, trainer_id = auth.trainer_id, "client added");
        Ok((StatusCode::CREATED, Json(client)).into_response())
    }

    /// Handle POST /api/check_client - duplicate check before adding
    async fn handle_check(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CheckClientRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let exists = manager
            .exists(
                auth.trainer_id,
                body.first_name.trim(),
                body.last_name.trim(),
                body.email.as_deref(),
            )
            .await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "exists": exists }))).into_response())
    }

    /// Handle GET /api/existing_clients
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let clients = manager.list_by_trainer(auth.trainer_id).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "clients": clients }))).into_response())
    }

    /// Handle GET /api/current_client/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let client = manager
            .get(client_id)
            .await?
            .filter(|client| client.trainer_id == auth.trainer_id)
            .ok_or_else(|| AppError::not_found(format!("Client {client_id}")))?;

        Ok((StatusCode::OK, Json(client)).into_response())
    }

    /// Handle PUT /api/update_client_data/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
        Json(body): Json<UpsertClientRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let client = manager
            .update(client_id, auth.trainer_id, &body)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Client {client_id}")))?;

        Ok((StatusCode::OK, Json(client)).into_response())
    }

    /// Handle DELETE /api/delete_client/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let deleted = manager.delete(client_id, auth.trainer_id).await?;
        if !deleted {
            return Err(AppError::not_found(format!("Client {client_id}")));
        }

        info!(client_id, trainer_id = auth.trainer_id, "client deleted");
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle POST /api/email_plan_to_client
    async fn handle_email_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<EmailPlanRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let clients = Self::manager(&resources);
        let client = clients
            .get(body.client_id)
            .await?
            .filter(|client| client.trainer_id == auth.trainer_id)
            .ok_or_else(|| AppError::not_found(format!("Client {}", body.client_id)))?;

        let client_email = client
            .email
            .as_deref()
            .ok_or_else(|| AppError::invalid_input("Client has no email address on file"))?;

        let kind = PlanKind::parse(&body.plan_type)?;
        let plans = PlansManager::new(resources.database.pool().clone());
        let plan = plans
            .get(kind, body.plan_id)
            .await?
            .filter(|plan| plan.client_id == client.id)
            .ok_or_else(|| AppError::not_found(format!("Plan {}", body.plan_id)))?;

        let client_name = format!("{} {}", client.first_name, client.last_name);
        let trainer_name = format!(
            "{} {}",
            client.trainer_first_name.as_deref().unwrap_or_default(),
            client.trainer_last_name.as_deref().unwrap_or_default()
        );

        resources
            .email
            .send_plan(client_email, &client_name, trainer_name.trim(), &plan.name, &plan.details)
            .await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response())
    }
}
