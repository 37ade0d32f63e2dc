// ABOUTME: Route handlers for demo and generated workout plans
// ABOUTME: AI generation, plan CRUD, pinning, and completion-status queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{authenticate, ServerResources};
use crate::database::assessments::AssessmentsManager;
use crate::database::clients::ClientsManager;
use crate::database::plans::{PlanKind, PlansManager};
use crate::errors::AppError;
use crate::llm::{ChatMessage, ChatRequest};
use crate::plans::{build_plan_prompt, demo_plan_name, extract_plan_title, format_assessment_findings};

/// Request to generate a plan for a client
#[derive(Debug, Deserialize)]
pub struct GeneratePlanRequest {
    #[serde(rename = "promptContent")]
    pub prompt_content: String,
    pub comments: Option<String>,
}

/// Request to update a stored plan
#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    pub name: String,
    pub plan_details: String,
}

/// Plan routes handler
pub struct PlansRoutes;

impl PlansRoutes {
    /// Create all plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/generate_quick_plan/:client_id", post(Self::handle_generate_quick))
            .route(
                "/api/generate_custom_plan/:client_id",
                post(Self::handle_generate_custom),
            )
            .route("/api/plans/:kind/:id", get(Self::handle_get))
            .route("/api/plans/:kind/:id", post(Self::handle_update))
            .route("/api/plans/:kind/:id", delete(Self::handle_delete))
            .route("/api/plans/:kind/latest/:client_id", get(Self::handle_latest))
            .route("/api/plans/:kind/client/:client_id", get(Self::handle_list_by_client))
            .route("/api/plans/:kind/:id/pin", post(Self::handle_pin))
            .route("/api/plans/:kind/:id/pin", delete(Self::handle_unpin))
            .route("/api/plans/:kind/:id/pin", get(Self::handle_check_pin))
            .route(
                "/api/plans/:kind/:id/completion_status",
                get(Self::handle_completion_status),
            )
            .with_state(resources)
    }

    fn plans(resources: &Arc<ServerResources>) -> PlansManager {
        PlansManager::new(resources.database.pool().clone())
    }

    fn parse_kind(kind: &str) -> Result<PlanKind, AppError> {
        PlanKind::parse(kind)
    }

    /// Generate a plan body for a client via the chat-completion API
    async fn generate_for_client(
        resources: &Arc<ServerResources>,
        trainer_id: i64,
        client_id: i64,
        request: &GeneratePlanRequest,
        kind: PlanKind,
    ) -> Result<Response, AppError> {
        if request.prompt_content.trim().is_empty() {
            return Err(AppError::invalid_input(
                "No prompt selected. Please select a prompt.",
            ));
        }

        let clients = ClientsManager::new(resources.database.pool().clone());
        let client = clients
            .get(client_id)
            .await?
            .filter(|client| client.trainer_id == trainer_id)
            .ok_or_else(|| AppError::not_found(format!("Client {client_id}")))?;

        let assessments = AssessmentsManager::new(resources.database.pool().clone());
        let findings = assessments.findings_for_client(client_id).await?;
        let findings_text = format_assessment_findings(&findings);

        let prompt = build_plan_prompt(
            &request.prompt_content,
            &findings_text,
            request.comments.as_deref(),
        );

        let chat_request = ChatRequest::new(vec![
            ChatMessage::system("You are a fitness trainer."),
            ChatMessage::user(prompt),
        ])
        .with_temperature(0.0)
        .with_max_tokens(resources.config.llm.max_tokens);

        let completion = resources.llm.complete(&chat_request).await?;
        let details = completion.content.trim().to_owned();

        let title = extract_plan_title(&details, "Workout Plan");
        let name = match kind {
            PlanKind::Demo => demo_plan_name(&title),
            PlanKind::Generated => title,
        };

        let manager = Self::plans(resources);
        let plan = manager.create(kind, client.id, &name, &details).await?;

        info!(plan_id = plan.id, kind = kind.as_str(), client_id, "plan generated");
        Ok((StatusCode::CREATED, Json(plan)).into_response())
    }

    /// Handle POST /api/generate_quick_plan/:client_id - demo plan
    async fn handle_generate_quick(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
        Json(body): Json<GeneratePlanRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        Self::generate_for_client(&resources, auth.trainer_id, client_id, &body, PlanKind::Demo)
            .await
    }

    /// Handle POST /api/generate_custom_plan/:client_id - generated plan
    async fn handle_generate_custom(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
        Json(body): Json<GeneratePlanRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        Self::generate_for_client(
            &resources,
            auth.trainer_id,
            client_id,
            &body,
            PlanKind::Generated,
        )
        .await
    }

    /// Handle GET /api/plans/:kind/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((kind, plan_id)): Path<(String, i64)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let kind = Self::parse_kind(&kind)?;

        let manager = Self::plans(&resources);
        let plan = manager
            .get(kind, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plan {plan_id}")))?;

        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Handle GET /api/plans/:kind/latest/:client_id
    async fn handle_latest(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((kind, client_id)): Path<(String, i64)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let kind = Self::parse_kind(&kind)?;

        let manager = Self::plans(&resources);
        let plan = manager
            .latest_by_client(kind, client_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Plan for client {client_id}"))
            })?;

        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Handle GET /api/plans/:kind/client/:client_id - a client's plans
    async fn handle_list_by_client(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((kind, client_id)): Path<(String, i64)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let kind = Self::parse_kind(&kind)?;

        let manager = Self::plans(&resources);
        let plans = manager.list_by_client(kind, client_id).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "plans": plans }))).into_response())
    }

    /// Handle POST /api/plans/:kind/:id - update name and body
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((kind, plan_id)): Path<(String, i64)>,
        Json(body): Json<UpdatePlanRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let kind = Self::parse_kind(&kind)?;

        if body.name.trim().is_empty() || body.plan_details.trim().is_empty() {
            return Err(AppError::missing_field("name/plan_details"));
        }

        let manager = Self::plans(&resources);
        let updated = manager
            .update_details(kind, plan_id, body.name.trim(), &body.plan_details)
            .await?;
        if !updated {
            return Err(AppError::not_found(format!("Plan {plan_id}")));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response())
    }

    /// Handle DELETE /api/plans/:kind/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((kind, plan_id)): Path<(String, i64)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let kind = Self::parse_kind(&kind)?;

        let manager = Self::plans(&resources);
        let deleted = manager.delete(kind, plan_id).await?;
        if !deleted {
            return Err(AppError::not_found(format!("Plan {plan_id}")));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle POST /api/plans/:kind/:id/pin - pin for today
    ///
    /// An already-active pin is a no-op reported as `pinned: false`.
    async fn handle_pin(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((kind, plan_id)): Path<(String, i64)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let kind = Self::parse_kind(&kind)?;

        let manager = Self::plans(&resources);
        let pinned = manager.pin_for_today(kind, plan_id).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "pinned": pinned }))).into_response())
    }

    /// Handle DELETE /api/plans/:kind/:id/pin - unpin
    async fn handle_unpin(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((kind, plan_id)): Path<(String, i64)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let kind = Self::parse_kind(&kind)?;

        let manager = Self::plans(&resources);
        let unpinned = manager.unpin(kind, plan_id).await?;
        if !unpinned {
            return Err(AppError::not_found(format!("Plan {plan_id}")));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response())
    }

    /// Handle GET /api/plans/:kind/:id/pin - pin status (lazy expiry)
    async fn handle_check_pin(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((kind, plan_id)): Path<(String, i64)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let kind = Self::parse_kind(&kind)?;

        let manager = Self::plans(&resources);
        let is_pinned = manager.check_pin_status(kind, plan_id).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "is_pinned": is_pinned }))).into_response())
    }

    /// Handle GET /api/plans/:kind/:id/completion_status
    async fn handle_completion_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((kind, plan_id)): Path<(String, i64)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let kind = Self::parse_kind(&kind)?;

        let manager = Self::plans(&resources);
        let report = manager.completion_status_and_date(kind, plan_id).await?;

        Ok((StatusCode::OK, Json(report)).into_response())
    }
}
