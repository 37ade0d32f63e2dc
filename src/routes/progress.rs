// ABOUTME: Route handlers for workout session logging and the mark-plan-completed flow
// ABOUTME: Session CRUD, per-plan session queries, and session recap emails
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use super::{authenticate, ServerResources};
use crate::database::clients::ClientsManager;
use crate::database::plans::{PlanKind, PlansManager};
use crate::database::progress::{CreateSessionRequest, ProgressManager, UpdateSessionRequest};
use crate::errors::AppError;
use crate::plans::{parse_day_index, DayIndexInput};

/// Request to mark a plan (day) completed and log the session evidencing it
#[derive(Debug, Deserialize)]
pub struct MarkPlanCompletedRequest {
    pub client_id: i64,
    /// `generated` or `demo`
    pub plan_type: String,
    /// Absent for single-day generated plans
    pub day_index: Option<DayIndexInput>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub workout_type: Option<String>,
    pub duration_minutes: Option<i64>,
    /// The logged exercise text for the session
    pub combined_text: Option<String>,
    pub intensity_level: Option<String>,
    pub location: Option<String>,
    pub workout_rating: Option<i64>,
    pub trainer_notes: Option<String>,
}

/// Request to email a session recap
#[derive(Debug, Deserialize)]
pub struct EmailSessionRequest {
    pub client_id: i64,
    pub session_id: i64,
}

/// Workout progress routes handler
pub struct ProgressRoutes;

impl ProgressRoutes {
    /// Create all progress routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/add_workout_session", post(Self::handle_create))
            .route("/api/get_progress_session/:id", get(Self::handle_get))
            .route("/api/update_progress_session/:id", post(Self::handle_update))
            .route("/api/delete_progress_session/:id", delete(Self::handle_delete))
            .route("/api/mark_plan_completed/:plan_id", post(Self::handle_mark_plan_completed))
            .route(
                "/api/get_progress_sessions_by_plan/:kind/:plan_id",
                get(Self::handle_sessions_by_plan),
            )
            .route(
                "/api/get_progress_by_client/:client_id",
                get(Self::handle_sessions_by_client),
            )
            .route(
                "/api/get_single_day_generated_plan_progress/:client_id",
                get(Self::handle_single_day_progress),
            )
            .route(
                "/api/get_multi_day_plans_progress/:client_id",
                get(Self::handle_multi_day_progress),
            )
            .route("/api/email_session_to_client", post(Self::handle_email_session))
            .with_state(resources)
    }

    fn manager(resources: &Arc<ServerResources>) -> ProgressManager {
        ProgressManager::new(resources.database.pool().clone())
    }

    /// Handle POST /api/add_workout_session
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateSessionRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        if body.date.trim().is_empty()
            || body.workout_type.trim().is_empty()
            || body.exercises_log.trim().is_empty()
        {
            return Err(AppError::missing_field("date/workout_type/exercises_log"));
        }

        let manager = Self::manager(&resources);
        let session = manager.create(&body).await?;

        Ok((StatusCode::CREATED, Json(session)).into_response())
    }

    /// Handle GET /api/get_progress_session/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(session_id): Path<i64>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let session = manager
            .get(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Workout session {session_id}")))?;

        Ok((StatusCode::OK, Json(session)).into_response())
    }

    /// Handle POST /api/update_progress_session/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(session_id): Path<i64>,
        Json(body): Json<UpdateSessionRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let updated = manager.update(session_id, &body).await?;
        if !updated {
            return Err(AppError::not_found(format!("Workout session {session_id}")));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response())
    }

    /// Handle DELETE /api/delete_progress_session/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(session_id): Path<i64>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let deleted = manager.delete(session_id).await?;
        if !deleted {
            return Err(AppError::not_found(format!("Workout session {session_id}")));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle POST /api/mark_plan_completed/:plan_id
    ///
    /// Marks the day (or whole single-day plan) complete, logs the workout
    /// session evidencing it, then unconditionally unpins the plan: logging a
    /// session means today's job is done whether or not the plan finished.
    async fn handle_mark_plan_completed(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<i64>,
        Json(body): Json<MarkPlanCompletedRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        let kind = PlanKind::parse(&body.plan_type)?;
        let day_index = body.day_index.as_ref().map(parse_day_index).transpose()?;

        let plans = PlansManager::new(resources.database.pool().clone());
        let plan = match day_index {
            Some(day) => plans.mark_day_complete(kind, plan_id, day).await?,
            None => plans.mark_as_completed(kind, plan_id).await?,
        };

        let session_request = CreateSessionRequest {
            client_id: body.client_id,
            name: Some(body.name.clone().unwrap_or_else(|| "Workout Plan".to_owned())),
            date: body
                .date
                .clone()
                .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
            workout_type: body
                .workout_type
                .clone()
                .unwrap_or_else(|| "Strength Training".to_owned()),
            duration_minutes: body.duration_minutes.unwrap_or(60),
            exercises_log: body.combined_text.clone().unwrap_or_default(),
            intensity_level: body
                .intensity_level
                .clone()
                .unwrap_or_else(|| "moderate".to_owned()),
            location: body.location.clone().unwrap_or_else(|| "Local Gym".to_owned()),
            workout_rating: body.workout_rating.unwrap_or(5),
            trainer_notes: body.trainer_notes.clone(),
            workout_source: "AI".to_owned(),
            generated_plan_id: (kind == PlanKind::Generated).then_some(plan_id),
            demo_plan_id: (kind == PlanKind::Demo).then_some(plan_id),
            day_index: day_index.map(i64::from),
        };

        let progress = Self::manager(&resources);
        let session = progress.create(&session_request).await?;

        // The session is logged; a failed unpin only loses dashboard tidiness
        if let Err(e) = plans.unpin(kind, plan_id).await {
            error!(plan_id, "failed to unpin plan after completion: {e}");
        }

        info!(
            plan_id,
            kind = kind.as_str(),
            day_index,
            completed = plan.completed_marked,
            "plan completion recorded"
        );

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Plan marked as completed and logged as workout",
                "workout_log_id": session.id,
                "completed_marked": plan.completed_marked,
                "day_completion_status": plan.day_completion_status,
            })),
        )
            .into_response())
    }

    /// Handle GET /api/get_progress_sessions_by_plan/:kind/:plan_id
    async fn handle_sessions_by_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((kind, plan_id)): Path<(String, i64)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let kind = PlanKind::parse(&kind)?;

        let manager = Self::manager(&resources);
        let sessions = manager.list_by_plan(kind, plan_id).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "sessions": sessions }))).into_response())
    }

    /// Handle GET /api/get_progress_by_client/:client_id
    async fn handle_sessions_by_client(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let sessions = manager.list_by_client(client_id).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "sessions": sessions }))).into_response())
    }

    /// Handle GET /api/get_single_day_generated_plan_progress/:client_id
    async fn handle_single_day_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let sessions = manager.single_day_generated_progress(client_id).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "sessions": sessions }))).into_response())
    }

    /// Handle GET /api/get_multi_day_plans_progress/:client_id
    async fn handle_multi_day_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let sessions = manager.multi_day_plans_progress(client_id).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "sessions": sessions }))).into_response())
    }

    /// Handle POST /api/email_session_to_client
    async fn handle_email_session(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<EmailSessionRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let clients = ClientsManager::new(resources.database.pool().clone());
        let client = clients
            .get(body.client_id)
            .await?
            .filter(|client| client.trainer_id == auth.trainer_id)
            .ok_or_else(|| AppError::not_found(format!("Client {}", body.client_id)))?;

        let client_email = client
            .email
            .as_deref()
            .ok_or_else(|| AppError::invalid_input("Client has no email address on file"))?;

        let progress = Self::manager(&resources);
        let session = progress
            .get(body.session_id)
            .await?
            .filter(|session| session.client_id == client.id)
            .ok_or_else(|| AppError::not_found(format!("Workout session {}", body.session_id)))?;

        let client_name = format!("{} {}", client.first_name, client.last_name);
        let trainer_name = format!(
            "{} {}",
            client.trainer_first_name.as_deref().unwrap_or_default(),
            client.trainer_last_name.as_deref().unwrap_or_default()
        );

        resources
            .email
            .send_session_recap(client_email, &client_name, trainer_name.trim(), &session)
            .await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response())
    }
}
