// ABOUTME: Route handlers for intake questions, trainer overlays, and form answers
// ABOUTME: Exposes the resolved per-trainer question set and overlay writes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use super::{authenticate, ServerResources};
use crate::database::clients::ClientsManager;
use crate::database::intake::{AnswerInput, IntakeManager};
use crate::database::questions::{QuestionsManager, UpsertOverlayRequest};
use crate::errors::AppError;
use crate::intake::QuestionFilter;

/// Request to open an intake form for a client
#[derive(Debug, Deserialize)]
pub struct CreateFormRequest {
    pub form_type: String,
    pub client_id: i64,
}

/// Request to save a batch of answers
#[derive(Debug, Deserialize)]
pub struct SaveAnswersRequest {
    pub answers: Vec<AnswerInput>,
}

/// Intake routes handler
pub struct IntakeRoutes;

impl IntakeRoutes {
    /// Create all intake routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/intake_questions", get(Self::handle_resolve_questions))
            .route("/api/intake_questions/overlay", post(Self::handle_upsert_overlay))
            .route(
                "/api/intake_questions/trainer/:id",
                delete(Self::handle_delete_trainer_question),
            )
            .route("/api/intake_forms", post(Self::handle_create_form))
            .route("/api/intake_forms/client/:id", get(Self::handle_list_forms))
            .route("/api/intake_forms/:id/answers", post(Self::handle_save_answers))
            .route("/api/intake_forms/:id/answers", get(Self::handle_list_answers))
            .with_state(resources)
    }

    fn questions(resources: &Arc<ServerResources>) -> QuestionsManager {
        QuestionsManager::new(resources.database.pool().clone())
    }

    fn forms(resources: &Arc<ServerResources>) -> IntakeManager {
        IntakeManager::new(resources.database.pool().clone())
    }

    /// Handle GET /api/intake_questions - the trainer's effective question set
    ///
    /// Query parameters: `category`, `template`, `defaults_only`.
    async fn handle_resolve_questions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(filter): Query<QuestionFilter>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = Self::questions(&resources);
        let questions = manager.resolve_for_trainer(auth.trainer_id, &filter).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "questions": questions }))).into_response())
    }

    /// Handle POST /api/intake_questions/overlay - write a trainer overlay
    async fn handle_upsert_overlay(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<UpsertOverlayRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = Self::questions(&resources);
        let overlay = manager.upsert_overlay(auth.trainer_id, &body).await?;

        Ok((StatusCode::OK, Json(overlay)).into_response())
    }

    /// Handle DELETE /api/intake_questions/trainer/:id - remove a
    /// trainer-original question
    async fn handle_delete_trainer_question(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(overlay_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = Self::questions(&resources);
        manager.delete_trainer_question(auth.trainer_id, overlay_id).await?;

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle POST /api/intake_forms - open a form instance for a client
    async fn handle_create_form(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateFormRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        if body.form_type.trim().is_empty() {
            return Err(AppError::missing_field("form_type"));
        }

        let clients = ClientsManager::new(resources.database.pool().clone());
        let owned = clients
            .get(body.client_id)
            .await?
            .is_some_and(|client| client.trainer_id == auth.trainer_id);
        if !owned {
            return Err(AppError::not_found(format!("Client {}", body.client_id)));
        }

        let manager = Self::forms(&resources);
        let form = manager
            .create_form(body.form_type.trim(), body.client_id, auth.trainer_id)
            .await?;

        Ok((StatusCode::CREATED, Json(form)).into_response())
    }

    /// Handle GET /api/intake_forms/client/:id - a client's forms
    async fn handle_list_forms(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        let manager = Self::forms(&resources);
        let forms = manager.list_forms_by_client(client_id).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "forms": forms }))).into_response())
    }

    /// Handle POST /api/intake_forms/:id/answers - save a batch of answers
    async fn handle_save_answers(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(form_id): Path<i64>,
        Json(body): Json<SaveAnswersRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        if body.answers.is_empty() {
            return Err(AppError::missing_field("answers"));
        }

        let manager = Self::forms(&resources);
        let saved = manager.save_answers(form_id, &body.answers).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "saved": saved }))).into_response())
    }

    /// Handle GET /api/intake_forms/:id/answers
    async fn handle_list_answers(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(form_id): Path<i64>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        let manager = Self::forms(&resources);
        let answers = manager.list_answers(form_id).await?;

        Ok((StatusCode::OK, Json(serde_json::json!({ "answers": answers }))).into_response())
    }
}
