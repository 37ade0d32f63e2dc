// ABOUTME: Route handlers for nutrition profiles and client assessments
// ABOUTME: Intake wellness data consumed by the AI plan-generation prompt
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use super::{authenticate, ServerResources};
use crate::database::assessments::AssessmentsManager;
use crate::database::clients::ClientsManager;
use crate::database::nutrition::{NutritionManager, UpsertNutritionProfileRequest};
use crate::errors::AppError;

/// Request to create a catalog assessment
#[derive(Debug, Deserialize)]
pub struct CreateAssessmentRequest {
    pub name: String,
    pub category: Option<String>,
}

/// Request to record a client's assessment submission
#[derive(Debug, Deserialize)]
pub struct SaveClientAssessmentRequest {
    pub client_id: i64,
    pub assessment_id: i64,
    pub input_data: serde_json::Value,
}

/// Request to store computed TDEE values
#[derive(Debug, Deserialize)]
pub struct UpdateTdeeRequest {
    pub client_id: i64,
    pub normal_tdee: f64,
    pub average_tdee: f64,
}

/// Wellness routes handler
pub struct WellnessRoutes;

impl WellnessRoutes {
    /// Create all wellness routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/add_nutrition_form/:client_id", post(Self::handle_upsert_nutrition))
            .route(
                "/api/get_relatable_nutrition_data/:client_id",
                get(Self::handle_get_nutrition),
            )
            .route("/api/update_tdee", post(Self::handle_update_tdee))
            .route("/api/assessments", get(Self::handle_list_assessments))
            .route("/api/assessments", post(Self::handle_create_assessment))
            .route("/api/save_client_assessment", post(Self::handle_save_client_assessment))
            .route(
                "/api/client_assessments/:client_id",
                get(Self::handle_list_client_assessments),
            )
            .with_state(resources)
    }

    /// Check that the client belongs to the authenticated trainer
    async fn ensure_owned_client(
        resources: &Arc<ServerResources>,
        trainer_id: i64,
        client_id: i64,
    ) -> Result<(), AppError> {
        let clients = ClientsManager::new(resources.database.pool().clone());
        let owned = clients
            .get(client_id)
            .await?
            .is_some_and(|client| client.trainer_id == trainer_id);
        if owned {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Client {client_id}")))
        }
    }

    /// Handle POST /api/add_nutrition_form/:client_id
    async fn handle_upsert_nutrition(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
        Json(body): Json<UpsertNutritionProfileRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        Self::ensure_owned_client(&resources, auth.trainer_id, client_id).await?;

        let manager = NutritionManager::new(resources.database.pool().clone());
        let profile = manager.upsert(client_id, &body).await?;

        Ok((StatusCode::OK, Json(profile)).into_response())
    }

    /// Handle GET /api/get_relatable_nutrition_data/:client_id
    async fn handle_get_nutrition(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        Self::ensure_owned_client(&resources, auth.trainer_id, client_id).await?;

        let manager = NutritionManager::new(resources.database.pool().clone());
        let profile = manager
            .get_by_client(client_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Nutrition profile for client {client_id}")))?;

        Ok((StatusCode::OK, Json(profile)).into_response())
    }

    /// Handle POST /api/update_tdee
    async fn handle_update_tdee(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<UpdateTdeeRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        Self::ensure_owned_client(&resources, auth.trainer_id, body.client_id).await?;

        let manager = NutritionManager::new(resources.database.pool().clone());
        let updated = manager
            .update_tdee(body.client_id, body.normal_tdee, body.average_tdee)
            .await?;
        if !updated {
            return Err(AppError::not_found(format!(
                "Nutrition profile for client {}",
                body.client_id
            )));
        }

        Ok((StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response())
    }

    /// Handle GET /api/assessments - the assessment catalog
    async fn handle_list_assessments(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        let manager = AssessmentsManager::new(resources.database.pool().clone());
        let assessments = manager.list_global().await?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "assessments": assessments })),
        )
            .into_response())
    }

    /// Handle POST /api/assessments - add a catalog assessment
    async fn handle_create_assessment(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateAssessmentRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        if body.name.trim().is_empty() {
            return Err(AppError::missing_field("name"));
        }

        let manager = AssessmentsManager::new(resources.database.pool().clone());
        let assessment = manager
            .create_global(body.name.trim(), body.category.as_deref())
            .await?;

        Ok((StatusCode::CREATED, Json(assessment)).into_response())
    }

    /// Handle POST /api/save_client_assessment
    async fn handle_save_client_assessment(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<SaveClientAssessmentRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        Self::ensure_owned_client(&resources, auth.trainer_id, body.client_id).await?;

        let manager = AssessmentsManager::new(resources.database.pool().clone());
        let saved = manager
            .save_client_assessment(body.client_id, body.assessment_id, &body.input_data)
            .await?;

        Ok((StatusCode::CREATED, Json(saved)).into_response())
    }

    /// Handle GET /api/client_assessments/:client_id
    async fn handle_list_client_assessments(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        Self::ensure_owned_client(&resources, auth.trainer_id, client_id).await?;

        let manager = AssessmentsManager::new(resources.database.pool().clone());
        let assessments = manager.list_by_client(client_id).await?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "assessments": assessments })),
        )
            .into_response())
    }
}
