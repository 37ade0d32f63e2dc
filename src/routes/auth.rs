// ABOUTME: Route handlers for trainer registration, login, and profile management
// ABOUTME: Issues JWT session tokens consumed by every other route group
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{authenticate, ServerResources};
use crate::auth::{hash_password, is_valid_email, is_valid_password, verify_password};
use crate::database::trainers::{CreateTrainerRequest, Trainer, TrainersManager, UpdateTrainerProfileRequest};
use crate::errors::AppError;

/// Request to register a trainer
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Request to log in
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Trainer info embedded in auth responses
#[derive(Debug, Serialize)]
pub struct TrainerInfo {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: Option<String>,
    pub specializations: Option<String>,
    pub years_experience: Option<i64>,
}

impl From<Trainer> for TrainerInfo {
    fn from(trainer: Trainer) -> Self {
        Self {
            id: trainer.id,
            first_name: trainer.first_name,
            last_name: trainer.last_name,
            email: trainer.email,
            bio: trainer.bio,
            specializations: trainer.specializations,
            years_experience: trainer.years_experience,
        }
    }
}

/// Response for register/login
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub trainer: TrainerInfo,
}

/// Trainer auth routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all auth routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/register_trainer", post(Self::handle_register))
            .route("/api/login_trainer", post(Self::handle_login))
            .route("/api/trainer_profile", get(Self::handle_get_profile))
            .route("/api/trainer_profile", put(Self::handle_update_profile))
            .with_state(resources)
    }

    fn manager(resources: &Arc<ServerResources>) -> TrainersManager {
        TrainersManager::new(resources.database.pool().clone())
    }

    /// Handle POST /api/register_trainer
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        if !is_valid_email(&body.email) {
            return Err(AppError::invalid_input("Invalid email address"));
        }
        if !is_valid_password(&body.password) {
            return Err(AppError::invalid_input(
                "Password must be at least 8 characters",
            ));
        }
        if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
            return Err(AppError::missing_field("first_name/last_name"));
        }

        let manager = Self::manager(&resources);
        let trainer = manager
            .create(&CreateTrainerRequest {
                first_name: body.first_name.trim().to_owned(),
                last_name: body.last_name.trim().to_owned(),
                email: body.email.trim().to_lowercase(),
                password_hash: hash_password(&body.password)?,
            })
            .await?;

        info!(trainer_id = trainer.id, "trainer registered");
        let token = resources.auth.generate_token(trainer.id, &trainer.email)?;
        let response = SessionResponse {
            token,
            trainer: trainer.into(),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/login_trainer
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let manager = Self::manager(&resources);
        let trainer = manager
            .get_by_email(&body.email.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        if !verify_password(&body.password, &trainer.password_hash)? {
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        let token = resources.auth.generate_token(trainer.id, &trainer.email)?;
        let response = SessionResponse {
            token,
            trainer: trainer.into(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/trainer_profile
    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let trainer = manager
            .get(auth.trainer_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trainer {}", auth.trainer_id)))?;

        Ok((StatusCode::OK, Json(TrainerInfo::from(trainer))).into_response())
    }

    /// Handle PUT /api/trainer_profile
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<UpdateTrainerProfileRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let manager = Self::manager(&resources);
        let trainer = manager
            .update_profile(auth.trainer_id, &body)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trainer {}", auth.trainer_id)))?;

        Ok((StatusCode::OK, Json(TrainerInfo::from(trainer))).into_response())
    }
}
