// ABOUTME: Database operations for trainer accounts
// ABOUTME: Handles registration, login lookup, and profile updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::errors::{AppError, AppResult};

/// A trainer account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// bcrypt hash, never serialized into responses
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub specializations: Option<String>,
    pub years_experience: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to register a trainer (password already hashed by the caller)
#[derive(Debug, Clone)]
pub struct CreateTrainerRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Profile fields a trainer can edit after registration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTrainerProfileRequest {
    pub bio: Option<String>,
    pub specializations: Option<String>,
    pub years_experience: Option<i64>,
}

/// Trainer database operations manager
pub struct TrainersManager {
    pool: SqlitePool,
}

impl TrainersManager {
    /// Create a new trainers manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new trainer account
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the email is taken, or a
    /// database error on other failures
    pub async fn create(&self, request: &CreateTrainerRequest) -> AppResult<Trainer> {
        let now = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO trainers (first_name, last_name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                AppError::already_exists(format!("Trainer with email {}", request.email))
            } else {
                AppError::database(format!("Failed to create trainer: {e}"))
            }
        })?;

        Ok(Trainer {
            id: result.last_insert_rowid(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            password_hash: request.password_hash.clone(),
            bio: None,
            specializations: None,
            years_experience: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a trainer by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, trainer_id: i64) -> AppResult<Option<Trainer>> {
        let row = sqlx::query("SELECT * FROM trainers WHERE id = $1")
            .bind(trainer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get trainer: {e}")))?;

        row.map(|r| row_to_trainer(&r)).transpose()
    }

    /// Get a trainer by email (login lookup)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Trainer>> {
        let row = sqlx::query("SELECT * FROM trainers WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get trainer by email: {e}")))?;

        row.map(|r| row_to_trainer(&r)).transpose()
    }

    /// Update a trainer's profile fields
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_profile(
        &self,
        trainer_id: i64,
        request: &UpdateTrainerProfileRequest,
    ) -> AppResult<Option<Trainer>> {
        let Some(existing) = self.get(trainer_id).await? else {
            return Ok(None);
        };

        let bio = request.bio.clone().or(existing.bio);
        let specializations = request.specializations.clone().or(existing.specializations);
        let years_experience = request.years_experience.or(existing.years_experience);

        let result = sqlx::query(
            r"
            UPDATE trainers
            SET bio = $1, specializations = $2, years_experience = $3, updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(&bio)
        .bind(&specializations)
        .bind(years_experience)
        .bind(Utc::now().to_rfc3339())
        .bind(trainer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update trainer profile: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(trainer_id).await
    }
}

/// Convert a database row to a `Trainer`
fn row_to_trainer(row: &SqliteRow) -> AppResult<Trainer> {
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Trainer {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        bio: row.get("bio"),
        specializations: row.get("specializations"),
        years_experience: row.get("years_experience"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Parse a stored RFC 3339 timestamp
pub(crate) fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))
}
