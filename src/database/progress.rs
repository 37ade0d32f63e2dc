// ABOUTME: Database operations for logged workout sessions
// ABOUTME: Append-only progress rows, optionally linked to a plan and day index
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::plans::PlanKind;
use super::trainers::parse_timestamp;
use crate::errors::{AppError, AppResult};

/// A logged workout session. One row per completion event; rows linked to a
/// plan also carry the day index they evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: i64,
    pub client_id: i64,
    pub name: Option<String>,
    pub date: String,
    pub workout_type: String,
    pub duration_minutes: i64,
    pub exercises_log: String,
    pub intensity_level: String,
    pub location: String,
    pub workout_rating: i64,
    pub trainer_notes: Option<String>,
    pub workout_source: String,
    pub generated_plan_id: Option<i64>,
    pub demo_plan_id: Option<i64>,
    pub day_index: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_last_name: Option<String>,
}

/// Request to log a workout session
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub client_id: i64,
    pub name: Option<String>,
    pub date: String,
    pub workout_type: String,
    pub duration_minutes: i64,
    pub exercises_log: String,
    pub intensity_level: String,
    pub location: String,
    pub workout_rating: i64,
    pub trainer_notes: Option<String>,
    #[serde(default = "default_workout_source")]
    pub workout_source: String,
    pub generated_plan_id: Option<i64>,
    pub demo_plan_id: Option<i64>,
    pub day_index: Option<i64>,
}

fn default_workout_source() -> String {
    "manual".to_owned()
}

/// Editable fields of an existing session
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSessionRequest {
    pub name: Option<String>,
    pub date: String,
    pub workout_type: String,
    pub duration_minutes: i64,
    pub exercises_log: String,
    pub intensity_level: String,
    pub location: String,
    pub workout_rating: i64,
    pub trainer_notes: Option<String>,
}

/// Workout session database operations manager
pub struct ProgressManager {
    pool: SqlitePool,
}

impl ProgressManager {
    /// Create a new progress manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Log a workout session
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(&self, request: &CreateSessionRequest) -> AppResult<WorkoutSession> {
        let now = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO workout_progress (
                client_id, name, date, workout_type, duration_minutes, exercises_log,
                intensity_level, location, workout_rating, trainer_notes, workout_source,
                generated_plan_id, demo_plan_id, day_index, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
            ",
        )
        .bind(request.client_id)
        .bind(&request.name)
        .bind(&request.date)
        .bind(&request.workout_type)
        .bind(request.duration_minutes)
        .bind(&request.exercises_log)
        .bind(&request.intensity_level)
        .bind(&request.location)
        .bind(request.workout_rating)
        .bind(&request.trainer_notes)
        .bind(&request.workout_source)
        .bind(request.generated_plan_id)
        .bind(request.demo_plan_id)
        .bind(request.day_index)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to log workout session: {e}")))?;

        Ok(WorkoutSession {
            id: result.last_insert_rowid(),
            client_id: request.client_id,
            name: request.name.clone(),
            date: request.date.clone(),
            workout_type: request.workout_type.clone(),
            duration_minutes: request.duration_minutes,
            exercises_log: request.exercises_log.clone(),
            intensity_level: request.intensity_level.clone(),
            location: request.location.clone(),
            workout_rating: request.workout_rating,
            trainer_notes: request.trainer_notes.clone(),
            workout_source: request.workout_source.clone(),
            generated_plan_id: request.generated_plan_id,
            demo_plan_id: request.demo_plan_id,
            day_index: request.day_index,
            created_at: now,
            updated_at: now,
            client_first_name: None,
            client_last_name: None,
        })
    }

    /// Get a session by id, with joined client names
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, session_id: i64) -> AppResult<Option<WorkoutSession>> {
        let row = sqlx::query(
            r"
            SELECT wp.*, c.first_name AS client_first_name, c.last_name AS client_last_name
            FROM workout_progress wp
            JOIN clients c ON wp.client_id = c.id
            WHERE wp.id = $1
            ",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get workout session: {e}")))?;

        row.map(|r| row_to_session(&r, true)).transpose()
    }

    /// List all sessions for a client, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_by_client(&self, client_id: i64) -> AppResult<Vec<WorkoutSession>> {
        let rows = sqlx::query(
            "SELECT * FROM workout_progress WHERE client_id = $1 ORDER BY date DESC, id DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout sessions: {e}")))?;

        rows.iter().map(|r| row_to_session(r, false)).collect()
    }

    /// List sessions logged against a specific plan, with client names
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_by_plan(
        &self,
        kind: PlanKind,
        plan_id: i64,
    ) -> AppResult<Vec<WorkoutSession>> {
        let fk_column = match kind {
            PlanKind::Generated => "generated_plan_id",
            PlanKind::Demo => "demo_plan_id",
        };
        let query = format!(
            r"
            SELECT wp.*, c.first_name AS client_first_name, c.last_name AS client_last_name
            FROM workout_progress wp
            JOIN clients c ON wp.client_id = c.id
            WHERE wp.{fk_column} = $1
            ORDER BY wp.date DESC, wp.id DESC
            ",
        );

        let rows = sqlx::query(&query)
            .bind(plan_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list plan sessions: {e}")))?;

        rows.iter().map(|r| row_to_session(r, true)).collect()
    }

    /// Sessions for generated plans logged without a day index (single-day
    /// plan completions)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn single_day_generated_progress(
        &self,
        client_id: i64,
    ) -> AppResult<Vec<WorkoutSession>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM workout_progress
            WHERE client_id = $1 AND generated_plan_id IS NOT NULL AND day_index IS NULL
            ORDER BY date DESC, id DESC
            ",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list single-day progress: {e}")))?;

        rows.iter().map(|r| row_to_session(r, false)).collect()
    }

    /// Sessions logged against any plan day (multi-day plan progress)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn multi_day_plans_progress(&self, client_id: i64) -> AppResult<Vec<WorkoutSession>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM workout_progress
            WHERE client_id = $1 AND day_index IS NOT NULL
              AND (generated_plan_id IS NOT NULL OR demo_plan_id IS NOT NULL)
            ORDER BY date DESC, id DESC
            ",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list multi-day progress: {e}")))?;

        rows.iter().map(|r| row_to_session(r, false)).collect()
    }

    /// Update an existing session's editable fields
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update(
        &self,
        session_id: i64,
        request: &UpdateSessionRequest,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE workout_progress
            SET name = $1, date = $2, workout_type = $3, duration_minutes = $4,
                exercises_log = $5, intensity_level = $6, location = $7,
                workout_rating = $8, trainer_notes = $9, updated_at = $10
            WHERE id = $11
            ",
        )
        .bind(&request.name)
        .bind(&request.date)
        .bind(&request.workout_type)
        .bind(request.duration_minutes)
        .bind(&request.exercises_log)
        .bind(&request.intensity_level)
        .bind(&request.location)
        .bind(request.workout_rating)
        .bind(&request.trainer_notes)
        .bind(Utc::now().to_rfc3339())
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update workout session: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a session
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, session_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM workout_progress WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete workout session: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert a database row to a `WorkoutSession`
fn row_to_session(row: &SqliteRow, with_client_names: bool) -> AppResult<WorkoutSession> {
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(WorkoutSession {
        id: row.get("id"),
        client_id: row.get("client_id"),
        name: row.get("name"),
        date: row.get("date"),
        workout_type: row.get("workout_type"),
        duration_minutes: row.get("duration_minutes"),
        exercises_log: row.get("exercises_log"),
        intensity_level: row.get("intensity_level"),
        location: row.get("location"),
        workout_rating: row.get("workout_rating"),
        trainer_notes: row.get("trainer_notes"),
        workout_source: row.get("workout_source"),
        generated_plan_id: row.get("generated_plan_id"),
        demo_plan_id: row.get("demo_plan_id"),
        day_index: row.get("day_index"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        client_first_name: if with_client_names {
            row.get("client_first_name")
        } else {
            None
        },
        client_last_name: if with_client_names {
            row.get("client_last_name")
        } else {
            None
        },
    })
}
