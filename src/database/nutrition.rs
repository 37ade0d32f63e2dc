// ABOUTME: Database operations for client nutrition profiles
// ABOUTME: One profile per client, with a dedicated TDEE update path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::trainers::parse_timestamp;
use crate::errors::{AppError, AppResult};

/// A client's nutrition profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionProfile {
    pub id: i64,
    pub client_id: i64,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub bodyfat_est: Option<f64>,
    pub health_conditions: Option<String>,
    pub allergies: Option<String>,
    pub dietary_preferences: Option<String>,
    pub activity_level_neat: Option<String>,
    pub activity_level_eat: Option<String>,
    pub exercise_days_per_week: Option<i64>,
    pub gym_duration: Option<String>,
    pub normal_tdee: Option<f64>,
    pub average_tdee: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create or replace a client's nutrition profile
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertNutritionProfileRequest {
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub bodyfat_est: Option<f64>,
    pub health_conditions: Option<String>,
    pub allergies: Option<String>,
    pub dietary_preferences: Option<String>,
    pub activity_level_neat: Option<String>,
    pub activity_level_eat: Option<String>,
    pub exercise_days_per_week: Option<i64>,
    pub gym_duration: Option<String>,
}

/// Nutrition profile database operations manager
pub struct NutritionManager {
    pool: SqlitePool,
}

impl NutritionManager {
    /// Create a new nutrition manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create or replace a client's profile (one profile per client)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn upsert(
        &self,
        client_id: i64,
        request: &UpsertNutritionProfileRequest,
    ) -> AppResult<NutritionProfile> {
        let now = Utc::now();

        sqlx::query(
            r"
            INSERT INTO nutrition_profiles (
                client_id, height, weight, dob, gender, bodyfat_est, health_conditions,
                allergies, dietary_preferences, activity_level_neat, activity_level_eat,
                exercise_days_per_week, gym_duration, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            ON CONFLICT (client_id) DO UPDATE SET
                height = excluded.height,
                weight = excluded.weight,
                dob = excluded.dob,
                gender = excluded.gender,
                bodyfat_est = excluded.bodyfat_est,
                health_conditions = excluded.health_conditions,
                allergies = excluded.allergies,
                dietary_preferences = excluded.dietary_preferences,
                activity_level_neat = excluded.activity_level_neat,
                activity_level_eat = excluded.activity_level_eat,
                exercise_days_per_week = excluded.exercise_days_per_week,
                gym_duration = excluded.gym_duration,
                updated_at = excluded.updated_at
            ",
        )
        .bind(client_id)
        .bind(request.height)
        .bind(request.weight)
        .bind(&request.dob)
        .bind(&request.gender)
        .bind(request.bodyfat_est)
        .bind(&request.health_conditions)
        .bind(&request.allergies)
        .bind(&request.dietary_preferences)
        .bind(&request.activity_level_neat)
        .bind(&request.activity_level_eat)
        .bind(request.exercise_days_per_week)
        .bind(&request.gym_duration)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save nutrition profile: {e}")))?;

        self.get_by_client(client_id).await?.ok_or_else(|| {
            AppError::database("Nutrition profile missing after upsert".to_owned())
        })
    }

    /// Get a client's profile
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_by_client(&self, client_id: i64) -> AppResult<Option<NutritionProfile>> {
        let row = sqlx::query("SELECT * FROM nutrition_profiles WHERE client_id = $1")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get nutrition profile: {e}")))?;

        row.map(|r| row_to_profile(&r)).transpose()
    }

    /// Store computed TDEE values on a client's profile
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_tdee(
        &self,
        client_id: i64,
        normal_tdee: f64,
        average_tdee: f64,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE nutrition_profiles
            SET normal_tdee = $1, average_tdee = $2, updated_at = $3
            WHERE client_id = $4
            ",
        )
        .bind(normal_tdee)
        .bind(average_tdee)
        .bind(Utc::now().to_rfc3339())
        .bind(client_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update TDEE: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert a database row to a `NutritionProfile`
fn row_to_profile(row: &SqliteRow) -> AppResult<NutritionProfile> {
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(NutritionProfile {
        id: row.get("id"),
        client_id: row.get("client_id"),
        height: row.get("height"),
        weight: row.get("weight"),
        dob: row.get("dob"),
        gender: row.get("gender"),
        bodyfat_est: row.get("bodyfat_est"),
        health_conditions: row.get("health_conditions"),
        allergies: row.get("allergies"),
        dietary_preferences: row.get("dietary_preferences"),
        activity_level_neat: row.get("activity_level_neat"),
        activity_level_eat: row.get("activity_level_eat"),
        exercise_days_per_week: row.get("exercise_days_per_week"),
        gym_duration: row.get("gym_duration"),
        normal_tdee: row.get("normal_tdee"),
        average_tdee: row.get("average_tdee"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
