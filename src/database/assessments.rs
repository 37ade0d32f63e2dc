// ABOUTME: Database operations for the assessment catalog and client submissions
// ABOUTME: Client assessments carry a free-form JSON payload consumed by plan generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::trainers::parse_timestamp;
use crate::errors::{AppError, AppResult};
use crate::plans::AssessmentFinding;

/// A platform-wide assessment definition (flexibility test, beginner
/// strength screen, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalAssessment {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A client's submitted assessment with its raw input payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAssessment {
    pub id: i64,
    pub client_id: i64,
    pub assessment_id: i64,
    pub input_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assessment database operations manager
pub struct AssessmentsManager {
    pool: SqlitePool,
}

impl AssessmentsManager {
    /// Create a new assessments manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a catalog assessment (platform admin flow)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_global(
        &self,
        name: &str,
        category: Option<&str>,
    ) -> AppResult<GlobalAssessment> {
        let now = Utc::now();

        let result =
            sqlx::query("INSERT INTO global_assessments (name, category, created_at) VALUES ($1, $2, $3)")
                .bind(name)
                .bind(category)
                .bind(now.to_rfc3339())
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to create assessment: {e}")))?;

        Ok(GlobalAssessment {
            id: result.last_insert_rowid(),
            name: name.to_owned(),
            category: category.map(str::to_owned),
            created_at: now,
        })
    }

    /// List the assessment catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_global(&self) -> AppResult<Vec<GlobalAssessment>> {
        let rows = sqlx::query("SELECT * FROM global_assessments ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list assessments: {e}")))?;

        rows.iter().map(row_to_global_assessment).collect()
    }

    /// Record a client's assessment submission
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn save_client_assessment(
        &self,
        client_id: i64,
        assessment_id: i64,
        input_data: &serde_json::Value,
    ) -> AppResult<ClientAssessment> {
        let now = Utc::now();
        let payload = serde_json::to_string(input_data)?;

        let result = sqlx::query(
            r"
            INSERT INTO client_assessments (client_id, assessment_id, input_data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ",
        )
        .bind(client_id)
        .bind(assessment_id)
        .bind(&payload)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save client assessment: {e}")))?;

        Ok(ClientAssessment {
            id: result.last_insert_rowid(),
            client_id,
            assessment_id,
            input_data: input_data.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// List a client's submissions, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_by_client(&self, client_id: i64) -> AppResult<Vec<ClientAssessment>> {
        let rows = sqlx::query("SELECT * FROM client_assessments WHERE client_id = $1 ORDER BY id")
            .bind(client_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list client assessments: {e}")))?;

        rows.iter().map(row_to_client_assessment).collect()
    }

    /// A client's submissions joined with their catalog names, shaped for
    /// the plan-generation prompt
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn findings_for_client(&self, client_id: i64) -> AppResult<Vec<AssessmentFinding>> {
        let rows = sqlx::query(
            r"
            SELECT ca.input_data, ga.name AS assessment_name
            FROM client_assessments ca
            JOIN global_assessments ga ON ca.assessment_id = ga.id
            WHERE ca.client_id = $1
            ORDER BY ca.id
            ",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load assessment findings: {e}")))?;

        rows.iter()
            .map(|row| {
                let raw: String = row.get("input_data");
                Ok(AssessmentFinding {
                    assessment_name: row.get("assessment_name"),
                    input_data: serde_json::from_str(&raw)?,
                })
            })
            .collect()
    }
}

/// Convert a database row to a `GlobalAssessment`
fn row_to_global_assessment(row: &SqliteRow) -> AppResult<GlobalAssessment> {
    let created_at: String = row.get("created_at");

    Ok(GlobalAssessment {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Convert a database row to a `ClientAssessment`
fn row_to_client_assessment(row: &SqliteRow) -> AppResult<ClientAssessment> {
    let raw: String = row.get("input_data");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(ClientAssessment {
        id: row.get("id"),
        client_id: row.get("client_id"),
        assessment_id: row.get("assessment_id"),
        input_data: serde_json::from_str(&raw)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
