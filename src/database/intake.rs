// ABOUTME: Database operations for intake form instances and their answers
// ABOUTME: Answers upsert on (form, question key) so re-submitting a step overwrites in place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::trainers::parse_timestamp;
use crate::errors::{AppError, AppResult};

/// An intake form instance (consultation, medical history, ...) for a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeForm {
    pub id: i64,
    pub form_type: String,
    pub client_id: i64,
    pub trainer_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored answer, keyed by the resolved question identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeFormAnswer {
    pub id: i64,
    pub form_id: i64,
    /// Resolved question key (`global_<id>` / `trainer_<id>`)
    pub question_key: String,
    /// `global` or `trainer`, as tagged by the resolver
    pub question_source: String,
    /// Question text at answer time, denormalized for history views
    pub question_text: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One answer in a submission batch
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerInput {
    pub question_key: String,
    pub question_source: String,
    pub question_text: String,
    pub answer: String,
}

/// Intake form database operations manager
pub struct IntakeManager {
    pool: SqlitePool,
}

impl IntakeManager {
    /// Create a new intake manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a form instance for a client
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_form(
        &self,
        form_type: &str,
        client_id: i64,
        trainer_id: i64,
    ) -> AppResult<IntakeForm> {
        let now = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO intake_forms (form_type, client_id, trainer_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ",
        )
        .bind(form_type)
        .bind(client_id)
        .bind(trainer_id)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create intake form: {e}")))?;

        Ok(IntakeForm {
            id: result.last_insert_rowid(),
            form_type: form_type.to_owned(),
            client_id,
            trainer_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a form by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_form(&self, form_id: i64) -> AppResult<Option<IntakeForm>> {
        let row = sqlx::query("SELECT * FROM intake_forms WHERE id = $1")
            .bind(form_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get intake form: {e}")))?;

        row.map(|r| row_to_form(&r)).transpose()
    }

    /// List a client's forms, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_forms_by_client(&self, client_id: i64) -> AppResult<Vec<IntakeForm>> {
        let rows = sqlx::query(
            "SELECT * FROM intake_forms WHERE client_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list intake forms: {e}")))?;

        rows.iter().map(row_to_form).collect()
    }

    /// Save a batch of answers for a form. Each answer upserts on
    /// (form, question key): re-submitting a step overwrites earlier answers
    /// rather than duplicating them.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown forms, or a database error on
    /// write failure
    pub async fn save_answers(&self, form_id: i64, answers: &[AnswerInput]) -> AppResult<usize> {
        if self.get_form(form_id).await?.is_none() {
            return Err(AppError::not_found(format!("Intake form {form_id}")));
        }

        let now = Utc::now().to_rfc3339();
        for answer in answers {
            sqlx::query(
                r"
                INSERT INTO intake_form_answers
                    (form_id, question_key, question_source, question_text, answer, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                ON CONFLICT (form_id, question_key) DO UPDATE SET
                    answer = excluded.answer,
                    question_source = excluded.question_source,
                    question_text = excluded.question_text,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(form_id)
            .bind(&answer.question_key)
            .bind(&answer.question_source)
            .bind(&answer.question_text)
            .bind(&answer.answer)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to save intake answer: {e}")))?;
        }

        Ok(answers.len())
    }

    /// List a form's answers in question-key order
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_answers(&self, form_id: i64) -> AppResult<Vec<IntakeFormAnswer>> {
        let rows = sqlx::query(
            "SELECT * FROM intake_form_answers WHERE form_id = $1 ORDER BY question_key",
        )
        .bind(form_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list intake answers: {e}")))?;

        rows.iter().map(row_to_answer).collect()
    }
}

/// Convert a database row to an `IntakeForm`
fn row_to_form(row: &SqliteRow) -> AppResult<IntakeForm> {
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(IntakeForm {
        id: row.get("id"),
        form_type: row.get("form_type"),
        client_id: row.get("client_id"),
        trainer_id: row.get("trainer_id"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Convert a database row to an `IntakeFormAnswer`
fn row_to_answer(row: &SqliteRow) -> AppResult<IntakeFormAnswer> {
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(IntakeFormAnswer {
        id: row.get("id"),
        form_id: row.get("form_id"),
        question_key: row.get("question_key"),
        question_source: row.get("question_source"),
        question_text: row.get("question_text"),
        answer: row.get("answer"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
