// ABOUTME: Database operations for the global question catalog and trainer overlays
// ABOUTME: Enforces the one-overlay-per-(trainer, global question) upsert contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::trainers::parse_timestamp;
use crate::errors::{AppError, AppResult};
use crate::intake::{resolve, EffectiveQuestion, QuestionFilter};

/// Intake question input type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    Text,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Number,
}

impl QuestionType {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Number => "number",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "number" => Self::Number,
            _ => Self::Text,
        }
    }

    /// Whether this type requires a non-empty options list
    #[must_use]
    pub const fn requires_options(&self) -> bool {
        matches!(self, Self::Select | Self::Checkbox)
    }
}

/// Overlay action a trainer can take on a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayAction {
    /// Introduce a brand-new trainer-original question
    Add,
    /// Replace a global question's content for this trainer
    Edit,
    /// Hide a global question for this trainer
    Delete,
}

impl OverlayAction {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }

    /// Parse from database string representation
    ///
    /// # Errors
    ///
    /// Returns an error on unknown actions
    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "add" => Ok(Self::Add),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            other => Err(AppError::invalid_input(format!(
                "Unknown overlay action: {other}"
            ))),
        }
    }
}

/// A platform-wide intake question, immutable from the trainer's perspective
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalQuestion {
    pub id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    /// Ordered options, present iff the type requires them
    pub options: Option<Vec<String>>,
    pub category: String,
    pub is_default: bool,
    pub template: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A trainer-specific customization row layered over the global catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerQuestionOverlay {
    pub id: i64,
    pub trainer_id: i64,
    /// None means the overlay itself defines a brand-new question
    pub global_question_id: Option<i64>,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Option<Vec<String>>,
    pub category: String,
    pub action: OverlayAction,
    pub template: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a global catalog question (platform admin flow)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGlobalQuestionRequest {
    pub question_text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    pub options: Option<Vec<String>>,
    pub category: String,
    #[serde(default)]
    pub is_default: bool,
    pub template: Option<String>,
}

/// Request to write a trainer overlay
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertOverlayRequest {
    /// Required for `edit`/`delete`; an `add` carrying one is treated as an
    /// edit of that catalog question
    pub global_question_id: Option<i64>,
    pub action: OverlayAction,
    pub question_text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    pub options: Option<Vec<String>>,
    pub category: String,
    pub template: Option<String>,
}

/// Question catalog and overlay database operations manager
pub struct QuestionsManager {
    pool: SqlitePool,
}

impl QuestionsManager {
    /// Create a new questions manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a global catalog question
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` when a select/checkbox question has no
    /// options, or a database error on write failure
    pub async fn create_global(
        &self,
        request: &CreateGlobalQuestionRequest,
    ) -> AppResult<GlobalQuestion> {
        validate_options(request.question_type, request.options.as_deref())?;

        let now = Utc::now();
        let options_json = request
            .options
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let result = sqlx::query(
            r"
            INSERT INTO global_form_questions
                (question_text, question_type, options, category, is_default, template, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(&request.question_text)
        .bind(request.question_type.as_str())
        .bind(&options_json)
        .bind(&request.category)
        .bind(i64::from(request.is_default))
        .bind(&request.template)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create global question: {e}")))?;

        Ok(GlobalQuestion {
            id: result.last_insert_rowid(),
            question_text: request.question_text.clone(),
            question_type: request.question_type,
            options: request.options.clone(),
            category: request.category.clone(),
            is_default: request.is_default,
            template: request.template.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a global question by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_global(&self, question_id: i64) -> AppResult<Option<GlobalQuestion>> {
        let row = sqlx::query("SELECT * FROM global_form_questions WHERE id = $1")
            .bind(question_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get global question: {e}")))?;

        row.map(|r| row_to_global_question(&r)).transpose()
    }

    /// List global questions, optionally filtered by category/template/defaults
    ///
    /// Returned in catalog (id) order so the resolver's output is stable.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_global(&self, filter: &QuestionFilter) -> AppResult<Vec<GlobalQuestion>> {
        let defaults_clause = if filter.defaults_only {
            "AND is_default = 1"
        } else {
            ""
        };
        let query = format!(
            r"
            SELECT * FROM global_form_questions
            WHERE ($1 IS NULL OR category = $1)
              AND ($2 IS NULL OR template = $2)
              {defaults_clause}
            ORDER BY id
            "
        );

        let rows = sqlx::query(&query)
            .bind(&filter.category)
            .bind(&filter.template)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list global questions: {e}")))?;

        rows.iter().map(row_to_global_question).collect()
    }

    /// List all overlay rows for a trainer, in creation (id) order
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_overlays(&self, trainer_id: i64) -> AppResult<Vec<TrainerQuestionOverlay>> {
        let rows = sqlx::query(
            "SELECT * FROM trainer_intake_questions WHERE trainer_id = $1 ORDER BY id",
        )
        .bind(trainer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list overlays: {e}")))?;

        rows.iter().map(row_to_overlay).collect()
    }

    /// Get the trainer's overlay for a specific global question, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_overlay_for_global(
        &self,
        trainer_id: i64,
        global_question_id: i64,
    ) -> AppResult<Option<TrainerQuestionOverlay>> {
        let row = sqlx::query(
            "SELECT * FROM trainer_intake_questions WHERE trainer_id = $1 AND global_question_id = $2",
        )
        .bind(trainer_id)
        .bind(global_question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get overlay: {e}")))?;

        row.map(|r| row_to_overlay(&r)).transpose()
    }

    /// Write a trainer overlay, honoring the single-opinion upsert contract:
    /// at most one overlay row exists per (trainer, global question), and a
    /// later write replaces the earlier one in place, including its action.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` when a select/checkbox overlay has no
    /// options, `InvalidInput` when the action/id combination is malformed,
    /// `ResourceNotFound` when an edit/delete references an unknown global
    /// question, or a database error on write failure
    pub async fn upsert_overlay(
        &self,
        trainer_id: i64,
        request: &UpsertOverlayRequest,
    ) -> AppResult<TrainerQuestionOverlay> {
        // Re-adding a previously hidden catalog question is an edit of that
        // question, not a new trainer-original row; it overwrites the delete.
        let action = match (request.action, request.global_question_id) {
            (OverlayAction::Add, Some(_)) => OverlayAction::Edit,
            (OverlayAction::Edit | OverlayAction::Delete, None) => {
                return Err(AppError::missing_field("global_question_id"));
            }
            (action, _) => action,
        };

        // Hiding a question carries no content worth validating
        if action != OverlayAction::Delete {
            validate_options(request.question_type, request.options.as_deref())?;
        }

        if let Some(global_id) = request.global_question_id {
            if self.get_global(global_id).await?.is_none() {
                return Err(AppError::not_found(format!("Global question {global_id}")));
            }
        }

        let now = Utc::now();
        let options_json = request
            .options
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let existing = match request.global_question_id {
            Some(global_id) => self.get_overlay_for_global(trainer_id, global_id).await?,
            None => None,
        };

        let overlay_id = if let Some(existing) = existing {
            sqlx::query(
                r"
                UPDATE trainer_intake_questions
                SET question_text = $1, question_type = $2, options = $3, category = $4,
                    action = $5, template = $6, updated_at = $7
                WHERE id = $8 AND trainer_id = $9
                ",
            )
            .bind(&request.question_text)
            .bind(request.question_type.as_str())
            .bind(&options_json)
            .bind(&request.category)
            .bind(action.as_str())
            .bind(&request.template)
            .bind(now.to_rfc3339())
            .bind(existing.id)
            .bind(trainer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update overlay: {e}")))?;

            existing.id
        } else {
            let result = sqlx::query(
                r"
                INSERT INTO trainer_intake_questions
                    (trainer_id, global_question_id, question_text, question_type, options,
                     category, action, template, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
                ",
            )
            .bind(trainer_id)
            .bind(request.global_question_id)
            .bind(&request.question_text)
            .bind(request.question_type.as_str())
            .bind(&options_json)
            .bind(&request.category)
            .bind(action.as_str())
            .bind(&request.template)
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert overlay: {e}")))?;

            result.last_insert_rowid()
        };

        let written = sqlx::query("SELECT * FROM trainer_intake_questions WHERE id = $1")
            .bind(overlay_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to read back overlay: {e}")))?;

        row_to_overlay(&written)
    }

    /// Hard-delete a trainer-original question row
    ///
    /// Only `add` overlays may be removed this way; hiding a global question
    /// goes through [`Self::upsert_overlay`] with a `delete` action instead.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown overlays and `InvalidInput`
    /// for overlays of global questions
    pub async fn delete_trainer_question(
        &self,
        trainer_id: i64,
        overlay_id: i64,
    ) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT global_question_id FROM trainer_intake_questions WHERE id = $1 AND trainer_id = $2",
        )
        .bind(overlay_id)
        .bind(trainer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get overlay: {e}")))?;

        let Some(row) = row else {
            return Err(AppError::not_found(format!("Trainer question {overlay_id}")));
        };

        let global_question_id: Option<i64> = row.get("global_question_id");
        if global_question_id.is_some() {
            return Err(AppError::invalid_input(
                "Overlays of global questions are removed by re-editing, not deleted",
            ));
        }

        let result = sqlx::query(
            "DELETE FROM trainer_intake_questions WHERE id = $1 AND trainer_id = $2",
        )
        .bind(overlay_id)
        .bind(trainer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete trainer question: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Resolve the effective question set a trainer sees for a given context
    ///
    /// Fetches the (filtered) catalog and the trainer's overlays, then runs
    /// the pure merge in [`crate::intake`]. Recomputed per request, never
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns an error if a fetch fails
    pub async fn resolve_for_trainer(
        &self,
        trainer_id: i64,
        filter: &QuestionFilter,
    ) -> AppResult<Vec<EffectiveQuestion>> {
        let globals = self.list_global(filter).await?;
        let overlays = self.list_overlays(trainer_id).await?;
        Ok(resolve(&globals, &overlays, filter))
    }
}

/// Reject select/checkbox questions without options
fn validate_options(question_type: QuestionType, options: Option<&[String]>) -> AppResult<()> {
    if question_type.requires_options() && options.is_none_or(<[String]>::is_empty) {
        return Err(AppError::missing_field("options").with_details(serde_json::json!({
            "question_type": question_type.as_str(),
        })));
    }
    Ok(())
}

/// Convert a database row to a `GlobalQuestion`
fn row_to_global_question(row: &SqliteRow) -> AppResult<GlobalQuestion> {
    let question_type: String = row.get("question_type");
    let options_json: Option<String> = row.get("options");
    let is_default: i64 = row.get("is_default");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(GlobalQuestion {
        id: row.get("id"),
        question_text: row.get("question_text"),
        question_type: QuestionType::parse(&question_type),
        options: options_json
            .map(|raw| serde_json::from_str(&raw))
            .transpose()?,
        category: row.get("category"),
        is_default: is_default == 1,
        template: row.get("template"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Convert a database row to a `TrainerQuestionOverlay`
fn row_to_overlay(row: &SqliteRow) -> AppResult<TrainerQuestionOverlay> {
    let question_type: String = row.get("question_type");
    let action: String = row.get("action");
    let options_json: Option<String> = row.get("options");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(TrainerQuestionOverlay {
        id: row.get("id"),
        trainer_id: row.get("trainer_id"),
        global_question_id: row.get("global_question_id"),
        question_text: row.get("question_text"),
        question_type: QuestionType::parse(&question_type),
        options: options_json
            .map(|raw| serde_json::from_str(&raw))
            .transpose()?,
        category: row.get("category"),
        action: OverlayAction::parse(&action)?,
        template: row.get("template"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
