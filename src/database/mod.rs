// ABOUTME: Database management for the SmartGains server
// ABOUTME: Owns the SQLite pool, runs migrations, and re-exports per-entity managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

//! # Database Management
//!
//! This module provides the shared `SQLite` pool and schema migrations for the
//! SmartGains server. Per-entity operations live in manager modules
//! (`trainers`, `clients`, `questions`, `plans`, `progress`, ...) that each
//! hold a clone of the pool. Every statement runs as its own implicit
//! transaction; there is no multi-statement transaction coordination.

pub mod assessments;
pub mod clients;
pub mod intake;
pub mod nutrition;
pub mod plans;
pub mod progress;
pub mod questions;
pub mod trainers;

use sqlx::{Pool, Sqlite, SqlitePool};

use crate::errors::{AppError, AppResult};

/// Database handle wrapping the shared connection pool
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains("mode=")
            && !database_url.contains(":memory:")
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePool::connect(&connection_options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table creation fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_trainers().await?;
        self.migrate_clients().await?;
        self.migrate_questions().await?;
        self.migrate_intake().await?;
        self.migrate_assessments().await?;
        self.migrate_nutrition().await?;
        self.migrate_plans().await?;
        self.migrate_progress().await?;
        Ok(())
    }

    async fn migrate_trainers(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS trainers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                bio TEXT,
                specializations TEXT,
                years_experience INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create trainers table: {e}")))?;

        Ok(())
    }

    async fn migrate_clients(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trainer_id INTEGER NOT NULL REFERENCES trainers(id) ON DELETE CASCADE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                age INTEGER,
                gender TEXT,
                occupation TEXT,
                email TEXT,
                phone_number TEXT,
                address TEXT,
                location_gym TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create clients table: {e}")))?;

        Ok(())
    }

    async fn migrate_questions(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS global_form_questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question_text TEXT NOT NULL,
                question_type TEXT NOT NULL,
                options TEXT,
                category TEXT NOT NULL,
                is_default INTEGER NOT NULL DEFAULT 0,
                template TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create global_form_questions table: {e}"))
        })?;

        // NULL global_question_id rows (trainer-original questions) are exempt
        // from the uniqueness constraint; SQLite treats NULLs as distinct.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS trainer_intake_questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trainer_id INTEGER NOT NULL REFERENCES trainers(id) ON DELETE CASCADE,
                global_question_id INTEGER REFERENCES global_form_questions(id) ON DELETE CASCADE,
                question_text TEXT NOT NULL,
                question_type TEXT NOT NULL,
                options TEXT,
                category TEXT NOT NULL,
                action TEXT NOT NULL CHECK (action IN ('add', 'edit', 'delete')),
                template TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (trainer_id, global_question_id)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!(
                "Failed to create trainer_intake_questions table: {e}"
            ))
        })?;

        Ok(())
    }

    async fn migrate_intake(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS intake_forms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                form_type TEXT NOT NULL,
                client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                trainer_id INTEGER NOT NULL REFERENCES trainers(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create intake_forms table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS intake_form_answers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                form_id INTEGER NOT NULL REFERENCES intake_forms(id) ON DELETE CASCADE,
                question_key TEXT NOT NULL,
                question_source TEXT NOT NULL,
                question_text TEXT NOT NULL,
                answer TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (form_id, question_key)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create intake_form_answers table: {e}"))
        })?;

        Ok(())
    }

    async fn migrate_assessments(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS global_assessments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                category TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create global_assessments table: {e}"))
        })?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS client_assessments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                assessment_id INTEGER NOT NULL REFERENCES global_assessments(id) ON DELETE CASCADE,
                input_data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create client_assessments table: {e}"))
        })?;

        Ok(())
    }

    async fn migrate_nutrition(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS nutrition_profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER UNIQUE NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                height REAL,
                weight REAL,
                dob TEXT,
                gender TEXT,
                bodyfat_est REAL,
                health_conditions TEXT,
                allergies TEXT,
                dietary_preferences TEXT,
                activity_level_neat TEXT,
                activity_level_eat TEXT,
                exercise_days_per_week INTEGER,
                gym_duration TEXT,
                normal_tdee REAL,
                average_tdee REAL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create nutrition_profiles table: {e}"))
        })?;

        Ok(())
    }

    async fn migrate_plans(&self) -> AppResult<()> {
        // generated_plans and demo_plans are structurally identical for
        // completion/pinning; only the details column name differs.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS generated_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                generated_plan_details TEXT NOT NULL,
                completed_marked INTEGER NOT NULL DEFAULT 0,
                day_completion_status TEXT,
                pinned_until TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create generated_plans table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS demo_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                demo_plan_details TEXT NOT NULL,
                completed_marked INTEGER NOT NULL DEFAULT 0,
                day_completion_status TEXT,
                pinned_until TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create demo_plans table: {e}")))?;

        Ok(())
    }

    async fn migrate_progress(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_progress (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                name TEXT,
                date TEXT NOT NULL,
                workout_type TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                exercises_log TEXT NOT NULL,
                intensity_level TEXT NOT NULL,
                location TEXT NOT NULL,
                workout_rating INTEGER NOT NULL,
                trainer_notes TEXT,
                workout_source TEXT NOT NULL DEFAULT 'manual',
                generated_plan_id INTEGER REFERENCES generated_plans(id) ON DELETE SET NULL,
                demo_plan_id INTEGER REFERENCES demo_plans(id) ON DELETE SET NULL,
                day_index INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout_progress table: {e}")))?;

        Ok(())
    }
}
