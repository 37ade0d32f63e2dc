// ABOUTME: Database operations for trainer-owned clients
// ABOUTME: Handles client CRUD, duplicate checks, and dashboard counts with trainer scoping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::trainers::parse_timestamp;
use crate::errors::{AppError, AppResult};

/// A client belonging to a trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub trainer_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub occupation: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub location_gym: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Joined trainer names for email/display flows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer_last_name: Option<String>,
}

/// Request to create or update a client
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertClientRequest {
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub occupation: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub location_gym: Option<String>,
}

/// Client database operations manager
pub struct ClientsManager {
    pool: SqlitePool,
}

impl ClientsManager {
    /// Create a new clients manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new client for a trainer
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(&self, trainer_id: i64, request: &UpsertClientRequest) -> AppResult<Client> {
        let now = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO clients (
                trainer_id, first_name, last_name, age, gender, occupation,
                email, phone_number, address, location_gym, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            ",
        )
        .bind(trainer_id)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.age)
        .bind(&request.gender)
        .bind(&request.occupation)
        .bind(&request.email)
        .bind(&request.phone_number)
        .bind(&request.address)
        .bind(&request.location_gym)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create client: {e}")))?;

        Ok(Client {
            id: result.last_insert_rowid(),
            trainer_id,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            age: request.age,
            gender: request.gender.clone(),
            occupation: request.occupation.clone(),
            email: request.email.clone(),
            phone_number: request.phone_number.clone(),
            address: request.address.clone(),
            location_gym: request.location_gym.clone(),
            created_at: now,
            updated_at: now,
            trainer_first_name: None,
            trainer_last_name: None,
        })
    }

    /// Get a client by id, with joined trainer names
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, client_id: i64) -> AppResult<Option<Client>> {
        let row = sqlx::query(
            r"
            SELECT c.*, t.first_name AS trainer_first_name, t.last_name AS trainer_last_name
            FROM clients c
            JOIN trainers t ON c.trainer_id = t.id
            WHERE c.id = $1
            ",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get client: {e}")))?;

        row.map(|r| row_to_client(&r, true)).transpose()
    }

    /// List all clients for a trainer, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_by_trainer(&self, trainer_id: i64) -> AppResult<Vec<Client>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM clients
            WHERE trainer_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(trainer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list clients: {e}")))?;

        rows.iter().map(|r| row_to_client(r, false)).collect()
    }

    /// Check whether a trainer already has a client with this name and email
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn exists(
        &self,
        trainer_id: i64,
        first_name: &str,
        last_name: &str,
        email: Option<&str>,
    ) -> AppResult<bool> {
        let row = sqlx::query(
            r"
            SELECT 1 FROM clients
            WHERE trainer_id = $1 AND first_name = $2 AND last_name = $3
              AND ($4 IS NULL OR email = $4)
            ",
        )
        .bind(trainer_id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check client: {e}")))?;

        Ok(row.is_some())
    }

    /// Update a client's editable data
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update(
        &self,
        client_id: i64,
        trainer_id: i64,
        request: &UpsertClientRequest,
    ) -> AppResult<Option<Client>> {
        let result = sqlx::query(
            r"
            UPDATE clients
            SET first_name = $1, last_name = $2, age = $3, gender = $4, occupation = $5,
                email = $6, phone_number = $7, address = $8, location_gym = $9, updated_at = $10
            WHERE id = $11 AND trainer_id = $12
            ",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.age)
        .bind(&request.gender)
        .bind(&request.occupation)
        .bind(&request.email)
        .bind(&request.phone_number)
        .bind(&request.address)
        .bind(&request.location_gym)
        .bind(Utc::now().to_rfc3339())
        .bind(client_id)
        .bind(trainer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update client: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(client_id).await
    }

    /// Delete a client (cascades to plans, progress, and intake data)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, client_id: i64, trainer_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND trainer_id = $2")
            .bind(client_id)
            .bind(trainer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete client: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count clients for a trainer's dashboard
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn count_by_trainer(&self, trainer_id: i64) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM clients WHERE trainer_id = $1")
            .bind(trainer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count clients: {e}")))?;

        Ok(row.get("count"))
    }
}

/// Convert a database row to a `Client`
fn row_to_client(row: &SqliteRow, with_trainer_names: bool) -> AppResult<Client> {
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Client {
        id: row.get("id"),
        trainer_id: row.get("trainer_id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        age: row.get("age"),
        gender: row.get("gender"),
        occupation: row.get("occupation"),
        email: row.get("email"),
        phone_number: row.get("phone_number"),
        address: row.get("address"),
        location_gym: row.get("location_gym"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        trainer_first_name: if with_trainer_names {
            row.get("trainer_first_name")
        } else {
            None
        },
        trainer_last_name: if with_trainer_names {
            row.get("trainer_last_name")
        } else {
            None
        },
    })
}
