// ABOUTME: Database operations for demo and generated workout plans
// ABOUTME: Handles plan CRUD, day-completion persistence, and the 24-hour pin window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::BTreeMap;

use super::trainers::parse_timestamp;
use crate::errors::{AppError, AppResult};
use crate::plans::{count_plan_days, CompletionState, DayCompletionMap};

/// How long a pin keeps a plan on the "today" dashboard
const PIN_WINDOW_HOURS: i64 = 24;

/// Demo plans always span a fixed number of days
const DEMO_PLAN_DAYS: u32 = 3;

/// Which plan table a call addresses; the two tables are structurally
/// identical apart from the details column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Generated,
    Demo,
}

impl PlanKind {
    /// Table holding this kind of plan
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Generated => "generated_plans",
            Self::Demo => "demo_plans",
        }
    }

    /// Column holding the plan body text
    #[must_use]
    pub const fn details_column(&self) -> &'static str {
        match self {
            Self::Generated => "generated_plan_details",
            Self::Demo => "demo_plan_details",
        }
    }

    /// Parse from a request string
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` on unknown kinds
    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "generated" => Ok(Self::Generated),
            "demo" => Ok(Self::Demo),
            other => Err(AppError::invalid_input(format!("Invalid plan type: {other}"))),
        }
    }

    /// Convert to a request/response string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Demo => "demo",
        }
    }
}

/// A stored workout plan (demo or generated)
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: i64,
    pub kind: PlanKind,
    pub client_id: i64,
    pub name: String,
    pub details: String,
    pub completed_marked: bool,
    pub day_completion_status: DayCompletionMap,
    pub pinned_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Joined client names, present on single-plan fetches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_last_name: Option<String>,
}

impl Plan {
    /// Total days this plan spans: demo plans are fixed, generated plans
    /// derive theirs from the `## Day` headers in the body (a plan without
    /// headers is single-day).
    #[must_use]
    pub fn total_days(&self) -> u32 {
        match self.kind {
            PlanKind::Demo => DEMO_PLAN_DAYS,
            PlanKind::Generated => count_plan_days(&self.details).max(1),
        }
    }

    /// Whether this plan has more than one day section
    #[must_use]
    pub fn is_multi_day(&self) -> bool {
        self.total_days() > 1
    }

    /// Aggregate completion state
    #[must_use]
    pub fn completion_state(&self) -> CompletionState {
        self.day_completion_status.state(self.total_days())
    }

    /// Whether the pin is currently active (lazy expiry, no write-back)
    #[must_use]
    pub fn is_pinned_at(&self, now: DateTime<Utc>) -> bool {
        self.pinned_until.is_some_and(|until| until > now)
    }
}

/// Per-day completion report with the dates the days were actually logged
#[derive(Debug, Clone, Serialize)]
pub struct CompletionReport {
    pub completed_marked: bool,
    pub day_completion_status: DayCompletionMap,
    /// Day index -> date of the matching workout log, if one exists. A day
    /// can be flagged complete with no log row (the flag and the log are
    /// written to different tables without a shared transaction); such days
    /// report a null date.
    pub completion_dates: BTreeMap<u32, Option<String>>,
}

/// Plan database operations manager
pub struct PlansManager {
    pool: SqlitePool,
}

impl PlansManager {
    /// Create a new plans manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a newly generated plan for a client
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(
        &self,
        kind: PlanKind,
        client_id: i64,
        name: &str,
        details: &str,
    ) -> AppResult<Plan> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO {} (client_id, name, {}, created_at, updated_at) VALUES ($1, $2, $3, $4, $4)",
            kind.table(),
            kind.details_column(),
        );

        let result = sqlx::query(&query)
            .bind(client_id)
            .bind(name)
            .bind(details)
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create plan: {e}")))?;

        Ok(Plan {
            id: result.last_insert_rowid(),
            kind,
            client_id,
            name: name.to_owned(),
            details: details.to_owned(),
            completed_marked: false,
            day_completion_status: DayCompletionMap::new(),
            pinned_until: None,
            created_at: now,
            updated_at: now,
            client_first_name: None,
            client_last_name: None,
        })
    }

    /// Get a plan by id, with joined client names
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, kind: PlanKind, plan_id: i64) -> AppResult<Option<Plan>> {
        let query = format!(
            r"
            SELECT p.*, c.first_name AS client_first_name, c.last_name AS client_last_name
            FROM {} p
            JOIN clients c ON p.client_id = c.id
            WHERE p.id = $1
            ",
            kind.table(),
        );

        let row = sqlx::query(&query)
            .bind(plan_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get plan: {e}")))?;

        row.map(|r| row_to_plan(&r, kind, true)).transpose()
    }

    /// List a client's plans of one kind, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_by_client(&self, kind: PlanKind, client_id: i64) -> AppResult<Vec<Plan>> {
        let query = format!(
            "SELECT * FROM {} WHERE client_id = $1 ORDER BY created_at DESC, id DESC",
            kind.table(),
        );

        let rows = sqlx::query(&query)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list plans: {e}")))?;

        rows.iter().map(|r| row_to_plan(r, kind, false)).collect()
    }

    /// Get the most recently created plan of one kind for a client
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn latest_by_client(&self, kind: PlanKind, client_id: i64) -> AppResult<Option<Plan>> {
        let query = format!(
            r"
            SELECT p.*, c.first_name AS client_first_name, c.last_name AS client_last_name
            FROM {} p
            JOIN clients c ON p.client_id = c.id
            WHERE p.client_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT 1
            ",
            kind.table(),
        );

        let row = sqlx::query(&query)
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get latest plan: {e}")))?;

        row.map(|r| row_to_plan(&r, kind, true)).transpose()
    }

    /// Update a plan's name and body
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_details(
        &self,
        kind: PlanKind,
        plan_id: i64,
        name: &str,
        details: &str,
    ) -> AppResult<bool> {
        let query = format!(
            "UPDATE {} SET name = $1, {} = $2, updated_at = $3 WHERE id = $4",
            kind.table(),
            kind.details_column(),
        );

        let result = sqlx::query(&query)
            .bind(name)
            .bind(details)
            .bind(Utc::now().to_rfc3339())
            .bind(plan_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update plan: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a plan
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, kind: PlanKind, plan_id: i64) -> AppResult<bool> {
        let query = format!("DELETE FROM {} WHERE id = $1", kind.table());

        let result = sqlx::query(&query)
            .bind(plan_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete plan: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark one day of a plan complete and recompute the aggregate flag.
    ///
    /// Marking an already-complete day is a no-op in effect. The completion
    /// map and `completed_marked` are persisted in a single UPDATE. Two
    /// concurrent calls for the same plan race last-write-wins on the map;
    /// no row versioning guards this.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown plans, and a database error
    /// when the update affects no rows
    pub async fn mark_day_complete(
        &self,
        kind: PlanKind,
        plan_id: i64,
        day_index: u32,
    ) -> AppResult<Plan> {
        let mut plan = self
            .get(kind, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plan {plan_id}")))?;

        plan.day_completion_status.mark_day(day_index);
        let completed = plan.day_completion_status.all_complete(plan.total_days());
        self.persist_completion(kind, plan_id, &plan.day_completion_status, completed)
            .await?;

        plan.completed_marked = completed;
        Ok(plan)
    }

    /// Mark an entire plan complete in one step (single-day plan flow):
    /// every day in range is flagged so the aggregate invariant holds.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown plans
    pub async fn mark_as_completed(&self, kind: PlanKind, plan_id: i64) -> AppResult<Plan> {
        let mut plan = self
            .get(kind, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plan {plan_id}")))?;

        for day in 1..=plan.total_days() {
            plan.day_completion_status.mark_day(day);
        }
        self.persist_completion(kind, plan_id, &plan.day_completion_status, true)
            .await?;

        plan.completed_marked = true;
        Ok(plan)
    }

    async fn persist_completion(
        &self,
        kind: PlanKind,
        plan_id: i64,
        map: &DayCompletionMap,
        completed: bool,
    ) -> AppResult<()> {
        let query = format!(
            "UPDATE {} SET day_completion_status = $1, completed_marked = $2, updated_at = $3 WHERE id = $4",
            kind.table(),
        );

        let result = sqlx::query(&query)
            .bind(map.to_stored()?)
            .bind(i64::from(completed))
            .bind(Utc::now().to_rfc3339())
            .bind(plan_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update day completion: {e}")))?;

        if result.rows_affected() == 0 {
            tracing::warn!(plan_id, table = kind.table(), "day completion update affected no rows");
            return Err(AppError::database(format!(
                "Day completion update affected no rows for plan {plan_id}"
            )));
        }
        Ok(())
    }

    /// Pin a plan to the "today" dashboard for the next 24 hours.
    ///
    /// Returns `false` without writing when an active pin already exists;
    /// pinning never extends a running window. The read and the write are
    /// separate statements, acceptable under single-trainer contention.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown plans
    pub async fn pin_for_today(&self, kind: PlanKind, plan_id: i64) -> AppResult<bool> {
        let plan = self
            .get(kind, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plan {plan_id}")))?;

        let now = Utc::now();
        if plan.is_pinned_at(now) {
            return Ok(false);
        }

        let pinned_until = now + Duration::hours(PIN_WINDOW_HOURS);
        let query = format!("UPDATE {} SET pinned_until = $1 WHERE id = $2", kind.table());

        let result = sqlx::query(&query)
            .bind(pinned_until.to_rfc3339())
            .bind(plan_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to pin plan: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a plan's pin is currently active; expired pins read as false
    /// without any write-back.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown plans
    pub async fn check_pin_status(&self, kind: PlanKind, plan_id: i64) -> AppResult<bool> {
        let plan = self
            .get(kind, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plan {plan_id}")))?;

        Ok(plan.is_pinned_at(Utc::now()))
    }

    /// Unconditionally clear a plan's pin; used by explicit trainer action
    /// and by the auto-unpin after a session is logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn unpin(&self, kind: PlanKind, plan_id: i64) -> AppResult<bool> {
        let query = format!("UPDATE {} SET pinned_until = NULL WHERE id = $1", kind.table());

        let result = sqlx::query(&query)
            .bind(plan_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to unpin plan: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// The "today" dashboard feed: every plan (generated and demo) belonging
    /// to the trainer's clients whose pin is still active, most recently
    /// pinned first.
    ///
    /// # Errors
    ///
    /// Returns an error if a fetch fails
    pub async fn get_pinned_plans(&self, trainer_id: i64) -> AppResult<Vec<Plan>> {
        let now = Utc::now();
        let mut pinned = Vec::new();

        for kind in [PlanKind::Generated, PlanKind::Demo] {
            let query = format!(
                r"
                SELECT p.*, c.first_name AS client_first_name, c.last_name AS client_last_name
                FROM {} p
                JOIN clients c ON p.client_id = c.id
                WHERE c.trainer_id = $1 AND p.pinned_until IS NOT NULL
                ",
                kind.table(),
            );

            let rows = sqlx::query(&query)
                .bind(trainer_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to list pinned plans: {e}")))?;

            for row in &rows {
                let plan = row_to_plan(row, kind, true)?;
                if plan.is_pinned_at(now) {
                    pinned.push(plan);
                }
            }
        }

        pinned.sort_by(|a, b| b.pinned_until.cmp(&a.pinned_until));
        Ok(pinned)
    }

    /// Per-day completion report joined against the workout log, so the UI
    /// can show "completed on {date}" instead of a bare checkmark.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown plans
    pub async fn completion_status_and_date(
        &self,
        kind: PlanKind,
        plan_id: i64,
    ) -> AppResult<CompletionReport> {
        let plan = self
            .get(kind, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plan {plan_id}")))?;

        let fk_column = match kind {
            PlanKind::Generated => "generated_plan_id",
            PlanKind::Demo => "demo_plan_id",
        };
        let query = format!(
            r"
            SELECT day_index, MIN(date) AS logged_date
            FROM workout_progress
            WHERE {fk_column} = $1 AND day_index IS NOT NULL
            GROUP BY day_index
            ",
        );

        let rows = sqlx::query(&query)
            .bind(plan_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load completion dates: {e}")))?;

        let mut logged: BTreeMap<u32, String> = BTreeMap::new();
        for row in &rows {
            let day_index: i64 = row.get("day_index");
            let date: String = row.get("logged_date");
            if let Ok(day) = u32::try_from(day_index) {
                logged.insert(day, date);
            }
        }

        let completion_dates = plan
            .day_completion_status
            .completed_days()
            .map(|day| (day, logged.get(&day).cloned()))
            .collect();

        Ok(CompletionReport {
            completed_marked: plan.completed_marked,
            day_completion_status: plan.day_completion_status,
            completion_dates,
        })
    }
}

/// Convert a database row to a `Plan`
fn row_to_plan(row: &SqliteRow, kind: PlanKind, with_client_names: bool) -> AppResult<Plan> {
    let details: String = row.get(kind.details_column());
    let completed_marked: i64 = row.get("completed_marked");
    let day_completion_raw: Option<String> = row.get("day_completion_status");
    let pinned_until_raw: Option<String> = row.get("pinned_until");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Plan {
        id: row.get("id"),
        kind,
        client_id: row.get("client_id"),
        name: row.get("name"),
        details,
        completed_marked: completed_marked == 1,
        day_completion_status: DayCompletionMap::from_stored(day_completion_raw.as_deref())?,
        pinned_until: pinned_until_raw.map(|raw| parse_timestamp(&raw)).transpose()?,
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
