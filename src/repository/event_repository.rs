use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateEventRequest, Event, Lifecycle, UpdateEventRequest},
    error::{AppError, Result},
    repository::user_repository::{lifecycle_to_str, parse_lifecycle},
    repository::EventRepository,
};

#[derive(FromRow)]
struct EventRow {
    id: String,
    name: String,
    start_time: Option<NaiveDateTime>,
    end_time: Option<NaiveDateTime>,
    weight: f64,
    is_reproduction: i32,
    is_active: i32,
    allow_wp_only: i32,
    lifecycle: String,
    created_at: NaiveDateTime,
}

const EVENT_COLUMNS: &str = "id, name, start_time, end_time, weight, is_reproduction, \
     is_active, allow_wp_only, lifecycle, created_at";

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_event(row: EventRow) -> Result<Event> {
        Ok(Event {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            start_time: row
                .start_time
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            end_time: row
                .end_time
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            weight: row.weight,
            is_reproduction: row.is_reproduction != 0,
            is_active: row.is_active != 0,
            allow_wp_only: row.allow_wp_only != 0,
            lifecycle: parse_lifecycle(&row.lifecycle)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn create(&self, request: CreateEventRequest) -> Result<Event> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO events (
                id, name, start_time, end_time, weight, is_reproduction,
                is_active, allow_wp_only, lifecycle, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, 1, ?, 'Active', ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(request.start_time.map(|dt| dt.naive_utc()))
        .bind(request.end_time.map(|dt| dt.naive_utc()))
        .bind(request.weight)
        .bind(request.is_reproduction as i32)
        .bind(request.allow_wp_only as i32)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id, false)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created event".to_string()))
    }

    async fn find_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events WHERE id = ? AND (? OR lifecycle = 'Active')",
            EVENT_COLUMNS
        ))
        .bind(id.to_string())
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_event(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events WHERE (? OR lifecycle = 'Active') ORDER BY created_at DESC",
            EVENT_COLUMNS
        ))
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn list_active(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events WHERE is_active = 1 AND lifecycle = 'Active' \
             ORDER BY created_at DESC",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateEventRequest) -> Result<Event> {
        let existing = self
            .find_by_id(id, true)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        sqlx::query(
            r#"
            UPDATE events
            SET name = COALESCE(?, name),
                start_time = COALESCE(?, start_time),
                end_time = COALESCE(?, end_time),
                weight = ?,
                is_reproduction = ?,
                is_active = ?,
                allow_wp_only = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(update.start_time.map(|dt| dt.naive_utc()))
        .bind(update.end_time.map(|dt| dt.naive_utc()))
        .bind(update.weight.unwrap_or(existing.weight))
        .bind(update.is_reproduction.unwrap_or(existing.is_reproduction) as i32)
        .bind(update.is_active.unwrap_or(existing.is_active) as i32)
        .bind(update.allow_wp_only.unwrap_or(existing.allow_wp_only) as i32)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.find_by_id(id, true)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated event".to_string()))
    }

    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()> {
        sqlx::query("UPDATE events SET lifecycle = ? WHERE id = ?")
            .bind(lifecycle_to_str(&lifecycle))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn purge(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM submission_items WHERE submission_id IN \
             (SELECT id FROM submissions WHERE event_id = ?)",
        )
        .bind(&id_str)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM submissions WHERE event_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM challenges WHERE event_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
