use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Challenge, CreateChallengeRequest, Lifecycle, UpdateChallengeRequest},
    error::{AppError, Result},
    repository::user_repository::{lifecycle_to_str, parse_lifecycle},
    repository::ChallengeRepository,
};

#[derive(FromRow)]
struct ChallengeRow {
    id: String,
    event_id: String,
    name: String,
    category: String,
    base_score: i64,
    lifecycle: String,
    created_at: NaiveDateTime,
}

const CHALLENGE_COLUMNS: &str = "id, event_id, name, category, base_score, lifecycle, created_at";

pub struct SqliteChallengeRepository {
    pool: SqlitePool,
}

impl SqliteChallengeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_challenge(row: ChallengeRow) -> Result<Challenge> {
        Ok(Challenge {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            event_id: Uuid::parse_str(&row.event_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            category: row.category,
            base_score: row.base_score,
            lifecycle: parse_lifecycle(&row.lifecycle)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl ChallengeRepository for SqliteChallengeRepository {
    async fn create(&self, event_id: Uuid, request: CreateChallengeRequest) -> Result<Challenge> {
        if request.base_score < 0 {
            return Err(AppError::Validation(
                "Base score must not be negative".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO challenges (id, event_id, name, category, base_score, lifecycle, created_at)
            VALUES (?, ?, ?, ?, ?, 'Active', ?)
            "#,
        )
        .bind(id.to_string())
        .bind(event_id.to_string())
        .bind(&request.name)
        .bind(&request.category)
        .bind(request.base_score)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id, false)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created challenge".to_string()))
    }

    async fn find_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Option<Challenge>> {
        let row = sqlx::query_as::<_, ChallengeRow>(&format!(
            "SELECT {} FROM challenges WHERE id = ? AND (? OR lifecycle = 'Active')",
            CHALLENGE_COLUMNS
        ))
        .bind(id.to_string())
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_challenge(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_event(
        &self,
        event_id: Uuid,
        include_deleted: bool,
        category: Option<&str>,
        name_query: Option<&str>,
    ) -> Result<Vec<Challenge>> {
        let rows = sqlx::query_as::<_, ChallengeRow>(&format!(
            r#"
            SELECT {}
            FROM challenges
            WHERE event_id = ?
              AND (? OR lifecycle = 'Active')
              AND (? IS NULL OR category = ?)
              AND (? IS NULL OR name LIKE '%' || ? || '%')
            ORDER BY created_at ASC
            "#,
            CHALLENGE_COLUMNS
        ))
        .bind(event_id.to_string())
        .bind(include_deleted)
        .bind(category)
        .bind(category)
        .bind(name_query)
        .bind(name_query)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_challenge).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateChallengeRequest) -> Result<Challenge> {
        if update.base_score.is_some_and(|s| s < 0) {
            return Err(AppError::Validation(
                "Base score must not be negative".to_string(),
            ));
        }

        self.find_by_id(id, true)
            .await?
            .ok_or_else(|| AppError::NotFound("Challenge not found".to_string()))?;

        sqlx::query(
            r#"
            UPDATE challenges
            SET name = COALESCE(?, name),
                category = COALESCE(?, category),
                base_score = COALESCE(?, base_score)
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.category)
        .bind(update.base_score)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.find_by_id(id, true)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated challenge".to_string()))
    }

    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()> {
        sqlx::query("UPDATE challenges SET lifecycle = ? WHERE id = ?")
            .bind(lifecycle_to_str(&lifecycle))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn reference_count(&self, id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM submission_items WHERE challenge_id = ?",
        )
        .bind(id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn purge(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Referencing items go with the challenge; their submissions
        // simply lose one claim.
        sqlx::query("DELETE FROM submission_items WHERE challenge_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM challenges WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
