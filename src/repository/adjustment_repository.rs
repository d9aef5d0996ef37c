use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateAdjustmentRequest, Lifecycle, PointAdjustment},
    error::{AppError, Result},
    repository::user_repository::{lifecycle_to_str, parse_lifecycle},
    repository::AdjustmentRepository,
};

#[derive(FromRow)]
struct AdjustmentRow {
    id: String,
    user_id: String,
    amount: f64,
    year: i64,
    month: i64,
    reason: String,
    created_by: Option<String>,
    lifecycle: String,
    created_at: NaiveDateTime,
}

const ADJUSTMENT_COLUMNS: &str =
    "id, user_id, amount, year, month, reason, created_by, lifecycle, created_at";

pub struct SqliteAdjustmentRepository {
    pool: SqlitePool,
}

impl SqliteAdjustmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_adjustment(row: AdjustmentRow) -> Result<PointAdjustment> {
        Ok(PointAdjustment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            amount: row.amount,
            year: row.year as i32,
            month: row.month as u32,
            reason: row.reason,
            created_by: row
                .created_by
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok()),
            lifecycle: parse_lifecycle(&row.lifecycle)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl AdjustmentRepository for SqliteAdjustmentRepository {
    async fn create(
        &self,
        request: CreateAdjustmentRequest,
        created_by: Option<Uuid>,
    ) -> Result<PointAdjustment> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO point_adjustments (
                id, user_id, amount, year, month, reason, created_by, lifecycle, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 'Active', ?)
            "#,
        )
        .bind(id.to_string())
        .bind(request.user_id.to_string())
        .bind(request.amount)
        .bind(request.year)
        .bind(request.month)
        .bind(&request.reason)
        .bind(created_by.map(|u| u.to_string()))
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created adjustment".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PointAdjustment>> {
        let row = sqlx::query_as::<_, AdjustmentRow>(&format!(
            "SELECT {} FROM point_adjustments WHERE id = ?",
            ADJUSTMENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_adjustment(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<PointAdjustment>> {
        let rows = sqlx::query_as::<_, AdjustmentRow>(&format!(
            "SELECT {} FROM point_adjustments WHERE (? OR lifecycle = 'Active') \
             ORDER BY created_at DESC",
            ADJUSTMENT_COLUMNS
        ))
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_adjustment).collect()
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        include_deleted: bool,
    ) -> Result<Vec<PointAdjustment>> {
        let rows = sqlx::query_as::<_, AdjustmentRow>(&format!(
            "SELECT {} FROM point_adjustments WHERE user_id = ? AND (? OR lifecycle = 'Active') \
             ORDER BY created_at DESC",
            ADJUSTMENT_COLUMNS
        ))
        .bind(user_id.to_string())
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_adjustment).collect()
    }

    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()> {
        sqlx::query("UPDATE point_adjustments SET lifecycle = ? WHERE id = ?")
            .bind(lifecycle_to_str(&lifecycle))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
