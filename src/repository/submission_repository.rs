use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{ItemState, Lifecycle, Rejection, Submission, SubmissionItem},
    error::{AppError, Result},
    repository::user_repository::{lifecycle_to_str, parse_lifecycle},
    repository::SubmissionRepository,
    scoring::{ItemFacts, ScoredSubmission},
};

#[derive(FromRow)]
struct SubmissionRow {
    id: String,
    user_id: String,
    event_id: String,
    wp_url: Option<String>,
    wp_md: Option<String>,
    manual_points: Option<f64>,
    rejected: i32,
    rejected_reason: Option<String>,
    rejected_at: Option<NaiveDateTime>,
    rejected_by_id: Option<String>,
    lifecycle: String,
    created_at: NaiveDateTime,
}

#[derive(FromRow)]
struct ItemRow {
    id: String,
    submission_id: String,
    challenge_id: String,
    state: String,
    created_at: NaiveDateTime,
}

#[derive(FromRow)]
struct ScoredSubmissionRow {
    id: String,
    user_id: String,
    created_at: NaiveDateTime,
    rejected: i32,
    manual_points: Option<f64>,
    event_weight: Option<f64>,
}

#[derive(FromRow)]
struct ItemFactsRow {
    submission_id: String,
    state: String,
    base_score: Option<i64>,
}

const SUBMISSION_COLUMNS: &str = "id, user_id, event_id, wp_url, wp_md, manual_points, rejected, \
     rejected_reason, rejected_at, rejected_by_id, lifecycle, created_at";

pub struct SqliteSubmissionRepository {
    pool: SqlitePool,
}

impl SqliteSubmissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_submission(row: SubmissionRow) -> Result<Submission> {
        let rejection = if row.rejected != 0 {
            Some(Rejection {
                reason: row.rejected_reason.unwrap_or_default(),
                rejected_at: row
                    .rejected_at
                    .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
                    .unwrap_or_else(Utc::now),
                rejected_by_id: row
                    .rejected_by_id
                    .as_deref()
                    .and_then(|s| Uuid::parse_str(s).ok()),
            })
        } else {
            None
        };

        Ok(Submission {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            event_id: Uuid::parse_str(&row.event_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            wp_url: row.wp_url,
            wp_md: row.wp_md,
            manual_points: row.manual_points,
            rejection,
            lifecycle: parse_lifecycle(&row.lifecycle)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    fn row_to_item(row: ItemRow) -> Result<SubmissionItem> {
        Ok(SubmissionItem {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            submission_id: Uuid::parse_str(&row.submission_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            challenge_id: Uuid::parse_str(&row.challenge_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            state: parse_item_state(&row.state)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    /// Item facts for a set of scored submissions, soft-deleted
    /// challenges included; the LEFT JOIN leaves base_score NULL only
    /// when the challenge row was hard-deleted.
    async fn item_facts_by_submission(&self) -> Result<HashMap<String, Vec<ItemFacts>>> {
        let rows = sqlx::query_as::<_, ItemFactsRow>(
            r#"
            SELECT si.submission_id, si.state, c.base_score
            FROM submission_items si
            LEFT JOIN challenges c ON c.id = si.challenge_id
            JOIN submissions s ON s.id = si.submission_id
            WHERE s.lifecycle = 'Active'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut facts: HashMap<String, Vec<ItemFacts>> = HashMap::new();
        for row in rows {
            facts.entry(row.submission_id).or_default().push(ItemFacts {
                state: parse_item_state(&row.state)?,
                base_score: row.base_score,
            });
        }
        Ok(facts)
    }

    fn assemble_scored(
        rows: Vec<ScoredSubmissionRow>,
        mut facts: HashMap<String, Vec<ItemFacts>>,
    ) -> Result<Vec<ScoredSubmission>> {
        rows.into_iter()
            .map(|row| {
                Ok(ScoredSubmission {
                    submission_id: Uuid::parse_str(&row.id)
                        .map_err(|e| AppError::Database(e.to_string()))?,
                    user_id: Uuid::parse_str(&row.user_id)
                        .map_err(|e| AppError::Database(e.to_string()))?,
                    created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
                    rejected: row.rejected != 0,
                    manual_points: row.manual_points,
                    event_weight: row.event_weight,
                    items: facts.remove(&row.id).unwrap_or_default(),
                })
            })
            .collect()
    }
}

pub(crate) fn parse_item_state(s: &str) -> Result<ItemState> {
    match s {
        "Pending" => Ok(ItemState::Pending),
        "Approved" => Ok(ItemState::Approved),
        "Revoked" => Ok(ItemState::Revoked),
        _ => Err(AppError::Database(format!("Invalid item state: {}", s))),
    }
}

pub(crate) fn item_state_to_str(state: &ItemState) -> &'static str {
    match state {
        ItemState::Pending => "Pending",
        ItemState::Approved => "Approved",
        ItemState::Revoked => "Revoked",
    }
}

#[async_trait]
impl SubmissionRepository for SqliteSubmissionRepository {
    async fn create(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        challenge_ids: &[Uuid],
        wp_url: Option<String>,
        wp_md: Option<String>,
    ) -> Result<Submission> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO submissions (
                id, user_id, event_id, wp_url, wp_md, rejected, lifecycle, created_at
            ) VALUES (?, ?, ?, ?, ?, 0, 'Active', ?)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(event_id.to_string())
        .bind(&wp_url)
        .bind(&wp_md)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for challenge_id in challenge_ids {
            sqlx::query(
                r#"
                INSERT INTO submission_items (id, submission_id, challenge_id, state, created_at)
                VALUES (?, ?, ?, 'Pending', ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(id.to_string())
            .bind(challenge_id.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_by_id(id, false)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created submission".to_string()))
    }

    async fn find_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Option<Submission>> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {} FROM submissions WHERE id = ? AND (? OR lifecycle = 'Active')",
            SUBMISSION_COLUMNS
        ))
        .bind(id.to_string())
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_submission(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: Uuid, include_deleted: bool) -> Result<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {} FROM submissions WHERE user_id = ? AND (? OR lifecycle = 'Active') \
             ORDER BY created_at DESC",
            SUBMISSION_COLUMNS
        ))
        .bind(user_id.to_string())
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_submission).collect()
    }

    async fn list_for_review(&self, event_id: Option<Uuid>) -> Result<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {} FROM submissions WHERE lifecycle = 'Active' \
             AND (? IS NULL OR event_id = ?) ORDER BY created_at DESC",
            SUBMISSION_COLUMNS
        ))
        .bind(event_id.map(|id| id.to_string()))
        .bind(event_id.map(|id| id.to_string()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_submission).collect()
    }

    async fn items(&self, submission_id: Uuid) -> Result<Vec<SubmissionItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT id, submission_id, challenge_id, state, created_at \
             FROM submission_items WHERE submission_id = ? ORDER BY created_at ASC",
        )
        .bind(submission_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn find_item(&self, item_id: Uuid) -> Result<Option<SubmissionItem>> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, submission_id, challenge_id, state, created_at \
             FROM submission_items WHERE id = ?",
        )
        .bind(item_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_item(r)?)),
            None => Ok(None),
        }
    }

    async fn set_item_state(&self, item_id: Uuid, state: ItemState) -> Result<()> {
        sqlx::query("UPDATE submission_items SET state = ? WHERE id = ?")
            .bind(item_state_to_str(&state))
            .bind(item_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn approve_pending_items(&self, submission_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE submission_items SET state = 'Approved' \
             WHERE submission_id = ? AND state = 'Pending'",
        )
        .bind(submission_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn approve_pending_items_for_event(&self, event_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE submission_items SET state = 'Approved'
            WHERE state = 'Pending' AND submission_id IN (
                SELECT id FROM submissions
                WHERE event_id = ? AND rejected = 0 AND lifecycle = 'Active'
            )
            "#,
        )
        .bind(event_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn set_manual_points(&self, id: Uuid, value: Option<f64>) -> Result<()> {
        sqlx::query("UPDATE submissions SET manual_points = ? WHERE id = ?")
            .bind(value)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_rejection(&self, id: Uuid, rejection: Option<Rejection>) -> Result<()> {
        match rejection {
            Some(rejection) => {
                // The rejection is authoritative: any prior manual
                // scoring decision is erased in the same statement.
                sqlx::query(
                    r#"
                    UPDATE submissions
                    SET rejected = 1,
                        rejected_reason = ?,
                        rejected_at = ?,
                        rejected_by_id = ?,
                        manual_points = NULL
                    WHERE id = ?
                    "#,
                )
                .bind(&rejection.reason)
                .bind(rejection.rejected_at.naive_utc())
                .bind(rejection.rejected_by_id.map(|u| u.to_string()))
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE submissions
                    SET rejected = 0,
                        rejected_reason = NULL,
                        rejected_at = NULL,
                        rejected_by_id = NULL
                    WHERE id = ?
                    "#,
                )
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;
            }
        }

        Ok(())
    }

    async fn replace_items(
        &self,
        id: Uuid,
        challenge_ids: &[Uuid],
        wp_url: Option<String>,
        wp_md: Option<String>,
    ) -> Result<()> {
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM submission_items WHERE submission_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        for challenge_id in challenge_ids {
            sqlx::query(
                r#"
                INSERT INTO submission_items (id, submission_id, challenge_id, state, created_at)
                VALUES (?, ?, ?, 'Pending', ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(id.to_string())
            .bind(challenge_id.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        // created_at deliberately untouched: a resubmission stays in
        // its original scoring month.
        sqlx::query(
            r#"
            UPDATE submissions
            SET wp_url = ?,
                wp_md = ?,
                manual_points = NULL,
                rejected = 0,
                rejected_reason = NULL,
                rejected_at = NULL,
                rejected_by_id = NULL
            WHERE id = ?
            "#,
        )
        .bind(&wp_url)
        .bind(&wp_md)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()> {
        sqlx::query("UPDATE submissions SET lifecycle = ? WHERE id = ?")
            .bind(lifecycle_to_str(&lifecycle))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn scored_all(&self) -> Result<Vec<ScoredSubmission>> {
        let rows = sqlx::query_as::<_, ScoredSubmissionRow>(
            r#"
            SELECT s.id, s.user_id, s.created_at, s.rejected, s.manual_points,
                   e.weight AS event_weight
            FROM submissions s
            LEFT JOIN events e ON e.id = s.event_id
            WHERE s.lifecycle = 'Active'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let facts = self.item_facts_by_submission().await?;
        Self::assemble_scored(rows, facts)
    }

    async fn scored_by_user(&self, user_id: Uuid) -> Result<Vec<ScoredSubmission>> {
        let rows = sqlx::query_as::<_, ScoredSubmissionRow>(
            r#"
            SELECT s.id, s.user_id, s.created_at, s.rejected, s.manual_points,
                   e.weight AS event_weight
            FROM submissions s
            LEFT JOIN events e ON e.id = s.event_id
            WHERE s.lifecycle = 'Active' AND s.user_id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let facts = self.item_facts_by_submission().await?;
        Self::assemble_scored(rows, facts)
    }
}
