use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Lifecycle, NewNotification, Notification, NotificationKind, ReadStatus},
    error::{AppError, Result},
    repository::user_repository::{lifecycle_to_str, parse_lifecycle},
    repository::NotificationRepository,
};

#[derive(FromRow)]
struct NotificationRow {
    id: String,
    user_id: String,
    kind: String,
    title: String,
    content: String,
    related_id: Option<String>,
    batch_id: Option<String>,
    read_at: Option<NaiveDateTime>,
    lifecycle: String,
    created_at: NaiveDateTime,
}

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, title, content, related_id, batch_id, read_at, lifecycle, created_at";

pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_notification(row: NotificationRow) -> Result<Notification> {
        Ok(Notification {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            kind: parse_kind(&row.kind)?,
            title: row.title,
            content: row.content,
            related_id: row
                .related_id
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok()),
            batch_id: row
                .batch_id
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok()),
            read_at: row
                .read_at
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            lifecycle: parse_lifecycle(&row.lifecycle)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

fn parse_kind(s: &str) -> Result<NotificationKind> {
    match s {
        "Rejection" => Ok(NotificationKind::Rejection),
        "Announcement" => Ok(NotificationKind::Announcement),
        _ => Err(AppError::Database(format!(
            "Invalid notification kind: {}",
            s
        ))),
    }
}

fn kind_to_str(kind: &NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Rejection => "Rejection",
        NotificationKind::Announcement => "Announcement",
    }
}

/// (unread-only, read-only) flags for the SQL filter; `None` matches
/// both.
fn status_flags(status: Option<ReadStatus>) -> (bool, bool) {
    match status {
        Some(ReadStatus::Unread) => (true, false),
        Some(ReadStatus::Read) => (false, true),
        None => (false, false),
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn create(&self, new: NewNotification) -> Result<Notification> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, user_id, kind, title, content, related_id, batch_id, lifecycle, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 'Active', ?)
            "#,
        )
        .bind(id.to_string())
        .bind(new.user_id.to_string())
        .bind(kind_to_str(&new.kind))
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.related_id.map(|u| u.to_string()))
        .bind(new.batch_id.map(|u| u.to_string()))
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created notification".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {} FROM notifications WHERE id = ?",
            NOTIFICATION_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_notification(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<ReadStatus>,
        include_deleted: bool,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Notification>> {
        let (unread_only, read_only) = status_flags(status);
        let offset = (page.max(1) - 1) * page_size;

        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE user_id = ?
              AND (? OR lifecycle = 'Active')
              AND (NOT ? OR read_at IS NULL)
              AND (NOT ? OR read_at IS NOT NULL)
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id.to_string())
        .bind(include_deleted)
        .bind(unread_only)
        .bind(read_only)
        .bind(page_size as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_notification).collect()
    }

    async fn count_by_user(
        &self,
        user_id: Uuid,
        status: Option<ReadStatus>,
        include_deleted: bool,
    ) -> Result<i64> {
        let (unread_only, read_only) = status_flags(status);

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE user_id = ?
              AND (? OR lifecycle = 'Active')
              AND (NOT ? OR read_at IS NULL)
              AND (NOT ? OR read_at IS NOT NULL)
            "#,
        )
        .bind(user_id.to_string())
        .bind(include_deleted)
        .bind(unread_only)
        .bind(read_only)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn mark_read(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE notifications SET read_at = ? WHERE id = ? AND read_at IS NULL")
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = ? \
             WHERE user_id = ? AND read_at IS NULL AND lifecycle = 'Active'",
        )
        .bind(Utc::now().naive_utc())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()> {
        sqlx::query("UPDATE notifications SET lifecycle = ? WHERE id = ?")
            .bind(lifecycle_to_str(&lifecycle))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn soft_delete_related(
        &self,
        kind: NotificationKind,
        related_id: Uuid,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET lifecycle = 'Deleted' WHERE kind = ? AND related_id = ?",
        )
        .bind(kind_to_str(&kind))
        .bind(related_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn soft_delete_batch(&self, batch_id: Uuid) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET lifecycle = 'Deleted' WHERE batch_id = ?")
                .bind(batch_id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
