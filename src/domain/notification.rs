use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Lifecycle;

/// User-addressed message created as a side effect of a rejection or
/// an admin broadcast. `read_at == None` means unread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    /// Markdown body; rendered through the sanitizing transform before
    /// display, never shown raw.
    pub content: String,
    pub related_id: Option<Uuid>,
    /// Groups the notifications of one broadcast so the whole batch can
    /// be recalled together.
    pub batch_id: Option<Uuid>,
    pub read_at: Option<DateTime<Utc>>,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT")]
pub enum NotificationKind {
    Rejection,
    Announcement,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

/// Inbox filter: `None` means both read and unread.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReadStatus {
    Unread,
    Read,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub content: String,
    pub related_id: Option<Uuid>,
    pub batch_id: Option<Uuid>,
}
