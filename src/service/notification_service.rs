use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{Lifecycle, NewNotification, Notification, NotificationKind, ReadStatus, User},
    error::{AppError, Result},
    notify::{markdown::markdown_to_safe_html, NotifierManager, NotifyEvent},
    repository::{NotificationRepository, UserRepository},
};

pub const INBOX_PAGE_SIZE: u32 = 10;

pub struct NotificationService {
    notification_repo: Arc<dyn NotificationRepository>,
    user_repo: Arc<dyn UserRepository>,
    notifier_manager: Arc<NotifierManager>,
}

/// One page of a user's inbox.
#[derive(Debug, Clone, Serialize)]
pub struct Inbox {
    pub items: Vec<InboxItem>,
    pub total: i64,
    pub unread_total: i64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct InboxItem {
    #[serde(flatten)]
    pub notification: Notification,
    pub content_html: String,
}

impl InboxItem {
    fn from(notification: Notification) -> Self {
        let content_html = markdown_to_safe_html(&notification.content);
        Self {
            notification,
            content_html,
        }
    }
}

impl NotificationService {
    pub fn new(
        notification_repo: Arc<dyn NotificationRepository>,
        user_repo: Arc<dyn UserRepository>,
        notifier_manager: Arc<NotifierManager>,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
            notifier_manager,
        }
    }

    pub async fn inbox(
        &self,
        user: &User,
        status: Option<ReadStatus>,
        page: u32,
    ) -> Result<Inbox> {
        let page = page.max(1);
        let items = self
            .notification_repo
            .list_by_user(user.id, status, false, page, INBOX_PAGE_SIZE)
            .await?
            .into_iter()
            .map(InboxItem::from)
            .collect();
        let total = self
            .notification_repo
            .count_by_user(user.id, status, false)
            .await?;
        let unread_total = self
            .notification_repo
            .count_by_user(user.id, Some(ReadStatus::Unread), false)
            .await?;

        Ok(Inbox {
            items,
            total,
            unread_total,
            page,
            page_size: INBOX_PAGE_SIZE,
        })
    }

    pub async fn unread_count(&self, user: &User) -> Result<i64> {
        self.notification_repo
            .count_by_user(user.id, Some(ReadStatus::Unread), false)
            .await
    }

    /// Opening a notification marks it read as a side effect. Reading
    /// someone else's notification is a 404, not a 403. The inbox
    /// never confirms foreign ids exist.
    pub async fn open(&self, user: &User, id: Uuid) -> Result<InboxItem> {
        let notification = self
            .notification_repo
            .find_by_id(id)
            .await?
            .filter(|n| n.user_id == user.id && !n.lifecycle.is_deleted())
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if !notification.is_read() {
            self.notification_repo.mark_read(id).await?;
        }
        let notification = self
            .notification_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        Ok(InboxItem::from(notification))
    }

    pub async fn mark_all_read(&self, user: &User) -> Result<u64> {
        self.notification_repo.mark_all_read(user.id).await
    }

    pub async fn soft_delete(&self, user: &User, id: Uuid) -> Result<()> {
        self.notification_repo
            .find_by_id(id)
            .await?
            .filter(|n| n.user_id == user.id && !n.lifecycle.is_deleted())
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        self.notification_repo
            .set_lifecycle(id, Lifecycle::Deleted)
            .await
    }

    /// Announce to every active, non-deleted user. One batch id spans
    /// the whole broadcast so it can be recalled in one call. Outbound
    /// delivery is spawned off and never fails the request.
    pub async fn broadcast(&self, actor: &User, title: &str, body: &str) -> Result<Uuid> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation(
                "A broadcast title is required".to_string(),
            ));
        }

        let batch_id = Uuid::new_v4();
        let recipients: Vec<User> = self
            .user_repo
            .list(false)
            .await?
            .into_iter()
            .filter(|u| u.is_active)
            .collect();

        for recipient in &recipients {
            self.notification_repo
                .create(NewNotification {
                    user_id: recipient.id,
                    kind: NotificationKind::Announcement,
                    title: title.to_string(),
                    content: body.to_string(),
                    related_id: None,
                    batch_id: Some(batch_id),
                })
                .await?;
        }
        tracing::info!(
            "Broadcast {} delivered to {} users",
            batch_id,
            recipients.len()
        );

        let manager = self.notifier_manager.clone();
        let title = title.to_string();
        let body = body.to_string();
        tokio::spawn(async move {
            for recipient in recipients {
                manager
                    .handle_event(NotifyEvent::Broadcast {
                        recipient,
                        title: title.clone(),
                        body: body.clone(),
                    })
                    .await;
            }
        });

        Ok(batch_id)
    }

    /// Recall an entire broadcast: soft-deletes every notification in
    /// the batch, read or not.
    pub async fn recall_broadcast(&self, actor: &User, batch_id: Uuid) -> Result<u64> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }
        let affected = self.notification_repo.soft_delete_batch(batch_id).await?;
        if affected == 0 {
            return Err(AppError::NotFound("Broadcast not found".to_string()));
        }
        Ok(affected)
    }
}
