use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;
use crate::scoring::ScoredSubmission;

pub mod adjustment_repository;
pub mod challenge_repository;
pub mod event_repository;
pub mod notification_repository;
pub mod submission_repository;
pub mod user_repository;

pub use adjustment_repository::SqliteAdjustmentRepository;
pub use challenge_repository::SqliteChallengeRepository;
pub use event_repository::SqliteEventRepository;
pub use notification_repository::SqliteNotificationRepository;
pub use submission_repository::SqliteSubmissionRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, request: CreateUserRequest, password_hash: &str) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn password_hash_by_username(&self, username: &str) -> Result<Option<String>>;
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()>;
    async fn list(&self, include_deleted: bool) -> Result<Vec<User>>;
    async fn update(&self, id: Uuid, update: UpdateUserRequest) -> Result<User>;
    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()>;
    /// Hard delete with explicit cascade: owned submissions and their
    /// items go, adjustment authorship is nulled, sessions and
    /// notifications are removed, then the user row itself.
    async fn purge(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, request: CreateEventRequest) -> Result<Event>;
    async fn find_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Option<Event>>;
    async fn list(&self, include_deleted: bool) -> Result<Vec<Event>>;
    async fn list_active(&self) -> Result<Vec<Event>>;
    async fn update(&self, id: Uuid, update: UpdateEventRequest) -> Result<Event>;
    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()>;
    /// Hard delete with explicit cascade: submission items, submissions
    /// and challenges of the event first, then the event row.
    async fn purge(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    async fn create(&self, event_id: Uuid, request: CreateChallengeRequest) -> Result<Challenge>;
    async fn find_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Option<Challenge>>;
    async fn list_by_event(
        &self,
        event_id: Uuid,
        include_deleted: bool,
        category: Option<&str>,
        name_query: Option<&str>,
    ) -> Result<Vec<Challenge>>;
    async fn update(&self, id: Uuid, update: UpdateChallengeRequest) -> Result<Challenge>;
    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()>;
    /// Number of submission items referencing this challenge.
    async fn reference_count(&self, id: Uuid) -> Result<i64>;
    async fn purge(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        challenge_ids: &[Uuid],
        wp_url: Option<String>,
        wp_md: Option<String>,
    ) -> Result<Submission>;
    async fn find_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Option<Submission>>;
    async fn list_by_user(&self, user_id: Uuid, include_deleted: bool) -> Result<Vec<Submission>>;
    async fn list_for_review(&self, event_id: Option<Uuid>) -> Result<Vec<Submission>>;
    async fn items(&self, submission_id: Uuid) -> Result<Vec<SubmissionItem>>;
    async fn find_item(&self, item_id: Uuid) -> Result<Option<SubmissionItem>>;
    async fn set_item_state(&self, item_id: Uuid, state: ItemState) -> Result<()>;
    /// Pending -> Approved for every item of one submission; idempotent.
    async fn approve_pending_items(&self, submission_id: Uuid) -> Result<u64>;
    /// Pending -> Approved across a whole event, skipping rejected
    /// submissions (their items must stay inert).
    async fn approve_pending_items_for_event(&self, event_id: Uuid) -> Result<u64>;
    async fn set_manual_points(&self, id: Uuid, value: Option<f64>) -> Result<()>;
    /// Setting a rejection also clears any manual override in the same
    /// statement; clearing leaves manual points alone.
    async fn set_rejection(&self, id: Uuid, rejection: Option<Rejection>) -> Result<()>;
    /// Destructively replace the item set for a re-edit: delete all
    /// items, insert fresh pending ones, replace the writeup fields and
    /// clear both rejection and manual override. `created_at` is never
    /// touched.
    async fn replace_items(
        &self,
        id: Uuid,
        challenge_ids: &[Uuid],
        wp_url: Option<String>,
        wp_md: Option<String>,
    ) -> Result<()>;
    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()>;
    /// Scoring facts for every non-deleted submission: event weight and
    /// per-item base scores, soft-deleted challenges included (existence
    /// matters to scoring, not visibility).
    async fn scored_all(&self) -> Result<Vec<ScoredSubmission>>;
    async fn scored_by_user(&self, user_id: Uuid) -> Result<Vec<ScoredSubmission>>;
}

#[async_trait]
pub trait AdjustmentRepository: Send + Sync {
    async fn create(
        &self,
        request: CreateAdjustmentRequest,
        created_by: Option<Uuid>,
    ) -> Result<PointAdjustment>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PointAdjustment>>;
    async fn list(&self, include_deleted: bool) -> Result<Vec<PointAdjustment>>;
    async fn list_by_user(&self, user_id: Uuid, include_deleted: bool)
        -> Result<Vec<PointAdjustment>>;
    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, new: NewNotification) -> Result<Notification>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>>;
    async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<ReadStatus>,
        include_deleted: bool,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Notification>>;
    async fn count_by_user(
        &self,
        user_id: Uuid,
        status: Option<ReadStatus>,
        include_deleted: bool,
    ) -> Result<i64>;
    async fn mark_read(&self, id: Uuid) -> Result<()>;
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64>;
    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()>;
    /// Suppress notifications tied to a state transition that was
    /// undone, matched by kind + related id.
    async fn soft_delete_related(&self, kind: NotificationKind, related_id: Uuid) -> Result<u64>;
    async fn soft_delete_batch(&self, batch_id: Uuid) -> Result<u64>;
}
