pub mod adjustment_service;
pub mod leaderboard_service;
pub mod notification_service;
pub mod review_service;
pub mod submission_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::notify::NotifierManager;
use crate::repository::*;

pub use adjustment_service::{AdjustmentFilter, AdjustmentService};
pub use leaderboard_service::{
    CountLeaderboardOverview, LeaderboardOverview, LeaderboardService, ScoredEntry,
    UserScoreSummary,
};
pub use notification_service::{Inbox, InboxItem, NotificationService, INBOX_PAGE_SIZE};
pub use review_service::{ReviewService, SubmissionDetail, SubmissionReviewRow};
pub use submission_service::SubmissionService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub challenge_repo: Arc<dyn ChallengeRepository>,
    pub submission_repo: Arc<dyn SubmissionRepository>,
    pub adjustment_repo: Arc<dyn AdjustmentRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub notifier_manager: Arc<NotifierManager>,
    pub auth_service: Arc<AuthService>,
    pub submission_service: Arc<SubmissionService>,
    pub review_service: Arc<ReviewService>,
    pub leaderboard_service: Arc<LeaderboardService>,
    pub adjustment_service: Arc<AdjustmentService>,
    pub notification_service: Arc<NotificationService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(pool: SqlitePool, notifier_manager: Arc<NotifierManager>) -> Self {
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(pool.clone()));
        let event_repo: Arc<dyn EventRepository> =
            Arc::new(SqliteEventRepository::new(pool.clone()));
        let challenge_repo: Arc<dyn ChallengeRepository> =
            Arc::new(SqliteChallengeRepository::new(pool.clone()));
        let submission_repo: Arc<dyn SubmissionRepository> =
            Arc::new(SqliteSubmissionRepository::new(pool.clone()));
        let adjustment_repo: Arc<dyn AdjustmentRepository> =
            Arc::new(SqliteAdjustmentRepository::new(pool.clone()));
        let notification_repo: Arc<dyn NotificationRepository> =
            Arc::new(SqliteNotificationRepository::new(pool.clone()));

        let auth_service = Arc::new(AuthService::new(pool.clone()));

        let notification_service = Arc::new(NotificationService::new(
            notification_repo.clone(),
            user_repo.clone(),
            notifier_manager.clone(),
        ));
        let submission_service = Arc::new(SubmissionService::new(
            submission_repo.clone(),
            event_repo.clone(),
            challenge_repo.clone(),
        ));
        let review_service = Arc::new(ReviewService::new(
            submission_repo.clone(),
            event_repo.clone(),
            challenge_repo.clone(),
            user_repo.clone(),
            notification_repo.clone(),
            notifier_manager.clone(),
        ));
        let leaderboard_service = Arc::new(LeaderboardService::new(
            user_repo.clone(),
            submission_repo.clone(),
            adjustment_repo.clone(),
        ));
        let adjustment_service = Arc::new(AdjustmentService::new(
            adjustment_repo.clone(),
            user_repo.clone(),
        ));

        Self {
            user_repo,
            event_repo,
            challenge_repo,
            submission_repo,
            adjustment_repo,
            notification_repo,
            notifier_manager,
            auth_service,
            submission_service,
            review_service,
            leaderboard_service,
            adjustment_service,
            notification_service,
            db_pool: pool,
        }
    }
}
