use std::sync::Arc;

use ctfboard::{
    auth::AuthService,
    domain::{
        CreateChallengeRequest, CreateEventRequest, CreateSubmissionRequest, CreateUserRequest,
        ItemState, ResubmitRequest, Role, TeamType, User,
    },
    error::AppError,
    notify::NotifierManager,
    service::ServiceContext,
};
use sqlx::SqlitePool;
use uuid::Uuid;

async fn setup() -> anyhow::Result<ServiceContext> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(ServiceContext::new(
        pool,
        Arc::new(NotifierManager::new()),
    ))
}

async fn create_user(ctx: &ServiceContext, username: &str, role: Role) -> anyhow::Result<User> {
    let hash = AuthService::hash_password("password123").await?;
    let user = ctx
        .user_repo
        .create(
            CreateUserRequest {
                username: username.to_string(),
                password: "password123".to_string(),
                email: None,
                role,
                team_type: TeamType::Main,
            },
            &hash,
        )
        .await?;
    Ok(user)
}

/// Creates one event with two challenges and one pending submission
/// claiming both.
async fn create_submission(
    ctx: &ServiceContext,
    owner: &User,
) -> anyhow::Result<(Uuid, Vec<Uuid>)> {
    let event = ctx
        .event_repo
        .create(CreateEventRequest {
            name: "Test CTF".to_string(),
            start_time: None,
            end_time: None,
            weight: 2.0,
            is_reproduction: false,
            allow_wp_only: true,
        })
        .await?;

    let mut challenge_ids = Vec::new();
    for (name, score) in [("web-100", 100), ("pwn-200", 200)] {
        let challenge = ctx
            .challenge_repo
            .create(
                event.id,
                CreateChallengeRequest {
                    name: name.to_string(),
                    category: name.split('-').next().unwrap().to_string(),
                    base_score: score,
                },
            )
            .await?;
        challenge_ids.push(challenge.id);
    }

    let submission = ctx
        .submission_service
        .create(
            owner,
            CreateSubmissionRequest {
                event_id: event.id,
                challenge_ids: challenge_ids.clone(),
                wp_url: Some("https://example.com/writeup".to_string()),
                wp_md: None,
            },
        )
        .await?;

    Ok((submission.id, challenge_ids))
}

#[tokio::test]
async fn test_item_toggle_cycle() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let reviewer = create_user(&ctx, "reviewer", Role::Reviewer).await?;
    let owner = create_user(&ctx, "owner", Role::Member).await?;
    let (submission_id, _) = create_submission(&ctx, &owner).await?;

    let items = ctx.submission_repo.items(submission_id).await?;
    let item_id = items[0].id;
    assert_eq!(items[0].state, ItemState::Pending);

    // Pending items cannot be revoked.
    let err = ctx
        .review_service
        .toggle_revoke(&reviewer, item_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let item = ctx.review_service.toggle_approve(&reviewer, item_id).await?;
    assert_eq!(item.state, ItemState::Approved);

    let item = ctx.review_service.toggle_revoke(&reviewer, item_id).await?;
    assert_eq!(item.state, ItemState::Revoked);

    // Revoking again restores approval.
    let item = ctx.review_service.toggle_revoke(&reviewer, item_id).await?;
    assert_eq!(item.state, ItemState::Approved);

    // Un-approving from Revoked lands on Pending, clearing revocation.
    ctx.review_service.toggle_revoke(&reviewer, item_id).await?;
    let item = ctx.review_service.toggle_approve(&reviewer, item_id).await?;
    assert_eq!(item.state, ItemState::Pending);

    Ok(())
}

#[tokio::test]
async fn test_members_cannot_review() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let owner = create_user(&ctx, "owner", Role::Member).await?;
    let (submission_id, _) = create_submission(&ctx, &owner).await?;

    let items = ctx.submission_repo.items(submission_id).await?;
    let err = ctx
        .review_service
        .toggle_approve(&owner, items[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn test_reject_clears_manual_points_and_freezes_items() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let reviewer = create_user(&ctx, "reviewer", Role::Reviewer).await?;
    let owner = create_user(&ctx, "owner", Role::Member).await?;
    let (submission_id, _) = create_submission(&ctx, &owner).await?;

    ctx.review_service
        .set_manual_points(&reviewer, submission_id, Some(500.0))
        .await?;

    ctx.review_service
        .reject(&reviewer, submission_id, "no writeup content")
        .await?;

    let submission = ctx
        .submission_repo
        .find_by_id(submission_id, false)
        .await?
        .unwrap();
    assert!(submission.is_rejected());
    assert_eq!(submission.manual_points, None);
    assert_eq!(
        submission.rejection.as_ref().unwrap().reason,
        "no writeup content"
    );

    // Item transitions and manual points are frozen while rejected.
    let items = ctx.submission_repo.items(submission_id).await?;
    let err = ctx
        .review_service
        .toggle_approve(&reviewer, items[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let err = ctx
        .review_service
        .set_manual_points(&reviewer, submission_id, Some(10.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    // Rejecting twice is an error.
    let err = ctx
        .review_service
        .reject(&reviewer, submission_id, "again")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    Ok(())
}

#[tokio::test]
async fn test_unreject_does_not_restore_manual_points() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let reviewer = create_user(&ctx, "reviewer", Role::Reviewer).await?;
    let owner = create_user(&ctx, "owner", Role::Member).await?;
    let (submission_id, _) = create_submission(&ctx, &owner).await?;

    ctx.review_service
        .set_manual_points(&reviewer, submission_id, Some(500.0))
        .await?;
    ctx.review_service
        .reject(&reviewer, submission_id, "wrong event")
        .await?;
    ctx.review_service.unreject(&reviewer, submission_id).await?;

    let submission = ctx
        .submission_repo
        .find_by_id(submission_id, false)
        .await?
        .unwrap();
    assert!(!submission.is_rejected());
    assert_eq!(submission.manual_points, None);

    Ok(())
}

#[tokio::test]
async fn test_resubmit_preserves_created_at() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let reviewer = create_user(&ctx, "reviewer", Role::Reviewer).await?;
    let owner = create_user(&ctx, "owner", Role::Member).await?;
    let (submission_id, challenge_ids) = create_submission(&ctx, &owner).await?;

    let before = ctx
        .submission_repo
        .find_by_id(submission_id, false)
        .await?
        .unwrap();

    // Only rejected submissions can be re-edited.
    let err = ctx
        .review_service
        .resubmit_edit(
            &owner,
            submission_id,
            ResubmitRequest {
                challenge_ids: challenge_ids.clone(),
                wp_url: None,
                wp_md: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    ctx.review_service
        .reject(&reviewer, submission_id, "claimed unsolved challenge")
        .await?;

    // Foreign ids are dropped; the kept one becomes a fresh pending item.
    let after = ctx
        .review_service
        .resubmit_edit(
            &owner,
            submission_id,
            ResubmitRequest {
                challenge_ids: vec![challenge_ids[0], Uuid::new_v4()],
                wp_url: Some("https://example.com/fixed".to_string()),
                wp_md: None,
            },
        )
        .await?;

    assert!(!after.is_rejected());
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.wp_url.as_deref(), Some("https://example.com/fixed"));

    let items = ctx.submission_repo.items(submission_id).await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].state, ItemState::Pending);
    assert_eq!(items[0].challenge_id, challenge_ids[0]);

    // A non-owner cannot re-edit, even a reviewer.
    ctx.review_service
        .reject(&reviewer, submission_id, "still wrong")
        .await?;
    let err = ctx
        .review_service
        .resubmit_edit(
            &reviewer,
            submission_id,
            ResubmitRequest {
                challenge_ids: vec![],
                wp_url: None,
                wp_md: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn test_approve_all_is_idempotent() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let reviewer = create_user(&ctx, "reviewer", Role::Reviewer).await?;
    let owner = create_user(&ctx, "owner", Role::Member).await?;
    let (submission_id, _) = create_submission(&ctx, &owner).await?;

    let approved = ctx.review_service.approve_all(&reviewer, submission_id).await?;
    assert_eq!(approved, 2);

    let approved = ctx.review_service.approve_all(&reviewer, submission_id).await?;
    assert_eq!(approved, 0);

    let items = ctx.submission_repo.items(submission_id).await?;
    assert!(items.iter().all(|it| it.state == ItemState::Approved));

    Ok(())
}

#[tokio::test]
async fn test_owner_delete_rules() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let reviewer = create_user(&ctx, "reviewer", Role::Reviewer).await?;
    let owner = create_user(&ctx, "owner", Role::Member).await?;
    let (submission_id, _) = create_submission(&ctx, &owner).await?;

    // Unreviewed: the owner may delete; then a reviewer restores.
    ctx.review_service.soft_delete(&owner, submission_id).await?;
    assert!(ctx
        .submission_repo
        .find_by_id(submission_id, false)
        .await?
        .is_none());
    ctx.review_service.restore(&reviewer, submission_id).await?;

    // Once an item is approved, the owner may no longer delete.
    ctx.review_service.approve_all(&reviewer, submission_id).await?;
    let err = ctx
        .review_service
        .soft_delete(&owner, submission_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    // A reviewer still can.
    ctx.review_service.soft_delete(&reviewer, submission_id).await?;

    Ok(())
}

#[tokio::test]
async fn test_rejection_creates_inbox_notification() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let reviewer = create_user(&ctx, "reviewer", Role::Reviewer).await?;
    let owner = create_user(&ctx, "owner", Role::Member).await?;
    let (submission_id, _) = create_submission(&ctx, &owner).await?;

    ctx.review_service
        .reject(&reviewer, submission_id, "duplicate of an earlier entry")
        .await?;

    let inbox = ctx.notification_service.inbox(&owner, None, 1).await?;
    assert_eq!(inbox.total, 1);
    assert_eq!(inbox.unread_total, 1);
    assert!(inbox.items[0]
        .notification
        .content
        .contains("duplicate of an earlier entry"));

    // Unrejecting suppresses the related notification.
    ctx.review_service.unreject(&reviewer, submission_id).await?;
    let inbox = ctx.notification_service.inbox(&owner, None, 1).await?;
    assert_eq!(inbox.total, 0);

    Ok(())
}
