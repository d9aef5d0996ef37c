use std::sync::Arc;

use ctfboard::{
    auth::AuthService,
    domain::{
        CreateChallengeRequest, CreateEventRequest, CreateSubmissionRequest, CreateUserRequest,
        Role, TeamType, UpdateEventRequest, User,
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
    Ok(ServiceContext::new(pool, Arc::new(NotifierManager::new())))
}

async fn create_member(ctx: &ServiceContext, username: &str) -> anyhow::Result<User> {
    let hash = AuthService::hash_password("password123").await?;
    let user = ctx
        .user_repo
        .create(
            CreateUserRequest {
                username: username.to_string(),
                password: "password123".to_string(),
                email: None,
                role: Role::Member,
                team_type: TeamType::Main,
            },
            &hash,
        )
        .await?;
    Ok(user)
}

#[tokio::test]
async fn test_intake_scopes_and_dedupes_challenges() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let alice = create_member(&ctx, "alice").await?;

    let event = ctx
        .event_repo
        .create(CreateEventRequest {
            name: "Scoping CTF".to_string(),
            start_time: None,
            end_time: None,
            weight: 1.0,
            is_reproduction: false,
            allow_wp_only: false,
        })
        .await?;
    let other_event = ctx
        .event_repo
        .create(CreateEventRequest {
            name: "Other CTF".to_string(),
            start_time: None,
            end_time: None,
            weight: 1.0,
            is_reproduction: false,
            allow_wp_only: false,
        })
        .await?;

    let own = ctx
        .challenge_repo
        .create(
            event.id,
            CreateChallengeRequest {
                name: "own".to_string(),
                category: "web".to_string(),
                base_score: 100,
            },
        )
        .await?;
    let foreign = ctx
        .challenge_repo
        .create(
            other_event.id,
            CreateChallengeRequest {
                name: "foreign".to_string(),
                category: "web".to_string(),
                base_score: 100,
            },
        )
        .await?;

    // Duplicates collapse; foreign and unknown ids are dropped.
    let submission = ctx
        .submission_service
        .create(
            &alice,
            CreateSubmissionRequest {
                event_id: event.id,
                challenge_ids: vec![own.id, own.id, foreign.id, Uuid::new_v4()],
                wp_url: None,
                wp_md: None,
            },
        )
        .await?;

    let items = ctx.submission_repo.items(submission.id).await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].challenge_id, own.id);

    Ok(())
}

#[tokio::test]
async fn test_intake_rejects_empty_selection_unless_wp_only() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let alice = create_member(&ctx, "alice").await?;

    let strict = ctx
        .event_repo
        .create(CreateEventRequest {
            name: "Strict CTF".to_string(),
            start_time: None,
            end_time: None,
            weight: 1.0,
            is_reproduction: false,
            allow_wp_only: false,
        })
        .await?;

    let err = ctx
        .submission_service
        .create(
            &alice,
            CreateSubmissionRequest {
                event_id: strict.id,
                challenge_ids: vec![],
                wp_url: None,
                wp_md: Some("writeup only".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let lenient = ctx
        .event_repo
        .create(CreateEventRequest {
            name: "Writeup CTF".to_string(),
            start_time: None,
            end_time: None,
            weight: 1.0,
            is_reproduction: true,
            allow_wp_only: true,
        })
        .await?;

    let submission = ctx
        .submission_service
        .create(
            &alice,
            CreateSubmissionRequest {
                event_id: lenient.id,
                challenge_ids: vec![],
                wp_url: Some("ftp://not-kept".to_string()),
                wp_md: Some("writeup only".to_string()),
            },
        )
        .await?;
    assert!(ctx.submission_repo.items(submission.id).await?.is_empty());
    // Non-http(s) links are dropped rather than rejected.
    assert_eq!(submission.wp_url, None);

    Ok(())
}

#[tokio::test]
async fn test_intake_requires_active_event() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let alice = create_member(&ctx, "alice").await?;

    let event = ctx
        .event_repo
        .create(CreateEventRequest {
            name: "Closed CTF".to_string(),
            start_time: None,
            end_time: None,
            weight: 1.0,
            is_reproduction: false,
            allow_wp_only: true,
        })
        .await?;
    ctx.event_repo
        .update(
            event.id,
            UpdateEventRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;

    let err = ctx
        .submission_service
        .create(
            &alice,
            CreateSubmissionRequest {
                event_id: event.id,
                challenge_ids: vec![],
                wp_url: None,
                wp_md: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}
