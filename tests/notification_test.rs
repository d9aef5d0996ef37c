use std::sync::Arc;

use ctfboard::{
    auth::AuthService,
    domain::{CreateUserRequest, ReadStatus, Role, TeamType, User},
    error::AppError,
    notify::NotifierManager,
    service::{ServiceContext, INBOX_PAGE_SIZE},
};
use sqlx::SqlitePool;

async fn setup() -> anyhow::Result<ServiceContext> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(ServiceContext::new(pool, Arc::new(NotifierManager::new())))
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

#[tokio::test]
async fn test_broadcast_inbox_and_recall() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = create_user(&ctx, "admin", Role::Admin).await?;
    let alice = create_user(&ctx, "alice", Role::Member).await?;
    let bob = create_user(&ctx, "bob", Role::Member).await?;

    let batch_id = ctx
        .notification_service
        .broadcast(&admin, "Meeting", "Team sync **tonight** at 21:00.")
        .await?;

    // Every active user got one, the sender included.
    for user in [&admin, &alice, &bob] {
        assert_eq!(ctx.notification_service.unread_count(user).await?, 1);
    }

    // Opening marks read and renders the body.
    let inbox = ctx.notification_service.inbox(&alice, None, 1).await?;
    let opened = ctx
        .notification_service
        .open(&alice, inbox.items[0].notification.id)
        .await?;
    assert!(opened.notification.is_read());
    assert!(opened.content_html.starts_with("<p>"));
    assert_eq!(ctx.notification_service.unread_count(&alice).await?, 0);

    // Bob cannot open Alice's copy.
    let err = ctx
        .notification_service
        .open(&bob, inbox.items[0].notification.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Recall removes the whole batch, read copies included.
    let recalled = ctx
        .notification_service
        .recall_broadcast(&admin, batch_id)
        .await?;
    assert_eq!(recalled, 3);
    assert_eq!(
        ctx.notification_service.inbox(&alice, None, 1).await?.total,
        0
    );

    // Members cannot broadcast.
    let err = ctx
        .notification_service
        .broadcast(&alice, "nope", "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn test_inbox_pagination_and_filters() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = create_user(&ctx, "admin", Role::Admin).await?;
    let alice = create_user(&ctx, "alice", Role::Member).await?;

    for i in 0..12 {
        ctx.notification_service
            .broadcast(&admin, &format!("Notice {}", i), "body")
            .await?;
    }

    let page1 = ctx.notification_service.inbox(&alice, None, 1).await?;
    assert_eq!(page1.total, 12);
    assert_eq!(page1.items.len(), INBOX_PAGE_SIZE as usize);
    let page2 = ctx.notification_service.inbox(&alice, None, 2).await?;
    assert_eq!(page2.items.len(), 2);

    // Read one, then filter.
    ctx.notification_service
        .open(&alice, page1.items[0].notification.id)
        .await?;
    let unread = ctx
        .notification_service
        .inbox(&alice, Some(ReadStatus::Unread), 1)
        .await?;
    assert_eq!(unread.total, 11);
    let read = ctx
        .notification_service
        .inbox(&alice, Some(ReadStatus::Read), 1)
        .await?;
    assert_eq!(read.total, 1);

    let marked = ctx.notification_service.mark_all_read(&alice).await?;
    assert_eq!(marked, 11);
    assert_eq!(ctx.notification_service.unread_count(&alice).await?, 0);

    Ok(())
}
