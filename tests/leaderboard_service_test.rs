use std::sync::Arc;

use chrono::{Datelike, Duration};
use ctfboard::{
    auth::AuthService,
    domain::{
        CreateAdjustmentRequest, CreateChallengeRequest, CreateEventRequest,
        CreateSubmissionRequest, CreateUserRequest, Role, TeamType, UpdateUserRequest, User,
    },
    notify::NotifierManager,
    scoring,
    service::ServiceContext,
};
use sqlx::SqlitePool;
use uuid::Uuid;

async fn setup() -> anyhow::Result<ServiceContext> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(ServiceContext::new(pool, Arc::new(NotifierManager::new())))
}

async fn create_user(
    ctx: &ServiceContext,
    username: &str,
    role: Role,
    team_type: TeamType,
) -> anyhow::Result<User> {
    let hash = AuthService::hash_password("password123").await?;
    let user = ctx
        .user_repo
        .create(
            CreateUserRequest {
                username: username.to_string(),
                password: "password123".to_string(),
                email: None,
                role,
                team_type,
            },
            &hash,
        )
        .await?;
    Ok(user)
}

/// One event (weight 2.0) with a 100-point and a 200-point challenge.
async fn create_event(ctx: &ServiceContext) -> anyhow::Result<(Uuid, Vec<Uuid>)> {
    let event = ctx
        .event_repo
        .create(CreateEventRequest {
            name: "Scored CTF".to_string(),
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
                    category: "misc".to_string(),
                    base_score: score,
                },
            )
            .await?;
        challenge_ids.push(challenge.id);
    }
    Ok((event.id, challenge_ids))
}

async fn submit(
    ctx: &ServiceContext,
    user: &User,
    event_id: Uuid,
    challenge_ids: Vec<Uuid>,
) -> anyhow::Result<Uuid> {
    let submission = ctx
        .submission_service
        .create(
            user,
            CreateSubmissionRequest {
                event_id,
                challenge_ids,
                wp_url: None,
                wp_md: None,
            },
        )
        .await?;
    Ok(submission.id)
}

/// Moves a submission's creation time out of the current month so it
/// only counts toward the cumulative total.
async fn backdate(ctx: &ServiceContext, submission_id: Uuid, days: i64) -> anyhow::Result<()> {
    let when = (chrono::Utc::now() - Duration::days(days)).naive_utc();
    sqlx::query("UPDATE submissions SET created_at = ? WHERE id = ?")
        .bind(when)
        .bind(submission_id.to_string())
        .execute(&ctx.db_pool)
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_points_and_ordering() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = create_user(&ctx, "admin", Role::Admin, TeamType::Main).await?;
    let alice = create_user(&ctx, "alice", Role::Member, TeamType::Main).await?;
    let bob = create_user(&ctx, "bob", Role::Member, TeamType::Main).await?;
    let (event_id, challenge_ids) = create_event(&ctx).await?;

    // Alice solves both (300 * 2.0 = 600), Bob only the first
    // (100 * 2.0 = 200).
    let a = submit(&ctx, &alice, event_id, challenge_ids.clone()).await?;
    let b = submit(&ctx, &bob, event_id, vec![challenge_ids[0]]).await?;
    ctx.review_service.approve_all(&admin, a).await?;
    ctx.review_service.approve_all(&admin, b).await?;

    let overview = ctx.leaderboard_service.overview(None, None).await?;
    let main = &overview.main;
    assert_eq!(main.len(), 2);
    assert_eq!(main[0].username, "alice");
    assert_eq!(main[0].month_points, 600.0);
    assert_eq!(main[1].username, "bob");
    assert_eq!(main[1].month_points, 200.0);

    // Admins and reviewers never rank.
    assert!(main.iter().all(|r| r.user_id != admin.id));

    Ok(())
}

#[tokio::test]
async fn test_manual_override_ignores_weight() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = create_user(&ctx, "admin", Role::Admin, TeamType::Main).await?;
    let alice = create_user(&ctx, "alice", Role::Member, TeamType::Main).await?;
    let (event_id, challenge_ids) = create_event(&ctx).await?;

    let a = submit(&ctx, &alice, event_id, challenge_ids).await?;
    ctx.review_service.approve_all(&admin, a).await?;
    ctx.review_service
        .set_manual_points(&admin, a, Some(42.0))
        .await?;

    let overview = ctx.leaderboard_service.overview(None, None).await?;
    assert_eq!(overview.main[0].month_points, 42.0);

    // Count mode ignores the override and still counts approved items.
    let counts = ctx.leaderboard_service.count_overview(None, None).await?;
    assert_eq!(counts.main[0].month_count, 2);

    Ok(())
}

#[tokio::test]
async fn test_rejected_submissions_score_zero() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = create_user(&ctx, "admin", Role::Admin, TeamType::Main).await?;
    let alice = create_user(&ctx, "alice", Role::Member, TeamType::Main).await?;
    let (event_id, challenge_ids) = create_event(&ctx).await?;

    let a = submit(&ctx, &alice, event_id, challenge_ids).await?;
    ctx.review_service.approve_all(&admin, a).await?;
    ctx.review_service.reject(&admin, a, "plagiarized").await?;

    let overview = ctx.leaderboard_service.overview(None, None).await?;
    assert_eq!(overview.main[0].month_points, 0.0);

    let counts = ctx.leaderboard_service.count_overview(None, None).await?;
    assert_eq!(counts.main[0].month_count, 0);

    Ok(())
}

#[tokio::test]
async fn test_adjustments_window_and_accumulate() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = create_user(&ctx, "admin", Role::Admin, TeamType::Main).await?;
    let alice = create_user(&ctx, "alice", Role::Member, TeamType::Main).await?;

    let now = scoring::now_team();
    let this_month = ctx
        .adjustment_service
        .create(
            &admin,
            CreateAdjustmentRequest {
                user_id: alice.id,
                amount: 50.0,
                year: now.year(),
                month: now.month(),
                reason: "infra work".to_string(),
            },
        )
        .await?;

    // A past-month grant: cumulative only.
    let past = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };
    ctx.adjustment_service
        .create(
            &admin,
            CreateAdjustmentRequest {
                user_id: alice.id,
                amount: 30.0,
                year: past.0,
                month: past.1,
                reason: "late writeup bonus".to_string(),
            },
        )
        .await?;

    let overview = ctx.leaderboard_service.overview(None, None).await?;
    assert_eq!(overview.main[0].month_points, 50.0);
    assert_eq!(overview.main[0].total_points, 80.0);

    // Soft-deleting the current-month grant removes it everywhere.
    ctx.adjustment_service.soft_delete(&admin, this_month.id).await?;
    let overview = ctx.leaderboard_service.overview(None, None).await?;
    assert_eq!(overview.main[0].month_points, 0.0);
    assert_eq!(overview.main[0].total_points, 30.0);

    Ok(())
}

#[tokio::test]
async fn test_historical_scores_survive_the_month() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = create_user(&ctx, "admin", Role::Admin, TeamType::Main).await?;
    let alice = create_user(&ctx, "alice", Role::Member, TeamType::Main).await?;
    let (event_id, challenge_ids) = create_event(&ctx).await?;

    let a = submit(&ctx, &alice, event_id, challenge_ids).await?;
    ctx.review_service.approve_all(&admin, a).await?;
    backdate(&ctx, a, 90).await?;

    let overview = ctx.leaderboard_service.overview(None, None).await?;
    assert_eq!(overview.main[0].month_points, 0.0);
    assert_eq!(overview.main[0].total_points, 600.0);

    Ok(())
}

#[tokio::test]
async fn test_promotion_suggestion() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = create_user(&ctx, "admin", Role::Admin, TeamType::Main).await?;
    let weak = create_user(&ctx, "weak_main", Role::Member, TeamType::Main).await?;
    let strong = create_user(&ctx, "strong_sub", Role::Member, TeamType::Sub).await?;
    let (event_id, challenge_ids) = create_event(&ctx).await?;

    // Sub-team member outscores the main-team member this month.
    let w = submit(&ctx, &weak, event_id, vec![challenge_ids[0]]).await?;
    let s = submit(&ctx, &strong, event_id, challenge_ids.clone()).await?;
    ctx.review_service.approve_all(&admin, w).await?;
    ctx.review_service.approve_all(&admin, s).await?;

    let overview = ctx.leaderboard_service.overview(None, None).await?;
    let suggestion = overview.suggestion.expect("expected a promotion suggestion");
    assert_eq!(suggestion.demote.user_id, weak.id);
    assert_eq!(suggestion.promote.user_id, strong.id);

    Ok(())
}

#[tokio::test]
async fn test_hidden_users_are_excluded() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = create_user(&ctx, "admin", Role::Admin, TeamType::Main).await?;
    let alice = create_user(&ctx, "alice", Role::Member, TeamType::Main).await?;
    let (event_id, challenge_ids) = create_event(&ctx).await?;

    let a = submit(&ctx, &alice, event_id, challenge_ids).await?;
    ctx.review_service.approve_all(&admin, a).await?;

    ctx.user_repo
        .update(
            alice.id,
            UpdateUserRequest {
                show_on_leaderboard: Some(false),
                ..Default::default()
            },
        )
        .await?;

    let overview = ctx.leaderboard_service.overview(None, None).await?;
    assert!(overview.main.is_empty());

    // The member still sees their own score.
    let summary = ctx
        .leaderboard_service
        .user_summary(alice.id, None, None)
        .await?;
    assert_eq!(summary.month_points, 600.0);

    Ok(())
}
