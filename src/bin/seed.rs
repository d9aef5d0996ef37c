use chrono::{Duration, Utc};
use clap::Parser;
use fake::faker::internet::en::Username;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::sqlite::SqlitePoolOptions;

use ctfboard::{
    auth::AuthService,
    domain::{
        CreateAdjustmentRequest, CreateChallengeRequest, CreateEventRequest,
        CreateSubmissionRequest, CreateUserRequest, Role, TeamType,
    },
    notify::NotifierManager,
    service::ServiceContext,
};

#[derive(Parser, Debug)]
#[command(about = "Seed the ctfboard database with demo data")]
struct Args {
    /// Number of extra random members to create (besides the fixed
    /// admin / reviewer / demo accounts)
    #[arg(long, default_value_t = 8)]
    members: usize,

    /// Number of events to create
    #[arg(long, default_value_t = 3)]
    events: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:ctfboard.db".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let ctx = ServiceContext::new(db_pool, std::sync::Arc::new(NotifierManager::new()));
    let mut rng = rand::thread_rng();

    println!("👥 Creating users...");

    let admin_hash = AuthService::hash_password("admin123").await?;
    let admin = ctx
        .user_repo
        .create(
            CreateUserRequest {
                username: "admin".to_string(),
                password: "admin123".to_string(),
                email: Some("admin@ctfboard.local".to_string()),
                role: Role::Admin,
                team_type: TeamType::Main,
            },
            &admin_hash,
        )
        .await?;
    println!("  ✅ Created admin (admin / admin123)");

    let reviewer_hash = AuthService::hash_password("review123").await?;
    ctx.user_repo
        .create(
            CreateUserRequest {
                username: "reviewer".to_string(),
                password: "review123".to_string(),
                email: Some("reviewer@ctfboard.local".to_string()),
                role: Role::Reviewer,
                team_type: TeamType::Main,
            },
            &reviewer_hash,
        )
        .await?;
    println!("  ✅ Created reviewer (reviewer / review123)");

    let member_hash = AuthService::hash_password("password123").await?;
    let mut members = Vec::new();
    for i in 0..args.members {
        let username: String = Username().fake();
        let team_type = if i % 2 == 0 {
            TeamType::Main
        } else {
            TeamType::Sub
        };
        let user = ctx
            .user_repo
            .create(
                CreateUserRequest {
                    username: format!("{}{}", username, i),
                    password: "password123".to_string(),
                    email: None,
                    role: Role::Member,
                    team_type,
                },
                &member_hash,
            )
            .await?;
        members.push(user);
    }
    println!("  ✅ Created {} members (password123)", members.len());

    println!("🏁 Creating events and challenges...");

    let categories = ["web", "pwn", "crypto", "rev", "forensics", "misc"];
    let mut all_challenges = Vec::new();
    let mut events = Vec::new();

    for i in 0..args.events {
        let start = Utc::now() - Duration::days(30 * i as i64 + 2);
        let event = ctx
            .event_repo
            .create(CreateEventRequest {
                name: format!("Demo CTF {}", i + 1),
                start_time: Some(start),
                end_time: Some(start + Duration::days(2)),
                weight: [0.5, 1.0, 2.0][i % 3],
                is_reproduction: i % 3 == 2,
                allow_wp_only: i % 2 == 0,
            })
            .await?;

        let challenge_count = rng.gen_range(4..=8);
        for c in 0..challenge_count {
            let challenge = ctx
                .challenge_repo
                .create(
                    event.id,
                    CreateChallengeRequest {
                        name: format!("chal-{}-{}", i + 1, c + 1),
                        category: categories[c % categories.len()].to_string(),
                        base_score: [100, 200, 300, 500][c % 4],
                    },
                )
                .await?;
            all_challenges.push(challenge);
        }
        events.push(event);
    }
    println!(
        "  ✅ Created {} events with {} challenges",
        events.len(),
        all_challenges.len()
    );

    println!("📝 Creating submissions...");

    let mut submission_count = 0;
    for member in &members {
        for event in &events {
            if !rng.gen_bool(0.7) {
                continue;
            }
            let choices: Vec<_> = all_challenges
                .iter()
                .filter(|c| c.event_id == event.id)
                .collect();
            let picked = rng.gen_range(1..=choices.len().min(4));
            let challenge_ids = choices
                .choose_multiple(&mut rng, picked)
                .map(|c| c.id)
                .collect();

            let submission = ctx
                .submission_service
                .create(
                    member,
                    CreateSubmissionRequest {
                        event_id: event.id,
                        challenge_ids,
                        wp_url: None,
                        wp_md: Some("## Writeup\n\nSolved with a demo payload.".to_string()),
                    },
                )
                .await?;

            // Approve roughly half so the leaderboard has scores.
            if rng.gen_bool(0.5) {
                ctx.review_service.approve_all(&admin, submission.id).await?;
            }
            submission_count += 1;
        }
    }
    println!("  ✅ Created {} submissions", submission_count);

    if let Some(member) = members.first() {
        let now = ctfboard::scoring::now_team();
        use chrono::Datelike;
        ctx.adjustment_service
            .create(
                &admin,
                CreateAdjustmentRequest {
                    user_id: member.id,
                    amount: 150.0,
                    year: now.year(),
                    month: now.month(),
                    reason: "Infrastructure help during the demo event".to_string(),
                },
            )
            .await?;
        println!("  ✅ Created a point adjustment for {}", member.username);
    }

    println!("🎉 Seeding complete!");
    Ok(())
}
