use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{CountLeaderboardRow, LeaderboardRow, PromotionSuggestion, Submission, TeamType},
    error::Result,
    repository::{AdjustmentRepository, SubmissionRepository, UserRepository},
    scoring::{
        self, compute_points, leaderboard_count_rows, leaderboard_rows, month_range, MonthWindow,
    },
};

/// Hydrates the pure scoring folds with repository data. All ranking
/// and windowing rules live in [`crate::scoring`]; this layer only
/// fetches and assembles.
pub struct LeaderboardService {
    user_repo: Arc<dyn UserRepository>,
    submission_repo: Arc<dyn SubmissionRepository>,
    adjustment_repo: Arc<dyn AdjustmentRepository>,
}

/// Both team boards for one month, plus the promotion advisory.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardOverview {
    pub year: i32,
    pub month: u32,
    pub main: Vec<LeaderboardRow>,
    pub sub: Vec<LeaderboardRow>,
    pub suggestion: Option<PromotionSuggestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountLeaderboardOverview {
    pub year: i32,
    pub month: u32,
    pub main: Vec<CountLeaderboardRow>,
    pub sub: Vec<CountLeaderboardRow>,
}

/// One member's own score breakdown for a month.
#[derive(Debug, Clone, Serialize)]
pub struct UserScoreSummary {
    pub user_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub month_points: f64,
    pub total_points: f64,
    pub submissions: Vec<ScoredEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredEntry {
    pub submission: Submission,
    pub points: f64,
    pub in_month: bool,
}

impl LeaderboardService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        submission_repo: Arc<dyn SubmissionRepository>,
        adjustment_repo: Arc<dyn AdjustmentRepository>,
    ) -> Self {
        Self {
            user_repo,
            submission_repo,
            adjustment_repo,
        }
    }

    /// Resolve the requested month, defaulting to the current one in
    /// team-local time.
    fn window(year: Option<i32>, month: Option<u32>) -> Result<MonthWindow> {
        let now = scoring::now_team();
        month_range(
            year.unwrap_or_else(|| now.year()),
            month.unwrap_or_else(|| now.month()),
        )
    }

    pub async fn overview(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<LeaderboardOverview> {
        let window = Self::window(year, month)?;
        let users = self.user_repo.list(false).await?;
        let submissions = self.submission_repo.scored_all().await?;
        let adjustments = self.adjustment_repo.list(false).await?;

        let main = leaderboard_rows(&window, TeamType::Main, &users, &submissions, &adjustments);
        let sub = leaderboard_rows(&window, TeamType::Sub, &users, &submissions, &adjustments);
        let suggestion = scoring::suggest_promotion(&main, &sub);

        Ok(LeaderboardOverview {
            year: window.year,
            month: window.month,
            main,
            sub,
            suggestion,
        })
    }

    pub async fn count_overview(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<CountLeaderboardOverview> {
        let window = Self::window(year, month)?;
        let users = self.user_repo.list(false).await?;
        let submissions = self.submission_repo.scored_all().await?;

        Ok(CountLeaderboardOverview {
            year: window.year,
            month: window.month,
            main: leaderboard_count_rows(&window, TeamType::Main, &users, &submissions),
            sub: leaderboard_count_rows(&window, TeamType::Sub, &users, &submissions),
        })
    }

    /// A member's own submissions with their individual point values.
    /// No visibility filter here: members always see their own score
    /// even when hidden from the public board.
    pub async fn user_summary(
        &self,
        user_id: Uuid,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<UserScoreSummary> {
        let window = Self::window(year, month)?;
        let scored = self.submission_repo.scored_by_user(user_id).await?;
        let submissions = self.submission_repo.list_by_user(user_id, false).await?;
        let adjustments = self.adjustment_repo.list_by_user(user_id, false).await?;

        let mut month_points = 0.0;
        let mut total_points = 0.0;
        let mut entries = Vec::with_capacity(submissions.len());

        for submission in submissions {
            let points = scored
                .iter()
                .find(|s| s.submission_id == submission.id)
                .map(compute_points)
                .unwrap_or(0.0);
            let in_month = window.contains(submission.created_at);
            if in_month {
                month_points += points;
            }
            total_points += points;
            entries.push(ScoredEntry {
                submission,
                points,
                in_month,
            });
        }

        for adj in adjustments {
            if adj.year == window.year && adj.month == window.month {
                month_points += adj.amount;
            }
            total_points += adj.amount;
        }

        Ok(UserScoreSummary {
            user_id,
            year: window.year,
            month: window.month,
            month_points,
            total_points,
            submissions: entries,
        })
    }
}
