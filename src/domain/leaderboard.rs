use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the point-weighted monthly leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardRow {
    pub user_id: Uuid,
    pub username: String,
    pub month_points: f64,
    pub total_points: f64,
}

/// One row of the count-based leaderboard (approved item counts;
/// manual overrides and adjustments are ignored in this mode).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountLeaderboardRow {
    pub user_id: Uuid,
    pub username: String,
    pub month_count: i64,
    pub total_count: i64,
}

/// Advisory comparison between the weakest main-team and strongest
/// sub-team monthly performer. Never mutates team membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionSuggestion {
    pub demote: LeaderboardRow,
    pub promote: LeaderboardRow,
    pub reason: String,
}
