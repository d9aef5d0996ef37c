use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{CountLeaderboardRow, LeaderboardRow, PointAdjustment, Role, TeamType, User};

use super::points::{approved_count, compute_points, ScoredSubmission};
use super::window::MonthWindow;

/// Point-weighted monthly leaderboard fold.
///
/// `submissions` must already exclude soft-deleted rows (the
/// repository filter); everything else is filtered here: only active,
/// leaderboard-visible members of the requested team are ranked.
/// Month points add the adjustments granted for that exact (year,
/// month); total points add every adjustment the user ever received.
/// Adjustments are permanently cumulative, never windowed out.
pub fn leaderboard_rows(
    window: &MonthWindow,
    team_type: TeamType,
    users: &[User],
    submissions: &[ScoredSubmission],
    adjustments: &[PointAdjustment],
) -> Vec<LeaderboardRow> {
    let eligible = eligible_users(users, team_type);

    let mut month: HashMap<Uuid, f64> = HashMap::new();
    let mut total: HashMap<Uuid, f64> = HashMap::new();
    let mut seen: Vec<Uuid> = Vec::new();

    for sub in submissions {
        if !eligible.contains_key(&sub.user_id) {
            continue;
        }
        let pts = compute_points(sub);
        if window.contains(sub.created_at) {
            *month.entry(sub.user_id).or_default() += pts;
        }
        *total.entry(sub.user_id).or_default() += pts;
        if !seen.contains(&sub.user_id) {
            seen.push(sub.user_id);
        }
    }

    for adj in adjustments {
        if adj.lifecycle.is_deleted() || !eligible.contains_key(&adj.user_id) {
            continue;
        }
        if adj.year == window.year && adj.month == window.month {
            *month.entry(adj.user_id).or_default() += adj.amount;
        }
        *total.entry(adj.user_id).or_default() += adj.amount;
        if !seen.contains(&adj.user_id) {
            seen.push(adj.user_id);
        }
    }

    let mut rows: Vec<LeaderboardRow> = seen
        .into_iter()
        .map(|uid| LeaderboardRow {
            user_id: uid,
            username: eligible[&uid].username.clone(),
            month_points: month.get(&uid).copied().unwrap_or(0.0),
            total_points: total.get(&uid).copied().unwrap_or(0.0),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.month_points
            .total_cmp(&a.month_points)
            .then(b.total_points.total_cmp(&a.total_points))
            .then(a.user_id.cmp(&b.user_id))
    });
    rows
}

/// Count-based sibling mode: approved item counts instead of points.
/// Manual overrides and adjustments are ignored entirely.
pub fn leaderboard_count_rows(
    window: &MonthWindow,
    team_type: TeamType,
    users: &[User],
    submissions: &[ScoredSubmission],
) -> Vec<CountLeaderboardRow> {
    let eligible = eligible_users(users, team_type);

    let mut month: HashMap<Uuid, i64> = HashMap::new();
    let mut total: HashMap<Uuid, i64> = HashMap::new();
    let mut seen: Vec<Uuid> = Vec::new();

    for sub in submissions {
        if !eligible.contains_key(&sub.user_id) {
            continue;
        }
        let count = approved_count(sub);
        if window.contains(sub.created_at) {
            *month.entry(sub.user_id).or_default() += count;
        }
        *total.entry(sub.user_id).or_default() += count;
        if !seen.contains(&sub.user_id) {
            seen.push(sub.user_id);
        }
    }

    let mut rows: Vec<CountLeaderboardRow> = seen
        .into_iter()
        .map(|uid| CountLeaderboardRow {
            user_id: uid,
            username: eligible[&uid].username.clone(),
            month_count: month.get(&uid).copied().unwrap_or(0),
            total_count: total.get(&uid).copied().unwrap_or(0),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.month_count
            .cmp(&a.month_count)
            .then(b.total_count.cmp(&a.total_count))
            .then(a.user_id.cmp(&b.user_id))
    });
    rows
}

fn eligible_users(users: &[User], team_type: TeamType) -> HashMap<Uuid, &User> {
    users
        .iter()
        .filter(|u| {
            u.team_type == team_type
                && u.role == Role::Member
                && !u.lifecycle.is_deleted()
                && u.is_visible_on_leaderboard()
        })
        .map(|u| (u.id, u))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemState, Lifecycle};
    use crate::scoring::points::ItemFacts;
    use crate::scoring::window::month_range;
    use chrono::{Duration, Utc};

    fn member(username: &str, team_type: TeamType) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: None,
            role: Role::Member,
            team_type,
            is_active: true,
            show_on_leaderboard: None,
            avatar_filename: None,
            lifecycle: Lifecycle::Active,
            created_at: Utc::now(),
        }
    }

    fn scored(user_id: Uuid, created_at: chrono::DateTime<Utc>, points: i64) -> ScoredSubmission {
        ScoredSubmission {
            submission_id: Uuid::new_v4(),
            user_id,
            created_at,
            rejected: false,
            manual_points: None,
            event_weight: Some(1.0),
            items: vec![ItemFacts {
                state: ItemState::Approved,
                base_score: Some(points),
            }],
        }
    }

    fn adjustment(user_id: Uuid, amount: f64, year: i32, month: u32) -> PointAdjustment {
        PointAdjustment {
            id: Uuid::new_v4(),
            user_id,
            amount,
            year,
            month,
            reason: "correction".to_string(),
            created_by: None,
            lifecycle: Lifecycle::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn window_boundaries_are_half_open() {
        let w = month_range(2025, 3).unwrap();
        let user = member("alice", TeamType::Main);
        let subs = vec![
            scored(user.id, w.start, 100),
            scored(user.id, w.end, 999),
        ];

        let rows = leaderboard_rows(&w, TeamType::Main, &[user], &subs, &[]);
        assert_eq!(rows[0].month_points, 100.0);
        // The boundary submission still counts toward the total.
        assert_eq!(rows[0].total_points, 1099.0);
    }

    #[test]
    fn adjustments_window_month_but_accumulate_in_total() {
        let march = month_range(2025, 3).unwrap();
        let april = month_range(2025, 4).unwrap();
        let user = member("alice", TeamType::Main);
        let subs = vec![scored(user.id, march.start + Duration::days(3), 100)];
        let adjs = vec![adjustment(user.id, -20.0, 2025, 3)];

        let rows = leaderboard_rows(&march, TeamType::Main, std::slice::from_ref(&user), &subs, &adjs);
        assert_eq!(rows[0].month_points, 80.0);
        assert_eq!(rows[0].total_points, 80.0);

        // The March adjustment no longer affects April's month column,
        // but stays in the cumulative total.
        let rows = leaderboard_rows(&april, TeamType::Main, &[user], &subs, &adjs);
        assert_eq!(rows[0].month_points, 0.0);
        assert_eq!(rows[0].total_points, 80.0);
    }

    #[test]
    fn deleted_adjustments_are_ignored() {
        let w = month_range(2025, 3).unwrap();
        let user = member("alice", TeamType::Main);
        let mut adj = adjustment(user.id, 50.0, 2025, 3);
        adj.lifecycle = Lifecycle::Deleted;

        let rows = leaderboard_rows(&w, TeamType::Main, &[user], &[], &[adj]);
        assert!(rows.is_empty());
    }

    #[test]
    fn non_members_and_hidden_users_are_excluded() {
        let w = month_range(2025, 3).unwrap();
        let mut reviewer = member("rev", TeamType::Main);
        reviewer.role = Role::Reviewer;
        let mut hidden = member("hidden", TeamType::Main);
        hidden.show_on_leaderboard = Some(false);
        let mut deleted = member("gone", TeamType::Main);
        deleted.lifecycle = Lifecycle::Deleted;
        let wrong_team = member("subber", TeamType::Sub);

        let users = vec![reviewer, hidden, deleted, wrong_team];
        let subs: Vec<ScoredSubmission> = users
            .iter()
            .map(|u| scored(u.id, w.start, 100))
            .collect();

        let rows = leaderboard_rows(&w, TeamType::Main, &users, &subs, &[]);
        assert!(rows.is_empty());
    }

    #[test]
    fn historical_only_user_appears_with_zero_month_points() {
        let march = month_range(2025, 3).unwrap();
        let user = member("alice", TeamType::Main);
        let subs = vec![scored(user.id, march.start - Duration::days(40), 100)];

        let rows = leaderboard_rows(&march, TeamType::Main, &[user], &subs, &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month_points, 0.0);
        assert_eq!(rows[0].total_points, 100.0);
    }

    #[test]
    fn sorted_by_month_then_total_descending() {
        let w = month_range(2025, 3).unwrap();
        let a = member("a", TeamType::Main);
        let b = member("b", TeamType::Main);
        let c = member("c", TeamType::Main);
        let subs = vec![
            scored(a.id, w.start, 100),
            scored(b.id, w.start, 200),
            // Same month points as `a`, higher total from history.
            scored(c.id, w.start, 100),
            scored(c.id, w.start - Duration::days(40), 300),
        ];

        let users = vec![a.clone(), b.clone(), c.clone()];
        let rows = leaderboard_rows(&w, TeamType::Main, &users, &subs, &[]);
        assert_eq!(rows[0].user_id, b.id);
        assert_eq!(rows[1].user_id, c.id);
        assert_eq!(rows[2].user_id, a.id);
    }

    #[test]
    fn count_mode_ranks_by_approved_item_count() {
        let w = month_range(2025, 3).unwrap();
        let a = member("a", TeamType::Main);
        let b = member("b", TeamType::Main);

        let mut big_manual = scored(a.id, w.start, 100);
        big_manual.manual_points = Some(100_000.0);
        let mut two_items = scored(b.id, w.start, 10);
        two_items.items.push(ItemFacts {
            state: ItemState::Approved,
            base_score: Some(10),
        });

        let users = vec![a.clone(), b.clone()];
        let rows =
            leaderboard_count_rows(&w, TeamType::Main, &users, &[big_manual, two_items]);
        assert_eq!(rows[0].user_id, b.id);
        assert_eq!(rows[0].month_count, 2);
        assert_eq!(rows[1].month_count, 1);
    }
}
