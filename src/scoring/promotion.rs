use crate::domain::{LeaderboardRow, PromotionSuggestion};

/// Compare the weakest main-team row against the strongest sub-team
/// row for the same month. A suggestion is produced only on a strict
/// month-point win; ties yield nothing, and so does an empty
/// leaderboard on either side. Advisory only; team membership is
/// never changed here.
pub fn suggest_promotion(
    main_rows: &[LeaderboardRow],
    sub_rows: &[LeaderboardRow],
) -> Option<PromotionSuggestion> {
    let main_last = main_rows.iter().min_by(|a, b| {
        a.month_points
            .total_cmp(&b.month_points)
            .then(a.total_points.total_cmp(&b.total_points))
    })?;
    let sub_best = sub_rows.iter().max_by(|a, b| {
        a.month_points
            .total_cmp(&b.month_points)
            .then(a.total_points.total_cmp(&b.total_points))
    })?;

    if sub_best.month_points > main_last.month_points {
        Some(PromotionSuggestion {
            demote: main_last.clone(),
            promote: sub_best.clone(),
            reason: format!(
                "sub team {} scored {:.2} this month, above main team last place {} at {:.2}",
                sub_best.username,
                sub_best.month_points,
                main_last.username,
                main_last.month_points
            ),
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row(username: &str, month: f64, total: f64) -> LeaderboardRow {
        LeaderboardRow {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            month_points: month,
            total_points: total,
        }
    }

    #[test]
    fn suggests_swap_on_strict_win() {
        let main = vec![row("strong", 200.0, 900.0), row("weak", 50.0, 100.0)];
        let sub = vec![row("rising", 80.0, 80.0), row("quiet", 10.0, 10.0)];

        let s = suggest_promotion(&main, &sub).expect("suggestion expected");
        assert_eq!(s.demote.username, "weak");
        assert_eq!(s.promote.username, "rising");
    }

    #[test]
    fn tie_produces_no_suggestion() {
        let main = vec![row("weak", 50.0, 100.0)];
        let sub = vec![row("rising", 50.0, 500.0)];
        assert!(suggest_promotion(&main, &sub).is_none());
    }

    #[test]
    fn empty_side_produces_no_suggestion() {
        let main = vec![row("weak", 50.0, 100.0)];
        assert!(suggest_promotion(&main, &[]).is_none());
        assert!(suggest_promotion(&[], &main).is_none());
    }

    #[test]
    fn total_points_break_month_ties_when_picking_extremes() {
        // Two main rows tied on month points: the one with the lower
        // total is the last place.
        let main = vec![row("a", 50.0, 400.0), row("b", 50.0, 100.0)];
        let sub = vec![row("rising", 60.0, 60.0)];

        let s = suggest_promotion(&main, &sub).unwrap();
        assert_eq!(s.demote.username, "b");
    }
}
