use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ItemState;

/// Everything the scoring engine needs to know about one submission,
/// hydrated by the repository layer.
#[derive(Debug, Clone)]
pub struct ScoredSubmission {
    pub submission_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub rejected: bool,
    pub manual_points: Option<f64>,
    /// `None` when the event row no longer exists; an orphaned
    /// submission scores nothing.
    pub event_weight: Option<f64>,
    pub items: Vec<ItemFacts>,
}

#[derive(Debug, Clone, Copy)]
pub struct ItemFacts {
    pub state: ItemState,
    /// `None` when the challenge row was hard-deleted. Soft-deleted
    /// challenges still carry their score; existence matters, not
    /// visibility.
    pub base_score: Option<i64>,
}

/// Point value of a submission, in strict precedence order: rejection
/// wins over everything, then a missing event, then the manual
/// override (taken as final, the event weight is not re-applied), then
/// the item-based sum times the event weight.
pub fn compute_points(sub: &ScoredSubmission) -> f64 {
    if sub.rejected {
        return 0.0;
    }
    let Some(weight) = sub.event_weight else {
        return 0.0;
    };
    if let Some(manual) = sub.manual_points {
        return manual;
    }

    let base: i64 = sub
        .items
        .iter()
        .filter(|it| it.state.counts_for_score())
        .filter_map(|it| it.base_score)
        .sum();

    base as f64 * weight
}

/// Approved-and-not-revoked item count for the count-based leaderboard
/// mode. Manual overrides carry no items and rejection leaves items
/// inert, so neither contributes here.
pub fn approved_count(sub: &ScoredSubmission) -> i64 {
    if sub.rejected {
        return 0;
    }
    sub.items
        .iter()
        .filter(|it| it.state.counts_for_score())
        .count() as i64
}

/// Reviewed-determination predicate, computed on read rather than
/// stored. A submission with items is reviewed once no item is
/// pending; a writeup-only submission is reviewed once a human set a
/// manual score; a rejected submission is always reviewed.
pub fn is_reviewed(
    rejected: bool,
    manual_points: Option<f64>,
    item_count: usize,
    pending_count: usize,
) -> bool {
    rejected
        || (item_count > 0 && pending_count == 0)
        || (item_count == 0 && manual_points.is_some())
}
