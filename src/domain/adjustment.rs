use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Lifecycle;

/// A signed point delta tied to a user and a specific (year, month).
///
/// It contributes to that month's total and, permanently, to the
/// all-time cumulative total; it is never recomputed or windowed out
/// when the month rolls over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointAdjustment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub year: i32,
    pub month: u32,
    pub reason: String,
    pub created_by: Option<Uuid>,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAdjustmentRequest {
    pub user_id: Uuid,
    pub amount: f64,
    #[validate(range(min = 1970, max = 9999))]
    pub year: i32,
    #[validate(range(min = 1, max = 12))]
    pub month: u32,
    #[validate(length(min = 1))]
    pub reason: String,
}
