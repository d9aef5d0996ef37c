use serde::{Deserialize, Serialize};

/// Soft-delete state shared by every deletable entity.
///
/// Normal queries exclude `Deleted` rows; the trash surfaces query for
/// them explicitly. Repository helpers take an `include_deleted` flag
/// instead of repeating ad hoc filters per query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT")]
pub enum Lifecycle {
    Active,
    Deleted,
}

impl Lifecycle {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Lifecycle::Deleted)
    }
}
