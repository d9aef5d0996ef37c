use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{CreateAdjustmentRequest, Lifecycle, PointAdjustment, User},
    error::{AppError, Result},
    repository::{AdjustmentRepository, UserRepository},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct AdjustmentFilter {
    pub user_id: Option<Uuid>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub include_deleted: bool,
}

pub struct AdjustmentService {
    adjustment_repo: Arc<dyn AdjustmentRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl AdjustmentService {
    pub fn new(
        adjustment_repo: Arc<dyn AdjustmentRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            adjustment_repo,
            user_repo,
        }
    }

    fn require_reviewer(actor: &User) -> Result<()> {
        if actor.can_review() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub async fn create(
        &self,
        actor: &User,
        request: CreateAdjustmentRequest,
    ) -> Result<PointAdjustment> {
        Self::require_reviewer(actor)?;
        request.validate()?;

        if !request.amount.is_finite() {
            return Err(AppError::Validation(
                "Adjustment amount must be a finite number".to_string(),
            ));
        }
        self.user_repo
            .find_by_id(request.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        self.adjustment_repo.create(request, Some(actor.id)).await
    }

    pub async fn list(
        &self,
        actor: &User,
        filter: AdjustmentFilter,
    ) -> Result<Vec<PointAdjustment>> {
        Self::require_reviewer(actor)?;

        let adjustments = match filter.user_id {
            Some(user_id) => {
                self.adjustment_repo
                    .list_by_user(user_id, filter.include_deleted)
                    .await?
            }
            None => self.adjustment_repo.list(filter.include_deleted).await?,
        };

        Ok(adjustments
            .into_iter()
            .filter(|a| filter.year.map_or(true, |y| a.year == y))
            .filter(|a| filter.month.map_or(true, |m| a.month == m))
            .collect())
    }

    /// Soft delete only; a deleted adjustment stops counting everywhere
    /// but the audit row survives.
    pub async fn soft_delete(&self, actor: &User, id: Uuid) -> Result<()> {
        Self::require_reviewer(actor)?;

        self.adjustment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Adjustment not found".to_string()))?;
        self.adjustment_repo.set_lifecycle(id, Lifecycle::Deleted).await
    }

    pub async fn restore(&self, actor: &User, id: Uuid) -> Result<()> {
        Self::require_reviewer(actor)?;

        self.adjustment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Adjustment not found".to_string()))?;
        self.adjustment_repo.set_lifecycle(id, Lifecycle::Active).await
    }
}
