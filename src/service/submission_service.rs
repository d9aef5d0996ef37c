use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::{CreateSubmissionRequest, Submission, User},
    error::{AppError, Result},
    repository::{ChallengeRepository, EventRepository, SubmissionRepository},
};

pub struct SubmissionService {
    submission_repo: Arc<dyn SubmissionRepository>,
    event_repo: Arc<dyn EventRepository>,
    challenge_repo: Arc<dyn ChallengeRepository>,
}

impl SubmissionService {
    pub fn new(
        submission_repo: Arc<dyn SubmissionRepository>,
        event_repo: Arc<dyn EventRepository>,
        challenge_repo: Arc<dyn ChallengeRepository>,
    ) -> Self {
        Self {
            submission_repo,
            event_repo,
            challenge_repo,
        }
    }

    /// Member-facing intake: a new, unreviewed submission against an
    /// active event. Claimed challenges are scoped to the event;
    /// anything else in the selection is dropped.
    pub async fn create(&self, actor: &User, request: CreateSubmissionRequest) -> Result<Submission> {
        let event = self
            .event_repo
            .find_by_id(request.event_id, false)
            .await?
            .filter(|e| e.is_active)
            .ok_or_else(|| AppError::NotFound("Event not found or inactive".to_string()))?;

        let challenge_ids = self
            .scope_to_event(event.id, &request.challenge_ids)
            .await?;

        if challenge_ids.is_empty() && !event.allow_wp_only {
            return Err(AppError::Validation(
                "Select at least one challenge for this event".to_string(),
            ));
        }

        self.submission_repo
            .create(
                actor.id,
                event.id,
                &challenge_ids,
                sanitize_url(request.wp_url),
                request.wp_md,
            )
            .await
    }

    pub async fn list_mine(&self, actor: &User) -> Result<Vec<Submission>> {
        self.submission_repo.list_by_user(actor.id, false).await
    }

    /// Restrict a challenge selection to the event's own (visible)
    /// challenges, deduplicated in selection order. Unknown or foreign
    /// ids are silently dropped, matching the form-scoping behavior of
    /// the intake surface.
    pub(crate) async fn scope_to_event(
        &self,
        event_id: Uuid,
        selected: &[Uuid],
    ) -> Result<Vec<Uuid>> {
        let known: Vec<Uuid> = self
            .challenge_repo
            .list_by_event(event_id, false, None, None)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        let mut scoped = Vec::new();
        for id in selected {
            if known.contains(id) && !scoped.contains(id) {
                scoped.push(*id);
            } else if !known.contains(id) {
                tracing::debug!("Dropping challenge {} outside event {}", id, event_id);
            }
        }
        Ok(scoped)
    }
}

/// Optional writeup links soft-fail: anything that is not plain http
/// or https is dropped rather than rejected.
pub(crate) fn sanitize_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
}

#[cfg(test)]
mod tests {
    use super::sanitize_url;

    #[test]
    fn accepts_http_and_https() {
        assert_eq!(
            sanitize_url(Some("https://example.com/wp".to_string())),
            Some("https://example.com/wp".to_string())
        );
        assert_eq!(
            sanitize_url(Some("http://example.com".to_string())),
            Some("http://example.com".to_string())
        );
    }

    #[test]
    fn drops_other_schemes_silently() {
        assert_eq!(sanitize_url(Some("javascript:alert(1)".to_string())), None);
        assert_eq!(sanitize_url(Some("ftp://example.com".to_string())), None);
        assert_eq!(sanitize_url(Some("   ".to_string())), None);
        assert_eq!(sanitize_url(None), None);
    }
}
