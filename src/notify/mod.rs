use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::User;
use crate::error::Result;

pub mod email;
pub mod markdown;

/// Side-effect events emitted by the review state machine and the
/// broadcast surface. Delivery is fire-and-forget: a failing notifier
/// must never roll back or block the state transition that caused it.
#[derive(Debug, Clone)]
pub enum NotifyEvent {
    SubmissionRejected {
        recipient: User,
        submission_id: Uuid,
        event_name: String,
        reason: String,
    },
    Broadcast {
        recipient: User,
        title: String,
        body: String,
    },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    fn is_enabled(&self) -> bool;
    async fn handle_event(&self, event: &NotifyEvent) -> Result<()>;
}

pub struct NotifierManager {
    notifiers: RwLock<Vec<Arc<dyn Notifier>>>,
}

impl NotifierManager {
    pub fn new() -> Self {
        Self {
            notifiers: RwLock::new(Vec::new()),
        }
    }

    pub async fn register(&self, notifier: Arc<dyn Notifier>) {
        if notifier.is_enabled() {
            let mut notifiers = self.notifiers.write().await;
            notifiers.push(notifier);
            tracing::info!("Registered notifier: {}", notifiers.last().unwrap().name());
        }
    }

    pub async fn handle_event(&self, event: NotifyEvent) {
        let notifiers = self.notifiers.read().await;

        for notifier in notifiers.iter() {
            if !notifier.is_enabled() {
                continue;
            }

            match notifier.handle_event(&event).await {
                Ok(_) => {
                    tracing::debug!("Notifier {} handled event successfully", notifier.name());
                }
                Err(e) => {
                    // Swallowed on purpose: outbound delivery is outside
                    // the state machine's consistency domain.
                    tracing::error!(
                        "Notifier {} failed to handle event: {:?}",
                        notifier.name(),
                        e
                    );
                }
            }
        }
    }
}

impl Default for NotifierManager {
    fn default() -> Self {
        Self::new()
    }
}
