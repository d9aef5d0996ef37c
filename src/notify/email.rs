use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::EmailConfig;
use crate::error::{AppError, Result};

use super::{Notifier, NotifyEvent};

/// SMTP hand-off for notification events. Recipients without an email
/// address are skipped silently; transport failures are logged by the
/// manager and never surfaced to the caller of the state machine.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    enabled: bool,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let host = config.smtp_host.as_deref()?;
        let from_address = config.from_address.clone()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host).ok()?;
        if let Some(port) = config.smtp_port {
            builder = builder.port(port);
        }
        if let (Some(username), Some(password)) =
            (config.smtp_username.clone(), config.smtp_password.clone())
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Some(Self {
            transport: builder.build(),
            from_address,
            enabled: true,
        })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<()> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid recipient: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::Internal(format!("Failed to build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("SMTP send failed: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn handle_event(&self, event: &NotifyEvent) -> Result<()> {
        match event {
            NotifyEvent::SubmissionRejected {
                recipient,
                event_name,
                reason,
                ..
            } => {
                let Some(email) = recipient.email.as_deref() else {
                    return Ok(());
                };
                let subject = format!("Submission for {} was rejected", event_name);
                let body = format!(
                    "Hi {},\n\nyour submission for {} was rejected.\n\nReason: {}\n\n\
                     You can correct and resubmit it from your submission list.",
                    recipient.username, event_name, reason
                );
                self.send(email, &subject, body).await
            }
            NotifyEvent::Broadcast {
                recipient,
                title,
                body,
            } => {
                let Some(email) = recipient.email.as_deref() else {
                    return Ok(());
                };
                self.send(email, title, body.clone()).await
            }
        }
    }
}
