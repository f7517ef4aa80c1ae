use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::info;

use crate::config::NotifyConfig;

const BODY: &str = "-";

#[async_trait]
pub trait Notify: Send + Sync {
    async fn notify(&self, record_name: &str, old_content: &str, new_content: &str) -> Result<()>;
}

/// Sends one plaintext mail per updated record through an open relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &NotifyConfig) -> Result<Self> {
        let from = config
            .from
            .parse()
            .with_context(|| format!("Invalid sender address: {}", config.from))?;
        let to = config
            .to
            .parse()
            .with_context(|| format!("Invalid report address: {}", config.to))?;

        // No TLS and no credentials: plain SMTP to the configured relay.
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .build();

        Ok(Self { transport, from, to })
    }

    fn compose(&self, record_name: &str, old_content: &str, new_content: &str) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!(
                "[DNS Update] {} updated from {} to {}",
                record_name, old_content, new_content
            ))
            .header(ContentType::TEXT_PLAIN)
            .body(BODY.to_string())
            .context("Failed to build notification email")
    }
}

#[async_trait]
impl Notify for SmtpNotifier {
    async fn notify(&self, record_name: &str, old_content: &str, new_content: &str) -> Result<()> {
        let message = self.compose(record_name, old_content, new_content)?;
        self.transport
            .send(message)
            .await
            .context("Failed to send notification email")?;
        info!("Sent update notification for {} to {}", record_name, self.to);
        Ok(())
    }
}
