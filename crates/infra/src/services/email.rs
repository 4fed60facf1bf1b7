use crate::config::SmtpConfig;
use lettre::message::{header::ContentType, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
}

#[async_trait::async_trait]
pub trait IEmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

pub struct SmtpEmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("Invalid SMTP_FROM: {}", e))?;

        let builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);
        let builder = match (&config.user, &config.password) {
            (Some(user), Some(password)) => {
                builder.credentials(Credentials::new(user.clone(), password.clone()))
            }
            _ => builder,
        };
        info!(
            host = %config.host,
            port = config.port,
            "Email sender initialized (SMTP with STARTTLS)"
        );

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }
}

#[async_trait::async_trait]
impl IEmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("Invalid recipient: {}. Err: {}", message.to, e))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone());
        let email = match &message.html_body {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                html.clone(),
            ))?,
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(message.text_body.clone())?,
        };

        self.mailer.send(email).await?;
        Ok(())
    }
}

/// Used when no mail transport is configured. Every send fails, so nothing
/// is recorded as delivered and the notification engine retries once a
/// transport is set up.
#[derive(Debug, Default)]
pub struct UnconfiguredEmailSender;

#[async_trait::async_trait]
impl IEmailSender for UnconfiguredEmailSender {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        warn!(
            to = %message.to,
            subject = %message.subject,
            "Email dropped, no mail transport is configured"
        );
        anyhow::bail!("Email delivery is not configured")
    }
}

/// Keeps every email in memory instead of delivering it

pub struct InMemoryEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    failing_recipients: Mutex<HashSet<String>>,
}

impl InMemoryEmailSender {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            failing_recipients: Mutex::new(HashSet::new()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<EmailMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.to == recipient)
            .collect()
    }

    /// Every following send to `recipient` fails until `recover` is called
    pub fn fail_for(&self, recipient: &str) {
        self.failing_recipients
            .lock()
            .unwrap()
            .insert(recipient.to_string());
    }

    pub fn recover(&self, recipient: &str) {
        self.failing_recipients.lock().unwrap().remove(recipient);
    }
}

impl Default for InMemoryEmailSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IEmailSender for InMemoryEmailSender {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        if self.failing_recipients.lock().unwrap().contains(&message.to) {
            anyhow::bail!("Mailbox unavailable: {}", message.to);
        }
        info!(to = %message.to, subject = %message.subject, "Email kept in memory");
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            to: to.into(),
            subject: "Reminder".into(),
            text_body: "Hello".into(),
            html_body: None,
        }
    }

    #[tokio::test]
    async fn records_sent_emails_and_fails_on_demand() {
        let sender = InMemoryEmailSender::new();
        sender.send(&message("a@example.com")).await.unwrap();

        sender.fail_for("b@example.com");
        assert!(sender.send(&message("b@example.com")).await.is_err());
        assert!(sender.sent_to("b@example.com").is_empty());

        sender.recover("b@example.com");
        sender.send(&message("b@example.com")).await.unwrap();
        assert_eq!(sender.sent().len(), 2);
    }

    #[tokio::test]
    async fn unconfigured_sender_never_reports_delivery() {
        let sender = UnconfiguredEmailSender;
        assert!(sender.send(&message("a@example.com")).await.is_err());
    }
}
