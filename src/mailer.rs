use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MonitorConfig;
use crate::error::MonitorError;

/// Delivers plain-text mail to the configured distribution list.
///
/// Delivery is fire-and-log: a failure for one recipient does not block the
/// others, and nothing propagates to the caller.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipients: Vec<Mailbox>,
}

impl Mailer {
    pub fn new(config: &MonitorConfig) -> Result<Self, MonitorError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|err| {
                MonitorError::Config(format!("invalid SMTP relay {}: {err}", config.smtp_host))
            })?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
            ))
            .build();

        let sender: Mailbox = config.smtp_user.parse().map_err(|err| {
            MonitorError::Config(format!("invalid sender address {}: {err}", config.smtp_user))
        })?;

        let recipients = config
            .recipients
            .iter()
            .map(|addr| {
                addr.parse::<Mailbox>().map_err(|err| {
                    MonitorError::Config(format!("invalid recipient address {addr}: {err}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            transport,
            sender,
            recipients,
        })
    }

    /// Send `subject`/`body` to every recipient, one message each.
    pub async fn send(&self, subject: &str, body: &str) {
        for recipient in &self.recipients {
            let message = Message::builder()
                .from(self.sender.clone())
                .to(recipient.clone())
                .subject(subject)
                .header(ContentType::TEXT_PLAIN)
                .body(body.to_string());

            let message = match message {
                Ok(message) => message,
                Err(err) => {
                    tracing::error!("failed to build email for {recipient}: {err}");
                    continue;
                }
            };

            match self.transport.send(message).await {
                Ok(_) => tracing::info!("email sent to {recipient}"),
                Err(err) => tracing::error!("failed to send email to {recipient}: {err}"),
            }
        }
    }
}
