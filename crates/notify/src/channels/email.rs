//! Email channel over SMTP with STARTTLS.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{debug, info};

use crate::error::ChannelError;
use crate::message::Message;
use crate::NotifyChannel;

/// Default SMTP submission port.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP server settings.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP relay host.
    pub host: String,
    /// SMTP port (STARTTLS).
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Sender address.
    pub from: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .finish()
    }
}

/// Sends messages as multipart (text + HTML) email.
pub struct EmailChannel {
    config: SmtpConfig,
    from: Mailbox,
}

impl EmailChannel {
    /// Create an email channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender address is not a valid mailbox.
    pub fn new(config: SmtpConfig) -> Result<Self, ChannelError> {
        let from = parse_mailbox(&config.from)?;
        Ok(Self { config, from })
    }

    /// Build the email for `message` addressed to every recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no recipients, a recipient address is
    /// invalid, or the message cannot be assembled.
    pub fn build_email(
        &self,
        message: &Message,
        recipients: &[String],
    ) -> Result<lettre::Message, ChannelError> {
        if recipients.is_empty() {
            return Err(ChannelError::NoRecipients);
        }

        let mut builder = lettre::Message::builder()
            .from(self.from.clone())
            .subject(message.subject.as_str());
        for recipient in recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        let email = builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(message.text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(message.html.clone()),
                ),
        )?;

        Ok(email)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, ChannelError> {
        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
                .port(self.config.port)
                .credentials(creds)
                .build(),
        )
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, ChannelError> {
    address
        .trim()
        .parse()
        .map_err(|source| ChannelError::Address {
            address: address.to_string(),
            source,
        })
}

#[async_trait]
impl NotifyChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn enabled(&self) -> bool {
        !self.config.host.is_empty()
    }

    async fn send(&self, message: &Message, recipients: &[String]) -> Result<(), ChannelError> {
        let email = self.build_email(message, recipients)?;

        debug!(
            host = %self.config.host,
            port = self.config.port,
            "Connecting to SMTP relay"
        );
        self.transport()?.send(email).await?;

        info!(
            recipients = recipients.len(),
            subject = %message.subject,
            "Email sent successfully"
        );

        Ok(())
    }
}
