//! Notification delivery for cost reports.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use notify::{EmailChannel, Message, Notifier, SmtpConfig};
//!
//! # async fn run() -> Result<(), notify::ChannelError> {
//! let email = EmailChannel::new(SmtpConfig {
//!     host: "smtp.gmail.com".to_string(),
//!     port: 587,
//!     username: "alerts@example.com".to_string(),
//!     password: "app-password".to_string(),
//!     from: "alerts@example.com".to_string(),
//! })?;
//!
//! let notifier = Notifier::with_channels(
//!     vec![Arc::new(email)],
//!     vec!["finance@example.com".to_string()],
//! );
//!
//! notifier
//!     .send(&Message::new("Subject", "text body", "<p>html body</p>"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for notification channels
//! - [`EmailChannel`] sends multipart email over SMTP
//! - [`StdoutChannel`] prints messages instead of sending them
//! - [`Notifier`] dispatches a message to all enabled channels

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod message;

pub use channels::email::{EmailChannel, SmtpConfig, DEFAULT_SMTP_PORT};
pub use channels::stdout::StdoutChannel;
pub use channels::NotifyChannel;
pub use error::ChannelError;
pub use message::Message;

use std::sync::Arc;
use tracing::{debug, error, warn};

/// Central notification dispatcher.
///
/// The `Notifier` owns the recipient list and sends each message through
/// every enabled channel. Delivery is attempted once; failures are not
/// retried.
pub struct Notifier {
    channels: Vec<Arc<dyn NotifyChannel>>,
    recipients: Vec<String>,
    disabled: bool,
}

impl Notifier {
    /// Create a notifier with specific channels and recipients.
    #[must_use]
    pub fn with_channels(channels: Vec<Arc<dyn NotifyChannel>>, recipients: Vec<String>) -> Self {
        Self {
            channels,
            recipients,
            disabled: false,
        }
    }

    /// Create a disabled notifier (for testing or when notifications are off).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            channels: vec![],
            recipients: vec![],
            disabled: true,
        }
    }

    /// Check if any notification channels are enabled.
    #[must_use]
    pub fn has_channels(&self) -> bool {
        !self.disabled && !self.channels.is_empty()
    }

    /// Get the number of enabled channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        if self.disabled {
            0
        } else {
            self.channels.len()
        }
    }

    #[must_use]
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Send a message to every channel and wait for all of them.
    ///
    /// Every enabled channel is attempted even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first channel failure, wrapped with the channel name.
    pub async fn send(&self, message: &Message) -> Result<(), ChannelError> {
        let mut first_error = None;

        for (channel, result) in self.send_and_collect(message).await {
            if let Err(e) = result {
                error!(channel, error = %e, "Failed to send notification");
                first_error.get_or_insert(ChannelError::Delivery {
                    channel,
                    source: Box::new(e),
                });
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Send a message and collect the result from each channel.
    pub async fn send_and_collect(
        &self,
        message: &Message,
    ) -> Vec<(&'static str, Result<(), ChannelError>)> {
        if self.disabled {
            debug!("Notifications disabled, skipping message");
            return vec![];
        }

        if self.channels.is_empty() {
            warn!("No notification channels configured");
            return vec![];
        }

        let mut results = vec![];

        for channel in &self.channels {
            let channel_name = channel.name();

            if !channel.enabled() {
                debug!(channel = channel_name, "Channel disabled, skipping");
                continue;
            }

            let result = channel.send(message, &self.recipients).await;
            if result.is_ok() {
                debug!(channel = channel_name, "Notification sent");
            }
            results.push((channel_name, result));
        }

        results
    }
}
