//! Notification channel implementations.

pub mod email;
pub mod stdout;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::message::Message;

/// Trait for notification channels (email, console).
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Check if this channel is enabled/configured.
    fn enabled(&self) -> bool;

    /// Deliver a message to the given recipients.
    async fn send(&self, message: &Message, recipients: &[String]) -> Result<(), ChannelError>;
}
