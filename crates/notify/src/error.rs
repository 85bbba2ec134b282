//! Error types for the notification system.

use thiserror::Error;

/// Errors that can occur when sending notifications.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// SMTP transport failed
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Email could not be built
    #[error("Failed to build email: {0}")]
    Email(#[from] lettre::error::Error),

    /// Invalid mailbox
    #[error("Invalid email address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    /// Nobody to send to
    #[error("No recipients configured")]
    NoRecipients,

    /// Writing to the console failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A named channel failed during dispatch
    #[error("{channel} channel failed: {source}")]
    Delivery {
        channel: &'static str,
        #[source]
        source: Box<ChannelError>,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}
