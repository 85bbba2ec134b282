//! Console channel used for dry runs.

use std::io::Write;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ChannelError;
use crate::message::Message;
use crate::NotifyChannel;

/// Prints messages to standard output instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutChannel {
    include_html: bool,
}

impl StdoutChannel {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_html: false,
        }
    }

    /// Also print the HTML body.
    #[must_use]
    pub const fn with_html(mut self, include_html: bool) -> Self {
        self.include_html = include_html;
        self
    }

    /// Render a message the way it is printed.
    #[must_use]
    pub fn render(&self, message: &Message, recipients: &[String]) -> String {
        let mut out = format!(
            "To: {}\nSubject: {}\n\n{}\n",
            recipients.join(", "),
            message.subject,
            message.text.trim_end()
        );
        if self.include_html {
            out.push_str("\n--- HTML ---\n");
            out.push_str(message.html.trim_end());
            out.push('\n');
        }
        out
    }
}

#[async_trait]
impl NotifyChannel for StdoutChannel {
    fn name(&self) -> &'static str {
        "stdout"
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn send(&self, message: &Message, recipients: &[String]) -> Result<(), ChannelError> {
        let rendered = self.render(message, recipients);
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;
        debug!(subject = %message.subject, "Printed message to stdout");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message::new("Subject line", "Body text\n", "<p>Body</p>")
    }

    #[test]
    fn test_render_text_only() {
        let out = StdoutChannel::new().render(&message(), &["a@example.com".to_string()]);
        assert_eq!(out, "To: a@example.com\nSubject: Subject line\n\nBody text\n");
    }

    #[test]
    fn test_render_with_html() {
        let out = StdoutChannel::new()
            .with_html(true)
            .render(&message(), &["a@example.com".to_string(), "b@example.com".to_string()]);
        assert!(out.starts_with("To: a@example.com, b@example.com\n"));
        assert!(out.ends_with("--- HTML ---\n<p>Body</p>\n"));
    }
}
