//! # Email Channel
//!
//! Sends one HTML message per phase transition over authenticated SMTP
//! (STARTTLS). The SMTP username is the sender address.

use super::{ChannelError, NotificationChannel, cancellable};
use crate::config::EmailSettings;
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use phasecast_core::{EventKind, NotificationEvent};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Email delivery channel.
pub struct EmailChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailChannel {
    /// Build a channel, failing on unparsable addresses or SMTP host.
    pub fn new(settings: &EmailSettings, timeout: Duration) -> Result<Self, ChannelError> {
        let from = parse_mailbox(&settings.from)?;
        let to = parse_mailbox(&settings.to)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
            .map_err(|e| ChannelError::Transport(format!("SMTP relay {}: {}", settings.smtp_host, e)))?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                smtp_username(&from),
                settings.password.clone(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    /// Build from configuration, or `None` when it is incomplete or invalid.
    pub fn from_settings(settings: &EmailSettings, timeout: Duration) -> Option<Self> {
        if !settings.is_configured() {
            return None;
        }

        match Self::new(settings, timeout) {
            Ok(channel) => Some(channel),
            Err(e) => {
                tracing::warn!(error = %e, "Email channel not registered");
                None
            }
        }
    }

    /// Assemble the message for `event`.
    pub fn compose(&self, event: &NotificationEvent) -> Result<Message, ChannelError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject(event))
            .header(ContentType::TEXT_HTML)
            .body(html_body(event))
            .map_err(|e| ChannelError::Message(e.to_string()))
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    async fn send(
        &self,
        cancel: &CancellationToken,
        event: &NotificationEvent,
    ) -> Result<(), ChannelError> {
        if event.kind != EventKind::PhaseTransition {
            return Ok(());
        }

        let message = self.compose(event)?;
        cancellable(cancel, async {
            self.transport
                .send(message)
                .await
                .map(|_| ())
                .map_err(|e| {
                    if e.is_timeout() {
                        ChannelError::Timeout
                    } else {
                        ChannelError::Transport(e.to_string())
                    }
                })
        })
        .await
    }

    fn channel_type(&self) -> &str {
        "email"
    }
}

/// Bare address of the sender, without any display name.
fn smtp_username(from: &Mailbox) -> String {
    from.email.to_string()
}

fn parse_mailbox(address: &str) -> Result<Mailbox, ChannelError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| ChannelError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

// =============================================================================
// RENDERING
// =============================================================================

fn subject(event: &NotificationEvent) -> String {
    format!("Video Phase Changed: {}", event.video_name)
}

fn html_body(event: &NotificationEvent) -> String {
    format!(
        "<h2>Video Phase Transition</h2>\n\
         <p><strong>Video:</strong> {}</p>\n\
         <p><strong>Category:</strong> {}</p>\n\
         <p><strong>Phase Change:</strong> {} → {}</p>\n\
         <p><strong>Time:</strong> {}</p>\n\
         <hr>\n\
         <p><em>This is an automated notification from Phasecast</em></p>\n",
        escape_html(&event.video_name),
        escape_html(&event.category),
        event.old_phase_name(),
        event.new_phase_name(),
        event.timestamp.format("%Y-%m-%d %H:%M:%S"),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
