//! # Notification Channels
//!
//! A channel is anything that can take a [`NotificationEvent`] somewhere:
//! an inbox, a chat room, a webhook. The event bus only knows the
//! [`NotificationChannel`] trait; it never looks at which kind it holds.
//!
//! ## Available Channels
//!
//! - `email` - HTML mail over SMTP ([`EmailChannel`])
//! - `slack` - `chat.postMessage` to one or more Slack channels ([`SlackChannel`])
//!
//! Construction from configuration yields `None` when a channel's
//! prerequisites are missing. An unconfigured channel is simply not
//! registered; there is no "always failing" placeholder.

mod email;
mod slack;

pub use email::EmailChannel;
pub use slack::SlackChannel;

use crate::config::Settings;
use async_trait::async_trait;
use phasecast_core::{EventKind, NotificationEvent};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

// =============================================================================
// CHANNEL TRAIT
// =============================================================================

/// A delivery target for notification events.
///
/// Implementations must not panic; every failure is a returned
/// [`ChannelError`]. `send` may do network I/O and should return
/// [`ChannelError::Cancelled`] promptly once `cancel` fires.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Attempt delivery of `event`.
    ///
    /// Events of a kind the channel does not handle are a successful no-op.
    async fn send(
        &self,
        cancel: &CancellationToken,
        event: &NotificationEvent,
    ) -> Result<(), ChannelError>;

    /// Stable identifier used in logs ("email", "slack", ...).
    fn channel_type(&self) -> &str;

    /// Whether this channel understands events of `kind`.
    ///
    /// The bus does not spawn deliveries for unsupported kinds.
    fn supports(&self, kind: EventKind) -> bool {
        matches!(kind, EventKind::PhaseTransition)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors a channel can report for a single delivery.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The cancellation token fired before delivery completed.
    #[error("delivery cancelled")]
    Cancelled,

    /// The channel's own time bound elapsed.
    #[error("delivery timed out")]
    Timeout,

    /// A sender or recipient address could not be parsed.
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The outgoing message could not be assembled.
    #[error("message error: {0}")]
    Message(String),

    /// Network or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote service answered but refused the message.
    #[error("rejected by {service}: {reason}")]
    Rejected {
        service: &'static str,
        reason: String,
    },

    /// Every target of a multi-target channel failed.
    #[error("failed to send to any of {attempted} targets: {last}")]
    AllTargetsFailed {
        attempted: usize,
        last: Box<ChannelError>,
    },
}

// =============================================================================
// HELPERS
// =============================================================================

/// Race `fut` against `cancel`. Cancellation wins ties.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ChannelError>
where
    F: Future<Output = Result<T, ChannelError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ChannelError::Cancelled),
        result = fut => result,
    }
}

/// Build every channel the settings fully describe, email first.
pub fn from_settings(settings: &Settings) -> Vec<Arc<dyn NotificationChannel>> {
    let timeout = settings.notifications.send_timeout();
    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();

    if let Some(email) = EmailChannel::from_settings(&settings.email, timeout) {
        channels.push(Arc::new(email));
    }
    if let Some(slack) = SlackChannel::from_settings(&settings.slack, timeout) {
        channels.push(Arc::new(slack));
    }

    channels
}

// =============================================================================
// TESTS
// =============================================================================
