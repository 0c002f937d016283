//! # Slack Channel
//!
//! Posts a short text message to every configured Slack channel through the
//! Web API (`chat.postMessage`). Targets are tried in order; the send
//! succeeds if at least one of them accepted the message.

use super::{ChannelError, NotificationChannel, cancellable};
use crate::config::SlackSettings;
use async_trait::async_trait;
use phasecast_core::{EventKind, NotificationEvent};
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Slack delivery channel.
pub struct SlackChannel {
    http: reqwest::Client,
    api_base: String,
    token: String,
    targets: Vec<String>,
}

/// The part of a Web API reply we care about.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackChannel {
    /// Build a channel posting to `targets`.
    pub fn new(
        settings: &SlackSettings,
        targets: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, ChannelError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChannelError::Transport(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            targets,
        })
    }

    /// Build from configuration, or `None` without a token or targets.
    pub fn from_settings(settings: &SlackSettings, timeout: Duration) -> Option<Self> {
        if !settings.is_configured() {
            return None;
        }

        match Self::new(settings, settings.targets(), timeout) {
            Ok(channel) => Some(channel),
            Err(e) => {
                tracing::warn!(error = %e, "Slack channel not registered");
                None
            }
        }
    }

    /// Target channel ids, in posting order.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    async fn post(&self, target: &str, text: &str) -> Result<(), ChannelError> {
        let response = self
            .http
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "channel": target, "text": text }))
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Rejected {
                service: "slack",
                reason: format!("HTTP {}", status),
            });
        }

        let reply: ApiReply = response.json().await.map_err(map_http_error)?;
        if reply.ok {
            Ok(())
        } else {
            Err(ChannelError::Rejected {
                service: "slack",
                reason: reply.error.unwrap_or_else(|| "unknown_error".to_string()),
            })
        }
    }
}

#[async_trait]
impl NotificationChannel for SlackChannel {
    async fn send(
        &self,
        cancel: &CancellationToken,
        event: &NotificationEvent,
    ) -> Result<(), ChannelError> {
        if event.kind != EventKind::PhaseTransition {
            return Ok(());
        }

        let text = message_text(event);
        let mut delivered = 0usize;
        let mut last_error = None;

        for target in &self.targets {
            match cancellable(cancel, self.post(target, &text)).await {
                Ok(()) => delivered += 1,
                Err(ChannelError::Cancelled) => return Err(ChannelError::Cancelled),
                Err(e) => {
                    tracing::warn!(
                        target_channel = %target,
                        error = %e,
                        "Failed to post phase notification to Slack channel"
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(last) if delivered == 0 => Err(ChannelError::AllTargetsFailed {
                attempted: self.targets.len(),
                last: Box::new(last),
            }),
            _ => Ok(()),
        }
    }

    fn channel_type(&self) -> &str {
        "slack"
    }
}

fn map_http_error(e: reqwest::Error) -> ChannelError {
    if e.is_timeout() {
        ChannelError::Timeout
    } else {
        ChannelError::Transport(e.to_string())
    }
}

fn message_text(event: &NotificationEvent) -> String {
    format!(
        "📹 Video Phase Changed: {}\n{} → {}\nCategory: {}",
        event.video_name,
        event.old_phase_name(),
        event.new_phase_name(),
        event.category,
    )
}

// =============================================================================
// TESTS
// =============================================================================
