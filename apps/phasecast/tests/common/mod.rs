//! Mock channels shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use async_trait::async_trait;
use phasecast::{ChannelError, NotificationChannel};
use phasecast_core::{NotificationEvent, Video};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Records every event it receives.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    pub events: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(
        &self,
        _cancel: &CancellationToken,
        event: &NotificationEvent,
    ) -> Result<(), ChannelError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn channel_type(&self) -> &str {
        "mock"
    }
}

/// Always fails.
pub struct FailingChannel;

#[async_trait]
impl NotificationChannel for FailingChannel {
    async fn send(
        &self,
        _cancel: &CancellationToken,
        _event: &NotificationEvent,
    ) -> Result<(), ChannelError> {
        Err(ChannelError::Transport("connection refused".to_string()))
    }

    fn channel_type(&self) -> &str {
        "failing"
    }
}

/// Holds every send until a permit is released, then records the event.
#[derive(Clone)]
pub struct GatedChannel {
    pub gate: Arc<Semaphore>,
    pub inner: RecordingChannel,
}

impl GatedChannel {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            inner: RecordingChannel::new(),
        }
    }

    pub fn release(&self, sends: usize) {
        self.gate.add_permits(sends);
    }
}

#[async_trait]
impl NotificationChannel for GatedChannel {
    async fn send(
        &self,
        cancel: &CancellationToken,
        event: &NotificationEvent,
    ) -> Result<(), ChannelError> {
        tokio::select! {
            () = cancel.cancelled() => return Err(ChannelError::Cancelled),
            permit = self.gate.acquire() => {
                permit.map_err(|e| ChannelError::Transport(e.to_string()))?.forget();
            }
        }
        self.inner.send(cancel, event).await
    }

    fn channel_type(&self) -> &str {
        "gated"
    }
}

/// Snapshot with no discriminating fields: Ideas (7).
pub fn idea() -> Video {
    Video::new("test-category", "test-video")
}

/// Same video with a date set: Started (4).
pub fn started() -> Video {
    let mut video = idea();
    video.date = "2023-01-01T10:00".to_string();
    video
}
