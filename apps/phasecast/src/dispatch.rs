//! # Event Bus
//!
//! Fans each published [`NotificationEvent`] out to every registered channel.
//!
//! - One task per channel per publish, no queue and no concurrency cap
//! - `publish` returns as soon as the tasks are spawned
//! - A failing or slow channel never affects its siblings or the publisher
//! - Failures go to the diagnostics sink: a `warn!` event plus counters
//!
//! Channels are registered during setup through `&mut self`. Once the bus is
//! shared (usually behind an `Arc`) the list is read-only, so dispatch takes
//! no lock.
//!
//! Every task is spawned on a [`TaskTracker`], which lets callers await the
//! in-flight deliveries ([`EventBus::drain`]) or stop them on shutdown
//! ([`EventBus::shutdown`]).

use crate::channel::NotificationChannel;
use phasecast_core::NotificationEvent;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

// =============================================================================
// STATISTICS
// =============================================================================

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time copy of the bus counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Events accepted for fan-out.
    pub published: u64,
    /// Channel deliveries that returned `Ok`.
    pub delivered: u64,
    /// Channel deliveries that returned an error.
    pub failed: u64,
    /// Channel deliveries not attempted because the channel does not support the event kind.
    pub skipped: u64,
    /// Events discarded because the bus was shut down or no runtime was available.
    pub dropped: u64,
}

// =============================================================================
// EVENT BUS
// =============================================================================

/// Concurrent, best-effort event dispatcher.
pub struct EventBus {
    channels: Vec<Arc<dyn NotificationChannel>>,
    enabled: AtomicBool,
    accepting: AtomicBool,
    tracker: TaskTracker,
    cancel: CancellationToken,
    runtime: Option<Handle>,
    counters: Arc<Counters>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create an enabled bus with no channels.
    ///
    /// Deliveries run on the Tokio runtime current at construction, or at
    /// publish time if the bus was built outside one.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            enabled: AtomicBool::new(true),
            accepting: AtomicBool::new(true),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
            runtime: Handle::try_current().ok(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Run deliveries on `handle`.
    #[must_use]
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Builder form of [`EventBus::add_channel`].
    #[must_use]
    pub fn with_channel(mut self, channel: impl NotificationChannel + 'static) -> Self {
        self.add_channel(Arc::new(channel));
        self
    }

    /// Register a channel. Duplicates are allowed.
    pub fn add_channel(&mut self, channel: Arc<dyn NotificationChannel>) {
        tracing::debug!(channel = channel.channel_type(), "Registered notification channel");
        self.channels.push(channel);
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Type identifiers of the registered channels, in registration order.
    #[must_use]
    pub fn channel_types(&self) -> Vec<String> {
        self.channels
            .iter()
            .map(|c| c.channel_type().to_string())
            .collect()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Number of deliveries still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        let c = &self.counters;
        DispatchStats {
            published: c.published.load(Ordering::Relaxed),
            delivered: c.delivered.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
            skipped: c.skipped.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
        }
    }

    /// Deliver `event` to every channel, without waiting for any of them.
    ///
    /// A disabled bus, or one without channels, ignores the call entirely.
    pub fn publish(&self, event: NotificationEvent) {
        if !self.is_enabled() || self.channels.is_empty() {
            return;
        }

        if !self.accepting.load(Ordering::SeqCst) {
            tracing::debug!(video = %event.video_id, "Event bus shut down, dropping event");
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let Some(handle) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            tracing::warn!(video = %event.video_id, "No async runtime available, dropping event");
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        self.counters.published.fetch_add(1, Ordering::Relaxed);
        let event = Arc::new(event);

        for channel in &self.channels {
            if !channel.supports(event.kind) {
                tracing::debug!(
                    channel = channel.channel_type(),
                    kind = %event.kind,
                    "Channel does not handle event kind, skipping"
                );
                self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            self.tracker.spawn_on(
                deliver(
                    Arc::clone(channel),
                    Arc::clone(&event),
                    self.cancel.clone(),
                    Arc::clone(&self.counters),
                ),
                &handle,
            );
        }
    }

    /// Wait for every delivery spawned so far.
    ///
    /// Publishing from other tasks while draining is allowed; those
    /// deliveries are awaited too.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        if self.accepting.load(Ordering::SeqCst) {
            self.tracker.reopen();
            // A shutdown may have closed the tracker between the check and
            // the reopen; it must stay closed.
            if !self.accepting.load(Ordering::SeqCst) {
                self.tracker.close();
            }
        }
    }

    /// Stop accepting events and wind down in-flight deliveries.
    ///
    /// Deliveries get `grace` to finish on their own; after that the shared
    /// cancellation token fires and the remaining ones are awaited. Returns
    /// `true` when everything finished within `grace`.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.accepting.store(false, Ordering::SeqCst);
        self.tracker.close();

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_ok() {
            return true;
        }

        tracing::warn!(
            in_flight = self.tracker.len(),
            "Notification deliveries still running after grace period, cancelling"
        );
        self.cancel.cancel();
        self.tracker.wait().await;
        false
    }
}

async fn deliver(
    channel: Arc<dyn NotificationChannel>,
    event: Arc<NotificationEvent>,
    cancel: CancellationToken,
    counters: Arc<Counters>,
) {
    match channel.send(&cancel, &event).await {
        Ok(()) => {
            counters.delivered.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                channel = channel.channel_type(),
                video = %event.video_id,
                "Notification delivered"
            );
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                channel = channel.channel_type(),
                video = %event.video_id,
                error = %e,
                "Failed to send notification"
            );
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
