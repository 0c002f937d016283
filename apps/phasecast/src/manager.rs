//! # Transition Manager
//!
//! Entry point for the surrounding application: call
//! [`TransitionManager::notify_phase_change`] whenever a video is saved.
//!
//! The manager classifies the old and new snapshots and publishes an event
//! only when the phase actually changed. It never blocks on delivery and
//! never reports an error back; notifications are a side effect of the
//! caller's workflow, not a dependency of it.
//!
//! There is no process-wide instance. Build one at startup and pass it
//! around by reference (or `Arc`).

use crate::channel;
use crate::config::{NotificationSettings, Settings};
use crate::dispatch::EventBus;
use phasecast_core::{NotificationEvent, PhaseClassifier, Video};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

// =============================================================================
// GATES
// =============================================================================

/// The two configuration switches that must both be on for a transition to
/// be published. Read on every call, never cached per event.
#[derive(Debug)]
pub struct NotificationGates {
    enabled: AtomicBool,
    phase_transitions: AtomicBool,
}

impl NotificationGates {
    #[must_use]
    pub fn new(enabled: bool, phase_transitions: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            phase_transitions: AtomicBool::new(phase_transitions),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &NotificationSettings) -> Self {
        Self::new(settings.enabled, settings.phase_transitions)
    }

    /// Both gates open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.enabled() && self.phase_transitions()
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn phase_transitions(&self) -> bool {
        self.phase_transitions.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn set_phase_transitions(&self, enabled: bool) {
        self.phase_transitions.store(enabled, Ordering::Release);
    }
}

// =============================================================================
// MANAGER
// =============================================================================

/// Detects phase changes and hands them to the event bus.
pub struct TransitionManager {
    bus: Arc<EventBus>,
    gates: NotificationGates,
    classifier: PhaseClassifier,
}

impl TransitionManager {
    #[must_use]
    pub fn new(bus: Arc<EventBus>, gates: NotificationGates) -> Self {
        Self {
            bus,
            gates,
            classifier: PhaseClassifier::new(),
        }
    }

    /// Build the bus and register every channel the settings describe.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let mut bus = EventBus::new();
        for channel in channel::from_settings(settings) {
            bus.add_channel(channel);
        }

        if bus.is_empty() {
            tracing::info!("No notification channels configured");
        } else {
            tracing::info!(channels = ?bus.channel_types(), "Notification channels registered");
        }

        Self::new(
            Arc::new(bus),
            NotificationGates::from_settings(&settings.notifications),
        )
    }

    /// Publish a transition event if `old` and `new` classify differently.
    ///
    /// Returns immediately; delivery happens in the background.
    pub fn notify_phase_change(&self, old: &Video, new: &Video) {
        if !self.gates.is_open() {
            return;
        }

        let Some((old_phase, new_phase)) = self.classifier.transition(old, new) else {
            return;
        };

        tracing::info!(
            category = %new.category,
            video = %new.name,
            from = old_phase.name(),
            to = new_phase.name(),
            "Video phase changed"
        );

        self.bus
            .publish(NotificationEvent::phase_transition(new, old_phase, new_phase));
    }

    #[must_use]
    pub fn gates(&self) -> &NotificationGates {
        &self.gates
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Shut the event bus down. See [`EventBus::shutdown`].
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.bus.shutdown(grace).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
