//! # Notification Events
//!
//! The immutable record handed to every delivery channel. An event is built
//! once, when a transition is detected, and is only ever read afterwards.

use crate::{Phase, Video};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// EVENT KIND
// =============================================================================

/// What happened. Serialized as a dotted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "video.phase.changed")]
    PhaseTransition,
}

impl EventKind {
    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::PhaseTransition => "video.phase.changed",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// EVENT
// =============================================================================

/// A detected change in a video's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// `category/name`, or empty when either part is missing.
    pub video_id: String,
    pub video_name: String,
    pub category: String,
    pub old_phase: Phase,
    pub new_phase: Phase,
    pub timestamp: DateTime<Utc>,
    /// Full copy of the new snapshot, for channel-side rendering.
    pub video: Video,
}

impl NotificationEvent {
    /// Build a phase-transition event for `video`, stamped with the current time.
    ///
    /// Missing identity is not an error: the event carries empty strings and
    /// channels render what they can.
    #[must_use]
    pub fn phase_transition(video: &Video, old_phase: Phase, new_phase: Phase) -> Self {
        Self {
            kind: EventKind::PhaseTransition,
            video_id: subject_id(&video.category, &video.name),
            video_name: video.name.clone(),
            category: video.category.clone(),
            old_phase,
            new_phase,
            timestamp: Utc::now(),
            video: video.clone(),
        }
    }

    #[must_use]
    pub fn old_phase_name(&self) -> &'static str {
        self.old_phase.name()
    }

    #[must_use]
    pub fn new_phase_name(&self) -> &'static str {
        self.new_phase.name()
    }

    /// Whether the video moved towards publication (rank decreased).
    #[must_use]
    pub fn is_forward(&self) -> bool {
        self.new_phase.rank() < self.old_phase.rank()
    }
}

/// Composite subject key.
fn subject_id(category: &str, name: &str) -> String {
    if category.is_empty() || name.is_empty() {
        String::new()
    } else {
        format!("{category}/{name}")
    }
}

// =============================================================================
// TESTS
// =============================================================================
