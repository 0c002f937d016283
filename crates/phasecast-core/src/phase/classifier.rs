//! # Phase Classification
//!
//! Maps a [`Video`] snapshot to a [`Phase`].
//!
//! The rules are evaluated top to bottom and the first match wins. Side
//! states (delayed, sponsor-blocked) take precedence over progress, and
//! progress is checked from the most advanced phase down, so a snapshot with
//! more fields filled in lands on a later phase.

use crate::{PhasecastError, Video};
use serde::{Deserialize, Serialize};

// =============================================================================
// PHASE ENUM
// =============================================================================

/// Lifecycle phase of a video, identified by a stable integer rank.
///
/// Serialized as the bare rank so events stay compatible with consumers
/// that only know the integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Phase {
    Published = 0,
    PublishPending = 1,
    EditRequested = 2,
    MaterialDone = 3,
    Started = 4,
    Delayed = 5,
    SponsoredBlocked = 6,
    Ideas = 7,
}

impl Phase {
    /// Every phase, in rank order.
    pub const ALL: [Phase; 8] = [
        Phase::Published,
        Phase::PublishPending,
        Phase::EditRequested,
        Phase::MaterialDone,
        Phase::Started,
        Phase::Delayed,
        Phase::SponsoredBlocked,
        Phase::Ideas,
    ];

    /// The phase a snapshot lands on when nothing discriminating is set.
    pub const NOT_STARTED: Phase = Phase::Ideas;

    /// Stable integer rank.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Look a phase up by rank.
    #[must_use]
    pub const fn from_rank(rank: u8) -> Option<Phase> {
        match rank {
            0 => Some(Phase::Published),
            1 => Some(Phase::PublishPending),
            2 => Some(Phase::EditRequested),
            3 => Some(Phase::MaterialDone),
            4 => Some(Phase::Started),
            5 => Some(Phase::Delayed),
            6 => Some(Phase::SponsoredBlocked),
            7 => Some(Phase::Ideas),
            _ => None,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Published => "Published",
            Phase::PublishPending => "Pending Publish",
            Phase::EditRequested => "Edit Requested",
            Phase::MaterialDone => "Material Done",
            Phase::Started => "Started",
            Phase::Delayed => "Delayed",
            Phase::SponsoredBlocked => "Sponsored Blocked",
            Phase::Ideas => "Ideas",
        }
    }

    /// Whether this is a hold state rather than a step of progress.
    #[must_use]
    pub const fn is_side_state(self) -> bool {
        matches!(self, Phase::Delayed | Phase::SponsoredBlocked)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> Self {
        phase.rank()
    }
}

impl TryFrom<u8> for Phase {
    type Error = PhasecastError;

    fn try_from(rank: u8) -> Result<Self, Self::Error> {
        Phase::from_rank(rank).ok_or(PhasecastError::UnknownPhase(rank))
    }
}

/// Name for a raw rank. Unknown ranks render as "Unknown".
#[must_use]
pub fn phase_name(rank: u8) -> &'static str {
    Phase::from_rank(rank).map_or("Unknown", Phase::name)
}

// =============================================================================
// CLASSIFIER
// =============================================================================

/// Classify a snapshot.
///
/// Total and deterministic: reads only the snapshot, never a clock or any
/// state left behind by earlier calls.
#[must_use]
pub fn classify(video: &Video) -> Phase {
    if video.delayed {
        Phase::Delayed
    } else if video.sponsorship.is_blocked() {
        Phase::SponsoredBlocked
    } else if !video.repo.is_empty() {
        Phase::Published
    } else if !video.upload_video.is_empty() && !video.tweet.is_empty() {
        Phase::PublishPending
    } else if video.request_edit {
        Phase::EditRequested
    } else if video.material_done() {
        Phase::MaterialDone
    } else if !video.date.is_empty() {
        Phase::Started
    } else {
        Phase::NOT_STARTED
    }
}

/// Phase Classifier - compares two independent classifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseClassifier;

impl PhaseClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classify a single snapshot.
    #[must_use]
    pub fn classify(&self, video: &Video) -> Phase {
        classify(video)
    }

    /// Classify both snapshots and return `(old, new)` when they differ.
    #[must_use]
    pub fn transition(&self, old: &Video, new: &Video) -> Option<(Phase, Phase)> {
        let old_phase = classify(old);
        let new_phase = classify(new);
        (old_phase != new_phase).then_some((old_phase, new_phase))
    }
}

// =============================================================================
// TESTS
// =============================================================================
