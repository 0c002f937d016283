//! # Core Type Definitions
//!
//! This module contains the types shared by every part of Phasecast:
//! - The video snapshot (`Video`, `Sponsorship`)
//! - Error types (`PhasecastError`)
//!
//! ## Snapshot Ownership
//!
//! A `Video` is owned by the surrounding application. Phasecast only reads
//! the fields it needs for classification and identity, and copies the whole
//! record into events so channels can render whatever they like.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// SPONSORSHIP
// =============================================================================

/// Sponsorship details attached to a video.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sponsorship {
    /// Agreed amount, free-form (e.g. "N/A", "1000").
    pub amount: String,
    /// Sponsor contact addresses.
    pub emails: String,
    /// Reason the sponsorship is blocking the video. Non-empty means blocked.
    pub blocked: String,
}

impl Sponsorship {
    /// Whether the sponsor is currently blocking progress.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        !self.blocked.is_empty()
    }
}

// =============================================================================
// VIDEO SNAPSHOT
// =============================================================================

/// A point-in-time snapshot of a tracked video.
///
/// Every field defaults, so partial JSON/TOML documents deserialize cleanly.
/// Empty strings mean "not set".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    /// Short slug, unique within its category.
    pub name: String,
    /// Category the video belongs to.
    pub category: String,

    /// Scheduled recording/publish date. Setting it starts the video.
    pub date: String,
    /// Video is on hold.
    pub delayed: bool,
    pub sponsorship: Sponsorship,

    /// Material checklist.
    pub code: bool,
    pub screen: bool,
    pub head: bool,
    pub diagrams: bool,

    /// Editing has been requested.
    pub request_edit: bool,
    /// Uploaded video id.
    pub upload_video: String,
    /// Announcement tweet.
    pub tweet: String,
    /// Companion repository. Set last, once the video is out.
    pub repo: String,

    // Rendering-only fields. Never consulted by the classifier.
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub gist: String,
}

impl Video {
    /// Create an empty snapshot for `category/name`.
    #[must_use]
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    /// Whether every material checklist item is done.
    #[must_use]
    pub fn material_done(&self) -> bool {
        self.code && self.screen && self.head && self.diagrams
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in Phasecast.
///
/// Classification has no error path. These cover decoding, configuration
/// and file access around it.
#[derive(Debug, Error)]
pub enum PhasecastError {
    /// A phase rank outside the known ladder.
    #[error("Unknown phase rank: {0}")]
    UnknownPhase(u8),

    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
