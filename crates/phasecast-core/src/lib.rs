//! # phasecast-core
//!
//! The deterministic half of Phasecast - THE LOGIC.
//!
//! This crate decides *whether* something happened to a tracked video. It
//! never decides *who hears about it*: delivery lives in the `phasecast`
//! binary crate.
//!
//! ## Contents
//!
//! - `types` → the [`Video`] snapshot and the [`PhasecastError`] type
//! - `phase` → the [`Phase`] ladder and the classifier
//! - `event` → the immutable [`NotificationEvent`] handed to channels
//!
//! ## Architectural Constraints
//!
//! - Classification is total and pure: same snapshot, same phase
//! - Has NO async, NO network dependencies
//! - Events are constructed once and never mutated

// =============================================================================
// MODULES
// =============================================================================

pub mod event;
pub mod phase;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use event::{EventKind, NotificationEvent};
pub use phase::{Phase, PhaseClassifier, classify, phase_name};
pub use types::{PhasecastError, Sponsorship, Video};
