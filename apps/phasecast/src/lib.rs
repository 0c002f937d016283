//! # Phasecast
//!
//! Watches video snapshots for lifecycle phase changes and fans each change
//! out to email, Slack, or any other [`NotificationChannel`].
//!
//! ## Architecture
//!
//! ```text
//! caller ──(old, new)──▶ TransitionManager ──▶ classify both (phasecast-core)
//!                               │
//!                       phases differ?
//!                               │ yes
//!                               ▼
//!                           EventBus ──┬──▶ task ──▶ EmailChannel
//!                                      ├──▶ task ──▶ SlackChannel
//!                                      └──▶ task ──▶ ...
//! ```
//!
//! Delivery is best-effort and fire-and-forget: failures are logged and
//! counted, never returned to the caller.

pub mod channel;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod manager;

pub use channel::{ChannelError, EmailChannel, NotificationChannel, SlackChannel};
pub use config::Settings;
pub use dispatch::{DispatchStats, EventBus};
pub use manager::{NotificationGates, TransitionManager};
