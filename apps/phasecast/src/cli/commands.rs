//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::Settings;
use crate::manager::TransitionManager;
use phasecast_core::{Phase, PhasecastError, Video, classify};
use std::path::Path;
use std::time::Duration;

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum snapshot file size (1 MB).
const MAX_SNAPSHOT_FILE_SIZE: u64 = 1024 * 1024;

/// Read and decode a JSON snapshot.
pub fn load_snapshot(path: &Path) -> Result<Video, PhasecastError> {
    let canonical = path.canonicalize().map_err(|e| {
        PhasecastError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(PhasecastError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| PhasecastError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_SNAPSHOT_FILE_SIZE {
        return Err(PhasecastError::Serialization(format!(
            "Snapshot size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_SNAPSHOT_FILE_SIZE
        )));
    }

    let contents = std::fs::read(&canonical)
        .map_err(|e| PhasecastError::IoError(format!("Read file: {}", e)))?;

    serde_json::from_slice(&contents).map_err(|e| {
        PhasecastError::Serialization(format!("Snapshot '{}': {}", path.display(), e))
    })
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// PHASES COMMAND
// =============================================================================

/// List every phase with its rank.
pub fn cmd_phases(json_mode: bool) -> Result<(), PhasecastError> {
    if json_mode {
        let phases: Vec<_> = Phase::ALL
            .iter()
            .map(|p| serde_json::json!({ "rank": p.rank(), "name": p.name() }))
            .collect();
        print_json(&serde_json::Value::Array(phases));
        return Ok(());
    }

    println!("Video Phases");
    println!("============");
    for phase in Phase::ALL {
        let marker = if phase.is_side_state() { " (hold)" } else { "" };
        println!("  {}  {}{}", phase.rank(), phase.name(), marker);
    }

    Ok(())
}

// =============================================================================
// CLASSIFY COMMAND
// =============================================================================

/// Show the phase of a snapshot file.
pub fn cmd_classify(file: &Path, json_mode: bool) -> Result<(), PhasecastError> {
    let video = load_snapshot(file)?;
    let phase = classify(&video);

    if json_mode {
        print_json(&serde_json::json!({
            "video": format!("{}/{}", video.category, video.name),
            "phase": phase.rank(),
            "phase_name": phase.name(),
        }));
        return Ok(());
    }

    println!("Video: {}/{}", video.category, video.name);
    println!("Phase: {} ({})", phase.name(), phase.rank());

    Ok(())
}

// =============================================================================
// NOTIFY COMMAND
// =============================================================================

/// Compare two snapshots and notify configured channels on a phase change.
pub async fn cmd_notify(
    config: &Path,
    old: &Path,
    new: &Path,
    grace_secs: u64,
    json_mode: bool,
) -> Result<(), PhasecastError> {
    let settings = Settings::load(config)?;
    let old_video = load_snapshot(old)?;
    let new_video = load_snapshot(new)?;

    let old_phase = classify(&old_video);
    let new_phase = classify(&new_video);

    let manager = TransitionManager::from_settings(&settings);
    let gates_open = manager.gates().is_open();
    if !gates_open {
        tracing::info!(
            enabled = manager.gates().enabled(),
            phase_transitions = manager.gates().phase_transitions(),
            "Phase transition notifications are disabled"
        );
    }

    manager.notify_phase_change(&old_video, &new_video);
    let drained = manager.shutdown(Duration::from_secs(grace_secs)).await;
    let stats = manager.dispatcher().stats();

    if json_mode {
        print_json(&serde_json::json!({
            "old_phase": old_phase.rank(),
            "new_phase": new_phase.rank(),
            "changed": old_phase != new_phase,
            "sent": notify_outcome(old_phase, new_phase, gates_open) == NotifyOutcome::Dispatched,
            "channels": manager.dispatcher().channel_types(),
            "drained": drained,
            "stats": stats,
        }));
        return Ok(());
    }

    println!("Phase: {} → {}", old_phase, new_phase);
    match notify_outcome(old_phase, new_phase, gates_open) {
        NotifyOutcome::Unchanged => {
            println!("No transition, nothing sent.");
            return Ok(());
        }
        NotifyOutcome::Disabled => {
            println!("Notifications disabled, nothing sent.");
            return Ok(());
        }
        NotifyOutcome::Dispatched => {}
    }

    println!("Delivered: {}", stats.delivered);
    println!("Failed:    {}", stats.failed);
    if !drained {
        println!("Some deliveries were cancelled after {}s", grace_secs);
    }

    Ok(())
}

/// What a `notify` run amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotifyOutcome {
    Unchanged,
    Disabled,
    Dispatched,
}

fn notify_outcome(old: Phase, new: Phase, gates_open: bool) -> NotifyOutcome {
    if old == new {
        NotifyOutcome::Unchanged
    } else if !gates_open {
        NotifyOutcome::Disabled
    } else {
        NotifyOutcome::Dispatched
    }
}

// =============================================================================
// CHANNELS COMMAND
// =============================================================================

/// Show which channels the configuration would register.
pub fn cmd_channels(config: &Path, json_mode: bool) -> Result<(), PhasecastError> {
    let settings = Settings::load(config)?;

    let email = settings.email.is_configured();
    let slack_targets = if settings.slack.is_configured() {
        settings.slack.targets()
    } else {
        Vec::new()
    };

    if json_mode {
        print_json(&serde_json::json!({
            "notifications_enabled": settings.notifications.enabled,
            "phase_transitions": settings.notifications.phase_transitions,
            "email": email,
            "slack_channels": slack_targets,
        }));
        return Ok(());
    }

    println!("Notification Channels");
    println!("=====================");
    println!("Config:            {}", config.display());
    println!("Notifications:     {}", on_off(settings.notifications.enabled));
    println!(
        "Phase transitions: {}",
        on_off(settings.notifications.phase_transitions)
    );
    println!();
    if email {
        println!("  email  → {}", settings.email.to);
    } else {
        println!("  email  (not configured)");
    }
    if slack_targets.is_empty() {
        println!("  slack  (not configured)");
    } else {
        println!("  slack  → {}", slack_targets.join(", "));
    }

    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

// =============================================================================
// TESTS
// =============================================================================
