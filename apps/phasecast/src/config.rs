//! # Configuration
//!
//! Settings are read from a TOML file and then overridden from the
//! environment. A missing file is not an error: every section has defaults,
//! and notifications start disabled.
//!
//! ```toml
//! [notifications]
//! enabled = true
//! phase_transitions = true
//! send_timeout_secs = 30
//!
//! [email]
//! from = "bot@example.com"
//! to = "team@example.com"
//! password = "app-password"
//!
//! [slack]
//! token = "xoxb-..."
//! target_channels = ["C0123456"]
//! ```
//!
//! ## Environment Overrides
//!
//! - `PHASECAST_NOTIFICATIONS_ENABLED`: "true"/"1" or "false"/"0"
//! - `PHASECAST_EMAIL_PASSWORD`: SMTP password
//! - `PHASECAST_SLACK_TOKEN`: Slack bot token

use phasecast_core::PhasecastError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "phasecast.toml";

// =============================================================================
// SETTINGS
// =============================================================================

/// Root of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub notifications: NotificationSettings,
    pub email: EmailSettings,
    pub slack: SlackSettings,
}

/// Global notification switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Master switch for every notification.
    pub enabled: bool,
    /// Switch for phase-transition notifications specifically.
    pub phase_transitions: bool,
    /// Upper bound each channel puts on its own network calls.
    pub send_timeout_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            phase_transitions: true,
            send_timeout_secs: 30,
        }
    }
}

impl NotificationSettings {
    #[must_use]
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs.max(1))
    }
}

/// SMTP delivery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from: String,
    pub to: String,
    pub password: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            from: String::new(),
            to: String::new(),
            password: String::new(),
        }
    }
}

impl EmailSettings {
    /// All credentials and addresses present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.password.is_empty() && !self.from.is_empty() && !self.to.is_empty()
    }
}

/// Slack Web API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackSettings {
    pub token: String,
    pub target_channels: Vec<String>,
    pub api_base: String,
}

impl Default for SlackSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            target_channels: Vec::new(),
            api_base: "https://slack.com/api".to_string(),
        }
    }
}

impl SlackSettings {
    /// Channel ids with surrounding whitespace and blanks removed.
    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        self.target_channels
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Token present and at least one target channel.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.targets().is_empty()
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, PhasecastError> {
        toml::from_str(text).map_err(|e| PhasecastError::Config(e.to_string()))
    }

    /// Load settings from `path` (defaults when the file does not exist),
    /// then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, PhasecastError> {
        let mut settings = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|e| {
                PhasecastError::IoError(format!("Cannot read {}: {}", path.display(), e))
            })?;
            Self::from_toml(&text)?
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Self::default()
        };

        settings.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), PhasecastError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("PHASECAST_NOTIFICATIONS_ENABLED") {
            self.notifications.enabled = parse_bool(&raw).ok_or_else(|| {
                PhasecastError::Config(format!(
                    "PHASECAST_NOTIFICATIONS_ENABLED must be a boolean, got '{}'",
                    raw
                ))
            })?;
        }
        if let Some(password) = lookup("PHASECAST_EMAIL_PASSWORD") {
            self.email.password = password;
        }
        if let Some(token) = lookup("PHASECAST_SLACK_TOKEN") {
            self.slack.token = token;
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_disabled() {
        let settings = Settings::default();
        assert!(!settings.notifications.enabled);
        assert!(settings.notifications.phase_transitions);
        assert_eq!(settings.notifications.send_timeout(), Duration::from_secs(30));
        assert_eq!(settings.email.smtp_host, "smtp.gmail.com");
        assert_eq!(settings.email.smtp_port, 587);
        assert!(!settings.email.is_configured());
        assert!(!settings.slack.is_configured());
    }

    #[test]
    fn parses_partial_toml() {
        let settings = Settings::from_toml(
            r#"
            [notifications]
            enabled = true

            [slack]
            token = "xoxb-1"
            target_channels = ["C1", "  ", " C2 "]
            "#,
        )
        .unwrap();

        assert!(settings.notifications.enabled);
        assert!(settings.notifications.phase_transitions);
        assert_eq!(settings.slack.targets(), vec!["C1", "C2"]);
        assert!(settings.slack.is_configured());
        assert_eq!(settings.slack.api_base, "https://slack.com/api");
        assert!(!settings.email.is_configured());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = Settings::from_toml("[notifications]\nenabled = \"maybe\"").unwrap_err();
        assert!(matches!(err, PhasecastError::Config(_)));
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let settings = NotificationSettings {
            send_timeout_secs: 0,
            ..NotificationSettings::default()
        };
        assert_eq!(settings.send_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PHASECAST_NOTIFICATIONS_ENABLED", "yes"),
            ("PHASECAST_EMAIL_PASSWORD", "secret"),
            ("PHASECAST_SLACK_TOKEN", "xoxb-env"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_env_with(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert!(settings.notifications.enabled);
        assert_eq!(settings.email.password, "secret");
        assert_eq!(settings.slack.token, "xoxb-env");
    }

    #[test]
    fn bad_env_boolean_is_rejected() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env_with(|k| (k == "PHASECAST_NOTIFICATIONS_ENABLED").then(|| "sure".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("PHASECAST_NOTIFICATIONS_ENABLED"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phasecast.toml");
        std::fs::write(
            &path,
            "[email]\nfrom = \"a@b.c\"\nto = \"d@e.f\"\npassword = \"pw\"\nsmtp_port = 2525\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(settings.email.is_configured());
        assert_eq!(settings.email.smtp_port, 2525);
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.email.smtp_host, "smtp.gmail.com");
        assert!(settings.slack.target_channels.is_empty());
    }
}
