// src/config/models.rs
use super::ConfigError;
use crate::check::CheckDefinition;
use crate::notification::{NotificationConfig, NotifyTarget};
use serde::Deserialize;
use std::path::PathBuf;

/// Keys are camelCase; the snake_case spellings are accepted as aliases.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for check definition files.
    #[serde(alias = "check_config_dir")]
    pub check_config_dir: PathBuf,

    pub notification: NotificationConfig,

    #[serde(default, alias = "check_defaults")]
    pub check_defaults: CheckDefaults,

    #[serde(default, alias = "startup_notification")]
    pub startup_notification: Option<StartupNotification>,

    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Filled from `checkConfigDir` after the main file is parsed.
    #[serde(skip)]
    pub checks: Vec<CheckDefinition>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_defaults.validate()?;
        self.notification.validate()?;
        Ok(())
    }
}

/// Values applied to every check that leaves them unset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckDefaults {
    #[serde(alias = "notify_targets")]
    pub notify_targets: Vec<NotifyTarget>,
    pub interval: i64,
    pub timeout: i64,
}

impl Default for CheckDefaults {
    fn default() -> Self {
        Self {
            notify_targets: Vec::new(),
            interval: 60,
            timeout: 5,
        }
    }
}

impl CheckDefaults {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.interval <= 0 {
            problems.push("interval must be greater than 0".to_string());
        }

        if self.timeout < 0 {
            problems.push("timeout must be greater than or equal to 0".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                section: "checkDefaults",
                message: problems.join("; "),
            })
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartupNotification {
    #[serde(default)]
    pub targets: Vec<NotifyTarget>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
            path: "/metrics".to_string(),
        }
    }
}
