// src/notification/config.rs
use super::NotifyTarget;
use crate::config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NotificationConfig {
    /// Used whenever a notification names no targets.
    #[serde(alias = "default_target")]
    pub default_target: NotifyTarget,

    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

impl NotificationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_target.as_str().is_empty() {
            return Err(invalid("defaultTarget is required".to_string()));
        }

        if self.targets.is_empty() {
            return Err(invalid("targets required".to_string()));
        }

        if !self.targets.contains_key(self.default_target.as_str()) {
            return Err(invalid(format!(
                "defaultTarget {} is not a configured target",
                self.default_target
            )));
        }

        let mut names: Vec<&String> = self.targets.keys().collect();
        names.sort();
        for name in names {
            if !self.targets[name].has_transport() {
                return Err(invalid(format!("no target type specified {}", name)));
            }
        }

        Ok(())
    }

    pub fn target(&self, name: &NotifyTarget) -> Option<&TargetConfig> {
        self.targets.get(name.as_str())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid {
        section: "notification",
        message,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Human readable label, only used in logs.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub webhook: Option<WebhookTarget>,

    #[serde(default)]
    pub log: Option<LogTarget>,
}

impl TargetConfig {
    pub fn has_transport(&self) -> bool {
        self.webhook.is_some() || self.log.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WebhookTarget {
    pub url: Url,

    #[serde(default = "default_webhook_timeout", alias = "timeout_secs")]
    pub timeout_secs: u64,
}

impl WebhookTarget {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_webhook_timeout() -> u64 {
    10
}

/// Writes the alert to the process log instead of sending it anywhere.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogTarget {}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> NotificationConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = parse(
            "default_target: ops\ntargets:\n  ops:\n    webhook:\n      url: http://hooks.example.com/alert\n  console:\n    log: {}\n",
        );
        config.validate().unwrap();

        let ops = config.target(&NotifyTarget::from("ops")).unwrap();
        assert_eq!(ops.webhook.as_ref().unwrap().timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_camel_case_keys() {
        let config = parse(
            "defaultTarget: ops\ntargets:\n  ops:\n    webhook:\n      url: http://hooks.example.com/alert\n      timeoutSecs: 3\n",
        );
        config.validate().unwrap();

        assert_eq!(config.default_target, NotifyTarget::from("ops"));
        let ops = config.target(&NotifyTarget::from("ops")).unwrap();
        assert_eq!(ops.webhook.as_ref().unwrap().timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_requires_targets() {
        let config = parse("default_target: ops\n");
        assert!(config.validate().unwrap_err().to_string().contains("targets required"));
    }

    #[test]
    fn test_default_target_must_exist() {
        let config = parse("default_target: ops\ntargets:\n  console:\n    log: {}\n");
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("defaultTarget ops"));
    }

    #[test]
    fn test_target_needs_transport() {
        let config = parse("default_target: ops\ntargets:\n  ops:\n    name: Operations\n");
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("no target type specified ops"));
    }
}
