// src/notification/mod.rs
mod config;
mod error;
mod gateway;

pub use config::{LogTarget, NotificationConfig, TargetConfig, WebhookTarget};
pub use error::NotificationError;
pub use gateway::{NotificationGateway, DEFAULT_SUBJECT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a configured notification target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotifyTarget(String);

impl NotifyTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NotifyTarget {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for NotifyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivers alert text to notification targets.
///
/// An empty `targets` slice means "the default target".
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        targets: &[NotifyTarget],
        subject: &str,
        body: &str,
    ) -> Result<(), NotificationError>;
}
