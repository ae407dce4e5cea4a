// src/notification/gateway.rs
use super::{NotificationConfig, NotificationError, Notifier, NotifyTarget, WebhookTarget};
use crate::version;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

pub const DEFAULT_SUBJECT: &str = "scrutzone Notification";

/// Resolves target names against the `notification` section and sends
/// the alert through each target's transport.
pub struct NotificationGateway {
    config: NotificationConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    target: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl NotificationGateway {
    pub fn new(config: NotificationConfig) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .build()
            .map_err(NotificationError::Client)?;

        Ok(Self { config, client })
    }

    async fn deliver(
        &self,
        target: &NotifyTarget,
        subject: &str,
        text: &str,
    ) -> Result<(), NotificationError> {
        let config = self
            .config
            .target(target)
            .ok_or_else(|| NotificationError::UnknownTarget(target.clone()))?;

        if !config.has_transport() {
            return Err(NotificationError::NoTransport(target.clone()));
        }

        if config.log.is_some() {
            warn!(
                notify_target = %target,
                label = config.name.as_deref().unwrap_or_default(),
                %subject,
                %text,
                "alert"
            );
        }

        if let Some(webhook) = &config.webhook {
            self.post_webhook(target, webhook, subject, text).await?;
        }

        Ok(())
    }

    async fn post_webhook(
        &self,
        target: &NotifyTarget,
        webhook: &WebhookTarget,
        subject: &str,
        text: &str,
    ) -> Result<(), NotificationError> {
        let payload = WebhookPayload {
            target: target.as_str(),
            subject,
            text,
        };

        let response = self
            .client
            .post(webhook.url.clone())
            .timeout(webhook.timeout())
            .json(&payload)
            .send()
            .await
            .map_err(|source| NotificationError::Webhook {
                target: target.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::WebhookStatus {
                target: target.clone(),
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for NotificationGateway {
    async fn notify(
        &self,
        targets: &[NotifyTarget],
        subject: &str,
        body: &str,
    ) -> Result<(), NotificationError> {
        let fallback = [self.config.default_target.clone()];
        let targets = if targets.is_empty() { &fallback[..] } else { targets };
        let subject = if subject.is_empty() { DEFAULT_SUBJECT } else { subject };
        let text = format!("{}{}", body, version::footer());

        info!(?targets, %subject, "notifying");

        let results = futures::future::join_all(
            targets
                .iter()
                .map(|target| self.deliver(target, subject, &text)),
        )
        .await;

        let mut failed = 0;
        for error in results.into_iter().filter_map(Result::err) {
            warn!(%error, "notification delivery failed");
            failed += 1;
        }

        if failed > 0 {
            return Err(NotificationError::Incomplete {
                failed,
                total: targets.len(),
            });
        }

        Ok(())
    }
}
