// src/notification/error.rs
use super::NotifyTarget;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification target {0} not found")]
    UnknownTarget(NotifyTarget),

    #[error("notification target {0} has no transport configured")]
    NoTransport(NotifyTarget),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("webhook delivery to {target} failed: {source}")]
    Webhook {
        target: NotifyTarget,
        #[source]
        source: reqwest::Error,
    },

    #[error("webhook {target} answered with status {status}")]
    WebhookStatus { target: NotifyTarget, status: u16 },

    #[error("{failed} of {total} notification deliveries failed")]
    Incomplete { failed: usize, total: usize },
}
