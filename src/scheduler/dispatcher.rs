// src/scheduler/dispatcher.rs
use super::RunRequest;
use crate::check::{CheckDefinition, NotifyAction, RunOutcome};
use crate::metrics::{MetricsCollector, Timer};
use crate::notification::Notifier;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info, Instrument};
use uuid::Uuid;

/// Drains the run queue, running every request on its own task and
/// handing the resulting alerts to the notifier.
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Runs until every sender of `queue` is gone, then waits for the
    /// runs still in flight.
    pub async fn run(self: Arc<Self>, mut queue: mpsc::UnboundedReceiver<RunRequest>) {
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                request = queue.recv() => match request {
                    Some(request) => {
                        let span = tracing::info_span!(
                            "check_run",
                            check = %request.check().name,
                            run_id = %Uuid::new_v4(),
                        );
                        let dispatcher = self.clone();
                        in_flight.spawn(async move { dispatcher.dispatch(request).await }.instrument(span));
                    }
                    None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!("Check run task failed: {}", e);
                    }
                }
            }
        }

        info!("Run queue closed, waiting for {} in-flight runs", in_flight.len());
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!("Check run task failed: {}", e);
            }
        }
    }

    /// Execute one run request and apply its notification decision.
    pub async fn dispatch(&self, request: RunRequest) -> RunOutcome {
        let check = request.check().clone();
        let timer = Timer::new();

        if let Some(metrics) = &self.metrics {
            metrics.run_started();
        }

        let outcome = request.run().await;

        if let Some(metrics) = &self.metrics {
            metrics.run_finished();
            match &outcome {
                RunOutcome::Skipped => metrics.record_skipped(&check.name),
                RunOutcome::Completed { state, .. } => {
                    metrics.record_run(&check.name, *state, timer.elapsed())
                }
            }
        }

        if let Some(action) = outcome.action() {
            self.apply(&check, action).await;
        }

        outcome
    }

    /// Turn a decision into gateway calls. Delivery failures are logged and
    /// dropped.
    pub async fn apply(&self, check: &CheckDefinition, action: &NotifyAction) {
        match action {
            NotifyAction::None => {}
            NotifyAction::LogOnly => {
                info!(check = %check.name, "Notification already sent for check");
            }
            NotifyAction::Alert {
                kind,
                subject,
                body,
            } => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_notification(&check.name, *kind);
                }

                if let Err(e) = self
                    .notifier
                    .notify(check.notify_targets(), subject, body)
                    .await
                {
                    error!(check = %check.name, error = %e, "Failed to deliver notification");
                    if let Some(metrics) = &self.metrics {
                        metrics.record_notification_failure();
                    }
                }
            }
        }
    }
}
