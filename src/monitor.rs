// src/monitor.rs
use crate::check::{CheckDefinition, ValidationError};
use crate::config::CheckDefaults;
use crate::metrics::MetricsCollector;
use crate::notification::{Notifier, NotifyTarget};
use crate::probe::ProbeRegistry;
use crate::scheduler::{Dispatcher, Scheduler};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub const STARTUP_SUBJECT: &str = "scrutzone Startup";

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("duplicate check name {0}")]
    DuplicateCheck(String),

    #[error("{} invalid check(s): {}", .0.len(), join(.0))]
    InvalidChecks(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated set of checks, ready to be scheduled.
pub struct Monitor {
    registry: Arc<ProbeRegistry>,
    checks: Vec<Arc<CheckDefinition>>,
    notifier: Arc<dyn Notifier>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Monitor {
    /// Apply `defaults` to every check and validate all of them. Any
    /// invalid check rejects the whole set, listing every problem found.
    pub fn new(
        registry: ProbeRegistry,
        mut checks: Vec<CheckDefinition>,
        defaults: &CheckDefaults,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, MonitorError> {
        let mut names = HashSet::new();
        for check in &checks {
            if !names.insert(check.name.clone()) {
                return Err(MonitorError::DuplicateCheck(check.name.clone()));
            }
        }

        for check in &mut checks {
            check.set_defaults(defaults);
        }

        let invalid: Vec<ValidationError> = checks
            .iter()
            .filter_map(|check| check.validate(&registry).err())
            .collect();
        if !invalid.is_empty() {
            return Err(MonitorError::InvalidChecks(invalid));
        }

        Ok(Self {
            registry: Arc::new(registry),
            checks: checks.into_iter().map(Arc::new).collect(),
            notifier,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn checks(&self) -> &[Arc<CheckDefinition>] {
        &self.checks
    }

    /// Check names, sorted.
    pub fn check_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.checks.iter().map(|c| c.name.clone()).collect();
        names.sort();
        names
    }

    /// Start one ticker per check and the dispatcher draining their queue.
    pub fn start(self) -> RunningMonitor {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let check_names = self.check_names();

        let mut scheduler = Scheduler::new(self.registry.clone());
        for check in &self.checks {
            scheduler.start_ticking(check.clone(), queue_tx.clone());
        }
        drop(queue_tx);

        let mut dispatcher = Dispatcher::new(self.notifier.clone());
        if let Some(metrics) = &self.metrics {
            metrics.set_checks_configured(self.checks.len());
            dispatcher = dispatcher.with_metrics(metrics.clone());
        }
        let dispatcher = tokio::spawn(Arc::new(dispatcher).run(queue_rx));

        info!("Scheduled {} checks", scheduler.len());

        RunningMonitor {
            scheduler,
            dispatcher,
            notifier: self.notifier,
            check_names,
        }
    }
}

pub struct RunningMonitor {
    scheduler: Scheduler,
    dispatcher: JoinHandle<()>,
    notifier: Arc<dyn Notifier>,
    check_names: Vec<String>,
}

impl RunningMonitor {
    /// Tell `targets` which checks are running. Delivery errors are logged.
    pub async fn announce_startup(&self, targets: &[NotifyTarget]) {
        let message = startup_message(&self.check_names);
        if let Err(e) = self.notifier.notify(targets, STARTUP_SUBJECT, &message).await {
            error!(error = %e, "Failed to send startup notification");
        }
    }

    /// Stop all tickers and wait for the runs already queued to finish.
    pub async fn shutdown(self) {
        info!("Stopping monitor");
        self.scheduler.shutdown();
        self.scheduler.join().await;

        if let Err(e) = self.dispatcher.await {
            error!("Dispatcher task failed: {}", e);
        }
    }
}

pub fn startup_message(check_names: &[String]) -> String {
    let mut message = String::from("scrutzone started\n\nConfigured checks:\n");
    for name in check_names {
        message.push_str("  ");
        message.push_str(name);
        message.push('\n');
    }
    message
}
