// src/scheduler/mod.rs
mod dispatcher;

pub use dispatcher::Dispatcher;

use crate::check::{CheckDefinition, RunOutcome};
use crate::probe::ProbeRegistry;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Sending half of the queue shared by every ticker.
pub type RunQueue = mpsc::UnboundedSender<RunRequest>;

/// "Run this check once", as queued by a ticker.
#[derive(Clone)]
pub struct RunRequest {
    check: Arc<CheckDefinition>,
    registry: Arc<ProbeRegistry>,
}

impl RunRequest {
    pub fn new(check: Arc<CheckDefinition>, registry: Arc<ProbeRegistry>) -> Self {
        Self { check, registry }
    }

    pub fn check(&self) -> &Arc<CheckDefinition> {
        &self.check
    }

    pub async fn run(&self) -> RunOutcome {
        self.check.run(&self.registry).await
    }
}

impl fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunRequest")
            .field("check", &self.check.name)
            .finish()
    }
}

/// Owns one periodic ticker task per check.
pub struct Scheduler {
    registry: Arc<ProbeRegistry>,
    tickers: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(registry: Arc<ProbeRegistry>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            registry,
            tickers: Vec::new(),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Spawn the ticker for `check`. It queues a run right away and then
    /// once per `interval` until shutdown or until the queue is closed.
    pub fn start_ticking(&mut self, check: Arc<CheckDefinition>, queue: RunQueue) {
        let registry = self.registry.clone();
        let shutdown_rx = self.shutdown_rx.clone();

        self.tickers.push(tokio::spawn(tick_loop(
            check,
            registry,
            queue,
            shutdown_rx,
        )));
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for every ticker to exit. Call after `shutdown`.
    pub async fn join(self) {
        for ticker in self.tickers {
            if let Err(e) = ticker.await {
                tracing::error!("Ticker task failed: {}", e);
            }
        }
    }
}

async fn tick_loop(
    check: Arc<CheckDefinition>,
    registry: Arc<ProbeRegistry>,
    queue: RunQueue,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let period = check.interval();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(check = %check.name, "Starting ticker with interval: {:?}", period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let request = RunRequest::new(check.clone(), registry.clone());
                if queue.send(request).is_err() {
                    debug!(check = %check.name, "run queue closed, ticker stopping");
                    break;
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    debug!(check = %check.name, "ticker shutting down");
                    break;
                }
            }
        }
    }
}
