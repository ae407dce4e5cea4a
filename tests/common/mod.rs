// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use scrutzone::check::CheckDefinition;
use scrutzone::notification::{NotificationError, Notifier, NotifyTarget};
use scrutzone::probe::{Probe, ProbeError, ProbeRegistry};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Probe answering with the next verdict of its script at execution time.
#[derive(Debug)]
pub struct ScriptedProbe {
    script: Script,
}

#[async_trait]
impl Probe for ScriptedProbe {
    fn apply_defaults(&mut self, _check: &CheckDefinition) {}

    fn validate(&self) -> Result<(), ProbeError> {
        Ok(())
    }

    async fn execute(&self) -> Result<(), ProbeError> {
        if self.script.next_verdict() {
            Ok(())
        } else {
            Err(ProbeError::UnexpectedStatus {
                expected: 200,
                actual: 502,
            })
        }
    }
}

/// Verdicts handed out one per execution; healthy once drained.
///
/// Building a probe (as validation does) consumes nothing.
#[derive(Debug, Clone, Default)]
pub struct Script {
    verdicts: Arc<Mutex<VecDeque<bool>>>,
    constructed: Arc<AtomicUsize>,
    executed: Arc<AtomicUsize>,
}

impl Script {
    pub fn new(verdicts: &[bool]) -> Self {
        Self {
            verdicts: Arc::new(Mutex::new(verdicts.iter().copied().collect())),
            ..Self::default()
        }
    }

    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }

    fn next_verdict(&self) -> bool {
        self.executed.fetch_add(1, Ordering::SeqCst);
        self.verdicts.lock().unwrap().pop_front().unwrap_or(true)
    }

    /// Register this script as the `scripted` check type.
    pub fn register(&self, registry: &mut ProbeRegistry) {
        let script = self.clone();
        registry.register("scripted", move |_: &CheckDefinition| {
            script.constructed.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ScriptedProbe {
                script: script.clone(),
            }) as Box<dyn Probe>)
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub targets: Vec<NotifyTarget>,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        targets: &[NotifyTarget],
        subject: &str,
        body: &str,
    ) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(Sent {
            targets: targets.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
