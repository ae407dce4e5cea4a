// src/check/definition.rs
use super::error::{CheckError, ValidationError};
use super::state::{decide, HealthState, NotifyAction, NotifyPolicy, StatePair};
use crate::config::CheckDefaults;
use crate::notification::NotifyTarget;
use crate::probe::{ProbeError, ProbeRegistry};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Configuration and health state of one monitored target.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckDefinition {
    /// Taken from the key the check was declared under.
    #[serde(skip)]
    pub name: String,

    #[serde(default)]
    pub address: String,

    /// Seconds between runs; 0 takes the global default.
    #[serde(default)]
    pub interval: i64,

    /// Seconds allowed for one probe execution; 0 takes the global default.
    #[serde(default)]
    pub timeout: i64,

    #[serde(rename = "type", default)]
    pub kind: String,

    /// Type-specific settings, decoded by the probe constructor.
    #[serde(default)]
    pub config: serde_yaml::Value,

    #[serde(default, alias = "notify_targets")]
    pub notify_targets: Option<Vec<NotifyTarget>>,

    #[serde(default, alias = "notify_policy")]
    pub notify_policy: NotifyPolicy,

    #[serde(skip)]
    state: Mutex<StatePair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The previous run of this check had not finished yet.
    Skipped,
    Completed {
        state: HealthState,
        action: NotifyAction,
    },
}

impl RunOutcome {
    pub fn action(&self) -> Option<&NotifyAction> {
        match self {
            RunOutcome::Skipped => None,
            RunOutcome::Completed { action, .. } => Some(action),
        }
    }
}

impl CheckDefinition {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: String::new(),
            interval: 0,
            timeout: 0,
            kind: kind.into(),
            config: serde_yaml::Value::Null,
            notify_targets: None,
            notify_policy: NotifyPolicy::default(),
            state: Mutex::new(StatePair::default()),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_interval(mut self, secs: i64) -> Self {
        self.interval = secs;
        self
    }

    pub fn with_timeout(mut self, secs: i64) -> Self {
        self.timeout = secs;
        self
    }

    pub fn with_config(mut self, config: serde_yaml::Value) -> Self {
        self.config = config;
        self
    }

    pub fn with_notify_targets(mut self, targets: Vec<NotifyTarget>) -> Self {
        self.notify_targets = Some(targets);
        self
    }

    pub fn with_notify_policy(mut self, policy: NotifyPolicy) -> Self {
        self.notify_policy = policy;
        self
    }

    /// Fill unset fields from the global defaults and seed the state pair.
    pub fn set_defaults(&mut self, defaults: &CheckDefaults) {
        if self.notify_targets.is_none() {
            self.notify_targets = Some(defaults.notify_targets.clone());
        }

        if self.timeout == 0 {
            self.timeout = defaults.timeout;
        }

        if self.interval == 0 {
            self.interval = defaults.interval;
        }

        *self.state.get_mut() = StatePair::default();
    }

    /// Collect every problem with this check instead of stopping at the first.
    pub fn validate(&self, registry: &ProbeRegistry) -> Result<(), ValidationError> {
        let mut problems = Vec::new();

        if self.interval <= 0 {
            problems.push(CheckError::InvalidInterval);
        }

        if self.timeout < 0 {
            problems.push(CheckError::NegativeTimeout);
        }

        if self.kind.is_empty() {
            problems.push(CheckError::MissingType);
        } else {
            match registry.resolve(&self.kind, self) {
                Ok(probe) => {
                    if let Err(e) = probe.validate() {
                        problems.push(e.into());
                    }
                }
                Err(e) => problems.push(e),
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                check: self.name.clone(),
                problems,
            })
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1) as u64)
    }

    /// Deadline for one probe execution, `None` when unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout as u64))
    }

    pub fn notify_targets(&self) -> &[NotifyTarget] {
        self.notify_targets.as_deref().unwrap_or_default()
    }

    pub async fn state(&self) -> StatePair {
        *self.state.lock().await
    }

    /// Run the probe once and classify the result.
    ///
    /// The state pair stays locked for the whole run, so a tick arriving
    /// while the previous run is still busy is skipped.
    pub async fn run(&self, registry: &ProbeRegistry) -> RunOutcome {
        let Ok(mut state) = self.state.try_lock() else {
            debug!(check = %self.name, "previous run still in progress, skipping");
            return RunOutcome::Skipped;
        };

        debug!(check = %self.name, "running check");

        let verdict = self.probe(registry).await;
        state.current = match verdict {
            Ok(()) => HealthState::Ok,
            Err(_) => HealthState::Failed,
        };
        let cause = verdict.err().map(|e| e.to_string());

        if state.transitioned() {
            match &cause {
                Some(cause) => warn!(check = %self.name, %cause, "check failed"),
                None => info!(check = %self.name, "check recovered"),
            }
        }

        let action = decide(&self.name, *state, cause.as_deref(), self.notify_policy);
        let current = state.current;
        state.roll();

        RunOutcome::Completed {
            state: current,
            action,
        }
    }

    async fn probe(&self, registry: &ProbeRegistry) -> Result<(), CheckError> {
        let probe = registry.resolve(&self.kind, self)?;
        probe.validate()?;

        match self.timeout() {
            Some(limit) => tokio::time::timeout(limit, probe.execute())
                .await
                .unwrap_or_else(|_| Err(ProbeError::Timeout(limit)))?,
            None => probe.execute().await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::AlertKind;
    use crate::probe::Probe;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Arc;

    type Verdicts = Arc<std::sync::Mutex<VecDeque<bool>>>;

    #[derive(Debug)]
    struct ScriptedProbe {
        script: Verdicts,
        delay: Duration,
    }

    #[async_trait]
    impl Probe for ScriptedProbe {
        fn apply_defaults(&mut self, _check: &CheckDefinition) {}

        fn validate(&self) -> Result<(), ProbeError> {
            Ok(())
        }

        async fn execute(&self) -> Result<(), ProbeError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let healthy = self.script.lock().unwrap().pop_front().unwrap_or(true);
            if healthy {
                Ok(())
            } else {
                Err(ProbeError::UnexpectedStatus {
                    expected: 200,
                    actual: 500,
                })
            }
        }
    }

    /// Registry whose `scripted` probes answer with the queued verdicts,
    /// one per execution, then stay healthy.
    fn scripted_registry(script: Vec<bool>, delay: Duration) -> ProbeRegistry {
        let script: Verdicts = Arc::new(std::sync::Mutex::new(VecDeque::from(script)));
        let mut registry = ProbeRegistry::new();
        registry.register("scripted", move |_: &CheckDefinition| {
            Ok(Box::new(ScriptedProbe {
                script: script.clone(),
                delay,
            }) as Box<dyn Probe>)
        });
        registry
    }

    fn ready_check(name: &str) -> CheckDefinition {
        let mut check = CheckDefinition::new(name, "scripted");
        check.set_defaults(&CheckDefaults::default());
        check
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let registry = scripted_registry(vec![], Duration::ZERO);
        let check = CheckDefinition::new("broken", "")
            .with_interval(0)
            .with_timeout(-1);

        let err = check.validate(&registry).unwrap_err();
        assert_eq!(err.check, "broken");
        assert_eq!(err.problems.len(), 3);
        assert!(matches!(err.problems[0], CheckError::InvalidInterval));
        assert!(matches!(err.problems[1], CheckError::NegativeTimeout));
        assert!(matches!(err.problems[2], CheckError::MissingType));

        let message = err.to_string();
        assert!(message.contains("interval"));
        assert!(message.contains("timeout"));
        assert!(message.contains("type is required"));
    }

    #[test]
    fn test_validate_unknown_type() {
        let registry = scripted_registry(vec![], Duration::ZERO);
        let mut check = CheckDefinition::new("db", "postgres");
        check.set_defaults(&CheckDefaults::default());

        let err = check.validate(&registry).unwrap_err();
        assert_eq!(err.problems.len(), 1);
        assert!(matches!(
            err.problems[0],
            CheckError::UnknownCheckType(ref t) if t == "postgres"
        ));
    }

    #[test]
    fn test_validate_includes_probe_problems() {
        let registry = crate::probe::builtin_registry();
        let mut check = CheckDefinition::new("web", "http")
            .with_address("example.com")
            .with_config(serde_yaml::from_str("scheme: gopher").unwrap());
        check.set_defaults(&CheckDefaults::default());

        let err = check.validate(&registry).unwrap_err();
        assert!(matches!(
            err.problems[0],
            CheckError::Probe(ProbeError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_set_defaults_fills_only_unset_fields() {
        let defaults = CheckDefaults {
            notify_targets: vec![NotifyTarget::from("ops")],
            interval: 30,
            timeout: 3,
        };

        let mut inherited = CheckDefinition::new("a", "tcp");
        inherited.set_defaults(&defaults);
        assert_eq!(inherited.interval, 30);
        assert_eq!(inherited.timeout, 3);
        assert_eq!(inherited.notify_targets(), &[NotifyTarget::from("ops")]);

        let mut explicit = CheckDefinition::new("b", "tcp")
            .with_interval(5)
            .with_timeout(1)
            .with_notify_targets(vec![]);
        explicit.set_defaults(&defaults);
        assert_eq!(explicit.interval, 5);
        assert_eq!(explicit.timeout, 1);
        assert!(explicit.notify_targets().is_empty());
    }

    #[tokio::test]
    async fn test_fail_fail_recover_sequence() {
        let registry = scripted_registry(vec![false, false, true], Duration::ZERO);
        let check = ready_check("api");

        let first = check.run(&registry).await;
        let second = check.run(&registry).await;
        let third = check.run(&registry).await;

        match first.action() {
            Some(NotifyAction::Alert { kind, body, .. }) => {
                assert_eq!(*kind, AlertKind::Failure);
                assert!(body.starts_with("api: "));
                assert!(body.contains("expected code 200, got 500"));
            }
            other => panic!("expected failure alert, got {:?}", other),
        }
        assert_eq!(second.action(), Some(&NotifyAction::LogOnly));
        assert!(matches!(
            third.action(),
            Some(NotifyAction::Alert { kind: AlertKind::Recovery, .. })
        ));

        let state = check.state().await;
        assert_eq!(state.previous, HealthState::Ok);
    }

    #[tokio::test]
    async fn test_validate_leaves_verdicts_for_runs() {
        let registry = scripted_registry(vec![false, false, true], Duration::ZERO);
        let check = ready_check("api");

        check.validate(&registry).unwrap();

        let first = check.run(&registry).await;
        let second = check.run(&registry).await;
        assert!(matches!(
            first.action(),
            Some(NotifyAction::Alert { kind: AlertKind::Failure, .. })
        ));
        assert_eq!(second.action(), Some(&NotifyAction::LogOnly));
    }

    #[tokio::test]
    async fn test_unresolvable_probe_fails_run() {
        let registry = ProbeRegistry::new();
        let check = ready_check("db");

        let outcome = check.run(&registry).await;
        match outcome {
            RunOutcome::Completed {
                state: HealthState::Failed,
                action: NotifyAction::Alert { body, .. },
            } => assert_eq!(body, "db: unknown check type scripted"),
            other => panic!("expected failed run, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_enforced() {
        let registry = scripted_registry(vec![true], Duration::from_secs(30));
        let check = ready_check("slow").with_timeout(2);

        let outcome = check.run(&registry).await;
        match outcome {
            RunOutcome::Completed {
                state: HealthState::Failed,
                action: NotifyAction::Alert { body, .. },
            } => assert!(body.contains("timed out")),
            other => panic!("expected timeout failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_run_is_skipped() {
        let registry = Arc::new(scripted_registry(vec![], Duration::from_secs(10)));
        let check = Arc::new(ready_check("busy").with_timeout(0));

        let first = {
            let registry = registry.clone();
            let check = check.clone();
            tokio::spawn(async move { check.run(&registry).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(check.run(&registry).await, RunOutcome::Skipped);

        let completed = first.await.unwrap();
        assert_eq!(
            completed,
            RunOutcome::Completed {
                state: HealthState::Ok,
                action: NotifyAction::None,
            }
        );
    }
}
