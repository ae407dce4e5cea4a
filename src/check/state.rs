// src/check/state.rs
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthState {
    #[default]
    Ok,
    Failed,
}

impl HealthState {
    pub fn is_ok(&self) -> bool {
        *self == HealthState::Ok
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Ok => f.write_str("ok"),
            HealthState::Failed => f.write_str("failed"),
        }
    }
}

/// The state pair owned by one check. `previous` is seeded to `Ok` so that
/// a fresh process only alerts on an actual change away from healthy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatePair {
    pub previous: HealthState,
    pub current: HealthState,
}

impl StatePair {
    pub fn transitioned(&self) -> bool {
        self.previous != self.current
    }

    /// Roll the pair forward once the decision for this run has been taken.
    pub fn roll(&mut self) {
        self.previous = self.current;
    }
}

/// Predicate deciding whether a run is worth an alert, given whether the
/// health state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    #[default]
    OnStateChange,
    Always,
    Never,
}

impl NotifyPolicy {
    pub fn should_notify(&self, changed: bool) -> bool {
        match self {
            NotifyPolicy::OnStateChange => changed,
            NotifyPolicy::Always => true,
            NotifyPolicy::Never => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Failure,
    Recovery,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Failure => "failure",
            AlertKind::Recovery => "recovery",
        }
    }
}

/// Outcome of the state machine for one run. Pure data; the dispatcher
/// turns it into gateway calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyAction {
    None,
    Alert {
        kind: AlertKind,
        subject: String,
        body: String,
    },
    /// An alert for this state went out on an earlier run.
    LogOnly,
}

impl NotifyAction {
    pub fn is_none(&self) -> bool {
        matches!(self, NotifyAction::None)
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, NotifyAction::Alert { .. })
    }
}

pub const FAILURE_SUBJECT: &str = "scrutzone Check Failure";
pub const RECOVERY_SUBJECT: &str = "scrutzone Check OK";

/// Classify one run of `check`.
///
/// | previous | current | action (on_state_change) |
/// |----------|---------|--------------------------|
/// | Ok       | Ok      | none                     |
/// | Ok       | Failed  | failure alert            |
/// | Failed   | Failed  | log only                 |
/// | Failed   | Ok      | recovery alert           |
///
/// `cause` is only read for failed runs.
pub fn decide(
    check: &str,
    pair: StatePair,
    cause: Option<&str>,
    policy: NotifyPolicy,
) -> NotifyAction {
    let notify = policy.should_notify(pair.transitioned());

    match pair.current {
        HealthState::Failed if notify => NotifyAction::Alert {
            kind: AlertKind::Failure,
            subject: format!("{}: {}", FAILURE_SUBJECT, check),
            body: format!("{}: {}", check, cause.unwrap_or("unknown failure")),
        },
        // only when the policy would have alerted on entering this failure
        HealthState::Failed if !pair.transitioned() && policy.should_notify(true) => {
            NotifyAction::LogOnly
        }
        HealthState::Ok if notify => NotifyAction::Alert {
            kind: AlertKind::Recovery,
            subject: format!("{}: {}", RECOVERY_SUBJECT, check),
            body: format!("{}: Check OK", check),
        },
        _ => NotifyAction::None,
    }
}
