// src/check/mod.rs
mod definition;
mod error;
mod state;

pub use definition::{CheckDefinition, RunOutcome};
pub use error::{CheckError, ValidationError};
pub use state::{
    decide, AlertKind, HealthState, NotifyAction, NotifyPolicy, StatePair, FAILURE_SUBJECT,
    RECOVERY_SUBJECT,
};
