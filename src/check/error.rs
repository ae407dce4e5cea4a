// src/check/error.rs
use crate::probe::ProbeError;

/// A single problem with one check, found at load time or while running it.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("interval is required and must be greater than 0")]
    InvalidInterval,

    #[error("timeout is required and must be greater than or equal to 0")]
    NegativeTimeout,

    #[error("type is required")]
    MissingType,

    #[error("unknown check type {0}")]
    UnknownCheckType(String),

    #[error(transparent)]
    Probe(#[from] ProbeError),
}

/// Every problem found while validating one check.
#[derive(Debug, thiserror::Error)]
#[error("check {check}: {}", join(.problems))]
pub struct ValidationError {
    pub check: String,
    pub problems: Vec<CheckError>,
}

fn join(problems: &[CheckError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
