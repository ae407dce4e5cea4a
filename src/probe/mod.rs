// src/probe/mod.rs
mod error;
mod http;
mod registry;
mod tcp;

pub use error::ProbeError;
pub use http::HttpProbe;
pub use registry::{builtin_registry, ProbeConstructor, ProbeRegistry};
pub use tcp::TcpProbe;

use crate::check::CheckDefinition;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;

/// Contract implemented by every check type.
///
/// A probe is built fresh for every run from the owning check's `config`
/// block; nothing it holds survives between runs.
#[async_trait]
pub trait Probe: Send + Sync + fmt::Debug {
    /// Fill fields left unset from the owning check. Must be idempotent.
    fn apply_defaults(&mut self, check: &CheckDefinition);

    /// Check probe-specific invariants without mutating anything.
    fn validate(&self) -> Result<(), ProbeError>;

    /// Perform the probe. An `Err` is a failed health verdict, not a fault
    /// of the caller.
    async fn execute(&self) -> Result<(), ProbeError>;
}

/// Decode a check's opaque `config` block. A missing block yields the
/// type's defaults.
pub fn decode_config<T>(config: &serde_yaml::Value) -> Result<T, ProbeError>
where
    T: DeserializeOwned + Default,
{
    if config.is_null() {
        return Ok(T::default());
    }
    Ok(serde_yaml::from_value(config.clone())?)
}
