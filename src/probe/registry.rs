// src/probe/registry.rs
use super::{HttpProbe, Probe, ProbeError, TcpProbe};
use crate::check::{CheckDefinition, CheckError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Factory building a probe bound to the check it runs for.
pub type ProbeConstructor =
    Arc<dyn Fn(&CheckDefinition) -> Result<Box<dyn Probe>, ProbeError> + Send + Sync>;

/// Maps check type names to probe constructors.
///
/// Filled during startup and shared read-only (behind an `Arc`) afterwards.
#[derive(Clone, Default)]
pub struct ProbeRegistry {
    constructors: HashMap<String, ProbeConstructor>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `type_name` with `constructor`. A second registration for
    /// the same name replaces the first.
    pub fn register<F>(&mut self, type_name: impl Into<String>, constructor: F)
    where
        F: Fn(&CheckDefinition) -> Result<Box<dyn Probe>, ProbeError> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        if self
            .constructors
            .insert(type_name.clone(), Arc::new(constructor))
            .is_some()
        {
            tracing::debug!(check_type = %type_name, "probe constructor replaced");
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Build the probe for `check` and fill in its defaults.
    pub fn resolve(
        &self,
        type_name: &str,
        check: &CheckDefinition,
    ) -> Result<Box<dyn Probe>, CheckError> {
        let constructor = self
            .constructors
            .get(type_name)
            .ok_or_else(|| CheckError::UnknownCheckType(type_name.to_string()))?;

        let mut probe = constructor(check)?;
        probe.apply_defaults(check);
        Ok(probe)
    }
}

impl fmt::Debug for ProbeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeRegistry")
            .field("types", &self.types())
            .finish()
    }
}

/// Registry with the probes shipped in this crate (`http`, `tcp`).
pub fn builtin_registry() -> ProbeRegistry {
    let mut registry = ProbeRegistry::new();
    registry.register("http", |check: &CheckDefinition| {
        Ok(Box::new(HttpProbe::from_check(check)?) as Box<dyn Probe>)
    });
    registry.register("tcp", |check: &CheckDefinition| {
        Ok(Box::new(TcpProbe::from_check(check)?) as Box<dyn Probe>)
    });
    registry
}
