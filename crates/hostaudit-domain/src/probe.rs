//! The host-state collaborator seam.

use crate::error::ProbeError;
use crate::model::{ResolvedRule, SystemValue};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Reads one system value by rule name.
///
/// Calls must be free of side effects from the engine's point of view: they may run
/// concurrently and in any order.
pub trait Probe: Send + Sync {
    fn system_value(&self, name: &str) -> Result<SystemValue, ProbeError>;
}

impl<P: Probe + ?Sized> Probe for Box<P> {
    fn system_value(&self, name: &str) -> Result<SystemValue, ProbeError> {
        (**self).system_value(name)
    }
}

impl<P: Probe + ?Sized> Probe for Arc<P> {
    fn system_value(&self, name: &str) -> Result<SystemValue, ProbeError> {
        (**self).system_value(name)
    }
}

/// Probes keyed by module namespace.
#[derive(Default)]
pub struct ProbeSet {
    probes: BTreeMap<String, Box<dyn Probe>>,
}

impl ProbeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, module: &str, probe: impl Probe + 'static) -> Self {
        self.register(module, probe);
        self
    }

    pub fn register(&mut self, module: &str, probe: impl Probe + 'static) {
        self.probes.insert(module.to_string(), Box::new(probe));
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.probes.keys().map(String::as_str)
    }

    pub fn probe(&self, rule: &ResolvedRule) -> Result<SystemValue, ProbeError> {
        match self.probes.get(&rule.module) {
            Some(probe) => probe.system_value(&rule.name),
            None => Err(ProbeError::Unsupported(rule.module.clone())),
        }
    }
}

impl fmt::Debug for ProbeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeSet")
            .field("modules", &self.probes.keys().collect::<Vec<_>>())
            .finish()
    }
}
