//! Probe adapters: read host state for the domain's [`Probe`] seam.
//!
//! This crate spawns processes and reads files. Every external command is bounded by a
//! timeout and killed when it runs over.

#![forbid(unsafe_code)]

pub mod auditpol;
pub mod command;
mod host;
mod packages;
mod service;
mod timeout;

use hostaudit_domain::probe::{Probe, ProbeSet};
use hostaudit_types::ids;
use std::time::Duration;

pub use auditpol::{AuditpolProbe, AuditpolRow, find_setting, parse_backup};
pub use host::{detect_host_identity, parse_os_release};
pub use packages::{PackageManager, PackageProbe, dpkg_status_installed};
pub use service::ServiceProbe;
pub use timeout::TimeoutProbe;

/// Probes for every module this host can answer, limited to `enabled` namespaces.
///
/// Each call is bounded as a whole (lazy dump capture and backend detection included).
pub fn host_probes(timeout: Duration, enabled: impl Fn(&str) -> bool) -> ProbeSet {
    let mut probes = ProbeSet::new();
    register(&mut probes, ids::MODULE_AUDITPOL, &enabled, timeout, || {
        AuditpolProbe::new(timeout)
    });
    register(&mut probes, ids::MODULE_PKG, &enabled, timeout, || {
        PackageProbe::new(timeout)
    });
    register(&mut probes, ids::MODULE_SERVICE, &enabled, timeout, || {
        ServiceProbe::new(timeout)
    });
    probes
}

fn register<P: Probe + 'static>(
    probes: &mut ProbeSet,
    module: &str,
    enabled: &impl Fn(&str) -> bool,
    timeout: Duration,
    build: impl FnOnce() -> P,
) {
    if enabled(module) {
        probes.register(module, TimeoutProbe::new(build(), timeout));
    } else {
        tracing::debug!(module, "module disabled; no probe registered");
    }
}
