use crate::command;
use hostaudit_domain::ProbeError;
use hostaudit_domain::model::SystemValue;
use hostaudit_domain::probe::Probe;
use std::sync::OnceLock;
use std::time::Duration;

const DPKG_INSTALLED: &str = "install ok installed";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackageManager {
    Dpkg,
    Rpm,
}

impl PackageManager {
    /// `dpkg-query` when it runs on this host, otherwise `rpm`.
    pub fn detect(timeout: Duration) -> Self {
        match command::run("dpkg-query", &["--version"], timeout) {
            Ok(out) if out.success() => PackageManager::Dpkg,
            _ => PackageManager::Rpm,
        }
    }
}

/// Whether a `dpkg-query -f '${Status}'` line describes an installed package.
pub fn dpkg_status_installed(status: &str) -> bool {
    status.contains(DPKG_INSTALLED)
}

/// Probe for the `pkg` module: rule names are package names, values are installed flags.
#[derive(Debug)]
pub struct PackageProbe {
    timeout: Duration,
    manager: OnceLock<PackageManager>,
}

impl PackageProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            manager: OnceLock::new(),
        }
    }

    pub fn with_manager(timeout: Duration, manager: PackageManager) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(manager);
        Self {
            timeout,
            manager: cell,
        }
    }

    fn manager(&self) -> PackageManager {
        *self
            .manager
            .get_or_init(|| PackageManager::detect(self.timeout))
    }
}

impl Probe for PackageProbe {
    fn system_value(&self, name: &str) -> Result<SystemValue, ProbeError> {
        let installed = match self.manager() {
            PackageManager::Dpkg => {
                let out = command::run("dpkg-query", &["-W", "-f=${Status}", name], self.timeout)?;
                out.success() && dpkg_status_installed(&out.stdout)
            }
            PackageManager::Rpm => command::run("rpm", &["-q", name], self.timeout)?.success(),
        };
        Ok(SystemValue::Bool(installed))
    }
}
