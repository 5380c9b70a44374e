use crate::command;
use hostaudit_domain::ProbeError;
use hostaudit_domain::model::SystemValue;
use hostaudit_domain::probe::Probe;
use std::time::Duration;

/// Probe for the `service` module: the unit's `systemctl is-enabled` state.
///
/// `is-enabled` exits non-zero for disabled units, so only stdout is consulted.
#[derive(Clone, Debug)]
pub struct ServiceProbe {
    timeout: Duration,
}

impl ServiceProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Probe for ServiceProbe {
    fn system_value(&self, name: &str) -> Result<SystemValue, ProbeError> {
        let out = command::run("systemctl", &["is-enabled", name], self.timeout)?;
        Ok(out.first_line().into())
    }
}
