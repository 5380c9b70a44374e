use hostaudit_domain::ProbeError;
use hostaudit_domain::model::SystemValue;
use hostaudit_domain::probe::Probe;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Bounds every call of the wrapped probe.
///
/// A call that outlives the deadline reports [`ProbeError::Timeout`]; its worker thread is
/// detached and its late answer dropped.
#[derive(Debug)]
pub struct TimeoutProbe<P> {
    inner: Arc<P>,
    timeout: Duration,
}

impl<P: Probe + 'static> TimeoutProbe<P> {
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }
}

impl<P: Probe + 'static> Probe for TimeoutProbe<P> {
    fn system_value(&self, name: &str) -> Result<SystemValue, ProbeError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let owned = name.to_string();
        thread::spawn(move || {
            let _ = tx.send(inner.system_value(&owned));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::debug!(name, timeout = ?self.timeout, "probe call timed out");
                Err(ProbeError::Timeout(self.timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ProbeError::Command {
                command: format!("probe {name}"),
                reason: "probe worker panicked".to_string(),
            }),
        }
    }
}
