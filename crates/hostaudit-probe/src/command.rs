//! Bounded execution of external commands.

use hostaudit_domain::ProbeError;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone, Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn first_line(&self) -> Option<&str> {
        self.stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
    }
}

/// Run `program` with `args`, killing it once `timeout` elapses.
///
/// A non-zero exit status is not an error here; callers decide what it means.
pub fn run(program: &str, args: &[&str], timeout: Duration) -> Result<CommandOutput, ProbeError> {
    let shown = display_command(program, args);
    tracing::debug!(command = %shown, "running probe command");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ProbeError::Command {
            command: shown.clone(),
            reason: e.to_string(),
        })?;

    // Drain both pipes concurrently so a chatty child cannot block on a full buffer.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait_with_deadline(&mut child, timeout, &shown)?;

    Ok(CommandOutput {
        status,
        stdout: join_drain(stdout),
        stderr: join_drain(stderr),
    })
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
    shown: &str,
) -> Result<ExitStatus, ProbeError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            if let Err(err) = child.kill() {
                tracing::warn!(command = %shown, error = %err, "failed to kill timed out command");
            }
            let _ = child.wait();
            tracing::debug!(command = %shown, ?timeout, "probe command timed out");
            return Err(ProbeError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join_drain(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

pub(crate) fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_status() {
        let out = run("sh", &["-c", "echo enabled; exit 3"], Duration::from_secs(5))
            .expect("run sh");
        assert_eq!(out.first_line(), Some("enabled"));
        assert_eq!(out.status.code(), Some(3));
        assert!(!out.success());
    }

    #[test]
    fn kills_commands_past_the_deadline() {
        let started = Instant::now();
        let err = run("sh", &["-c", "sleep 5"], Duration::from_millis(100))
            .expect_err("should time out");
        assert!(matches!(err, ProbeError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn missing_program_is_a_command_error() {
        let err = run("hostaudit-no-such-binary", &["--flag", "x"], Duration::from_secs(1))
            .expect_err("spawn should fail");
        match err {
            ProbeError::Command { command, .. } => {
                assert_eq!(command, "hostaudit-no-such-binary --flag x");
            }
            other => panic!("expected a command error, got {other:?}"),
        }
    }
}
