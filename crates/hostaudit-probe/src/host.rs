//! Host identity detection: the string OS patterns in rule documents are matched against.

use crate::command;
use hostaudit_domain::ProbeError;
use std::time::Duration;

const OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];

/// `{first word of NAME}-{VERSION_ID}` from os-release content, e.g. `CentOS-7`.
///
/// `VERSION_ID` is optional (rolling distributions); `NAME` is not.
pub fn parse_os_release(text: &str) -> Option<String> {
    let mut name = None;
    let mut version = None;
    for line in text.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches(|c: char| c == '"' || c == '\'');
        match key.trim() {
            "NAME" => name = value.split_whitespace().next().map(str::to_string),
            "VERSION_ID" if !value.is_empty() => version = Some(value.to_string()),
            _ => {}
        }
    }

    let name = name?;
    Some(match version {
        Some(version) => format!("{name}-{version}"),
        None => name,
    })
}

/// Detect the identity of the running host.
pub fn detect_host_identity(timeout: Duration) -> Result<String, ProbeError> {
    let identity = if cfg!(windows) {
        windows_caption(timeout)?
    } else {
        linux_identity()?
    };
    tracing::debug!(identity = %identity, "detected host identity");
    Ok(identity)
}

fn linux_identity() -> Result<String, ProbeError> {
    for path in OS_RELEASE_PATHS {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                return parse_os_release(&text)
                    .ok_or_else(|| ProbeError::Parse(format!("{path} has no NAME")));
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(ProbeError::Parse("no os-release file found".to_string()))
}

fn windows_caption(timeout: Duration) -> Result<String, ProbeError> {
    let args = [
        "-NoProfile",
        "-Command",
        "(Get-CimInstance Win32_OperatingSystem).Caption",
    ];
    let out = command::run("powershell", &args, timeout)?;
    out.first_line()
        .filter(|_| out.success())
        .map(str::to_string)
        .ok_or_else(|| ProbeError::Command {
            command: command::display_command("powershell", &args),
            reason: format!("no OS caption ({}): {}", out.status, out.stderr.trim()),
        })
}
