//! Windows advanced audit policy, read from an `auditpol /backup` dump.

use crate::command;
use hostaudit_domain::ProbeError;
use hostaudit_domain::model::SystemValue;
use hostaudit_domain::probe::Probe;
use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

const SUBCATEGORY_COLUMN: usize = 2;
const SETTING_VALUE_COLUMN: usize = 6;
const GLOBAL_SACL_MARKER: &str = "RegistryGlobalSacl";

/// One parsed `auditpol /backup` CSV row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditpolRow {
    pub subcategory: String,
    pub setting_value: String,
}

/// Parse the backup CSV. Rows too short to carry a setting value are skipped.
pub fn parse_backup<R: Read>(reader: R) -> Result<Vec<AuditpolRow>, ProbeError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record.map_err(|e| ProbeError::Parse(format!("auditpol backup: {e}")))?;
        let (Some(subcategory), Some(setting_value)) = (
            record.get(SUBCATEGORY_COLUMN),
            record.get(SETTING_VALUE_COLUMN),
        ) else {
            continue;
        };
        rows.push(AuditpolRow {
            subcategory: subcategory.to_string(),
            setting_value: setting_value.to_string(),
        });
    }
    Ok(rows)
}

/// Value of the last row whose subcategory mentions `option`.
///
/// Global SACL rows share subcategory names with the per-category settings and are ignored.
pub fn find_setting<'a>(rows: &'a [AuditpolRow], option: &str) -> Option<&'a str> {
    rows.iter()
        .filter(|row| {
            row.subcategory.contains(option) && !row.subcategory.contains(GLOBAL_SACL_MARKER)
        })
        .map(|row| row.setting_value.as_str())
        .last()
}

/// Probe for the `auditpol` module.
///
/// The policy is dumped on first use and the dump is reused for every later lookup
/// through this instance.
#[derive(Debug)]
pub struct AuditpolProbe {
    timeout: Duration,
    dump: OnceLock<Result<Vec<AuditpolRow>, String>>,
}

impl AuditpolProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            dump: OnceLock::new(),
        }
    }

    /// A probe over an already captured dump. Never runs `auditpol`.
    pub fn from_rows(rows: Vec<AuditpolRow>) -> Self {
        let dump = OnceLock::new();
        let _ = dump.set(Ok(rows));
        Self {
            timeout: Duration::ZERO,
            dump,
        }
    }

    fn rows(&self) -> Result<&[AuditpolRow], ProbeError> {
        match self
            .dump
            .get_or_init(|| self.capture().map_err(|e| e.to_string()))
        {
            Ok(rows) => Ok(rows.as_slice()),
            Err(reason) => Err(ProbeError::Command {
                command: "auditpol /backup".to_string(),
                reason: reason.clone(),
            }),
        }
    }

    fn capture(&self) -> Result<Vec<AuditpolRow>, ProbeError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("auditpol-backup.csv");
        let file_arg = format!("/file:{}", path.display());

        let out = command::run("auditpol", &["/backup", &file_arg], self.timeout)?;
        if !out.success() {
            return Err(ProbeError::Command {
                command: command::display_command("auditpol", &["/backup", &file_arg]),
                reason: format!("exited with {}: {}", out.status, out.stderr.trim()),
            });
        }

        let file = std::fs::File::open(&path)?;
        let rows = parse_backup(file)?;
        tracing::debug!(rows = rows.len(), "captured auditpol backup");
        Ok(rows)
    }
}

impl Probe for AuditpolProbe {
    fn system_value(&self, name: &str) -> Result<SystemValue, ProbeError> {
        let rows = self.rows()?;
        Ok(find_setting(rows, name).into())
    }
}
