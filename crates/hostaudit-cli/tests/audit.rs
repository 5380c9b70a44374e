//! End-to-end runs of the binary against real probes.
//!
//! Rules only use the `auditpol` module, which cannot run on the test hosts, so every
//! evaluated rule is a probe failure: blacklist rules pass, whitelist rules fail.

use assert_cmd::Command;
use hostaudit_test_util::normalize_nondeterministic;
use predicates::str::contains;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn hostaudit_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hostaudit").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

const BLACKLIST_RULES: &str = r#"
auditpol:
  blacklist:
    crash_on_fail:
      data:
        'Microsoft Windows Server 2016*':
          - CrashOnAuditFail: CIS-2.3.2.2
        '*':
          - CrashOnAuditFail: CIS-2.3.2.2-generic
      description: Shut down system if unable to log security audits
      value_type: binary
"#;

const WHITELIST_RULES: &str = r#"
auditpol:
  whitelist:
    logon:
      data:
        '*':
          - Audit Logon: CIS-17.5.1
          - Audit Special Logon:
              tag: CIS-17.5.2
              control: Collected by SIEM
      description: Logon events
      value_type: multi
      match_output: Success
"#;

fn write(dir: &TempDir, name: &str, text: &str) {
    std::fs::write(dir.path().join(name), text).expect("write file");
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).expect("read report");
    serde_json::from_str(&text).expect("report json")
}

#[cfg(not(windows))]
#[test]
fn blacklist_only_passes_and_matches_golden_report() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "rules.yaml", BLACKLIST_RULES);

    hostaudit_cmd(&dir)
        .args([
            "audit",
            "--rules",
            "rules.yaml",
            "--host-identity",
            "Microsoft Windows Server 2016 Datacenter",
            "--report-out",
            "out/report.json",
        ])
        .assert()
        .code(0);

    let report = normalize_nondeterministic(read_json(&dir.path().join("out/report.json")));
    assert_eq!(
        report,
        json!({
            "schema": "hostaudit.report.v1",
            "tool": {"name": "hostaudit", "version": "__VERSION__"},
            "started_at": "__TIMESTAMP__",
            "finished_at": "__TIMESTAMP__",
            "host": {"identity": "Microsoft Windows Server 2016 Datacenter"},
            "tags": "*",
            "verbose": false,
            "verdict": "pass",
            "results": {
                "Success": [
                    {"CIS-2.3.2.2": "Shut down system if unable to log security audits"}
                ],
                "Failure": []
            },
            "data": {"rules_resolved": 1, "rules_evaluated": 1, "probe_failures": 1}
        })
    );
}

#[cfg(not(windows))]
#[test]
fn whitelist_failure_exits_2_and_writes_markdown() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "rules.yaml", WHITELIST_RULES);

    hostaudit_cmd(&dir)
        .args([
            "audit",
            "--rules",
            "rules.yaml",
            "--host-identity",
            "Ubuntu-20.04",
            "--report-out",
            "report.json",
            "--write-markdown",
            "--markdown-out",
            "report.md",
        ])
        .assert()
        .code(2);

    let report = read_json(&dir.path().join("report.json"));
    assert_eq!(report["verdict"], "fail");
    assert_eq!(report["results"]["Failure"], json!([{"CIS-17.5.1": "Logon events"}]));
    assert_eq!(
        report["results"]["Controlled"],
        json!([{"CIS-17.5.2": {"description": "Logon events", "control": "Collected by SIEM"}}])
    );

    let md = std::fs::read_to_string(dir.path().join("report.md")).expect("read markdown");
    assert!(md.contains("Verdict: **FAIL**"));
    assert!(md.contains("## Controlled (1)"));
}

#[cfg(not(windows))]
#[test]
fn verbose_records_carry_probe_errors() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "rules.yaml", WHITELIST_RULES);

    hostaudit_cmd(&dir)
        .args([
            "audit",
            "--rules",
            "rules.yaml",
            "--host-identity",
            "Ubuntu-20.04",
            "--verbose",
            "--report-out",
            "report.json",
        ])
        .assert()
        .code(2);

    let report = read_json(&dir.path().join("report.json"));
    let failure = &report["results"]["Failure"][0];
    assert_eq!(failure["name"], "Audit Logon");
    assert_eq!(failure["module"], "auditpol");
    assert_eq!(failure["type"], "whitelist");
    assert!(failure["probe_error"].as_str().is_some_and(|e| e.contains("auditpol")));
    assert_eq!(report["results"]["Controlled"][0]["control"], "Collected by SIEM");
}

#[test]
fn tag_filter_and_config_file_apply() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "rules.yaml", WHITELIST_RULES);
    write(
        &dir,
        "hostaudit.toml",
        "host_identity = \"Ubuntu-20.04\"\nrules = [\"rules.yaml\"]\ntags = \"CIS-17.5.2\"\n",
    );

    hostaudit_cmd(&dir)
        .args(["audit", "--report-out", "report.json"])
        .assert()
        .code(0);

    let report = read_json(&dir.path().join("report.json"));
    assert_eq!(report["tags"], "CIS-17.5.2");
    assert_eq!(report["results"]["Failure"], json!([]));
    assert_eq!(report["results"]["Controlled"][0]["CIS-17.5.2"]["control"], "Collected by SIEM");
}

#[test]
fn disabled_module_is_skipped() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "rules.yaml", WHITELIST_RULES);
    write(&dir, "custom.toml", "[modules.auditpol]\nenabled = false\n");

    hostaudit_cmd(&dir)
        .args([
            "--config",
            "custom.toml",
            "audit",
            "--rules",
            "rules.yaml",
            "--host-identity",
            "Ubuntu-20.04",
            "--report-out",
            "report.json",
        ])
        .assert()
        .code(0);

    let report = read_json(&dir.path().join("report.json"));
    assert_eq!(report["data"]["rules_resolved"], 0);
    assert!(report["results"].get("Controlled").is_none());
}

#[test]
fn runtime_error_writes_failing_report_and_exits_1() {
    let dir = TempDir::new().expect("temp dir");

    hostaudit_cmd(&dir)
        .args([
            "audit",
            "--rules",
            "missing.yaml",
            "--host-identity",
            "Ubuntu-20.04",
            "--report-out",
            "report.json",
        ])
        .assert()
        .code(1)
        .stderr(contains("hostaudit error"))
        .stderr(contains("missing.yaml"));

    let report = read_json(&dir.path().join("report.json"));
    assert_eq!(report["verdict"], "fail");
    let failure = report["results"]["Failure"][0]["hostaudit.runtime_error"]
        .as_str()
        .expect("runtime error entry");
    assert!(failure.contains("missing.yaml"));
}

#[test]
fn malformed_rules_exit_1() {
    let dir = TempDir::new().expect("temp dir");
    write(
        &dir,
        "rules.yaml",
        "auditpol:\n  whitelist:\n    g:\n      data:\n        '*':\n          - Audit Logon: T\n      value_type: sideways\n",
    );

    hostaudit_cmd(&dir)
        .args([
            "audit",
            "--rules",
            "rules.yaml",
            "--host-identity",
            "Ubuntu-20.04",
            "--report-out",
            "report.json",
        ])
        .assert()
        .code(1)
        .stderr(contains("unknown value_type 'sideways'"));
}

#[cfg(not(windows))]
#[test]
fn md_renders_existing_report() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "rules.yaml", BLACKLIST_RULES);

    hostaudit_cmd(&dir)
        .args([
            "audit",
            "--rules",
            "rules.yaml",
            "--host-identity",
            "Ubuntu-20.04",
            "--report-out",
            "report.json",
        ])
        .assert()
        .code(0);

    hostaudit_cmd(&dir)
        .args(["md", "--report", "report.json"])
        .assert()
        .success()
        .stdout(contains("# Hostaudit report"))
        .stdout(contains("Host: `Ubuntu-20.04`"))
        .stdout(contains("CIS-2.3.2.2-generic"));

    hostaudit_cmd(&dir)
        .args(["md", "--report", "report.json", "-o", "out/report.md"])
        .assert()
        .success();
    assert!(dir.path().join("out/report.md").exists());
}

#[test]
fn tags_lists_resolved_tags() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "rules.yaml", BLACKLIST_RULES);
    write(&dir, "more.yaml", WHITELIST_RULES);

    hostaudit_cmd(&dir)
        .args([
            "tags",
            "--rules",
            "rules.yaml",
            "more.yaml",
            "--host-identity",
            "Microsoft Windows Server 2016 Standard",
        ])
        .assert()
        .success()
        .stdout(contains("# host: Microsoft Windows Server 2016 Standard"))
        .stdout(contains("CIS-2.3.2.2\t1\tauditpol\tblacklist"))
        .stdout(contains("CIS-17.5.2\t1\tauditpol\twhitelist"));
}
