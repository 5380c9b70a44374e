//! Developer tasks (schema generation, golden report checks).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use hostaudit_test_util::normalize_nondeterministic;
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(manifest_dir)
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

fn fixtures_dir() -> PathBuf {
    project_root().join("tests").join("fixtures")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(hostaudit_types::AuditReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(hostaudit_settings::HostauditConfigV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "hostaudit.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "hostaudit.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {}", name);
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {}", name);
        }
    }
    eprintln!("\nRun `cargo run -p xtask -- emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn hostaudit_bin() -> anyhow::Result<PathBuf> {
    let bin = project_root().join("target").join("debug").join("hostaudit");
    #[cfg(target_os = "windows")]
    let bin = bin.with_extension("exe");

    if !bin.exists() {
        bail!(
            "hostaudit binary not found at {}.\nRun `cargo build -p hostaudit-cli` first.",
            bin.display()
        );
    }
    Ok(bin)
}

/// Run the binary inside one fixture directory and return the normalized report.
///
/// Each fixture carries `rules.yaml` and a `hostaudit.toml` that pins the host identity.
fn run_fixture(bin: &Path, fixture_dir: &Path) -> anyhow::Result<serde_json::Value> {
    let temp_dir = tempfile::tempdir().context("Failed to create temp dir")?;
    let report_out = temp_dir.path().join("report.json");

    let output = std::process::Command::new(bin)
        .current_dir(fixture_dir)
        .arg("audit")
        .arg("--report-out")
        .arg(&report_out)
        .output()
        .context("Failed to run hostaudit")?;

    // 0 = pass, 2 = fail; anything else is a tool error.
    if !matches!(output.status.code(), Some(0 | 2)) {
        bail!(
            "hostaudit exited with {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let text = fs::read_to_string(&report_out).context("Failed to read report output")?;
    let value: serde_json::Value = serde_json::from_str(&text).context("Failed to parse report")?;
    Ok(normalize_nondeterministic(value))
}

fn fixture_dirs() -> anyhow::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(fixtures_dir()).context("Failed to read tests/fixtures/")? {
        let path = entry?.path();
        if path.is_dir() && path.join("rules.yaml").exists() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn fixture_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare every fixture's report against `expected.report.json`, or rewrite it with `bless`.
fn golden(bless: bool) -> anyhow::Result<()> {
    let bin = hostaudit_bin()?;
    let mut errors = Vec::new();

    for dir in fixture_dirs()? {
        let name = fixture_name(&dir);
        let actual = match run_fixture(&bin, &dir) {
            Ok(actual) => actual,
            Err(err) => {
                errors.push(format!("fixture '{name}': {err:#}"));
                continue;
            }
        };
        let golden_path = dir.join("expected.report.json");

        if bless {
            let mut json = serde_json::to_string_pretty(&actual)?;
            json.push('\n');
            fs::write(&golden_path, json)
                .with_context(|| format!("Failed to write {}", golden_path.display()))?;
            println!("  blessed fixture '{name}'");
            continue;
        }

        let expected: serde_json::Value = match fs::read_to_string(&golden_path) {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse {}", golden_path.display()))?,
            Err(_) => {
                errors.push(format!("fixture '{name}': missing expected.report.json"));
                continue;
            }
        };
        if actual == expected {
            println!("  ok fixture '{name}'");
        } else {
            errors.push(format!(
                "fixture '{name}': output differs from expected.report.json"
            ));
        }
    }

    if !errors.is_empty() {
        eprintln!("\nGolden report errors:");
        for err in &errors {
            eprintln!("  - {}", err);
        }
        bail!("Golden report check failed with {} errors", errors.len());
    }
    Ok(())
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  golden            Compare fixture reports with tests/fixtures/*/expected.report.json");
    eprintln!("  bless             Rewrite the expected fixture reports from current output");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "golden" => golden(false),
        "bless" => golden(true),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo run -p xtask -- help` for usage."),
    }
    .context("xtask failed")
}
