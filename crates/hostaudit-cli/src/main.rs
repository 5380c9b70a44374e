//! CLI entry point for hostaudit.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `hostaudit-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use hostaudit_app::{
    AuditInput, ProbeSource, TagsInput, format_tags, parse_report_json, render_markdown,
    run_audit, run_tags, runtime_error_report, serialize_report, verdict_exit_code,
};
use hostaudit_settings::Overrides;
use hostaudit_types::AuditReport;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "hostaudit",
    version,
    about = "Audit a host against declarative compliance rules"
)]
struct Cli {
    /// Path to hostaudit config TOML (missing file = defaults).
    #[arg(long, default_value = "hostaudit.toml", global = true)]
    config: Utf8PathBuf,

    /// Debug logging on stderr (RUST_LOG takes precedence).
    #[arg(short = 'v', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate rules against this host and write the report.
    Audit {
        /// Rule files (YAML), merged in the given order.
        #[arg(long, num_args = 1..)]
        rules: Vec<String>,

        /// Only evaluate tags matching this glob.
        #[arg(long)]
        tags: Option<String>,

        /// Emit full rule records instead of tag summaries.
        #[arg(long)]
        verbose: bool,

        /// Host identity to select OS variants with (skips detection).
        #[arg(long)]
        host_identity: Option<String>,

        /// Per-probe timeout in milliseconds.
        #[arg(long)]
        probe_timeout_ms: Option<u64>,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/hostaudit/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/hostaudit/report.md")]
        markdown_out: Utf8PathBuf,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/hostaudit/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// List the tags this host would be audited against.
    Tags {
        /// Rule files (YAML), merged in the given order.
        #[arg(long, num_args = 1..)]
        rules: Vec<String>,

        /// Only list tags matching this glob.
        #[arg(long)]
        tags: Option<String>,

        /// Host identity to select OS variants with (skips detection).
        #[arg(long)]
        host_identity: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config_text = read_config(&cli.config)?;

    match cli.cmd {
        Commands::Audit {
            rules,
            tags,
            verbose,
            host_identity,
            probe_timeout_ms,
            report_out,
            write_markdown,
            markdown_out,
        } => {
            let overrides = Overrides {
                tags,
                verbose: verbose.then_some(true),
                host_identity,
                probe_timeout_ms,
                rules,
            };
            let markdown_out = write_markdown.then_some(markdown_out.as_path());
            cmd_audit(&config_text, overrides, &report_out, markdown_out)
        }
        Commands::Md { report, output } => cmd_md(&report, output.as_deref()),
        Commands::Tags {
            rules,
            tags,
            host_identity,
        } => {
            let overrides = Overrides {
                tags,
                host_identity,
                rules,
                ..Overrides::default()
            };
            cmd_tags(&config_text, overrides)
        }
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Missing config file is allowed (defaults apply); any other read error is not.
fn read_config(path: &Utf8Path) -> anyhow::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path, "no config file; using defaults");
            Ok(String::new())
        }
        Err(err) => Err(err).with_context(|| format!("read config: {path}")),
    }
}

fn cmd_audit(
    config_text: &str,
    overrides: Overrides,
    report_out: &Utf8Path,
    markdown_out: Option<&Utf8Path>,
) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        let output = run_audit(AuditInput {
            config_text,
            overrides,
            probes: ProbeSource::Host,
        })?;

        write_report_file(report_out, &output.report).context("write report json")?;
        if let Some(markdown_out) = markdown_out {
            let md = render_markdown(&output.report);
            write_text_file(markdown_out, &md).context("write markdown")?;
        }

        Ok(verdict_exit_code(output.report.verdict))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            let report = runtime_error_report(&format!("{err:#}"));
            let _ = write_report_file(report_out, &report);
            eprintln!("hostaudit error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;
    let md = render_markdown(&report);

    if let Some(out_path) = output {
        write_text_file(out_path, &md).context("write markdown output")?;
    } else {
        print!("{}", md);
    }

    Ok(())
}

fn cmd_tags(config_text: &str, overrides: Overrides) -> anyhow::Result<()> {
    let output = run_tags(TagsInput {
        config_text,
        overrides,
    })?;
    print!("{}", format_tags(&output));
    Ok(())
}

fn write_report_file(path: &Utf8Path, report: &AuditReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    let data = serialize_report(report).context("serialize report")?;
    std::fs::write(path, data).with_context(|| format!("write report: {}", path))?;
    Ok(())
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, text).with_context(|| format!("write text: {}", path))?;
    Ok(())
}
