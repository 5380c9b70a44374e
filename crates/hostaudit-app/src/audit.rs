//! The `audit` use case: resolve rules for this host, probe, and produce a report.

use anyhow::Context;
use hostaudit_domain::probe::ProbeSet;
use hostaudit_settings::{EffectiveConfig, HostauditConfigV1, Overrides, ResolvedConfig};
use hostaudit_types::{AuditReport, HostMeta, SCHEMA_REPORT_V1, ToolMeta, Verdict, ids};
use time::OffsetDateTime;

use crate::rules::load_rules;

/// Where probe answers come from.
#[derive(Debug)]
pub enum ProbeSource {
    /// The bundled OS adapters, limited to enabled modules.
    Host,
    /// Caller-supplied probes (tests, embedding).
    Provided(ProbeSet),
}

/// Input for the audit use case.
#[derive(Debug)]
pub struct AuditInput<'a> {
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
    pub probes: ProbeSource,
}

/// Output from the audit use case.
#[derive(Clone, Debug)]
pub struct AuditOutput {
    pub report: AuditReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Run the audit use case: resolve config, load rules, evaluate, produce a report.
pub fn run_audit(input: AuditInput<'_>) -> anyhow::Result<AuditOutput> {
    let started_at = OffsetDateTime::now_utc();

    let resolved = resolve_settings(input.config_text, input.overrides)?;
    let effective = &resolved.effective;

    let mut document = load_rules(&rule_paths(effective)?).context("load rule files")?;
    document.sections.retain(|section| {
        let enabled = effective.module_enabled(&section.namespace);
        if !enabled {
            tracing::debug!(module = %section.namespace, "skipping disabled module");
        }
        enabled
    });

    let host_identity = host_identity(effective)?;
    let probes = match input.probes {
        ProbeSource::Host => hostaudit_probe::host_probes(effective.probe_timeout, |m| {
            effective.module_enabled(m)
        }),
        ProbeSource::Provided(probes) => probes,
    };

    let domain_report = hostaudit_domain::audit(
        &document,
        &host_identity,
        &effective.tags,
        &probes,
        effective.verbose,
    )
    .context("resolve rules for host")?;

    let report = AuditReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        host: HostMeta {
            identity: host_identity,
        },
        tags: effective.tags.pattern().to_string(),
        verbose: effective.verbose,
        verdict: domain_report.verdict,
        results: domain_report.results,
        data: domain_report.data,
    };

    Ok(AuditOutput {
        report,
        resolved_config: resolved,
    })
}

/// Map verdict to exit code: 0 = pass, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Fail => 2,
    }
}

pub(crate) fn resolve_settings(
    config_text: &str,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    // Empty config is allowed; defaults apply.
    let cfg = if config_text.trim().is_empty() {
        HostauditConfigV1::default()
    } else {
        hostaudit_settings::parse_config_toml(config_text).context("parse config")?
    };
    hostaudit_settings::resolve_config(cfg, overrides).context("resolve config")
}

pub(crate) fn rule_paths(effective: &EffectiveConfig) -> anyhow::Result<Vec<camino::Utf8PathBuf>> {
    if effective.rules.is_empty() {
        anyhow::bail!("no rule files given: pass --rules or set `rules` in hostaudit.toml");
    }
    Ok(effective.rules.iter().map(camino::Utf8PathBuf::from).collect())
}

pub(crate) fn host_identity(effective: &EffectiveConfig) -> anyhow::Result<String> {
    match &effective.host_identity {
        Some(identity) => Ok(identity.clone()),
        None => hostaudit_probe::detect_host_identity(effective.probe_timeout)
            .context("detect host identity (set host_identity to override)"),
    }
}

pub(crate) fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: ids::TOOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
