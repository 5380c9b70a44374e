use anyhow::Context;
use hostaudit_render::{RenderableData, RenderableEntry, RenderableReport, RenderableVerdict};
use hostaudit_types::{
    AuditData, AuditReport, AuditResults, HostMeta, ReportEntry, SCHEMA_REPORT_V1, Verdict, ids,
};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

use crate::audit::tool_meta;

pub fn parse_report_json(text: &str) -> anyhow::Result<AuditReport> {
    let value: JsonValue = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: '{schema}' (expected {SCHEMA_REPORT_V1})");
    }

    serde_json::from_value(value).context("parse hostaudit v1 report")
}

pub fn serialize_report(report: &AuditReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

/// A failing report for runs that aborted before producing results.
pub fn runtime_error_report(message: &str) -> AuditReport {
    let now = OffsetDateTime::now_utc();
    AuditReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        started_at: now,
        finished_at: now,
        host: HostMeta::default(),
        tags: ids::OS_WILDCARD.to_string(),
        verbose: false,
        verdict: Verdict::Fail,
        results: AuditResults {
            failure: vec![ReportEntry::Summary {
                tag: ids::TAG_RUNTIME_ERROR.to_string(),
                description: Some(message.to_string()),
            }],
            ..AuditResults::default()
        },
        data: AuditData::default(),
    }
}

pub fn to_renderable(report: &AuditReport) -> RenderableReport {
    RenderableReport {
        verdict: match report.verdict {
            Verdict::Pass => RenderableVerdict::Pass,
            Verdict::Fail => RenderableVerdict::Fail,
        },
        host: report.host.identity.clone(),
        tags: report.tags.clone(),
        success: report.results.success.iter().map(renderable_entry).collect(),
        failure: report.results.failure.iter().map(renderable_entry).collect(),
        controlled: report
            .results
            .controlled
            .iter()
            .map(renderable_entry)
            .collect(),
        data: RenderableData {
            rules_resolved: report.data.rules_resolved,
            rules_evaluated: report.data.rules_evaluated,
            probe_failures: report.data.probe_failures,
        },
    }
}

fn renderable_entry(entry: &ReportEntry) -> RenderableEntry {
    let mut out = RenderableEntry {
        tag: entry.tag().unwrap_or_default().to_string(),
        description: entry.description().map(str::to_string),
        control: entry.control().map(str::to_string),
        ..RenderableEntry::default()
    };
    if let ReportEntry::Detailed(record) = entry {
        out.name = record.get(ids::KEY_NAME).map(display_value);
        out.observed = record.get(ids::KEY_OBSERVED).map(display_value);
        out.probe_error = record.get(ids::KEY_PROBE_ERROR).map(display_value);
    }
    out
}

fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
