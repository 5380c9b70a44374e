use crate::{RenderableEntry, RenderableReport, RenderableVerdict};

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Hostaudit report\n\n");
    let verdict = match report.verdict {
        RenderableVerdict::Pass => "PASS",
        RenderableVerdict::Fail => "FAIL",
    };
    out.push_str(&format!(
        "- Verdict: **{}**\n- Host: `{}`\n- Tags: `{}`\n",
        verdict, report.host, report.tags
    ));
    out.push_str(&format!(
        "- Rules: {} resolved / {} evaluated / {} probe failures\n\n",
        report.data.rules_resolved, report.data.rules_evaluated, report.data.probe_failures
    ));

    if report.success.is_empty() && report.failure.is_empty() && report.controlled.is_empty() {
        out.push_str("No rules matched.\n");
        return out;
    }

    section(&mut out, "Failure", &report.failure);
    section(&mut out, "Success", &report.success);
    if !report.controlled.is_empty() {
        section(&mut out, "Controlled", &report.controlled);
    }

    out
}

fn section(out: &mut String, title: &str, entries: &[RenderableEntry]) {
    out.push_str(&format!("## {} ({})\n\n", title, entries.len()));
    if entries.is_empty() {
        out.push_str("None.\n\n");
        return;
    }

    for e in entries {
        out.push_str(&format!("- `{}`", e.tag));
        if let Some(name) = &e.name {
            out.push_str(&format!(" {}", name));
        }
        if let Some(desc) = &e.description {
            out.push_str(&format!(": {}", desc));
        }
        out.push('\n');

        if let Some(control) = &e.control {
            out.push_str(&format!("  - control: {}\n", control));
        }
        if let Some(observed) = &e.observed {
            out.push_str(&format!("  - observed: `{}`\n", observed));
        }
        if let Some(err) = &e.probe_error {
            out.push_str(&format!("  - probe error: {}\n", err));
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderableData;

    fn report(verdict: RenderableVerdict) -> RenderableReport {
        RenderableReport {
            verdict,
            host: "Windows-2016".to_string(),
            tags: "CIS-*".to_string(),
            success: Vec::new(),
            failure: Vec::new(),
            controlled: Vec::new(),
            data: RenderableData::default(),
        }
    }

    fn entry(tag: &str, description: &str) -> RenderableEntry {
        RenderableEntry {
            tag: tag.to_string(),
            description: Some(description.to_string()),
            ..RenderableEntry::default()
        }
    }

    #[test]
    fn renders_empty_report() {
        let md = render_markdown(&report(RenderableVerdict::Pass));
        assert!(md.contains("Verdict: **PASS**"));
        assert!(md.contains("Host: `Windows-2016`"));
        assert!(md.contains("No rules matched."));
        assert!(!md.contains("## "));
    }

    #[test]
    fn failures_come_first_and_controlled_only_when_present() {
        let mut r = report(RenderableVerdict::Fail);
        r.success.push(entry("CIS-17.5.1", "Audit Logon"));
        r.failure.push(entry("CIS-17.5.2", "Audit Logoff"));
        r.data = RenderableData {
            rules_resolved: 2,
            rules_evaluated: 2,
            probe_failures: 0,
        };

        let md = render_markdown(&r);
        assert!(md.contains("Verdict: **FAIL**"));
        assert!(md.contains("2 resolved / 2 evaluated / 0 probe failures"));
        let fail_at = md.find("## Failure (1)").expect("failure section");
        let ok_at = md.find("## Success (1)").expect("success section");
        assert!(fail_at < ok_at);
        assert!(md.contains("- `CIS-17.5.2`: Audit Logoff\n"));
        assert!(!md.contains("Controlled"));
    }

    #[test]
    fn renders_verbose_details() {
        let mut r = report(RenderableVerdict::Fail);
        r.failure.push(RenderableEntry {
            name: Some("Audit Logoff".to_string()),
            probe_error: Some("auditpol exited 1".to_string()),
            ..entry("CIS-17.5.2", "Logoff events")
        });
        r.success.push(RenderableEntry {
            name: Some("Audit Logon".to_string()),
            observed: Some("Success, Failure".to_string()),
            ..entry("CIS-17.5.1", "Logon events")
        });
        r.controlled.push(RenderableEntry {
            control: Some("handled by SIEM".to_string()),
            ..entry("CIS-17.6.1", "Special logon")
        });

        let md = render_markdown(&r);
        assert!(md.contains("- `CIS-17.5.2` Audit Logoff: Logoff events"));
        assert!(md.contains("  - probe error: auditpol exited 1"));
        assert!(md.contains("  - observed: `Success, Failure`"));
        assert!(md.contains("## Controlled (1)"));
        assert!(md.contains("  - control: handled by SIEM"));
    }

    #[test]
    fn empty_class_says_none() {
        let mut r = report(RenderableVerdict::Pass);
        r.success.push(entry("CIS-1", "d"));
        let md = render_markdown(&r);
        assert!(md.contains("## Failure (0)\n\nNone.\n"));
    }
}
