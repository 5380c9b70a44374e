use crate::engine::{Evaluation, Outcome, evaluate};
use crate::error::ResolveError;
use crate::glob::TagFilter;
use crate::model::RuleDocument;
use crate::probe::ProbeSet;
use crate::resolve::resolve;
use hostaudit_types::{AuditData, AuditResults, ReportEntry, Verdict, ids};
use std::collections::HashSet;

#[derive(Clone, Debug)]
pub struct DomainReport {
    pub verdict: Verdict,
    pub results: AuditResults,
    pub data: AuditData,
}

/// Resolve, evaluate and aggregate one audit run.
///
/// Only malformed rule input fails; probe failures are folded into the results.
pub fn audit(
    document: &RuleDocument,
    host_identity: &str,
    filter: &TagFilter,
    probes: &ProbeSet,
    verbose: bool,
) -> Result<DomainReport, ResolveError> {
    let registry = resolve(document, host_identity)?;
    let evaluations = evaluate(&registry, filter, probes);
    let results = aggregate(&evaluations, verbose);

    let data = AuditData {
        rules_resolved: saturating_count(registry.len()),
        rules_evaluated: saturating_count(
            evaluations
                .iter()
                .filter(|e| e.outcome != Outcome::Controlled)
                .count(),
        ),
        probe_failures: saturating_count(
            evaluations
                .iter()
                .filter(|e| e.probe_error.is_some())
                .count(),
        ),
    };
    tracing::info!(
        host = host_identity,
        tags = filter.pattern(),
        success = results.success.len(),
        failure = results.failure.len(),
        controlled = results.controlled.len(),
        "audit finished"
    );

    Ok(DomainReport {
        verdict: Verdict::from_results(&results),
        results,
        data,
    })
}

/// Shape evaluations into the Success / Failure / Controlled classes.
///
/// Verbose keeps every full record. Otherwise the first entry per `(tag, description)`
/// wins (Controlled also keys on the exemption reason).
pub fn aggregate(evaluations: &[Evaluation<'_>], verbose: bool) -> AuditResults {
    let mut results = AuditResults::default();

    if verbose {
        for eval in evaluations {
            let entry = ReportEntry::Detailed(detailed_record(eval));
            class_mut(&mut results, eval.outcome).push(entry);
        }
        return results;
    }

    let mut seen_success: HashSet<(&str, Option<&str>)> = HashSet::new();
    let mut seen_failure: HashSet<(&str, Option<&str>)> = HashSet::new();
    let mut seen_controlled: HashSet<(&str, Option<&str>, &str)> = HashSet::new();

    for eval in evaluations {
        let rule = eval.rule;
        let tag = rule.tag.as_str();
        let description = rule.description.as_deref();

        match eval.outcome {
            Outcome::Success | Outcome::Failure => {
                let seen = if eval.outcome == Outcome::Success {
                    &mut seen_success
                } else {
                    &mut seen_failure
                };
                if seen.insert((tag, description)) {
                    class_mut(&mut results, eval.outcome).push(ReportEntry::Summary {
                        tag: tag.to_string(),
                        description: rule.description.clone(),
                    });
                }
            }
            Outcome::Controlled => {
                let control = rule.control.as_deref().unwrap_or_default();
                if seen_controlled.insert((tag, description, control)) {
                    results.controlled.push(ReportEntry::Controlled {
                        tag: tag.to_string(),
                        description: rule.description.clone(),
                        control: control.to_string(),
                    });
                }
            }
        }
    }

    results
}

fn saturating_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn class_mut(results: &mut AuditResults, outcome: Outcome) -> &mut Vec<ReportEntry> {
    match outcome {
        Outcome::Success => &mut results.success,
        Outcome::Failure => &mut results.failure,
        Outcome::Controlled => &mut results.controlled,
    }
}

fn detailed_record(eval: &Evaluation<'_>) -> serde_json::Map<String, serde_json::Value> {
    let mut record = eval.rule.record.clone();
    if let Some(observed) = &eval.observed {
        record.insert(ids::KEY_OBSERVED.to_string(), observed.to_json());
    }
    if let Some(err) = &eval.probe_error {
        record.insert(ids::KEY_PROBE_ERROR.to_string(), err.clone().into());
    }
    record
}
