use crate::glob::TagFilter;
use crate::model::{ListType, Registry, ResolvedRule};
use crate::normalize::{Normalized, normalize};
use crate::probe::ProbeSet;
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Failure,
    Controlled,
}

/// One evaluated (or exempted) rule.
#[derive(Clone, Debug)]
pub struct Evaluation<'a> {
    pub rule: &'a ResolvedRule,
    pub outcome: Outcome,
    /// Normalized value, when the probe answered.
    pub observed: Option<Normalized>,
    /// Probe failure message, when it did not.
    pub probe_error: Option<String>,
}

/// Blacklist: present means Failure. Whitelist: present means Success.
pub fn classify(list: ListType, found: bool) -> Outcome {
    match (list, found) {
        (ListType::Blacklist, true) | (ListType::Whitelist, false) => Outcome::Failure,
        (ListType::Blacklist, false) | (ListType::Whitelist, true) => Outcome::Success,
    }
}

/// Evaluate every rule whose tag matches `filter`.
///
/// Rules are independent, so they are probed in parallel; results come back in registry
/// order (tags sorted, rules in resolution order).
pub fn evaluate<'a>(
    registry: &'a Registry,
    filter: &TagFilter,
    probes: &ProbeSet,
) -> Vec<Evaluation<'a>> {
    let selected: Vec<&ResolvedRule> = registry
        .iter()
        .filter(|(tag, _)| filter.matches(tag))
        .flat_map(|(_, rules)| rules.iter())
        .collect();

    selected
        .into_par_iter()
        .map(|rule| evaluate_rule(rule, probes))
        .collect()
}

fn evaluate_rule<'a>(rule: &'a ResolvedRule, probes: &ProbeSet) -> Evaluation<'a> {
    if rule.control.is_some() {
        return Evaluation {
            rule,
            outcome: Outcome::Controlled,
            observed: None,
            probe_error: None,
        };
    }

    match probes.probe(rule) {
        Ok(raw) => {
            let normalized = normalize(rule.value_type, &raw, rule.match_output.as_ref());
            let mut found = normalized.is_truthy();
            if let Some(expected) = &rule.match_output
                && !normalized.satisfies(expected)
            {
                found = false;
            }
            Evaluation {
                rule,
                outcome: classify(rule.list, found),
                observed: Some(normalized),
                probe_error: None,
            }
        }
        Err(err) => {
            tracing::debug!(
                tag = %rule.tag,
                name = %rule.name,
                module = %rule.module,
                error = %err,
                "probe failed; treating value as absent"
            );
            Evaluation {
                rule,
                outcome: classify(rule.list, false),
                observed: None,
                probe_error: Some(err.to_string()),
            }
        }
    }
}
