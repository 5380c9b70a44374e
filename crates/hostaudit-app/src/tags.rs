//! The `tags` use case: which tags would this host be audited against.

use anyhow::Context;
use hostaudit_domain::model::ListType;
use hostaudit_domain::resolve;
use hostaudit_settings::Overrides;
use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::audit::{host_identity, resolve_settings, rule_paths};
use crate::rules::load_rules;

#[derive(Clone, Debug)]
pub struct TagsInput<'a> {
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    pub overrides: Overrides,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagSummary {
    pub tag: String,
    pub rules: usize,
    pub modules: BTreeSet<String>,
    pub lists: BTreeSet<ListType>,
}

#[derive(Clone, Debug)]
pub struct TagsOutput {
    pub host_identity: String,
    /// Sorted by tag.
    pub tags: Vec<TagSummary>,
}

/// Resolve rules for the host and summarize them per tag. Nothing is probed.
///
/// The configured tag filter applies, and disabled modules are left out.
pub fn run_tags(input: TagsInput<'_>) -> anyhow::Result<TagsOutput> {
    let resolved = resolve_settings(input.config_text, input.overrides)?;
    let effective = &resolved.effective;

    let mut document = load_rules(&rule_paths(effective)?).context("load rule files")?;
    document
        .sections
        .retain(|section| effective.module_enabled(&section.namespace));

    let host_identity = host_identity(effective)?;
    let registry = resolve(&document, &host_identity).context("resolve rules for host")?;

    let tags = registry
        .iter()
        .filter(|(tag, _)| effective.tags.matches(tag))
        .map(|(tag, rules)| TagSummary {
            tag: tag.to_string(),
            rules: rules.len(),
            modules: rules.iter().map(|r| r.module.clone()).collect(),
            lists: rules.iter().map(|r| r.list).collect(),
        })
        .collect();

    Ok(TagsOutput {
        host_identity,
        tags,
    })
}

/// One line per tag: `tag  rules  modules  types`.
pub fn format_tags(output: &TagsOutput) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# host: {}", output.host_identity);
    for t in &output.tags {
        let modules = t.modules.iter().cloned().collect::<Vec<_>>().join(",");
        let lists = t
            .lists
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{}\t{}\t{}\t{}", t.tag, t.rules, modules, lists);
    }
    out
}
