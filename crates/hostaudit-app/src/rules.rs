use anyhow::Context;
use camino::Utf8Path;
use hostaudit_domain::document::parse_document;
use hostaudit_domain::model::RuleDocument;
use hostaudit_domain::merge;

/// Parse one YAML rule file. `origin` only labels errors.
pub fn parse_rule_text(origin: &str, text: &str) -> anyhow::Result<RuleDocument> {
    let value: serde_json::Value =
        serde_yaml::from_str(text).with_context(|| format!("parse YAML in {origin}"))?;
    parse_document(&value).with_context(|| format!("invalid rule document {origin}"))
}

/// Read, parse and merge rule files in the given order.
pub fn load_rules<P: AsRef<Utf8Path>>(paths: &[P]) -> anyhow::Result<RuleDocument> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
        documents.push(parse_rule_text(path.as_str(), &text)?);
    }
    let merged = merge(documents);
    tracing::debug!(
        files = paths.len(),
        groups = merged.group_count(),
        "loaded rule documents"
    );
    Ok(merged)
}
