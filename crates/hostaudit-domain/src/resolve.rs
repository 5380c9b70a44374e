//! Merging rule documents and selecting the variant list that applies to this host.

use crate::error::{MalformedRule, ResolveError};
use crate::glob;
use crate::model::{
    ListType, Metadata, Registry, ResolvedRule, RuleDocument, RuleGroup, ValueType, VariantEntry,
    VariantSpec,
};
use hostaudit_types::ids;
use serde_json::Value as JsonValue;

/// Union the blacklist/whitelist groups of every document, in document order.
///
/// Group names are not deduplicated. Documents without rule sections contribute nothing.
pub fn merge(documents: impl IntoIterator<Item = RuleDocument>) -> RuleDocument {
    let mut merged = RuleDocument::default();
    for doc in documents {
        for section in doc.sections {
            let target = merged.section_mut(&section.namespace);
            target.blacklist.extend(section.blacklist);
            target.whitelist.extend(section.whitelist);
        }
    }
    merged
}

/// Flatten every group into tag-indexed rules for `host_identity`.
///
/// All malformed variants are collected and reported together.
pub fn resolve(document: &RuleDocument, host_identity: &str) -> Result<Registry, ResolveError> {
    let mut registry = Registry::default();
    let mut malformed = Vec::new();

    for section in &document.sections {
        for list in [ListType::Blacklist, ListType::Whitelist] {
            for group in section.groups(list) {
                let variants = match select_variants(group, host_identity) {
                    Ok(variants) => variants,
                    Err(reason) => {
                        malformed.push(MalformedRule {
                            module: section.namespace.clone(),
                            group: group.name.clone(),
                            name: None,
                            reason,
                        });
                        continue;
                    }
                };

                for variant in variants {
                    match build_rule(&section.namespace, list, group, variant) {
                        Ok((tag, rule)) => registry.insert(tag, rule),
                        Err(reason) => malformed.push(MalformedRule {
                            module: section.namespace.clone(),
                            group: group.name.clone(),
                            name: Some(variant.name.clone()),
                            reason,
                        }),
                    }
                }
            }
        }
    }

    if !malformed.is_empty() {
        return Err(ResolveError::Malformed(malformed));
    }
    tracing::trace!(host = host_identity, rules = registry.len(), "resolved rule registry");
    Ok(registry)
}

/// First OS pattern matching the host wins; `*` is only the fallback.
///
/// A matching branch with no value does not count as a match, so later branches still apply.
fn select_variants<'g>(group: &'g RuleGroup, host: &str) -> Result<&'g [VariantEntry], String> {
    for branch in &group.data {
        if branch.key == ids::OS_WILDCARD {
            continue;
        }
        for pattern in branch.key.split(',').map(str::trim) {
            let matcher = glob::compile(pattern)
                .map_err(|err| format!("invalid OS pattern '{pattern}': {err}"))?;
            if matcher.is_match(host) {
                match &branch.variants {
                    Some(variants) => return Ok(variants.as_slice()),
                    None => break,
                }
            }
        }
    }

    Ok(group
        .data
        .iter()
        .find(|b| b.key == ids::OS_WILDCARD)
        .and_then(|b| b.variants.as_deref())
        .unwrap_or(&[]))
}

/// Layering, lowest to highest: `{name, tag, module, type}` < variant overrides < group metadata.
fn build_rule(
    module: &str,
    list: ListType,
    group: &RuleGroup,
    variant: &VariantEntry,
) -> Result<(String, ResolvedRule), String> {
    let (tag, overrides) = match &variant.spec {
        VariantSpec::Tag(tag) => (tag.clone(), Metadata::new()),
        VariantSpec::Record(record) => {
            let mut overrides = record.clone();
            let tag = match overrides.shift_remove(ids::KEY_TAG) {
                Some(JsonValue::String(tag)) => tag,
                Some(JsonValue::Number(n)) => n.to_string(),
                Some(other) => {
                    return Err(format!("tag must be a string, found {other}"));
                }
                None => return Err("missing tag".to_string()),
            };
            (tag, overrides)
        }
    };
    if tag.trim().is_empty() {
        return Err("empty tag".to_string());
    }

    let mut record = Metadata::new();
    record.insert(ids::KEY_NAME.to_string(), variant.name.clone().into());
    record.insert(ids::KEY_TAG.to_string(), tag.clone().into());
    record.insert(ids::KEY_MODULE.to_string(), module.into());
    record.insert(ids::KEY_TYPE.to_string(), list.as_str().into());
    record.extend(overrides);
    record.extend(group.metadata.clone());
    record.shift_remove(ids::KEY_DATA);

    let rule = rule_from_record(record)?;
    Ok((tag, rule))
}

fn rule_from_record(record: Metadata) -> Result<ResolvedRule, String> {
    let text = |key: &str| -> Result<String, String> {
        match record.get(key) {
            Some(JsonValue::String(s)) => Ok(s.clone()),
            Some(other) => Err(format!("{key} must be a string, found {other}")),
            None => Err(format!("missing {key}")),
        }
    };

    let name = text(ids::KEY_NAME)?;
    let tag = text(ids::KEY_TAG)?;
    let module = text(ids::KEY_MODULE)?;
    let list_s = text(ids::KEY_TYPE)?;
    let list = ListType::parse(&list_s)
        .ok_or_else(|| format!("type must be blacklist or whitelist, found '{list_s}'"))?;

    let value_type = match record.get(ids::KEY_VALUE_TYPE) {
        None | Some(JsonValue::Null) => ValueType::Raw,
        Some(JsonValue::String(s)) => {
            ValueType::parse(s).ok_or_else(|| format!("unknown value_type '{s}'"))?
        }
        Some(other) => return Err(format!("value_type must be a string, found {other}")),
    };

    let match_output = record
        .get(ids::KEY_MATCH_OUTPUT)
        .filter(|v| !v.is_null())
        .cloned();
    if value_type.is_ordered() && match_output.is_none() {
        return Err("ordered value_type requires match_output".to_string());
    }

    let control = record.get(ids::KEY_CONTROL).map(|v| match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    });
    let description = record.get(ids::KEY_DESCRIPTION).and_then(|v| match v {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    });

    Ok(ResolvedRule {
        name,
        tag,
        module,
        list,
        value_type,
        match_output,
        control,
        description,
        record,
    })
}
