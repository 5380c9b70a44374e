//! Structured input -> typed rule documents.
//!
//! Documents arrive as generic structured data (YAML in practice) and are checked for shape
//! here, so resolution only deals with well-formed groups. Mapping order is preserved end
//! to end, which keeps the `name -> variant` shorthand deterministic.

use crate::error::DocumentError;
use crate::model::{
    ListType, Metadata, ModuleSection, OsBranch, RuleDocument, RuleGroup, VariantEntry,
    VariantSpec,
};
use hostaudit_types::ids;
use serde_json::Value as JsonValue;

pub fn parse_document(value: &JsonValue) -> Result<RuleDocument, DocumentError> {
    // An empty file deserializes to null.
    if value.is_null() {
        return Ok(RuleDocument::default());
    }
    let JsonValue::Object(top) = value else {
        return Err(DocumentError::NotAMapping {
            found: kind(value),
        });
    };

    let mut doc = RuleDocument::default();
    for (namespace, section) in top {
        let JsonValue::Object(section) = section else {
            tracing::debug!(namespace = %namespace, "skipping non-mapping top-level key");
            continue;
        };
        if !section.contains_key(ids::LIST_BLACKLIST) && !section.contains_key(ids::LIST_WHITELIST)
        {
            tracing::debug!(namespace = %namespace, "skipping section without rule lists");
            continue;
        }

        let mut module = ModuleSection {
            namespace: namespace.clone(),
            ..ModuleSection::default()
        };
        for list in [ListType::Blacklist, ListType::Whitelist] {
            if let Some(groups) = section.get(list.as_str()) {
                *module.groups_mut(list) = parse_groups(namespace, list, groups)?;
            }
        }
        doc.sections.push(module);
    }
    Ok(doc)
}

/// Accepts the authored `name -> group` mapping as well as the merged list of
/// single-entry mappings.
fn parse_groups(
    namespace: &str,
    list: ListType,
    value: &JsonValue,
) -> Result<Vec<RuleGroup>, DocumentError> {
    let invalid = |found| DocumentError::InvalidList {
        namespace: namespace.to_string(),
        list: list.as_str(),
        found,
    };

    match value {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::Object(map) => map
            .iter()
            .map(|(name, group)| parse_group(namespace, name, group))
            .collect(),
        JsonValue::Array(items) => {
            let mut groups = Vec::new();
            for item in items {
                let JsonValue::Object(map) = item else {
                    return Err(invalid(kind(item)));
                };
                for (name, group) in map {
                    groups.push(parse_group(namespace, name, group)?);
                }
            }
            Ok(groups)
        }
        other => Err(invalid(kind(other))),
    }
}

fn parse_group(namespace: &str, name: &str, value: &JsonValue) -> Result<RuleGroup, DocumentError> {
    let invalid = |reason: String| DocumentError::InvalidGroup {
        namespace: namespace.to_string(),
        group: name.to_string(),
        reason,
    };

    let JsonValue::Object(fields) = value else {
        return Err(invalid(format!(
            "rule group must be a mapping, found {}",
            kind(value)
        )));
    };

    let mut metadata = Metadata::new();
    let mut data = Vec::new();
    for (key, field) in fields {
        if key != ids::KEY_DATA {
            metadata.insert(key.clone(), field.clone());
            continue;
        }
        match field {
            JsonValue::Null => {}
            JsonValue::Object(branches) => {
                for (os_key, variants) in branches {
                    let variants = parse_variants(variants).map_err(|reason| {
                        invalid(format!("data:{os_key}: {reason}"))
                    })?;
                    data.push(OsBranch {
                        key: os_key.clone(),
                        variants,
                    });
                }
            }
            other => {
                return Err(invalid(format!(
                    "data must be a mapping of OS patterns, found {}",
                    kind(other)
                )));
            }
        }
    }

    Ok(RuleGroup {
        name: name.to_string(),
        data,
        metadata,
    })
}

fn parse_variants(value: &JsonValue) -> Result<Option<Vec<VariantEntry>>, String> {
    let variants = match value {
        JsonValue::Null => return Ok(None),
        JsonValue::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                let JsonValue::Object(map) = item else {
                    return Err(format!(
                        "variant entries must be mappings of name to tag, found {}",
                        kind(item)
                    ));
                };
                for (name, spec) in map {
                    out.push(parse_variant(name, spec)?);
                }
            }
            out
        }
        // Shorthand: a bare `name -> variant` mapping instead of a list of them.
        JsonValue::Object(map) => map
            .iter()
            .map(|(name, spec)| parse_variant(name, spec))
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(format!(
                "variants must be a list or mapping, found {}",
                kind(other)
            ));
        }
    };
    Ok(Some(variants))
}

fn parse_variant(name: &str, value: &JsonValue) -> Result<VariantEntry, String> {
    let spec = match value {
        JsonValue::String(tag) => VariantSpec::Tag(tag.clone()),
        JsonValue::Number(n) => VariantSpec::Tag(n.to_string()),
        JsonValue::Object(record) => VariantSpec::Record(record.clone()),
        other => {
            return Err(format!(
                "variant '{name}' must be a tag or a mapping, found {}",
                kind(other)
            ));
        }
    };
    Ok(VariantEntry {
        name: name.to_string(),
        spec,
    })
}

pub(crate) fn kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "list",
        JsonValue::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_authored_mapping_form() {
        let doc = parse_document(&json!({
            "auditpol": {
                "whitelist": {
                    "account_logon": {
                        "data": {
                            "Windows-2012*": [{"Audit Credential Validation": "CIS-17.1.1"}],
                            "*": [{"Audit Credential Validation": {"tag": "CIS-17.1.1", "control": "n/a"}}]
                        },
                        "description": "Audit Credential Validation",
                        "value_type": "multi"
                    }
                }
            }
        }))
        .expect("parse");

        let section = doc.section("auditpol").expect("auditpol section");
        assert!(section.blacklist.is_empty());
        assert_eq!(section.whitelist.len(), 1);

        let group = &section.whitelist[0];
        assert_eq!(group.name, "account_logon");
        assert_eq!(group.data.len(), 2);
        assert_eq!(group.data[0].key, "Windows-2012*");
        assert_eq!(group.data[1].key, "*");
        assert!(!group.metadata.contains_key("data"));
        assert_eq!(group.metadata["value_type"], "multi");

        assert_eq!(
            group.data[0].variants.as_ref().expect("variants")[0],
            VariantEntry {
                name: "Audit Credential Validation".to_string(),
                spec: VariantSpec::Tag("CIS-17.1.1".to_string()),
            }
        );
        let fallback = group.data[1].variants.as_deref().expect("variants");
        assert!(matches!(fallback[0].spec, VariantSpec::Record(_)));
    }

    #[test]
    fn parses_merged_list_form() {
        let doc = parse_document(&json!({
            "pkg": {
                "blacklist": [
                    {"dhcp": {"data": {"*": [{"dhcp": "CIS-2.2.5"}]}}},
                    {"telnet": {"data": {"*": [{"telnet-server": "CIS-2.1.1"}]}}}
                ]
            }
        }))
        .expect("parse");
        let names: Vec<_> = doc.sections[0]
            .blacklist
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, vec!["dhcp", "telnet"]);
    }

    #[test]
    fn shorthand_mapping_keeps_input_order() {
        let doc = parse_document(&json!({
            "auditpol": {
                "blacklist": {
                    "g": {"data": {"*": {"zeta": "T1", "alpha": "T2", "mu": {"tag": "T3"}}}}
                }
            }
        }))
        .expect("parse");
        let names: Vec<_> = doc.sections[0].blacklist[0].data[0]
            .variants
            .iter()
            .flatten()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mu"]);
    }

    #[test]
    fn null_os_branch_has_no_variants() {
        let doc = parse_document(&json!({
            "auditpol": {"whitelist": {"g": {"data": {"Ubuntu-*": null, "*": []}}}}
        }))
        .expect("parse");
        let data = &doc.sections[0].whitelist[0].data;
        assert_eq!(data[0].variants, None);
        assert_eq!(data[1].variants, Some(Vec::new()));
    }

    #[test]
    fn sections_without_lists_are_skipped() {
        let doc = parse_document(&json!({
            "auditpol": {"description": "nothing here"},
            "version": 3
        }))
        .expect("parse");
        assert!(doc.sections.is_empty());
        assert_eq!(parse_document(&JsonValue::Null).expect("null"), RuleDocument::default());
    }

    #[test]
    fn wrong_shapes_fail_fast() {
        assert_eq!(
            parse_document(&json!(["not", "a", "mapping"])),
            Err(DocumentError::NotAMapping { found: "list" })
        );

        let err = parse_document(&json!({"auditpol": {"whitelist": "oops"}}))
            .expect_err("string list");
        assert!(matches!(err, DocumentError::InvalidList { found: "string", .. }));

        let err = parse_document(&json!({"auditpol": {"whitelist": {"g": ["x"]}}}))
            .expect_err("group list");
        assert!(err.to_string().contains("auditpol:g"));

        let err = parse_document(&json!({
            "auditpol": {"whitelist": {"g": {"data": {"*": ["bare-tag"]}}}}
        }))
        .expect_err("bare variant");
        assert!(err.to_string().contains("data:*"));
    }
}
