//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - merge ordering across documents
//! - OS selection with only a wildcard branch
//! - summary deduplication

use crate::engine::evaluate;
use crate::glob::TagFilter;
use crate::model::{Metadata, OsBranch, RuleDocument, RuleGroup, VariantEntry, VariantSpec};
use crate::probe::ProbeSet;
use crate::report::aggregate;
use crate::resolve::{merge, resolve};
use crate::test_support::ScriptedProbe;
use hostaudit_types::ReportEntry;
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Strategies
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").unwrap()
}

fn arb_tag() -> impl Strategy<Value = String> {
    prop::string::string_regex("CIS-[0-9]{1,2}\\.[0-9]{1,2}").unwrap()
}

fn arb_host() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z]{3,10}-[0-9]{1,2}(\\.[0-9]{2})?").unwrap()
}

fn arb_variant() -> impl Strategy<Value = VariantEntry> {
    (arb_name(), arb_tag(), prop::option::of("[a-z ]{1,12}")).prop_map(|(name, tag, control)| {
        let spec = match control {
            Some(control) => {
                let mut record = Metadata::new();
                record.insert("tag".to_string(), tag.into());
                record.insert("control".to_string(), control.into());
                VariantSpec::Record(record)
            }
            None => VariantSpec::Tag(tag),
        };
        VariantEntry { name, spec }
    })
}

/// A group whose only branch is the `*` wildcard.
fn arb_wildcard_group() -> impl Strategy<Value = RuleGroup> {
    (
        arb_name(),
        prop::collection::vec(arb_variant(), 0..5),
        prop::option::of(prop::sample::select(vec!["Logon", "Logoff", "Policy change"])),
    )
        .prop_map(|(name, variants, description)| {
            let mut metadata = Metadata::new();
            if let Some(d) = description {
                metadata.insert("description".to_string(), d.into());
            }
            RuleGroup {
                name,
                data: vec![OsBranch {
                    key: "*".to_string(),
                    variants: Some(variants),
                }],
                metadata,
            }
        })
}

fn arb_document() -> impl Strategy<Value = RuleDocument> {
    (
        prop::collection::vec(arb_wildcard_group(), 0..4),
        prop::collection::vec(arb_wildcard_group(), 0..4),
    )
        .prop_map(|(blacklist, whitelist)| {
            let mut doc = RuleDocument::default();
            let section = doc.section_mut("auditpol");
            section.blacklist = blacklist;
            section.whitelist = whitelist;
            doc
        })
}

fn group_names(doc: &RuleDocument, whitelist: bool) -> Vec<String> {
    doc.section("auditpol")
        .map(|s| if whitelist { &s.whitelist } else { &s.blacklist })
        .map(|groups| groups.iter().map(|g| g.name.clone()).collect())
        .unwrap_or_default()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn merge_is_concatenation_in_document_order(d1 in arb_document(), d2 in arb_document()) {
        let merged = merge([d1.clone(), d2.clone()]);
        for whitelist in [false, true] {
            let mut expected = group_names(&d1, whitelist);
            expected.extend(group_names(&d2, whitelist));
            prop_assert_eq!(group_names(&merged, whitelist), expected);
        }
    }

    #[test]
    fn wildcard_only_groups_resolve_identically_for_any_host(
        doc in arb_document(),
        h1 in arb_host(),
        h2 in arb_host(),
    ) {
        let r1 = resolve(&doc, &h1).expect("resolve h1");
        let r2 = resolve(&doc, &h2).expect("resolve h2");
        prop_assert_eq!(r1, r2);
    }

    #[test]
    fn summary_entries_are_unique_per_key(doc in arb_document()) {
        let registry = resolve(&doc, "Windows-10").expect("resolve");
        let probes = ProbeSet::new().with("auditpol", ScriptedProbe::new());
        let evals = evaluate(&registry, &TagFilter::all(), &probes);

        let first = aggregate(&evals, false);
        let second = aggregate(&evals, false);
        prop_assert_eq!(&first, &second);

        for class in [&first.success, &first.failure] {
            let mut seen = HashSet::new();
            for entry in class {
                let key = (entry.tag().map(str::to_string), entry.description().map(str::to_string));
                prop_assert!(seen.insert(key), "duplicate summary entry {:?}", entry);
            }
        }
        let mut seen = HashSet::new();
        for entry in &first.controlled {
            prop_assert!(
                matches!(entry, ReportEntry::Controlled { .. }),
                "controlled class holds controlled entries: {:?}",
                entry
            );
            let key = (
                entry.tag().map(str::to_string),
                entry.description().map(str::to_string),
                entry.control().map(str::to_string),
            );
            prop_assert!(seen.insert(key), "duplicate controlled entry {:?}", entry);
        }
    }
}
