//! Fuzz target for rule document parsing and host resolution.
//!
//! Goal: parsing and resolving should **never panic** on any input.
//! Malformed documents must come back as errors.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_rule_document
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct RuleInput {
    /// YAML rule file text.
    yaml: String,
    /// Host identity matched against the OS patterns.
    host: String,
}

fuzz_target!(|input: RuleInput| {
    if input.yaml.len() > 16 * 1024 || input.host.len() > 256 {
        return;
    }

    if let Ok(doc) = hostaudit_app::parse_rule_text("fuzz.yaml", &input.yaml) {
        let _ = hostaudit_domain::resolve(&doc, &input.host);
    }
});
