//! Use case orchestration for hostaudit.
//!
//! This crate coordinates settings, rule loading, the domain engine, probes and rendering.
//! It stays thin: the engine lives in `hostaudit-domain`, host access in `hostaudit-probe`.
//!
//! The CLI crate depends on this; it only handles argument parsing and output files.

#![forbid(unsafe_code)]

mod audit;
mod render;
mod report;
mod rules;
mod tags;

pub use audit::{AuditInput, AuditOutput, ProbeSource, run_audit, verdict_exit_code};
pub use render::render_markdown;
pub use report::{parse_report_json, runtime_error_report, serialize_report, to_renderable};
pub use rules::{load_rules, parse_rule_text};
pub use tags::{TagSummary, TagsInput, TagsOutput, format_tags, run_tags};
