//! Stable DTOs and IDs used across the hostaudit workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted audit report
//! - stable string IDs (schemas, module namespaces, value types, record keys)

#![forbid(unsafe_code)]

pub mod ids;
pub mod report;

pub use report::{
    AuditData, AuditReport, AuditResults, HostMeta, ReportEntry, ReportEnvelope, SCHEMA_REPORT_V1,
    ToolMeta, Verdict,
};
