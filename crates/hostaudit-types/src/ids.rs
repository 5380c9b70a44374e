//! Stable identifiers shared by rule documents, the engine and the report.

// Module namespaces with a bundled probe.
pub const MODULE_AUDITPOL: &str = "auditpol";
pub const MODULE_PKG: &str = "pkg";
pub const MODULE_SERVICE: &str = "service";

// Rule list kinds.
pub const LIST_BLACKLIST: &str = "blacklist";
pub const LIST_WHITELIST: &str = "whitelist";

// Keys of a rule group / resolved rule record.
pub const KEY_DATA: &str = "data";
pub const KEY_NAME: &str = "name";
pub const KEY_TAG: &str = "tag";
pub const KEY_MODULE: &str = "module";
pub const KEY_TYPE: &str = "type";
pub const KEY_VALUE_TYPE: &str = "value_type";
pub const KEY_MATCH_OUTPUT: &str = "match_output";
pub const KEY_CONTROL: &str = "control";
pub const KEY_DESCRIPTION: &str = "description";

// Keys added to verbose report records.
pub const KEY_OBSERVED: &str = "observed";
pub const KEY_PROBE_ERROR: &str = "probe_error";

/// OS pattern that applies when no specific pattern matches the host.
pub const OS_WILDCARD: &str = "*";

// Multi-state audit setting labels.
pub const MULTI_NO_AUDITING: &str = "No auditing";
pub const MULTI_SUCCESS: &str = "Success";
pub const MULTI_FAILURE: &str = "Failure";
pub const MULTI_SUCCESS_FAILURE: &str = "Success, Failure";
pub const MULTI_INVALID: &str = "Invalid Auditing Value";
pub const MULTI_NOT_DEFINED: &str = "Not Defined";

/// Tool name written into report envelopes.
pub const TOOL_NAME: &str = "hostaudit";

/// Failure tag of the report written when a run aborts before any rule was evaluated.
pub const TAG_RUNTIME_ERROR: &str = "hostaudit.runtime_error";
