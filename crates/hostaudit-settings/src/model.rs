use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `hostaudit.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HostauditConfigV1 {
    /// Optional schema string for tooling (`hostaudit.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Tag filter glob (default `*`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    /// Emit full rule records instead of deduplicated summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// Fixed OS identity instead of detecting it (e.g. `Ubuntu-20.04`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_identity: Option<String>,

    /// Upper bound for a single probe call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_timeout_ms: Option<u64>,

    /// Rule document paths, relative to the working directory.
    #[serde(default)]
    pub rules: Vec<String>,

    /// Map of module namespace -> config.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModuleConfig {
    /// Skip every rule of this module when false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}
