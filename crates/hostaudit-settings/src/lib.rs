//! Config parsing and effective-config resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod resolve;

pub use model::{HostauditConfigV1, ModuleConfig};
pub use resolve::{DEFAULT_PROBE_TIMEOUT_MS, EffectiveConfig, Overrides, ResolvedConfig};

/// Parse `hostaudit.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<HostauditConfigV1> {
    let cfg: HostauditConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the engine (defaults < config file < overrides).
pub fn resolve_config(
    cfg: HostauditConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
