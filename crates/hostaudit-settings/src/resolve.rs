use crate::model::HostauditConfigV1;
use anyhow::Context;
use hostaudit_domain::TagFilter;
use std::collections::BTreeSet;
use std::time::Duration;

pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 30_000;

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub tags: Option<String>,
    pub verbose: Option<bool>,
    pub host_identity: Option<String>,
    pub probe_timeout_ms: Option<u64>,
    /// Replaces the configured rule files when non-empty.
    pub rules: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub tags: TagFilter,
    pub verbose: bool,
    pub host_identity: Option<String>,
    pub probe_timeout: Duration,
    pub rules: Vec<String>,
    pub disabled_modules: BTreeSet<String>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            tags: TagFilter::all(),
            verbose: false,
            host_identity: None,
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            rules: Vec::new(),
            disabled_modules: BTreeSet::new(),
        }
    }
}

impl EffectiveConfig {
    pub fn module_enabled(&self, namespace: &str) -> bool {
        !self.disabled_modules.contains(namespace)
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(
    cfg: HostauditConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let mut effective = EffectiveConfig::default();

    if let Some(tags) = overrides.tags.as_deref().or(cfg.tags.as_deref()) {
        effective.tags =
            TagFilter::new(tags).with_context(|| format!("invalid tag filter glob: {tags}"))?;
    }

    if let Some(verbose) = overrides.verbose.or(cfg.verbose) {
        effective.verbose = verbose;
    }

    effective.host_identity = overrides
        .host_identity
        .or(cfg.host_identity)
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty());

    if let Some(ms) = overrides.probe_timeout_ms.or(cfg.probe_timeout_ms) {
        if ms == 0 {
            anyhow::bail!("probe_timeout_ms must be greater than zero");
        }
        effective.probe_timeout = Duration::from_millis(ms);
    }

    effective.rules = if overrides.rules.is_empty() {
        cfg.rules
    } else {
        overrides.rules
    };

    effective.disabled_modules = cfg
        .modules
        .iter()
        .filter(|(_, m)| m.enabled == Some(false))
        .map(|(name, _)| name.clone())
        .collect();

    Ok(ResolvedConfig { effective })
}
