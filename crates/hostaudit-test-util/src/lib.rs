//! Shared test utilities for the hostaudit workspace.
//!
//! This crate exists because `xtask` needs `normalize_nondeterministic` at
//! runtime (not behind `#[cfg(test)]`), so a `#[cfg(test)]` module inside
//! `hostaudit-types` would not suffice.

use serde_json::Value;

const ENVELOPE_KEYS: [&str; 5] = ["schema", "tool", "host", "verdict", "results"];

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// Only the root envelope is touched: `tool.version` becomes `"__VERSION__"` and
/// `started_at` / `finished_at` become `"__TIMESTAMP__"`. Verbose result records are
/// authored rule data and may legitimately carry keys with the same names, so the
/// walk does not recurse.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    let Some(obj) = value.as_object_mut() else {
        return value;
    };
    if !ENVELOPE_KEYS.iter().all(|k| obj.contains_key(*k)) {
        return value;
    }

    if let Some(tool) = obj.get_mut("tool")
        && let Some(tool_obj) = tool.as_object_mut()
        && tool_obj.contains_key("version")
    {
        tool_obj.insert(
            "version".to_string(),
            Value::String("__VERSION__".to_string()),
        );
    }
    for key in ["started_at", "finished_at"] {
        if obj.contains_key(key) {
            obj.insert(key.to_string(), Value::String("__TIMESTAMP__".to_string()));
        }
    }
    value
}
