use schemars::JsonSchema;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::borrow::Cow;
use time::OffsetDateTime;

use crate::ids;

/// Stable schema identifier for hostaudit reports.
pub const SCHEMA_REPORT_V1: &str = "hostaudit.report.v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// A run fails as soon as a single rule lands in `Failure`.
    pub fn from_results(results: &AuditResults) -> Self {
        if results.failure.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

/// One line of a report class.
///
/// The serialized shape depends on the variant:
/// - `Summary`: `{tag: description}`
/// - `Controlled`: `{tag: {description, control}}`
/// - `Detailed`: the full layered rule record (verbose mode)
#[derive(Clone, Debug, PartialEq)]
pub enum ReportEntry {
    Summary {
        tag: String,
        description: Option<String>,
    },
    Controlled {
        tag: String,
        description: Option<String>,
        control: String,
    },
    Detailed(Map<String, JsonValue>),
}

impl ReportEntry {
    pub fn tag(&self) -> Option<&str> {
        match self {
            ReportEntry::Summary { tag, .. } | ReportEntry::Controlled { tag, .. } => Some(tag),
            ReportEntry::Detailed(record) => record.get(ids::KEY_TAG).and_then(JsonValue::as_str),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            ReportEntry::Summary { description, .. }
            | ReportEntry::Controlled { description, .. } => description.as_deref(),
            ReportEntry::Detailed(record) => record
                .get(ids::KEY_DESCRIPTION)
                .and_then(JsonValue::as_str),
        }
    }

    pub fn control(&self) -> Option<&str> {
        match self {
            ReportEntry::Summary { .. } => None,
            ReportEntry::Controlled { control, .. } => Some(control),
            ReportEntry::Detailed(record) => {
                record.get(ids::KEY_CONTROL).and_then(JsonValue::as_str)
            }
        }
    }

    /// Classify a deserialized record back into its variant.
    ///
    /// Detailed records always carry `name`, `tag`, `module` and `type`, so a single-key map
    /// is unambiguously a summary line.
    pub fn from_record(record: Map<String, JsonValue>) -> Self {
        if record.len() == 1
            && let Some((tag, value)) = record.iter().next()
        {
            match value {
                JsonValue::Null => {
                    return ReportEntry::Summary {
                        tag: tag.clone(),
                        description: None,
                    };
                }
                JsonValue::String(description) => {
                    return ReportEntry::Summary {
                        tag: tag.clone(),
                        description: Some(description.clone()),
                    };
                }
                JsonValue::Object(note) if note.contains_key(ids::KEY_CONTROL) => {
                    return ReportEntry::Controlled {
                        tag: tag.clone(),
                        description: note
                            .get(ids::KEY_DESCRIPTION)
                            .and_then(JsonValue::as_str)
                            .map(str::to_string),
                        control: match note.get(ids::KEY_CONTROL) {
                            Some(JsonValue::String(s)) => s.clone(),
                            Some(JsonValue::Null) | None => String::new(),
                            Some(other) => other.to_string(),
                        },
                    };
                }
                _ => {}
            }
        }
        ReportEntry::Detailed(record)
    }
}

#[derive(Serialize)]
struct ControlNote<'a> {
    description: &'a Option<String>,
    control: &'a str,
}

impl Serialize for ReportEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReportEntry::Summary { tag, description } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(tag, description)?;
                map.end()
            }
            ReportEntry::Controlled {
                tag,
                description,
                control,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(
                    tag,
                    &ControlNote {
                        description,
                        control,
                    },
                )?;
                map.end()
            }
            ReportEntry::Detailed(record) => record.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ReportEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = Map::<String, JsonValue>::deserialize(deserializer)?;
        Ok(ReportEntry::from_record(record))
    }
}

impl JsonSchema for ReportEntry {
    fn schema_name() -> Cow<'static, str> {
        "ReportEntry".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "object",
            "description": "Either {tag: description}, {tag: {description, control}}, or a full rule record"
        })
    }
}

/// The per-run result classes.
///
/// `Controlled` is omitted from the serialized form when empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditResults {
    #[serde(rename = "Success", default)]
    pub success: Vec<ReportEntry>,
    #[serde(rename = "Failure", default)]
    pub failure: Vec<ReportEntry>,
    #[serde(
        rename = "Controlled",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub controlled: Vec<ReportEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HostMeta {
    /// OS identity used to select rule variants (e.g. `Ubuntu-20.04`).
    pub identity: String,
}

/// Hostaudit-specific counters for the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct AuditData {
    pub rules_resolved: u32,
    pub rules_evaluated: u32,
    pub probe_failures: u32,
}

/// Report envelope.
///
/// Generic over the tool data so the outer shape stays stable while the counters evolve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope<TData = AuditData> {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub host: HostMeta,
    /// Tag filter glob the run was restricted to.
    pub tags: String,
    pub verbose: bool,
    pub verdict: Verdict,
    pub results: AuditResults,
    pub data: TData,
}

pub type AuditReport = ReportEnvelope<AuditData>;
