use hostaudit_types::ids;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// Insertion-ordered key/value record (rule metadata, layered rule records).
pub type Metadata = serde_json::Map<String, JsonValue>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListType {
    /// The condition must be absent to pass.
    Blacklist,
    /// The condition must be present to pass.
    Whitelist,
}

impl ListType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListType::Blacklist => ids::LIST_BLACKLIST,
            ListType::Whitelist => ids::LIST_WHITELIST,
        }
    }

    pub fn parse(v: &str) -> Option<Self> {
        match v {
            ids::LIST_BLACKLIST => Some(ListType::Blacklist),
            ids::LIST_WHITELIST => Some(ListType::Whitelist),
            _ => None,
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a probed value is normalized and compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    /// No `value_type` given: the raw value's truthiness decides.
    Raw,
    Binary,
    Multi,
    LessThan,
    MoreThan,
    Equal,
}

impl ValueType {
    pub fn parse(v: &str) -> Option<Self> {
        match v.trim() {
            "binary" => Some(ValueType::Binary),
            "multi" => Some(ValueType::Multi),
            "less" | "less_than" => Some(ValueType::LessThan),
            "more" | "more_than" => Some(ValueType::MoreThan),
            "equal" | "equal_to" => Some(ValueType::Equal),
            _ => None,
        }
    }

    /// Ordered operators consume `match_output` as their operand.
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            ValueType::LessThan | ValueType::MoreThan | ValueType::Equal
        )
    }
}

/// A raw value returned by a probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SystemValue {
    Absent,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl SystemValue {
    pub fn to_json(&self) -> JsonValue {
        match self {
            SystemValue::Absent => JsonValue::Null,
            SystemValue::Bool(b) => JsonValue::Bool(*b),
            SystemValue::Int(i) => JsonValue::from(*i),
            SystemValue::Text(s) => JsonValue::String(s.clone()),
        }
    }
}

impl From<bool> for SystemValue {
    fn from(v: bool) -> Self {
        SystemValue::Bool(v)
    }
}

impl From<i64> for SystemValue {
    fn from(v: i64) -> Self {
        SystemValue::Int(v)
    }
}

impl From<&str> for SystemValue {
    fn from(v: &str) -> Self {
        SystemValue::Text(v.to_string())
    }
}

impl From<String> for SystemValue {
    fn from(v: String) -> Self {
        SystemValue::Text(v)
    }
}

impl<T: Into<SystemValue>> From<Option<T>> for SystemValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SystemValue::Absent)
    }
}

/// Rule definitions, grouped by module namespace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleDocument {
    pub sections: Vec<ModuleSection>,
}

impl RuleDocument {
    pub fn section(&self, namespace: &str) -> Option<&ModuleSection> {
        self.sections.iter().find(|s| s.namespace == namespace)
    }

    pub(crate) fn section_mut(&mut self, namespace: &str) -> &mut ModuleSection {
        let idx = match self.sections.iter().position(|s| s.namespace == namespace) {
            Some(idx) => idx,
            None => {
                self.sections.push(ModuleSection {
                    namespace: namespace.to_string(),
                    ..ModuleSection::default()
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }

    pub fn group_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| s.blacklist.len() + s.whitelist.len())
            .sum()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModuleSection {
    pub namespace: String,
    pub blacklist: Vec<RuleGroup>,
    pub whitelist: Vec<RuleGroup>,
}

impl ModuleSection {
    pub fn groups(&self, list: ListType) -> &[RuleGroup] {
        match list {
            ListType::Blacklist => &self.blacklist,
            ListType::Whitelist => &self.whitelist,
        }
    }

    pub(crate) fn groups_mut(&mut self, list: ListType) -> &mut Vec<RuleGroup> {
        match list {
            ListType::Blacklist => &mut self.blacklist,
            ListType::Whitelist => &mut self.whitelist,
        }
    }
}

/// A named rule group: OS-specific variant lists plus metadata shared by every variant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleGroup {
    pub name: String,
    /// OS pattern key (possibly comma-separated globs, or `*`) -> variants, in input order.
    pub data: Vec<OsBranch>,
    /// Every group key except `data`.
    pub metadata: Metadata,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OsBranch {
    pub key: String,
    /// `None` when the key has no value; such a branch never wins selection.
    pub variants: Option<Vec<VariantEntry>>,
}

/// `{name: tag}` or `{name: {tag, ...overrides}}`.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantEntry {
    /// Probe key (audit subcategory, package name, ...).
    pub name: String,
    pub spec: VariantSpec,
}

#[derive(Clone, Debug, PartialEq)]
pub enum VariantSpec {
    Tag(String),
    Record(Metadata),
}

/// A flattened, host-selected rule ready for evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRule {
    pub name: String,
    pub tag: String,
    pub module: String,
    pub list: ListType,
    pub value_type: ValueType,
    pub match_output: Option<JsonValue>,
    /// Exemption reason. Present means the rule is reported as Controlled and never probed.
    pub control: Option<String>,
    pub description: Option<String>,
    /// The full layered record, used for verbose output.
    pub record: Metadata,
}

/// Tag-indexed rules. Several rules may share a tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registry {
    rules: BTreeMap<String, Vec<ResolvedRule>>,
}

impl Registry {
    pub fn insert(&mut self, tag: String, rule: ResolvedRule) {
        self.rules.entry(tag).or_default().push(rule);
    }

    pub fn get(&self, tag: &str) -> &[ResolvedRule] {
        self.rules.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ResolvedRule])> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Total number of rules across all tags.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
