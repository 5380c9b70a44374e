use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The input does not have the shape of a rule document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("rule document must be a mapping of module namespaces, found {found}")]
    NotAMapping { found: &'static str },

    #[error("{namespace}:{list} must be a mapping or list of rule groups, found {found}")]
    InvalidList {
        namespace: String,
        list: &'static str,
        found: &'static str,
    },

    #[error("{namespace}:{group}: {reason}")]
    InvalidGroup {
        namespace: String,
        group: String,
        reason: String,
    },
}

/// One selected rule variant that could not be turned into a complete rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedRule {
    pub module: String,
    pub group: String,
    pub name: Option<String>,
    pub reason: String,
}

impl fmt::Display for MalformedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}:{}: {}", self.module, self.group, name, self.reason),
            None => write!(f, "{}:{}: {}", self.module, self.group, self.reason),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("malformed rule input: {}", join(.0))]
    Malformed(Vec<MalformedRule>),
}

fn join(rules: &[MalformedRule]) -> String {
    rules
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A probe could not produce a value. Always recovered by the evaluator.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no probe registered for module '{0}'")]
    Unsupported(String),

    #[error("command `{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("could not parse probe output: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
