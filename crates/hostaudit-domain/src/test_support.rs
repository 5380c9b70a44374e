use crate::document::parse_document;
use crate::error::ProbeError;
use crate::model::{Registry, RuleDocument, SystemValue};
use crate::probe::Probe;
use crate::resolve::resolve;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A probe returning canned values per rule name and recording every call.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    values: BTreeMap<String, Result<SystemValue, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, name: &str, value: impl Into<SystemValue>) -> Self {
        self.values.insert(name.to_string(), Ok(value.into()));
        self
    }

    pub fn failing(mut self, name: &str, reason: &str) -> Self {
        self.values.insert(name.to_string(), Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Probe for ScriptedProbe {
    fn system_value(&self, name: &str) -> Result<SystemValue, ProbeError> {
        self.calls.lock().expect("calls lock").push(name.to_string());
        match self.values.get(name) {
            Some(Ok(v)) => Ok(v.clone()),
            Some(Err(reason)) => Err(ProbeError::Command {
                command: format!("scripted {name}"),
                reason: reason.clone(),
            }),
            None => Ok(SystemValue::Absent),
        }
    }
}

pub fn document(value: JsonValue) -> RuleDocument {
    parse_document(&value).expect("valid rule document")
}

pub fn registry(value: JsonValue, host: &str) -> Registry {
    resolve(&document(value), host).expect("resolvable rule document")
}
