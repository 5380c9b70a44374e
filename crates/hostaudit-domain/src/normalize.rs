//! Turning raw probed values into comparable forms.

use crate::model::{SystemValue, ValueType};
use hostaudit_types::ids;
use serde_json::Value as JsonValue;

/// A probed value after normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum Normalized {
    /// Two-state value (`binary`).
    Flag(bool),
    /// Multi-state audit label (`multi`).
    Label(&'static str),
    /// Result of an ordered comparison against `match_output`.
    Compared(bool),
    /// Untouched value (no `value_type`).
    Raw(SystemValue),
}

impl Normalized {
    pub fn is_truthy(&self) -> bool {
        match self {
            Normalized::Flag(b) | Normalized::Compared(b) => *b,
            Normalized::Label(s) => !s.is_empty(),
            Normalized::Raw(raw) => match raw {
                SystemValue::Absent => false,
                SystemValue::Bool(b) => *b,
                SystemValue::Int(i) => *i != 0,
                SystemValue::Text(s) => !s.is_empty(),
            },
        }
    }

    /// Does this value contain or equal `expected`?
    ///
    /// Ordered comparisons already consumed `expected` as their operand.
    pub fn satisfies(&self, expected: &JsonValue) -> bool {
        match self {
            Normalized::Compared(_) => true,
            Normalized::Flag(b) => expected_flag(expected) == Some(*b),
            Normalized::Label(s) => s.contains(expected_text(expected).as_str()),
            Normalized::Raw(raw) => match raw {
                SystemValue::Absent => false,
                SystemValue::Bool(b) => expected_flag(expected) == Some(*b),
                SystemValue::Int(i) => match json_number(expected) {
                    Some(n) => n == *i as f64,
                    None => i.to_string() == expected_text(expected),
                },
                SystemValue::Text(s) => s.contains(expected_text(expected).as_str()),
            },
        }
    }

    /// JSON form for verbose report records.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Normalized::Flag(b) | Normalized::Compared(b) => JsonValue::Bool(*b),
            Normalized::Label(s) => JsonValue::String((*s).to_string()),
            Normalized::Raw(raw) => raw.to_json(),
        }
    }
}

pub fn normalize(
    value_type: ValueType,
    raw: &SystemValue,
    match_output: Option<&JsonValue>,
) -> Normalized {
    match value_type {
        ValueType::Raw => Normalized::Raw(raw.clone()),
        ValueType::Binary => Normalized::Flag(binary(raw)),
        ValueType::Multi => Normalized::Label(multi(raw)),
        ValueType::LessThan | ValueType::MoreThan | ValueType::Equal => {
            Normalized::Compared(compare(value_type, raw, match_output))
        }
    }
}

pub fn binary(raw: &SystemValue) -> bool {
    match raw {
        SystemValue::Absent => false,
        SystemValue::Bool(b) => *b,
        SystemValue::Int(i) => *i != 0,
        SystemValue::Text(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "enabled" | "on"
        ),
    }
}

/// Audit setting code (0-3) -> label.
pub fn multi(raw: &SystemValue) -> &'static str {
    let code = match raw {
        SystemValue::Absent => return ids::MULTI_NOT_DEFINED,
        SystemValue::Int(i) => *i,
        SystemValue::Text(s) => match s.trim().parse::<i64>() {
            Ok(i) => i,
            Err(_) => return ids::MULTI_INVALID,
        },
        SystemValue::Bool(_) => return ids::MULTI_INVALID,
    };
    match code {
        0 => ids::MULTI_NO_AUDITING,
        1 => ids::MULTI_SUCCESS,
        2 => ids::MULTI_FAILURE,
        3 => ids::MULTI_SUCCESS_FAILURE,
        _ => ids::MULTI_INVALID,
    }
}

fn compare(op: ValueType, raw: &SystemValue, operand: Option<&JsonValue>) -> bool {
    let Some(operand) = operand else {
        return false;
    };
    let lhs = raw_number(raw);
    let rhs = json_number(operand);

    match (op, lhs, rhs) {
        (ValueType::LessThan, Some(l), Some(r)) => l < r,
        (ValueType::MoreThan, Some(l), Some(r)) => l > r,
        (ValueType::Equal, Some(l), Some(r)) => l == r,
        (ValueType::Equal, _, _) => match raw {
            SystemValue::Absent => false,
            SystemValue::Text(s) => *s == expected_text(operand),
            SystemValue::Bool(b) => expected_flag(operand) == Some(*b),
            SystemValue::Int(i) => i.to_string() == expected_text(operand),
        },
        _ => false,
    }
}

fn raw_number(raw: &SystemValue) -> Option<f64> {
    match raw {
        SystemValue::Int(i) => Some(*i as f64),
        SystemValue::Text(s) => s.trim().parse().ok(),
        SystemValue::Absent | SystemValue::Bool(_) => None,
    }
}

fn json_number(v: &JsonValue) -> Option<f64> {
    match v {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn expected_text(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn expected_flag(v: &JsonValue) -> Option<bool> {
    match v {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::Number(n) => n.as_i64().map(|i| i != 0),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "enabled" | "1" => Some(true),
            "false" | "no" | "disabled" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
