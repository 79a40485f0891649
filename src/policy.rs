//! Decision rules applied by the router.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::integrations::types::FaqMatch;

pub const ESCALATION_COST_THRESHOLD: f64 = 5000.0;
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;
pub const FULL_CONFIDENCE_MATCHES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Escalated,
    ApprovedLocal,
}

impl DecisionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionStatus::Escalated => "escalated",
            DecisionStatus::ApprovedLocal => "approved_local",
        }
    }

    pub fn is_escalated(self) -> bool {
        matches!(self, DecisionStatus::Escalated)
    }
}

pub fn classify(cost: f64, procedure_change: bool) -> DecisionStatus {
    if cost > ESCALATION_COST_THRESHOLD || procedure_change {
        DecisionStatus::Escalated
    } else {
        DecisionStatus::ApprovedLocal
    }
}

/// Classifies a raw decision payload. Missing `cost` counts as 0 and missing
/// `procedureChange` as false.
pub fn classify_payload(payload: &Value) -> DecisionStatus {
    let cost = match payload.get("cost") {
        None | Some(Value::Null) => 0.0,
        Some(value) => coerce_number(value),
    };
    let procedure_change = payload.get("procedureChange").is_some_and(is_truthy);
    classify(cost, procedure_change)
}

/// Numeric reading of a loosely typed JSON value. Values with no numeric
/// reading become NaN, which never exceeds a threshold.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] if !single.is_object() && !single.is_array() => coerce_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `min(1, count / 5)`.
pub fn confidence_for(match_count: usize) -> f64 {
    (match_count as f64 / FULL_CONFIDENCE_MATCHES as f64).min(1.0)
}

pub fn is_confident(confidence: f64) -> bool {
    confidence >= CONFIDENCE_THRESHOLD
}

pub fn summary_prompt(matches: &[FaqMatch], question: &str) -> String {
    let page_titles = matches
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Summarize the likely answer based on these BookStack pages: {page_titles}. Question: {question}"
    )
}
