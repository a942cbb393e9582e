//! Wire types for the `/chat` endpoint

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::state::input::InputState;

/// Request body, snapshotted from the input fields at submit time.
///
/// Optional fields serialize as `null` (never omitted) when left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub requirements: String,
    pub user_stories: Option<String>,
    pub code_diffs: Option<String>,
    pub previous_test_results: Option<String>,
}

impl SubmissionPayload {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            requirements: input.requirements.clone(),
            user_stories: non_empty(&input.user_stories),
            code_diffs: non_empty(&input.code_diffs),
            previous_test_results: non_empty(&input.previous_test_results),
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// The analysis object held under `response` in a successful answer.
///
/// Kept as raw JSON: sections are picked out by path at render time, and
/// anything that is not an object counts as an empty result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StlcResult(Map<String, Value>);

impl StlcResult {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Pull the `response` field out of a full success body
    pub fn from_body(body: &Value) -> Self {
        body.get("response")
            .cloned()
            .map(Self::from_value)
            .unwrap_or_default()
    }

    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for key in rest {
            current = current.get(*key)?;
        }
        Some(current)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Extract a human-readable message from an error body.
///
/// `detail` is usually a string; FastAPI validation errors send a list,
/// which is passed through as compact JSON.
pub fn detail_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    match parsed.get("detail")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
