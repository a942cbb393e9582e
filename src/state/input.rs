//! The four free-text input fields

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Requirements,
    UserStories,
    CodeDiffs,
    PreviousTestResults,
}

impl Field {
    pub fn all() -> [Field; 4] {
        [
            Field::Requirements,
            Field::UserStories,
            Field::CodeDiffs,
            Field::PreviousTestResults,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Requirements => "Software Requirements",
            Field::UserStories => "User Stories (Optional)",
            Field::CodeDiffs => "Code Diffs (Optional)",
            Field::PreviousTestResults => "Previous Test Results (Optional)",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Requirements => write!(f, "requirements"),
            Field::UserStories => write!(f, "user_stories"),
            Field::CodeDiffs => write!(f, "code_diffs"),
            Field::PreviousTestResults => write!(f, "previous_test_results"),
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "requirements" | "req" => Ok(Field::Requirements),
            "user_stories" | "stories" => Ok(Field::UserStories),
            "code_diffs" | "diffs" => Ok(Field::CodeDiffs),
            "previous_test_results" | "previous" => Ok(Field::PreviousTestResults),
            other => Err(format!("Unknown field: {}", other)),
        }
    }
}

/// Current contents of the input fields. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub requirements: String,
    pub user_stories: String,
    pub code_diffs: String,
    pub previous_test_results: String,
}

impl InputState {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Requirements => &self.requirements,
            Field::UserStories => &self.user_stories,
            Field::CodeDiffs => &self.code_diffs,
            Field::PreviousTestResults => &self.previous_test_results,
        }
    }

    /// Replace the whole value of `field`
    pub fn set(&mut self, field: Field, text: String) {
        let slot = match field {
            Field::Requirements => &mut self.requirements,
            Field::UserStories => &mut self.user_stories,
            Field::CodeDiffs => &mut self.code_diffs,
            Field::PreviousTestResults => &mut self.previous_test_results,
        };
        *slot = text;
    }

    /// Only the empty string blocks submission; whitespace counts as input.
    pub fn has_requirements(&self) -> bool {
        !self.requirements.is_empty()
    }
}
