//! Request lifecycle and the reducer that drives it
//!
//! All state changes go through [`reduce`]. Side effects (the network
//! call) are returned as [`Effect`]s for the caller to run, which keeps
//! the transitions testable without a runtime.

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::api::types::{StlcResult, SubmissionPayload};
use crate::state::input::{Field, InputState};
use crate::utils::error::InputError;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestLifecycle {
    #[default]
    Idle,
    Loading,
    Success(StlcResult),
    Failure(String),
}

impl RequestLifecycle {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestLifecycle::Loading)
    }

    pub fn result(&self) -> Option<&StlcResult> {
        match self {
            RequestLifecycle::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestLifecycle::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RequestLifecycle::Idle => "idle",
            RequestLifecycle::Loading => "loading",
            RequestLifecycle::Success(_) => "success",
            RequestLifecycle::Failure(_) => "failure",
        }
    }
}

/// Everything the front end renders from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub input: InputState,
    pub lifecycle: RequestLifecycle,
    /// Import error raised while a request was in flight, or a refused
    /// second import
    pub notice: Option<String>,
    pub last_submitted_at: Option<DateTime<Local>>,
}

impl AppState {
    /// Whether the submit trigger is enabled
    pub fn can_submit(&self) -> bool {
        self.input.has_requirements() && !self.lifecycle.is_loading()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    UpdateField { field: Field, text: String },
    FileImported(String),
    FileImportFailed(InputError),
    Submit,
    RequestSucceeded(StlcResult),
    RequestFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send this payload to the analysis endpoint
    Dispatch(SubmissionPayload),
}

pub fn reduce(state: &mut AppState, action: Action) -> Vec<Effect> {
    match action {
        Action::UpdateField { field, text } => {
            state.input.set(field, text);
            Vec::new()
        }
        Action::FileImported(text) => {
            debug!(bytes = text.len(), "requirements replaced from file");
            state.input.set(Field::Requirements, text);
            state.notice = None;
            Vec::new()
        }
        Action::FileImportFailed(err) => {
            let message = err.to_string();
            // a refused second import leaves the current outcome in place
            let busy = matches!(err, InputError::ImportInProgress);
            if busy || state.lifecycle.is_loading() {
                state.notice = Some(message);
            } else {
                state.lifecycle = RequestLifecycle::Failure(message);
            }
            Vec::new()
        }
        Action::Submit => {
            if !state.can_submit() {
                debug!(
                    lifecycle = state.lifecycle.name(),
                    "submit ignored while trigger is disabled"
                );
                return Vec::new();
            }
            state.lifecycle = RequestLifecycle::Loading;
            state.notice = None;
            state.last_submitted_at = Some(Local::now());
            vec![Effect::Dispatch(SubmissionPayload::from_input(&state.input))]
        }
        Action::RequestSucceeded(result) => {
            if !finish_request(state) {
                return Vec::new();
            }
            state.lifecycle = RequestLifecycle::Success(result);
            Vec::new()
        }
        Action::RequestFailed(message) => {
            if !finish_request(state) {
                return Vec::new();
            }
            state.lifecycle = RequestLifecycle::Failure(message);
            Vec::new()
        }
    }
}

fn finish_request(state: &AppState) -> bool {
    if state.lifecycle.is_loading() {
        true
    } else {
        warn!(
            lifecycle = state.lifecycle.name(),
            "dropping request outcome with no request in flight"
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn with_requirements(text: &str) -> AppState {
        let mut state = AppState::default();
        reduce(
            &mut state,
            Action::UpdateField {
                field: Field::Requirements,
                text: text.to_string(),
            },
        );
        state
    }

    fn result(value: serde_json::Value) -> StlcResult {
        StlcResult::from_value(value)
    }

    #[test]
    fn test_submit_with_empty_requirements_is_noop() {
        let mut state = AppState::default();
        reduce(
            &mut state,
            Action::UpdateField {
                field: Field::UserStories,
                text: "As a user".to_string(),
            },
        );
        let before = state.clone();

        let effects = reduce(&mut state, Action::Submit);

        assert!(effects.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_submit_enters_loading_and_dispatches_snapshot() {
        let mut state = with_requirements("Login page must support SSO");

        let effects = reduce(&mut state, Action::Submit);

        assert_eq!(state.lifecycle, RequestLifecycle::Loading);
        assert!(state.last_submitted_at.is_some());
        assert_eq!(
            effects,
            vec![Effect::Dispatch(SubmissionPayload {
                requirements: "Login page must support SSO".to_string(),
                user_stories: None,
                code_diffs: None,
                previous_test_results: None,
            })]
        );
    }

    #[test]
    fn test_edits_after_submit_do_not_change_dispatched_payload() {
        let mut state = with_requirements("v1");
        let effects = reduce(&mut state, Action::Submit);
        reduce(
            &mut state,
            Action::UpdateField {
                field: Field::Requirements,
                text: "v2".to_string(),
            },
        );

        assert_matches!(&effects[0], Effect::Dispatch(p) if p.requirements == "v1");
        assert_eq!(state.input.requirements, "v2");
    }

    #[test]
    fn test_second_submit_while_loading_is_ignored() {
        let mut state = with_requirements("R");
        assert_eq!(reduce(&mut state, Action::Submit).len(), 1);
        assert!(reduce(&mut state, Action::Submit).is_empty());
        assert!(!state.can_submit());
    }

    #[test]
    fn test_submit_clears_previous_outcome() {
        let mut state = with_requirements("R");
        state.lifecycle = RequestLifecycle::Failure("old".to_string());

        reduce(&mut state, Action::Submit);
        assert_eq!(state.lifecycle, RequestLifecycle::Loading);

        reduce(&mut state, Action::RequestSucceeded(result(json!({"a": 1}))));
        reduce(&mut state, Action::Submit);
        assert_eq!(state.lifecycle, RequestLifecycle::Loading);
        assert!(state.lifecycle.result().is_none());
    }

    #[test]
    fn test_loading_resolves_to_success_or_failure() {
        let mut state = with_requirements("R");
        reduce(&mut state, Action::Submit);
        reduce(&mut state, Action::RequestSucceeded(StlcResult::default()));
        assert_eq!(state.lifecycle, RequestLifecycle::Success(StlcResult::default()));
        assert!(state.can_submit());

        reduce(&mut state, Action::Submit);
        reduce(&mut state, Action::RequestFailed("model timeout".to_string()));
        assert_eq!(state.lifecycle.error(), Some("model timeout"));
        assert!(state.can_submit());
    }

    #[test]
    fn test_outcome_without_request_in_flight_is_dropped() {
        let mut state = with_requirements("R");
        reduce(&mut state, Action::RequestFailed("stray".to_string()));
        assert_eq!(state.lifecycle, RequestLifecycle::Idle);
    }

    #[test]
    fn test_file_import_overwrites_requirements() {
        let mut state = with_requirements("typed text");
        reduce(&mut state, Action::FileImported("from file".to_string()));
        assert_eq!(state.input.requirements, "from file");
    }

    #[test]
    fn test_file_import_failure_supersedes_outcome_when_idle() {
        let mut state = with_requirements("keep me");
        state.lifecycle = RequestLifecycle::Success(result(json!({"x": {}})));

        reduce(
            &mut state,
            Action::FileImportFailed(InputError::UnsupportedFileType {
                name: "notes.md".to_string(),
                media_type: Some("text/markdown".to_string()),
            }),
        );

        assert_eq!(state.input.requirements, "keep me");
        assert_eq!(
            state.lifecycle.error(),
            Some("Please upload a valid text file (.txt)")
        );
    }

    #[test]
    fn test_file_import_failure_while_loading_keeps_lock() {
        let mut state = with_requirements("R");
        reduce(&mut state, Action::Submit);

        reduce(
            &mut state,
            Action::FileImportFailed(InputError::FileRead {
                name: "req.txt".to_string(),
                reason: "io".to_string(),
            }),
        );

        assert!(state.lifecycle.is_loading());
        assert_eq!(
            state.notice.as_deref(),
            Some("Failed to read file. Please try again.")
        );
    }

    #[test]
    fn test_import_in_progress_never_touches_lifecycle() {
        let mut state = with_requirements("R");
        let success = RequestLifecycle::Success(result(json!({"a": 1})));
        state.lifecycle = success.clone();

        reduce(&mut state, Action::FileImportFailed(InputError::ImportInProgress));

        assert_eq!(state.lifecycle, success);
        assert_eq!(
            state.notice.as_deref(),
            Some("A file import is already in progress")
        );
    }
}
