use anyhow::Result;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::api::{AnalysisBackend, ApiClient, StlcResult};
use crate::state::{reduce, Action, AppState, Effect, Field, FileHandle};
use crate::state::file_import;
use crate::utils::config::Config;
use crate::utils::error::{ApiError, InputError};

/// A background operation that finished and was applied to the state
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Request(Result<(), String>),
    Import(Result<(), String>),
}

/// Owns the state and runs the effects the reducer asks for.
///
/// Background tasks never touch the state; each reports through its own
/// oneshot channel and the result is applied by whoever polls the app.
pub struct App {
    pub config: Config,
    state: AppState,
    backend: Arc<dyn AnalysisBackend>,
    pending_request: Option<oneshot::Receiver<Result<StlcResult, ApiError>>>,
    pending_import: Option<oneshot::Receiver<Result<String, InputError>>>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(config.backend.url.clone())?;
        Ok(Self::with_backend(config, Arc::new(client)))
    }

    pub fn with_backend(config: Config, backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            config,
            state: AppState::default(),
            backend,
            pending_request: None,
            pending_import: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_request_pending(&self) -> bool {
        self.pending_request.is_some()
    }

    pub fn is_import_pending(&self) -> bool {
        self.pending_import.is_some()
    }

    pub fn update_field(&mut self, field: Field, text: impl Into<String>) {
        self.apply(Action::UpdateField {
            field,
            text: text.into(),
        });
    }

    /// Append a line to requirements (plain text typed at the prompt)
    pub fn append_requirements_line(&mut self, line: &str) {
        let mut text = self.state.input.requirements.clone();
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(line);
        self.update_field(Field::Requirements, text);
    }

    /// Start reading `file` into requirements.
    ///
    /// Unsupported files are rejected immediately. Returns whether a read
    /// was started.
    pub fn import_file(&mut self, file: FileHandle) -> bool {
        if self.pending_import.is_some() {
            self.apply(Action::FileImportFailed(InputError::ImportInProgress));
            return false;
        }
        if let Err(err) = file.check_supported() {
            info!(name = %file.name, media_type = ?file.media_type, "rejected file import");
            self.apply(Action::FileImportFailed(err));
            return false;
        }

        let (tx, rx) = oneshot::channel();
        self.pending_import = Some(rx);
        tokio::spawn(async move {
            let _ = tx.send(file_import::read_text(&file).await);
        });
        true
    }

    /// Trigger a submission. Returns whether a request was dispatched.
    pub fn submit(&mut self) -> bool {
        let mut dispatched = false;
        for effect in self.apply(Action::Submit) {
            match effect {
                Effect::Dispatch(payload) => {
                    info!(
                        user_stories = payload.user_stories.is_some(),
                        code_diffs = payload.code_diffs.is_some(),
                        previous_test_results = payload.previous_test_results.is_some(),
                        "submitting STLC request"
                    );
                    let backend = Arc::clone(&self.backend);
                    let (tx, rx) = oneshot::channel();
                    self.pending_request = Some(rx);
                    tokio::spawn(async move {
                        let _ = tx.send(backend.analyze(payload).await);
                    });
                    dispatched = true;
                }
            }
        }
        dispatched
    }

    /// Apply whatever finished since the last poll, without waiting
    pub fn poll_nonblocking(&mut self) -> Vec<Completion> {
        let mut completed = Vec::new();

        if let Some(rx) = &mut self.pending_import {
            match rx.try_recv() {
                Ok(outcome) => {
                    self.pending_import = None;
                    completed.push(self.finish_import(outcome));
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.pending_import = None;
                    completed.push(self.finish_import(Err(InputError::FileRead {
                        name: String::new(),
                        reason: "import task ended unexpectedly".to_string(),
                    })));
                }
            }
        }

        if let Some(rx) = &mut self.pending_request {
            match rx.try_recv() {
                Ok(outcome) => {
                    self.pending_request = None;
                    completed.push(self.finish_request(outcome));
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.pending_request = None;
                    completed.push(self.finish_request(Err(ApiError::Interrupted)));
                }
            }
        }

        completed
    }

    /// Wait for the in-flight request, if any, and apply its outcome
    pub async fn wait_for_request(&mut self) -> Option<Completion> {
        let rx = self.pending_request.take()?;
        let outcome = rx.await.unwrap_or(Err(ApiError::Interrupted));
        Some(self.finish_request(outcome))
    }

    /// Wait for the pending file import, if any, and apply its outcome
    pub async fn wait_for_import(&mut self) -> Option<Completion> {
        let rx = self.pending_import.take()?;
        let outcome = rx.await.unwrap_or_else(|_| {
            Err(InputError::FileRead {
                name: String::new(),
                reason: "import task ended unexpectedly".to_string(),
            })
        });
        Some(self.finish_import(outcome))
    }

    fn finish_request(&mut self, outcome: Result<StlcResult, ApiError>) -> Completion {
        match outcome {
            Ok(result) => {
                self.apply(Action::RequestSucceeded(result));
                Completion::Request(Ok(()))
            }
            Err(err) => {
                let message = err.to_string();
                self.apply(Action::RequestFailed(message.clone()));
                Completion::Request(Err(message))
            }
        }
    }

    fn finish_import(&mut self, outcome: Result<String, InputError>) -> Completion {
        match outcome {
            Ok(text) => {
                self.apply(Action::FileImported(text));
                Completion::Import(Ok(()))
            }
            Err(err) => {
                let message = err.to_string();
                self.apply(Action::FileImportFailed(err));
                Completion::Import(Err(message))
            }
        }
    }

    fn apply(&mut self, action: Action) -> Vec<Effect> {
        let before = self.state.lifecycle.name();
        let effects = reduce(&mut self.state, action);
        let after = self.state.lifecycle.name();
        if before != after {
            debug!(from = before, to = after, "lifecycle transition");
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::MockAnalysisBackend;
    use crate::state::RequestLifecycle;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn app_with(mock: MockAnalysisBackend) -> App {
        App::with_backend(Config::default(), Arc::new(mock))
    }

    #[tokio::test]
    async fn test_submit_without_requirements_never_calls_backend() {
        let mut mock = MockAnalysisBackend::new();
        mock.expect_analyze().times(0);
        let mut app = app_with(mock);

        assert!(!app.submit());
        assert!(!app.is_request_pending());
        assert_eq!(app.state().lifecycle, RequestLifecycle::Idle);
        assert_eq!(app.wait_for_request().await, None);
    }

    #[tokio::test]
    async fn test_rapid_double_submit_dispatches_once() {
        let mut mock = MockAnalysisBackend::new();
        mock.expect_analyze()
            .times(1)
            .returning(|_| Ok(StlcResult::default()));
        let mut app = app_with(mock);
        app.update_field(Field::Requirements, "R");

        assert!(app.submit());
        assert!(!app.submit());

        let done = app.wait_for_request().await;
        assert_eq!(done, Some(Completion::Request(Ok(()))));
        assert_eq!(
            app.state().lifecycle,
            RequestLifecycle::Success(StlcResult::default())
        );
    }

    #[tokio::test]
    async fn test_backend_error_becomes_failure() {
        let mut mock = MockAnalysisBackend::new();
        mock.expect_analyze().times(1).returning(|_| {
            Err(ApiError::Request {
                status: 500,
                message: "model timeout".to_string(),
            })
        });
        let mut app = app_with(mock);
        app.update_field(Field::Requirements, "R");
        app.submit();

        let done = app.wait_for_request().await;
        assert_eq!(
            done,
            Some(Completion::Request(Err("model timeout".to_string())))
        );
        assert_eq!(app.state().lifecycle.error(), Some("model timeout"));
        assert!(app.state().can_submit());
    }

    #[tokio::test]
    async fn test_payload_passed_to_backend_nulls_empty_fields() {
        let mut mock = MockAnalysisBackend::new();
        mock.expect_analyze()
            .withf(|p| {
                p.requirements == "Login page must support SSO"
                    && p.user_stories.is_none()
                    && p.code_diffs.as_deref() == Some("+sso")
                    && p.previous_test_results.is_none()
            })
            .times(1)
            .returning(|_| {
                Ok(StlcResult::from_value(json!({
                    "test_case_generation": {"test_cases": "TC1: verify SSO redirect"}
                })))
            });
        let mut app = app_with(mock);
        app.update_field(Field::Requirements, "Login page must support SSO");
        app.update_field(Field::CodeDiffs, "+sso");
        app.submit();
        app.wait_for_request().await;

        assert!(app.state().lifecycle.result().is_some());
    }

    #[tokio::test]
    async fn test_poll_nonblocking_applies_outcome_once() {
        let mut mock = MockAnalysisBackend::new();
        mock.expect_analyze()
            .times(1)
            .returning(|_| Err(ApiError::Network("connection refused".to_string())));
        let mut app = app_with(mock);
        app.update_field(Field::Requirements, "R");
        app.submit();

        let mut completions = Vec::new();
        for _ in 0..100 {
            completions.extend(app.poll_nonblocking());
            if !app.is_request_pending() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert_eq!(
            completions,
            vec![Completion::Request(Err("connection refused".to_string()))]
        );
        assert!(app.poll_nonblocking().is_empty());
        assert!(!app.state().lifecycle.is_loading());
    }

    #[tokio::test]
    async fn test_import_replaces_requirements() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("req.txt");
        fs::write(&path, "Imported requirement").unwrap();

        let mut app = app_with(MockAnalysisBackend::new());
        app.update_field(Field::Requirements, "typed");

        assert!(app.import_file(FileHandle::from_path(&path)));
        let done = app.wait_for_import().await;

        assert_eq!(done, Some(Completion::Import(Ok(()))));
        assert_eq!(app.state().input.requirements, "Imported requirement");
    }

    #[tokio::test]
    async fn test_import_markdown_is_rejected_without_mutation() {
        let mut app = app_with(MockAnalysisBackend::new());
        app.update_field(Field::Requirements, "original");

        let started = app.import_file(FileHandle::with_media_type(
            "notes.md",
            Some("text/markdown"),
        ));

        assert!(!started);
        assert!(!app.is_import_pending());
        assert_eq!(app.state().input.requirements, "original");
        assert_eq!(
            app.state().lifecycle.error(),
            Some("Please upload a valid text file (.txt)")
        );
    }

    #[tokio::test]
    async fn test_import_read_error_leaves_requirements() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(MockAnalysisBackend::new());
        app.update_field(Field::Requirements, "original");

        assert!(app.import_file(FileHandle::from_path(dir.path().join("missing.txt"))));
        let done = app.wait_for_import().await;

        assert_eq!(
            done,
            Some(Completion::Import(Err(
                "Failed to read file. Please try again.".to_string()
            )))
        );
        assert_eq!(app.state().input.requirements, "original");
    }

    #[test]
    fn test_append_requirements_line() {
        let mut app = app_with(MockAnalysisBackend::new());
        app.append_requirements_line("first");
        app.append_requirements_line("second");
        assert_eq!(app.state().input.requirements, "first\nsecond");
    }

    #[tokio::test]
    async fn test_crashed_backend_task_releases_lock() {
        let mut mock = MockAnalysisBackend::new();
        mock.expect_analyze()
            .times(1)
            .returning(|_| panic!("backend crashed"));
        let mut app = app_with(mock);
        app.update_field(Field::Requirements, "R");
        assert!(app.submit());

        let done = app.wait_for_request().await;

        assert_eq!(
            done,
            Some(Completion::Request(Err(
                "STLC request ended unexpectedly".to_string()
            )))
        );
        assert_eq!(
            app.state().lifecycle,
            RequestLifecycle::Failure("STLC request ended unexpectedly".to_string())
        );
        assert!(app.state().can_submit());
    }

    #[tokio::test]
    async fn test_crashed_backend_task_seen_by_polling() {
        let mut mock = MockAnalysisBackend::new();
        mock.expect_analyze()
            .times(1)
            .returning(|_| panic!("backend crashed"));
        let mut app = app_with(mock);
        app.update_field(Field::Requirements, "R");
        app.submit();

        let mut completions = Vec::new();
        for _ in 0..100 {
            completions.extend(app.poll_nonblocking());
            if !app.is_request_pending() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert_eq!(
            completions,
            vec![Completion::Request(Err(
                "STLC request ended unexpectedly".to_string()
            ))]
        );
        assert_eq!(
            app.state().lifecycle.error(),
            Some("STLC request ended unexpectedly")
        );
        assert!(app.state().can_submit());
    }

    fn with_lost_import(app: &mut App) {
        let (tx, rx) = oneshot::channel::<Result<String, InputError>>();
        drop(tx);
        app.pending_import = Some(rx);
    }

    #[tokio::test]
    async fn test_lost_import_task_is_read_failure() {
        let mut app = app_with(MockAnalysisBackend::new());
        app.update_field(Field::Requirements, "original");
        with_lost_import(&mut app);

        let done = app.wait_for_import().await;

        assert_eq!(
            done,
            Some(Completion::Import(Err(
                "Failed to read file. Please try again.".to_string()
            )))
        );
        assert!(!app.is_import_pending());
        assert_eq!(app.state().input.requirements, "original");

        with_lost_import(&mut app);
        assert_eq!(
            app.poll_nonblocking(),
            vec![Completion::Import(Err(
                "Failed to read file. Please try again.".to_string()
            ))]
        );
        assert!(!app.is_import_pending());
        assert_eq!(app.state().input.requirements, "original");
    }

    #[tokio::test]
    async fn test_second_import_is_refused_without_clobbering_outcome() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("req.txt");
        fs::write(&path, "Imported requirement").unwrap();

        let mut mock = MockAnalysisBackend::new();
        mock.expect_analyze()
            .times(1)
            .returning(|_| Ok(StlcResult::from_value(json!({"a": 1}))));
        let mut app = app_with(mock);
        app.update_field(Field::Requirements, "R");
        app.submit();
        app.wait_for_request().await;
        let outcome = app.state().lifecycle.clone();
        assert!(outcome.result().is_some());

        assert!(app.import_file(FileHandle::from_path(&path)));
        assert!(!app.import_file(FileHandle::from_path(&path)));

        assert_eq!(
            app.state().notice.as_deref(),
            Some("A file import is already in progress")
        );
        assert_eq!(app.state().lifecycle, outcome);

        let done = app.wait_for_import().await;
        assert_eq!(done, Some(Completion::Import(Ok(()))));
        assert_eq!(app.state().input.requirements, "Imported requirement");
        assert_eq!(app.state().lifecycle, outcome);
    }
}
