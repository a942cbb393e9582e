// Library exports for the QA Assist client

pub mod api;
pub mod app;
pub mod cli_commands;
pub mod state;
pub mod ui;
pub mod utils;

pub use api::{AnalysisBackend, ApiClient, StlcResult, SubmissionPayload};
pub use app::{App, Completion};
pub use state::{reduce, Action, AppState, Effect, Field, FileHandle, InputState, RequestLifecycle};
pub use ui::output::OutputHandler;
pub use ui::sections::{project, view, RenderedSection, View, STLC_SECTIONS};
pub use utils::config::{Config, DEFAULT_BACKEND_URL};
pub use utils::error::{ApiError, InputError, GENERIC_FAILURE_MESSAGE};
