pub mod client;
pub mod types;

pub use client::{AnalysisBackend, ApiClient, CHAT_PATH};
pub use types::{StlcResult, SubmissionPayload};
