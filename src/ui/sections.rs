//! Mapping from an STLC result to display sections
//!
//! The table below is the single source of truth for which sections exist,
//! where each one lives in the response, and in what order they show up.
//! Adding a section means adding a row.

use serde_json::Value;

use crate::api::types::StlcResult;
use crate::state::lifecycle::{AppState, RequestLifecycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// A string field shown verbatim
    Text,
    /// Any JSON value, pretty-printed with two-space indentation
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    pub title: &'static str,
    pub path: &'static [&'static str],
    pub kind: SectionKind,
}

/// Sections in canonical STLC stage order
pub const STLC_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        title: "Test Cases",
        path: &["test_case_generation", "test_cases"],
        kind: SectionKind::Text,
    },
    SectionSpec {
        title: "Test Data",
        path: &["test_data_generation", "test_data"],
        kind: SectionKind::Text,
    },
    SectionSpec {
        title: "Automated Scripts",
        path: &["test_script_automation", "automated_scripts"],
        kind: SectionKind::Text,
    },
    SectionSpec {
        title: "Change Impact Analysis",
        path: &["change_impact_analysis", "change_impact_analysis"],
        kind: SectionKind::Json,
    },
    SectionSpec {
        title: "Bug Reports",
        path: &["bug_report_generation", "structured_bug_reports"],
        kind: SectionKind::Text,
    },
    SectionSpec {
        title: "Simulated Execution Results",
        path: &["simulate_test_execution", "simulated_execution_results"],
        kind: SectionKind::Text,
    },
    SectionSpec {
        title: "Test Summary Report",
        path: &["test_summary_reporting", "test_summary_report"],
        kind: SectionKind::Text,
    },
    SectionSpec {
        title: "Release Readiness",
        path: &["release_readiness_advisory", "release_readiness_advice"],
        kind: SectionKind::Text,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub title: &'static str,
    pub body: String,
}

impl SectionSpec {
    pub fn extract(&self, result: &StlcResult) -> Option<String> {
        let value = result.lookup(self.path)?;
        match (self.kind, value) {
            (_, Value::Null) => None,
            (SectionKind::Text, Value::String(text)) if !text.is_empty() => Some(text.clone()),
            (SectionKind::Text, _) => None,
            (SectionKind::Json, value) => serde_json::to_string_pretty(value).ok(),
        }
    }
}

/// Sections present in `result`, in table order
pub fn project(result: &StlcResult) -> Vec<RenderedSection> {
    STLC_SECTIONS
        .iter()
        .filter_map(|spec| {
            spec.extract(result).map(|body| RenderedSection {
                title: spec.title,
                body,
            })
        })
        .collect()
}

/// What the screen shows for a given state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View<'a> {
    Idle,
    Loading,
    Results(Vec<RenderedSection>),
    Error(&'a str),
}

pub fn view(state: &AppState) -> View<'_> {
    match &state.lifecycle {
        RequestLifecycle::Idle => View::Idle,
        RequestLifecycle::Loading => View::Loading,
        RequestLifecycle::Success(result) => View::Results(project(result)),
        RequestLifecycle::Failure(message) => View::Error(message),
    }
}
