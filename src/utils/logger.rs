//! File-backed tracing setup
//!
//! Logs go to `~/.qa-assist/logs/latest.log` so they never interleave with
//! the interactive prompt. `RUST_LOG` overrides the default filter.

use anyhow::Result;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::config::Config;

pub fn log_dir() -> PathBuf {
    Config::app_dir().join("logs")
}

fn default_filter(debug: bool) -> &'static str {
    if debug {
        "qa_assist_cli=debug"
    } else {
        "qa_assist_cli=info"
    }
}

/// Install the global subscriber writing into `dir/latest.log`
pub fn init_logger_in(dir: &Path, debug: bool) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let log_path = dir.join("latest.log");
    let file = File::create(&log_path)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    Ok(log_path)
}

pub fn init_global_logger(debug: bool) -> Result<PathBuf> {
    init_logger_in(&log_dir(), debug)
}
