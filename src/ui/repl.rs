//! Interactive prompt
//!
//! Slash commands edit the fields and trigger submissions; any other line
//! is appended to the requirements.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use std::time::Duration;

use crate::api::types::SubmissionPayload;
use crate::app::{App, Completion};
use crate::state::{Field, FileHandle};
use crate::ui::output::OutputHandler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set(Field, String),
    Import(String),
    Submit,
    Status,
    Show,
    Payload,
    Help,
    Quit,
    /// Plain text, appended to the requirements
    Text(String),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Some(Command::Text(line.trim_end().to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim().to_string()),
            None => (rest, String::new()),
        };

        let command = match name.to_lowercase().as_str() {
            "requirements" | "req" => Command::Set(Field::Requirements, arg),
            "stories" => Command::Set(Field::UserStories, arg),
            "diffs" => Command::Set(Field::CodeDiffs, arg),
            "previous" => Command::Set(Field::PreviousTestResults, arg),
            "import" if !arg.is_empty() => Command::Import(arg),
            "submit" | "run" => Command::Submit,
            "status" => Command::Status,
            "show" => Command::Show,
            "payload" => Command::Payload,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(trimmed.to_string()),
        };
        Some(command)
    }

    pub fn help() -> &'static [(&'static str, &'static str)] {
        &[
            ("/requirements <text>", "Set software requirements (no text clears)"),
            ("/stories <text>", "Set user stories"),
            ("/diffs <text>", "Set code diffs"),
            ("/previous <text>", "Set previous test results"),
            ("/import <path>", "Load requirements from a .txt file"),
            ("/submit", "Start the STLC process"),
            ("/status", "Show fields and request status"),
            ("/show", "Show the last result or error again"),
            ("/payload", "Preview the request body"),
            ("/help", "Show this help"),
            ("/quit", "Exit"),
        ]
    }
}

pub struct Repl {
    app: App,
    output: OutputHandler,
}

impl Repl {
    pub fn new(app: App, output: OutputHandler) -> Self {
        Self { app, output }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut line_editor = Reedline::create();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("qa-assist".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.output.print_system("Type /help for commands. Plain text is appended to the requirements.")?;

        loop {
            // a finished import or request is reported before the next prompt
            for completion in self.app.poll_nonblocking() {
                self.report(&completion)?;
            }

            match line_editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let Some(command) = Command::parse(&line) else {
                        continue;
                    };
                    if !self.handle(command).await? {
                        break;
                    }
                }
                // Ctrl+C / Ctrl+D
                _ => break,
            }
        }

        Ok(())
    }

    /// Returns false when the session should end
    async fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Set(field, text) => {
                let cleared = text.is_empty();
                self.app.update_field(field, text);
                if cleared {
                    self.output.print_system(&format!("{} cleared", field.label()))?;
                }
            }
            Command::Text(line) => self.app.append_requirements_line(&line),
            Command::Import(path) => {
                if self.app.import_file(FileHandle::from_path(&path)) {
                    if let Some(completion) = self.app.wait_for_import().await {
                        self.report(&completion)?;
                    }
                } else {
                    self.output.print_outcome(self.app.state())?;
                }
            }
            Command::Submit => self.submit().await?,
            Command::Status => self.output.print_status(self.app.state())?,
            Command::Show => self.output.print_outcome(self.app.state())?,
            Command::Payload => {
                let payload = SubmissionPayload::from_input(&self.app.state().input);
                self.output.print_payload(&payload)?;
            }
            Command::Help => {
                for (usage, description) in Command::help() {
                    self.output.print_info(&format!("{:<24} {}", usage, description))?;
                }
            }
            Command::Unknown(input) => {
                self.output.print_system(&format!("Unknown command: {} (try /help)", input))?;
            }
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    async fn submit(&mut self) -> Result<()> {
        let state = self.app.state();
        if !state.input.has_requirements() {
            self.output.print_system("Submit is disabled: requirements are empty")?;
            return Ok(());
        }
        if state.lifecycle.is_loading() {
            self.output.print_system("Submit is disabled: a request is already running")?;
            return Ok(());
        }
        if self.app.config.ui.show_payload {
            let payload = SubmissionPayload::from_input(&state.input);
            self.output.print_payload(&payload)?;
        }

        if !self.app.submit() {
            return Ok(());
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Running STLC...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let completion = self.app.wait_for_request().await;
        spinner.finish_and_clear();

        if let Some(completion) = completion {
            self.report(&completion)?;
        }
        Ok(())
    }

    fn report(&mut self, completion: &Completion) -> Result<()> {
        match completion {
            Completion::Request(_) => self.output.print_outcome(self.app.state())?,
            Completion::Import(Ok(())) => {
                let lines = self.app.state().input.requirements.lines().count();
                self.output
                    .print_info(&format!("Requirements loaded from file ({} lines)", lines))?;
            }
            Completion::Import(Err(message)) => self.output.print_error(message)?,
        }
        Ok(())
    }
}
