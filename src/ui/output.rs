use console::style;
use std::io::{self, Write};

use crate::api::types::SubmissionPayload;
use crate::state::input::Field;
use crate::state::lifecycle::AppState;
use crate::ui::sections::{view, RenderedSection, View};

/// Longest field preview shown by `/status`
const PREVIEW_CHARS: usize = 60;

pub struct OutputHandler<W: Write = io::Stdout> {
    out: W,
    verbose: bool,
}

impl OutputHandler {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> OutputHandler<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn print_banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", style("╔═══════════════════════════════════════╗").cyan().bold())?;
        writeln!(self.out, "{}", style("║       Quality Assistant Agent         ║").cyan().bold())?;
        writeln!(self.out, "{}", style("║  Driving Intelligent Test Automation  ║").cyan().bold())?;
        writeln!(self.out, "{}", style("╚═══════════════════════════════════════╝").cyan().bold())?;
        Ok(())
    }

    pub fn print_system(&mut self, content: &str) -> io::Result<()> {
        writeln!(self.out, "{}", style(content).yellow().dim())
    }

    pub fn print_info(&mut self, content: &str) -> io::Result<()> {
        writeln!(self.out, "{}", style(content).green())
    }

    pub fn print_error(&mut self, content: &str) -> io::Result<()> {
        writeln!(self.out, "{}", style("Error:").red().bold())?;
        writeln!(self.out, "{}", content)
    }

    pub fn print_sections(&mut self, sections: &[RenderedSection]) -> io::Result<()> {
        writeln!(self.out, "{}", style("STLC Results").cyan().bold().underlined())?;
        if sections.is_empty() && self.verbose {
            writeln!(self.out, "{}", style("(the service returned no sections)").dim())?;
        }
        for section in sections {
            writeln!(self.out)?;
            writeln!(self.out, "{}", style(format!("{}:", section.title)).green().bold())?;
            writeln!(self.out, "{}", section.body)?;
        }
        Ok(())
    }

    /// Render the current outcome: results, an error, or nothing
    pub fn print_outcome(&mut self, state: &AppState) -> io::Result<()> {
        match view(state) {
            View::Idle => Ok(()),
            View::Loading => self.print_system("Running STLC..."),
            View::Results(sections) => self.print_sections(&sections),
            View::Error(message) => self.print_error(message),
        }
    }

    pub fn print_status(&mut self, state: &AppState) -> io::Result<()> {
        for field in Field::all() {
            let value = state.input.get(field);
            let summary = if value.is_empty() {
                style("(empty)".to_string()).dim()
            } else {
                style(preview(value))
            };
            writeln!(self.out, "{} {}", style(format!("{}:", field.label())).cyan(), summary)?;
        }

        let trigger = if state.can_submit() { "enabled" } else { "disabled" };
        writeln!(
            self.out,
            "{} {} (submit {})",
            style("Status:").cyan(),
            state.lifecycle.name(),
            trigger
        )?;
        if let Some(at) = state.last_submitted_at {
            writeln!(
                self.out,
                "{} {}",
                style("Last submitted:").cyan(),
                at.format("%Y-%m-%d %H:%M:%S")
            )?;
        }
        if let Some(notice) = &state.notice {
            writeln!(self.out, "{} {}", style("Notice:").yellow().bold(), notice)?;
        }
        Ok(())
    }

    pub fn print_payload(&mut self, payload: &SubmissionPayload) -> io::Result<()> {
        let json = serde_json::to_string_pretty(payload).map_err(io::Error::other)?;
        writeln!(self.out, "{}", style("Payload:").cyan())?;
        writeln!(self.out, "{}", style(json).dim())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    let lines = text.lines().count();
    let mut shown: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if first_line.chars().count() > PREVIEW_CHARS {
        shown.push_str("...");
    }
    if lines > 1 {
        shown.push_str(&format!(" (+{} more lines)", lines - 1));
    }
    shown
}
