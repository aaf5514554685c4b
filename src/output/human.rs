#![forbid(unsafe_code)]

//! Human-readable diagnostics with colorization support

use std::error::Error;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes help text and error reports for a terminal
pub struct HumanReporter {
    color_choice: ColorChoice,
}

impl HumanReporter {
    /// Creates a new HumanReporter with the specified color choice
    pub fn new(color_choice: ColorChoice) -> Self {
        HumanReporter { color_choice }
    }

    /// Formats an error and its causes without colors
    ///
    /// Causes already spelled out in a parent message are not repeated.
    pub fn format_error(&self, err: &dyn Error) -> String {
        let mut output = format!("error: {err}\n");
        let mut shown = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !shown.contains(&text) {
                output.push_str(&format!("  caused by: {text}\n"));
                shown = text;
            }
            source = cause.source();
        }
        output
    }

    /// Writes an error report to stderr, with a red `error:` label
    pub fn write_error_to_stderr(&self, err: &dyn Error) -> io::Result<()> {
        let mut stderr = StandardStream::stderr(self.color_choice);
        self.write_error(&mut stderr, err)
    }

    /// Writes an error report to any color-aware writer
    pub fn write_error(&self, out: &mut dyn WriteColor, err: &dyn Error) -> io::Result<()> {
        let text = self.format_error(err);
        let body = text.strip_prefix("error:").unwrap_or(&text);

        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(out, "error:")?;
        out.reset()?;
        write!(out, "{body}")?;
        out.flush()
    }

    /// Writes help text to stdout
    pub fn write_help_to_stdout(&self, help: &str) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice);
        write!(stdout, "{help}")?;
        stdout.flush()
    }
}
