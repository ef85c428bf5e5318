//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable) with support for
//! validation errors, conformance suite reports and progress indicators.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use datatype_schemas::fixture::SuiteReport;
use datatype_schemas::{ValidationError, ValidationErrors};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing::trace;

/// Outcome of validating one data document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// File name, or `-` for stdin
    pub document: String,
    /// Datatype the document was validated against
    pub datatype: String,
    pub valid: bool,
    pub errors: ValidationErrors,
}

impl DocumentReport {
    pub fn new(
        document: impl Into<String>,
        datatype: impl Into<String>,
        errors: ValidationErrors,
    ) -> Self {
        Self {
            document: document.into(),
            datatype: datatype.into(),
            valid: errors.is_valid(),
            errors,
        }
    }
}

/// One executed suite file
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResult {
    pub path: PathBuf,
    #[serde(flatten)]
    pub report: SuiteReport,
}

/// Totals across every executed suite
#[derive(Debug, Clone, Serialize)]
pub struct TestSummary {
    pub suites: Vec<SuiteResult>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl TestSummary {
    pub fn new(suites: Vec<SuiteResult>) -> Self {
        let passed = suites.iter().map(|s| s.report.passed()).sum();
        let executed: usize = suites.iter().map(|s| s.report.outcomes.len()).sum();
        let skipped = suites.iter().map(|s| s.report.skipped).sum();
        Self {
            suites,
            passed,
            failed: executed - passed,
            skipped,
        }
    }

    /// Number of executed cases
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format validation errors with one line per error
    fn format_validation_errors(&self, errors: &ValidationErrors) -> Result<String>;

    /// Format the report of one suite, listing failing cases
    fn format_suite_report(&self, report: &SuiteReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use pretty JSON as fallback
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    fn format_validation_errors(&self, errors: &ValidationErrors) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_validation_errors_human(errors)),
            _ => self.format(errors),
        }
    }

    fn format_suite_report(&self, report: &SuiteReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_suite_report_human(report)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stderr().is_terminal(),
            quiet,
            verbose,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            verbose,
            writer,
        }
    }

    /// Turn progress indicators off regardless of the terminal
    pub fn disable_progress(&mut self) {
        self.show_progress = false;
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Check if verbose output should be shown
    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        self.status(Status::Info, message)
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        self.status(Status::Success, message)
    }

    /// Write a warning message, shown even in quiet mode
    pub fn warning(&mut self, message: &str) -> Result<()> {
        self.status(Status::Warning, message)
    }

    /// Write an error message, shown even in quiet mode
    pub fn error(&mut self, message: &str) -> Result<()> {
        self.status(Status::Error, message)
    }

    fn status(&mut self, status: Status, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human || (self.quiet && !status.is_problem()) {
            return Ok(());
        }

        let line = if self.use_color {
            status.colored(message)
        } else {
            status.plain(message)
        };
        self.writeln(&line)
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");

        // serde_yaml already ends documents with a newline
        if formatted.ends_with('\n') {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    /// Write the outcome of validating one document
    ///
    /// Machine formats are written once for all documents by the caller.
    pub fn document_report(&mut self, report: &DocumentReport) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if report.valid {
            self.success(&format!("✓ {} conforms to {}", report.document, report.datatype))
        } else {
            self.error(&format!(
                "✗ {} does not conform to {}: {} error(s)",
                report.document,
                report.datatype,
                report.errors.len()
            ))?;
            let formatted = self.format.format_validation_errors(&report.errors)?;
            self.write(&formatted)
        }
    }

    /// Write the outcome of one suite in human format
    pub fn suite_result(&mut self, result: &SuiteResult) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        let report = &result.report;
        let executed = report.outcomes.len();
        if report.is_success() {
            if self.is_verbose() {
                self.success(&format!(
                    "✓ {} ({} passed) {}",
                    report.name,
                    executed,
                    result.path.display()
                ))?;
            } else {
                self.success(&format!("✓ {} ({} passed)", report.name, executed))?;
            }
        } else {
            self.error(&format!("✗ {} ({}/{} passed)", report.name, report.passed(), executed))?;
            let formatted = self.format.format_suite_report(report)?;
            self.write(&formatted)?;
        }
        Ok(())
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        // Calculate column widths
        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i < widths.len() {
                        format!("{:width$}", cell, width = widths[i])
                    } else {
                        cell.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }
}

/// Kind of a one-line status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Info,
    Success,
    Warning,
    Error,
}

impl Status {
    fn is_problem(self) -> bool {
        matches!(self, Status::Warning | Status::Error)
    }

    fn colored(self, message: &str) -> String {
        match self {
            Status::Info => format!("{} {}", "ℹ".blue(), message),
            Status::Success => message.green().to_string(),
            Status::Warning => message.yellow().to_string(),
            Status::Error => message.red().to_string(),
        }
    }

    fn plain(self, message: &str) -> String {
        match self {
            Status::Info => format!("INFO: {}", message),
            Status::Success => message.to_string(),
            Status::Warning => format!("WARNING: {}", message),
            Status::Error => format!("ERROR: {}", message),
        }
    }
}

/// Helper function to create a progress bar style
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Format validation errors for human reading, one indented line each
fn format_validation_errors_human(errors: &ValidationErrors) -> String {
    let mut output = String::new();
    for error in errors {
        output.push_str("  ");
        output.push_str(&format_validation_error_human(error));
        output.push('\n');
    }
    output
}

/// Format a single validation error for human reading
fn format_validation_error_human(error: &ValidationError) -> String {
    format!("{}  [{}]  {}", error.path, error.kind, error.message)
}

/// Format the failing cases of a suite for human reading
fn format_suite_report_human(report: &SuiteReport) -> String {
    let mut output = String::new();
    for outcome in report.failures() {
        if outcome.expected {
            output.push_str(&format!(
                "  case {}: expected valid, got {} error(s)\n",
                outcome.index,
                outcome.errors.len()
            ));
            for error in &outcome.errors {
                output.push_str("    ");
                output.push_str(&format_validation_error_human(error));
                output.push('\n');
            }
        } else {
            output.push_str(&format!(
                "  case {}: expected errors, data conformed\n",
                outcome.index
            ));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
