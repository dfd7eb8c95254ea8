//! Diagnostic Emitters
//!
//! Human-readable output in the `path:line:col: severity[code]: message`
//! shape understood by most editors' problem matchers.

use std::io::{self, Write};

use crate::{Diagnostic, Severity};

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const RESET: &str = "\x1b[0m";
}

/// Returns "s" for plural counts, "" for singular.
#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Trait for emitting diagnostics in various formats.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic for the file at `path`.
    fn emit(&mut self, path: &str, diagnostic: &Diagnostic);

    fn emit_all(&mut self, path: &str, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(path, diag);
        }
    }

    /// Emit a summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);

    /// Flush any buffered output.
    fn flush(&mut self);
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, colors: bool) -> Self {
        TerminalEmitter { writer, colors }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn severity_label(&self, severity: Severity) -> String {
        if !self.colors {
            return severity.to_string();
        }
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
        };
        format!("{color}{severity}{}", colors::RESET)
    }

    fn write_line(&mut self, line: &str) {
        // Output errors (e.g. a closed pipe) are not worth aborting a check for.
        let _: io::Result<()> = writeln!(self.writer, "{line}");
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, path: &str, diagnostic: &Diagnostic) {
        let line = format!(
            "{path}:{}:{}: {}[{}]: {}",
            diagnostic.range.start.line + 1,
            diagnostic.range.start.column + 1,
            self.severity_label(diagnostic.severity),
            diagnostic.code,
            diagnostic.message
        );
        self.write_line(&line);
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        let line = match (error_count, warning_count) {
            (0, 0) => "no problems found".to_owned(),
            (e, 0) => format!("{e} error{}", plural_s(e)),
            (0, w) => format!("{w} warning{}", plural_s(w)),
            (e, w) => format!(
                "{e} error{} and {w} warning{}",
                plural_s(e),
                plural_s(w)
            ),
        };
        self.write_line(&line);
    }

    fn flush(&mut self) {
        let _: io::Result<()> = self.writer.flush();
    }
}
