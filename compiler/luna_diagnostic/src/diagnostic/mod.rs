//! Core diagnostic types.

use std::fmt;

use luna_ir::{LineIndex, Range, Span};

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One finding in one file.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    pub severity: Severity,
    /// Range in the owning file's line/column space.
    pub range: Range,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, severity: Severity, message: impl Into<String>, range: Range) -> Self {
        Diagnostic {
            code,
            message: message.into(),
            severity,
            range,
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>, range: Range) -> Self {
        Self::new(code, Severity::Error, message, range)
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>, range: Range) -> Self {
        Self::new(code, Severity::Warning, message, range)
    }

    /// Build a diagnostic from a byte span, converting through the file's line index.
    pub fn at_span(
        code: ErrorCode,
        severity: Severity,
        message: impl Into<String>,
        text: &str,
        lines: &LineIndex,
        span: Span,
    ) -> Self {
        Self::new(code, severity, message, lines.range(text, span))
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}[{}]: {}",
            self.range.start.line + 1,
            self.range.start.column + 1,
            self.severity,
            self.code,
            self.message
        )
    }
}

#[cfg(test)]
mod tests;
