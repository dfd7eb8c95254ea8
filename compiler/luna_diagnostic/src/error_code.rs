//! Error codes for all diagnostics.
//!
//! The first digit indicates the producing stage:
//! - E1xxx: syntax and annotation errors
//! - E2xxx: type errors

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    /// Syntax error in code
    E1001,
    /// Expression statement that is not a call
    E1002,
    /// Malformed annotation comment
    E1003,
    /// Argument type does not match the parameter type
    E2001,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 4] = [
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E2001,
    ];

    /// Look a code up by its name, case-insensitively.
    pub fn parse(name: &str) -> Option<ErrorCode> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(name.trim()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E2001 => "E2001",
        }
    }

    /// One-line explanation shown by `--explain`-style tooling.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::E1001 => "syntax error",
            ErrorCode::E1002 => "non-complete statement",
            ErrorCode::E1003 => "malformed annotation",
            ErrorCode::E2001 => "argument type mismatch",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
