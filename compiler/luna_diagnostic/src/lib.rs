//! Diagnostic records for the Luna language tools.
//!
//! A [`Diagnostic`] is plain data: message, severity, code and the range it
//! covers in its file. Diagnostics are the product's output, never errors in
//! the `Result` sense. Each file's list is produced fresh on every pass and
//! replaces the previous one wholesale.

mod diagnostic;
pub mod emitter;
mod error_code;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
