//! The `explain` command: describe a diagnostic code.

use luna_diagnostic::ErrorCode;

/// Print the description of `code`. Returns the exit code.
pub fn explain_error(code: &str) -> i32 {
    let Some(code) = ErrorCode::parse(code) else {
        eprintln!("error: unknown diagnostic code '{code}'");
        let known: Vec<&str> = ErrorCode::ALL.into_iter().map(ErrorCode::as_str).collect();
        eprintln!("Known codes: {}", known.join(", "));
        return 1;
    };
    println!("{code}: {}", code.description());
    0
}
