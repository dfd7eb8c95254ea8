// Conversions between workspace and protocol types

use luna_diagnostic::{Diagnostic, Severity};
use luna_vfs::FileUri;
use tower_lsp::lsp_types::{self as lsp, NumberOrString, Url};

pub fn to_file_uri(url: &Url) -> Option<FileUri> {
    match FileUri::parse(url.as_str()) {
        Ok(uri) => Some(uri),
        Err(err) => {
            tracing::warn!(%url, %err, "ignoring unsupported uri");
            None
        }
    }
}

pub fn to_url(uri: &FileUri) -> Option<Url> {
    Url::parse(&uri.to_string()).ok()
}

pub fn to_lsp_diagnostic(diagnostic: &Diagnostic) -> lsp::Diagnostic {
    let severity = match diagnostic.severity {
        Severity::Error => lsp::DiagnosticSeverity::ERROR,
        Severity::Warning => lsp::DiagnosticSeverity::WARNING,
    };
    let start = diagnostic.range.start;
    let end = diagnostic.range.end;
    lsp::Diagnostic {
        range: lsp::Range::new(
            lsp::Position::new(start.line, start.column),
            lsp::Position::new(end.line, end.column),
        ),
        severity: Some(severity),
        code: Some(NumberOrString::String(diagnostic.code.as_str().to_owned())),
        source: Some("luna".to_owned()),
        message: diagnostic.message.clone(),
        ..Default::default()
    }
}
