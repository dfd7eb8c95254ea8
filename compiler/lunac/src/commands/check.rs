//! The `check` command: load paths as a workspace and report diagnostics.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use luna_diagnostic::emitter::{DiagnosticEmitter, TerminalEmitter};
use luna_diagnostic::Severity;
use luna_parse::LuaParser;
use luna_vfs::FileUri;

use crate::{CollectingSink, DiskLoader, Settings, Workspace, WorkspaceError};

pub const USAGE: &str = "Usage: luna check [--config <settings.json>] <path>...";

/// Parsed `check` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckArgs {
    pub config: Option<PathBuf>,
    pub paths: Vec<PathBuf>,
}

/// Totals of one check run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Parse the arguments following `luna check`.
pub fn parse_check_args(args: &[String]) -> Result<CheckArgs, String> {
    let mut parsed = CheckArgs::default();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if arg == "--config" || arg == "-c" {
            let Some(path) = args.get(i + 1) else {
                return Err(format!("missing value for '{arg}'"));
            };
            parsed.config = Some(PathBuf::from(path));
            i += 2;
            continue;
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            parsed.config = Some(PathBuf::from(path));
        } else if arg.starts_with('-') {
            return Err(format!("unknown option '{arg}'"));
        } else {
            parsed.paths.push(PathBuf::from(arg));
        }
        i += 1;
    }
    if parsed.paths.is_empty() {
        return Err("missing path".to_owned());
    }
    Ok(parsed)
}

/// Check every file below `args.paths`, writing one line per diagnostic
/// (`path:line:col: severity[code]: message`) and a summary to `out`.
pub fn check_paths<W: Write>(
    args: &CheckArgs,
    out: W,
    colors: bool,
) -> Result<CheckReport, WorkspaceError> {
    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let mut workspace = Workspace::new(
        Arc::new(LuaParser),
        Arc::new(DiskLoader),
        Arc::new(CollectingSink::new()),
    )
    .with_settings(settings);

    for path in &args.paths {
        workspace.add_root(root_uri(path)?);
    }
    workspace.sweep()?;

    let mut emitter = TerminalEmitter::new(out, colors);
    let mut report = CheckReport::default();
    workspace.fs().walk_files(&mut |file| {
        report.files += 1;
        let shown = display_path(file.uri());
        for diagnostic in file.diagnostics() {
            match diagnostic.severity {
                Severity::Error => report.errors += 1,
                Severity::Warning => report.warnings += 1,
            }
            emitter.emit(&shown, diagnostic);
        }
        true
    });
    emitter.emit_summary(report.errors, report.warnings);
    emitter.flush();
    Ok(report)
}

/// Run `luna check` with raw arguments. Returns the exit code: 1 when any
/// error was reported or the check could not run.
pub fn run_check(args: &[String]) -> i32 {
    let args = match parse_check_args(args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("{USAGE}");
            return 1;
        }
    };
    let stdout = std::io::stdout();
    let colors = stdout.is_terminal();
    match check_paths(&args, stdout.lock(), colors) {
        Ok(report) if report.errors > 0 => 1,
        Ok(_) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn root_uri(path: &Path) -> Result<FileUri, WorkspaceError> {
    let absolute = std::path::absolute(path).map_err(|source| WorkspaceError::Read {
        uri: FileUri::scheme_root("file"),
        source,
    })?;
    let uri = FileUri::from_path(&absolute)?;
    if !absolute.exists() {
        return Err(WorkspaceError::NotFound(uri));
    }
    Ok(uri)
}

/// The path shown for a file, relative to the working directory when possible.
fn display_path(uri: &FileUri) -> String {
    let Some(path) = uri.to_path() else {
        return uri.to_string();
    };
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    relative.unwrap_or(path).display().to_string()
}
