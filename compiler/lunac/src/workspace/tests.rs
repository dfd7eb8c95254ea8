use super::*;
use crate::{CollectingSink, MemoryLoader};
use luna_diagnostic::Severity;
use luna_ir::SyntaxTree;
use luna_parse::LuaParser;
use luna_vfs::FileState;
use pretty_assertions::assert_eq;
use serde_json::json;

fn uri(text: &str) -> FileUri {
    match FileUri::parse(text) {
        Ok(uri) => uri,
        Err(err) => panic!("`{text}` should parse: {err}"),
    }
}

struct Fixture {
    ws: Workspace,
    loader: Arc<MemoryLoader>,
    sink: Arc<CollectingSink>,
}

fn fixture_with(parser: Arc<dyn SourceParser>, files: &[(&str, &str)]) -> Fixture {
    let loader = Arc::new(MemoryLoader::new());
    for (path, text) in files {
        loader.insert(uri(&format!("mem:///proj/{path}")), *text);
    }
    let sink = Arc::new(CollectingSink::new());
    let mut ws = Workspace::new(parser, loader.clone(), sink.clone());
    ws.add_root(uri("mem:///proj"));
    Fixture { ws, loader, sink }
}

fn fixture(files: &[(&str, &str)]) -> Fixture {
    fixture_with(Arc::new(LuaParser), files)
}

fn sweep(fx: &mut Fixture) -> SweepSummary {
    match fx.ws.sweep() {
        Ok(summary) => summary,
        Err(err) => panic!("sweep failed: {err}"),
    }
}

fn warnings(fx: &Fixture, path: &str) -> usize {
    fx.ws
        .diagnostics(&uri(path))
        .map_or(0, |list| {
            list.iter()
                .filter(|d| d.severity == Severity::Warning)
                .count()
        })
}

const ZOO: &str = "\
---@class Animal
local Animal = {}
function Animal:speak() end

---@class Dog : Animal
local Dog = {}
";

const FEED: &str = "\
---@param d Dog
function walk(d) end
";

const MAIN: &str = "walk(Animal)\n";

#[test]
fn sweep_tracks_and_diagnoses_every_file() {
    let mut fx = fixture(&[("zoo.lua", ZOO), ("feed.lua", FEED), ("main.lua", MAIN)]);
    let summary = sweep(&mut fx);
    assert_eq!(
        summary,
        SweepSummary {
            removed: 0,
            loaded: 3,
            skipped: 0,
            diagnosed: 3,
            errors: 0,
            warnings: 1,
        }
    );
    assert_eq!(warnings(&fx, "mem:///proj/main.lua"), 1);
    fx.ws.fs().walk_files(&mut |file| {
        assert_eq!(file.state(), FileState::Clean, "{}", file.uri());
        true
    });
    assert_eq!(fx.sink.published().len(), 3);
}

#[test]
fn progress_is_monotonic_and_finishes_at_one() {
    let mut fx = fixture(&[("a.lua", "local a = 1"), ("b.lua", "local b = 2")]);
    sweep(&mut fx);
    let progress = fx.sink.progress();
    let fractions: Vec<f32> = progress.iter().map(|(_, f)| *f).collect();
    assert_eq!(fractions, vec![0.0, 0.25, 0.5, 0.75, 1.0, 1.0]);
    assert_eq!(progress.last().map(|(text, _)| text.as_str()), Some("Finished!"));
}

#[test]
fn empty_workspace_still_finishes() {
    let mut fx = fixture(&[]);
    sweep(&mut fx);
    assert_eq!(
        fx.sink.progress().last(),
        Some(&("Finished!".to_owned(), 1.0))
    );
}

#[test]
fn second_sweep_is_rejected_while_one_runs() {
    let mut fx = fixture(&[("a.lua", "local a = 1")]);
    let state = fx.ws.sweep_state();
    let held = state.try_begin();
    assert!(held.is_ok());
    assert!(state.is_running());
    assert!(matches!(fx.ws.sweep(), Err(WorkspaceError::SweepInFlight)));

    // Changes wait in the queue while the sweep is in flight.
    fx.ws.queue().push(WorkspaceEvent::Reload);
    assert_eq!(fx.ws.process_pending().ok(), Some(0));
    assert_eq!(fx.ws.queue().len(), 1);

    drop(held);
    assert!(!state.is_running());
    assert_eq!(fx.ws.process_pending().ok(), Some(1));
    assert!(fx.ws.find_file(&uri("mem:///proj/a.lua")).is_some());
}

#[test]
fn events_queued_before_a_sweep_are_applied_after_it() {
    let mut fx = fixture(&[("a.lua", "local a = 1")]);
    let queue = fx.ws.queue();
    queue.push(WorkspaceEvent::Opened {
        uri: uri("mem:///proj/open.lua"),
        text: "broken.field\n".to_owned(),
    });
    sweep(&mut fx);
    assert!(queue.is_empty());
    let diagnostics = fx.ws.diagnostics(&uri("mem:///proj/open.lua"));
    assert_eq!(diagnostics.map(<[Diagnostic]>::len), Some(1));
}

/// Lists a file it cannot read.
struct FlakyLoader(MemoryLoader);

impl SourceLoader for FlakyLoader {
    fn read_text(&self, uri: &FileUri) -> Result<String, WorkspaceError> {
        if uri.name() == Some("bad.lua") {
            return Err(WorkspaceError::InvalidText { uri: uri.clone() });
        }
        self.0.read_text(uri)
    }

    fn list_files(&self, root: &FileUri) -> Vec<FileUri> {
        let mut files = self.0.list_files(root);
        files.push(root.join("bad.lua"));
        files
    }
}

#[test]
fn unreadable_files_are_skipped() {
    let inner = MemoryLoader::new();
    inner.insert(uri("mem:///proj/good.lua"), "local ok = 1");
    let sink = Arc::new(CollectingSink::new());
    let mut ws = Workspace::new(Arc::new(LuaParser), Arc::new(FlakyLoader(inner)), sink.clone());
    ws.add_root(uri("mem:///proj"));

    let summary = ws.sweep();
    assert_eq!(summary.as_ref().map(|s| (s.loaded, s.skipped, s.diagnosed)).ok(), Some((1, 1, 1)));
    assert!(ws.find_file(&uri("mem:///proj/bad.lua")).is_none());
    assert_eq!(sink.progress().last().map(|(_, f)| *f), Some(1.0));
}

/// Parses normally, except that it panics on a marker.
struct PanickyParser;

impl SourceParser for PanickyParser {
    fn parse(&self, text: &str) -> SyntaxTree {
        assert!(!text.contains("--boom"), "parser blew up");
        luna_parse::parse(text)
    }
}

#[test]
fn a_panicking_file_does_not_stop_the_sweep() {
    let mut fx = fixture_with(
        Arc::new(PanickyParser),
        &[("a.lua", "--boom\n"), ("b.lua", "t.x\n")],
    );
    let summary = sweep(&mut fx);
    assert_eq!(summary.diagnosed, 2);
    assert_eq!(fx.ws.diagnostics(&uri("mem:///proj/a.lua")), Some(&[][..]));
    assert_eq!(
        fx.ws.find_file(&uri("mem:///proj/a.lua")).map(VirtualFile::state),
        Some(FileState::Clean)
    );
    assert_eq!(fx.ws.diagnostics(&uri("mem:///proj/b.lua")).map(<[Diagnostic]>::len), Some(1));
}

#[test]
fn watched_file_lifecycle() {
    let mut fx = fixture(&[]);
    let target = uri("mem:///proj/pkg/new.lua");
    fx.loader.insert(target.clone(), "---@class Fresh\nlocal Fresh = {}\n");

    fx.ws.file_changed(&target, FileChange::Created);
    assert!(fx.ws.registry().resolve("Fresh").is_some());
    assert_eq!(fx.ws.diagnostics(&target), Some(&[][..]));

    fx.loader.insert(target.clone(), "---@class Renamed\nlocal Renamed = {}\n");
    fx.ws.file_changed(&target, FileChange::Changed);
    assert!(fx.ws.registry().resolve("Fresh").is_none());
    assert!(fx.ws.registry().resolve("Renamed").is_some());

    fx.ws.file_changed(&target, FileChange::Deleted);
    assert!(fx.ws.find_file(&target).is_none());
    assert!(fx.ws.registry().resolve("Renamed").is_none());
    assert_eq!(fx.sink.latest(&target), Some(Vec::new()));
}

#[test]
fn changes_outside_the_workspace_are_ignored() {
    let mut fx = fixture(&[]);
    let outside = uri("mem:///other/x.lua");
    let not_lua = uri("mem:///proj/notes.txt");
    fx.loader.insert(outside.clone(), "x = 1");
    fx.loader.insert(not_lua.clone(), "x = 1");
    fx.ws.file_changed(&outside, FileChange::Created);
    fx.ws.file_changed(&not_lua, FileChange::Created);
    assert_eq!(fx.ws.fs().file_count(), 0);
}

#[test]
fn deleting_a_file_keeps_members_from_other_files() {
    let mut fx = fixture(&[
        ("point.lua", "---@class Point\n---@field x number\nlocal Point = {}\n"),
        ("length.lua", "function Point:length() return 0 end\n"),
    ]);
    sweep(&mut fx);
    assert!(fx.ws.registry().find_member("Point", "x").is_some());
    assert!(fx.ws.registry().find_member("Point", "length").is_some());
    fx.sink.clear();

    let point = uri("mem:///proj/point.lua");
    fx.ws.file_changed(&point, FileChange::Deleted);

    assert!(fx.ws.registry().find_member("Point", "x").is_none());
    assert!(fx.ws.registry().find_member("Point", "length").is_some());
    // Only the deleted file's diagnostics were touched.
    assert_eq!(fx.sink.published(), vec![(point, Vec::new())]);
}

#[test]
fn editor_buffers_bypass_the_policy() {
    let mut fx = fixture(&[("a.lua", "local a = 1")]);
    sweep(&mut fx);

    let scratch = uri("untitled:Untitled-1");
    fx.ws.open_document(&scratch, "x.y\n".to_owned());
    assert_eq!(fx.ws.diagnostics(&scratch).map(<[Diagnostic]>::len), Some(1));
    assert_eq!(fx.sink.latest(&scratch).map(|l| l.len()), Some(1));

    fx.ws.update_document(&scratch, "print(1)\n".to_owned());
    assert_eq!(fx.ws.diagnostics(&scratch), Some(&[][..]));

    fx.ws.close_document(&scratch);
    assert!(fx.ws.find_file(&scratch).is_none());
    assert_eq!(fx.sink.latest(&scratch), Some(Vec::new()));

    // Workspace files stay tracked after their buffer closes.
    let a = uri("mem:///proj/a.lua");
    fx.ws.open_document(&a, "local a = 2".to_owned());
    fx.ws.close_document(&a);
    assert_eq!(fx.ws.find_file(&a).map(VirtualFile::text), Some("local a = 2"));
}

#[test]
fn association_changes_trigger_one_reload() {
    let mut fx = fixture(&[("a.lua", "local a = 1"), ("b.luna", "local b = 1")]);
    sweep(&mut fx);
    assert!(fx.ws.find_file(&uri("mem:///proj/b.luna")).is_none());
    fx.sink.clear();

    let queue = fx.ws.queue();
    queue.push(WorkspaceEvent::Configuration(json!({
        "files": { "associations": { "*.luna": "lua" } }
    })));
    queue.push(WorkspaceEvent::Reload);
    queue.push(WorkspaceEvent::Reload);
    assert_eq!(fx.ws.process_pending().ok(), Some(3));

    assert!(fx.ws.find_file(&uri("mem:///proj/b.luna")).is_some());
    let finished = fx
        .sink
        .progress()
        .iter()
        .filter(|(text, _)| text == "Finished!")
        .count();
    assert_eq!(finished, 1);
}

#[test]
fn narrowing_associations_drops_excluded_files() {
    let mut fx = fixture(&[("a.lua", "local a = 1"), ("b.luna", "local b = 1")]);
    let widened = fx.ws.update_settings(&json!({
        "files": { "associations": { "*.luna": "lua" } }
    }));
    assert_eq!(widened.ok(), Some(true));
    sweep(&mut fx);
    assert_eq!(fx.ws.fs().file_count(), 2);

    assert_eq!(fx.ws.update_settings(&json!({})).ok(), Some(true));
    let summary = sweep(&mut fx);
    assert_eq!(summary.removed, 1);
    assert!(fx.ws.find_file(&uri("mem:///proj/b.luna")).is_none());
}

#[test]
fn settings_reach_the_diagnostics() {
    let mut fx = fixture(&[("zoo.lua", ZOO), ("feed.lua", FEED), ("main.lua", MAIN)]);
    let update = fx.ws.update_settings(&json!({
        "luna": { "diagnostics": { "parameterValidation": false } }
    }));
    assert_eq!(update.ok(), Some(false));
    assert_eq!(sweep(&mut fx).warnings, 0);
}

#[test]
fn removing_a_root_untracks_its_files() {
    let mut fx = fixture(&[("a.lua", "local a = 1"), ("sub/b.lua", "local b = 1")]);
    sweep(&mut fx);
    fx.sink.clear();

    fx.ws.remove_root(&uri("mem:///proj"));
    assert_eq!(fx.ws.fs().file_count(), 0);
    assert!(fx.ws.roots().is_empty());
    assert_eq!(fx.sink.published().len(), 2);
    assert!(fx.sink.published().iter().all(|(_, list)| list.is_empty()));
}

#[test]
fn dispose_clears_everything() {
    let mut fx = fixture(&[("zoo.lua", ZOO)]);
    sweep(&mut fx);
    assert!(!fx.ws.registry().is_empty());

    fx.ws.dispose();
    assert_eq!(fx.ws.fs().file_count(), 0);
    assert!(fx.ws.registry().is_empty());
    assert!(fx.ws.roots().is_empty());
}

#[test]
fn a_file_replaced_by_a_folder_is_untracked() {
    let mut fx = fixture(&[]);
    let ghost = uri("mem:///proj/a");
    let nested = uri("mem:///proj/a/b.lua");
    fx.ws.open_document(&ghost, "---@class Ghost\nlocal Ghost = {}\n".to_owned());
    assert!(fx.ws.registry().resolve("Ghost").is_some());
    fx.sink.clear();

    fx.ws.open_document(&nested, "local b = 1\n".to_owned());
    assert!(fx.ws.registry().resolve("Ghost").is_none());
    assert!(fx.ws.find_file(&ghost).is_none());
    assert_eq!(fx.ws.fs().file_uris(), vec![nested.clone()]);
    assert_eq!(fx.sink.published(), vec![(ghost, Vec::new()), (nested, Vec::new())]);
}

#[test]
fn a_folder_replaced_by_a_file_is_untracked() {
    let mut fx = fixture(&[]);
    let inner = uri("mem:///proj/pkg/shape.lua");
    fx.ws.open_document(&inner, "---@class Shape\nlocal Shape = {}\n".to_owned());
    fx.sink.clear();

    let pkg = uri("mem:///proj/pkg");
    fx.ws.open_document(&pkg, "local p = 1\n".to_owned());
    assert!(fx.ws.registry().resolve("Shape").is_none());
    assert_eq!(fx.ws.fs().file_uris(), vec![pkg.clone()]);
    assert_eq!(fx.sink.latest(&inner), Some(Vec::new()));

    fx.ws.remove_root(&uri("mem:///proj"));
    assert!(fx.ws.registry().is_empty());
}
