//! URI-level behavior of the workspace tree.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use luna_vfs::{FileState, FileUri, VirtualFs, VirtualNode};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn uri(text: &str) -> FileUri {
    FileUri::parse(text).unwrap()
}

#[test]
fn scheme_roots_are_created_on_first_use() {
    let mut fs = VirtualFs::new();
    assert!(fs.existing_root("mem").is_none());

    fs.upsert_file(&uri("mem:///a/b/c.lua"), "x = 1".to_owned());
    assert!(fs.existing_root("mem").is_some());
    assert!(fs.existing_root("file").is_none());

    // Ancestors were created on the way.
    assert!(fs.folder(&uri("mem:///a/b")).is_some());
    assert_eq!(fs.find_file(&uri("mem:///a/b/c.lua")).unwrap().text(), "x = 1");
}

#[test]
fn nodes_of_the_other_kind_block_a_file() {
    let mut fs = VirtualFs::new();
    fs.upsert_file(&uri("mem:///p/a"), "---@class Ghost".to_owned());
    fs.upsert_file(&uri("mem:///p/dir/x.lua"), "x = 1".to_owned());

    // A file where a folder has to go.
    let blocked = fs.blocking_node(&uri("mem:///p/a/b.lua")).map(VirtualNode::uri);
    assert_eq!(blocked, Some(&uri("mem:///p/a")));
    // A folder where the file has to go.
    let blocked = fs.blocking_node(&uri("mem:///p/dir")).map(VirtualNode::uri);
    assert_eq!(blocked, Some(&uri("mem:///p/dir")));

    assert!(fs.blocking_node(&uri("mem:///p/a")).is_none());
    assert!(fs.blocking_node(&uri("mem:///p/new/y.lua")).is_none());
    assert!(fs.blocking_node(&uri("other:///p/a/b.lua")).is_none());
}

#[test]
fn upsert_replaces_text_and_marks_dirty() {
    let mut fs = VirtualFs::new();
    let target = uri("mem:///m.lua");
    fs.upsert_file(&target, "old".to_owned());
    fs.find_file_mut(&target).unwrap().set_diagnostics(Vec::new());
    assert_eq!(fs.find_file(&target).unwrap().state(), FileState::Clean);

    fs.upsert_file(&target, "new".to_owned());
    let file = fs.find_file(&target).unwrap();
    assert_eq!(file.text(), "new");
    assert_eq!(file.state(), FileState::Dirty);
    assert_eq!(fs.file_count(), 1);
}

#[test]
fn lookups_never_create() {
    let mut fs = VirtualFs::new();
    assert!(fs.find(&uri("mem:///x/y.lua")).is_none());
    assert!(fs.folder_mut(&uri("mem:///x"), false).is_none());
    assert!(fs.existing_root("mem").is_none());
}

#[test]
fn files_are_not_folders() {
    let mut fs = VirtualFs::new();
    fs.upsert_file(&uri("mem:///a.lua"), String::new());
    assert!(fs.find_file(&uri("mem:///a.lua/b.lua")).is_none());
    assert!(fs.find_file(&uri("mem:///")).is_none());
}

#[test]
fn remove_returns_the_detached_node() {
    let mut fs = VirtualFs::new();
    fs.upsert_file(&uri("mem:///pkg/a.lua"), String::new());
    fs.upsert_file(&uri("mem:///pkg/b.lua"), String::new());
    fs.upsert_file(&uri("mem:///main.lua"), String::new());

    let removed = fs.remove(&uri("mem:///pkg"));
    assert!(matches!(removed, Some(VirtualNode::Folder(_))));
    assert_eq!(fs.file_uris(), vec![uri("mem:///main.lua")]);
    assert!(fs.remove(&uri("mem:///pkg")).is_none());
}

#[test]
fn walks_cover_every_scheme() {
    let mut fs = VirtualFs::new();
    fs.upsert_file(&uri("file:///w/a.lua"), String::new());
    fs.upsert_file(&uri("untitled:Untitled-1"), String::new());
    let mut count = 0;
    assert!(fs.walk_files(&mut |_| {
        count += 1;
        true
    }));
    assert_eq!(count, 2);

    let mut visited = 0;
    assert!(!fs.walk_files_mut(&mut |file| {
        visited += 1;
        file.mark_dirty();
        false
    }));
    assert_eq!(visited, 1);

    fs.clear();
    assert_eq!(fs.file_count(), 0);
}

proptest! {
    #[test]
    fn repeated_adds_track_one_file(name in "[a-z]{1,8}", text in ".{0,40}", times in 1usize..5) {
        let mut fs = VirtualFs::new();
        let target = FileUri::scheme_root("mem").join(&format!("{name}.lua"));
        for _ in 0..times {
            let parent = target.parent().unwrap();
            fs.folder_mut(&parent, true).unwrap().add_file(target.name().unwrap(), text.as_str());
        }
        prop_assert_eq!(fs.file_count(), 1);
        prop_assert_eq!(fs.find_file(&target).unwrap().text(), text.as_str());
    }
}
