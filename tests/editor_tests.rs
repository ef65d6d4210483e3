//! Integration tests for `EditorState`: selection, the delete state machine
//! and the messages each operation leaves for the user.

use std::fs;
use tempfile::TempDir;
use xmlquill::config::Config;
use xmlquill::editor::selection::{ElementRef, NodeRef};
use xmlquill::editor::state::{DeleteScope, EditorState, MessageLevel};
use xmlquill::error::ErrorKind;

/// Writes the files into `dir` and opens them from disk.
fn open(dir: &TempDir, files: &[(&str, &str)]) -> (EditorState, Vec<String>) {
    let mut state = EditorState::new(Config::default());
    let mut paths = Vec::new();
    for (name, xml) in files {
        let path = dir.path().join(name).to_string_lossy().into_owned();
        fs::write(&path, xml).unwrap();
        assert!(state.open_file(&path).unwrap());
        paths.push(path);
    }
    (state, paths)
}

fn element(state: &EditorState, path: &str, at: &[usize]) -> NodeRef {
    NodeRef::Element(ElementRef::new(state.store().get(path).unwrap(), at.to_vec()))
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_first_loaded_document_becomes_active() {
    let dir = TempDir::new().unwrap();
    let (state, paths) = open(&dir, &[("a.xml", "<a/>"), ("b.xml", "<b/>")]);
    assert_eq!(state.active_document(), Some(paths[0].as_str()));
    assert_eq!(state.tree_view().unwrap().label, "a: ");
}

#[test]
fn test_opening_twice_is_reported_not_reloaded() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(&dir, &[("a.xml", "<a/>")]);
    assert!(!state.open_file(&paths[0]).unwrap());
    assert_eq!(state.store().len(), 1);
    assert!(state.message().unwrap().text.contains("already open"));
}

#[test]
fn test_open_missing_file_is_io_error() {
    let mut state = EditorState::new(Config::default());
    let err = state.open_file("/no/such/dir/a.xml").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(state.message().unwrap().level, MessageLevel::Error);
}

#[test]
fn test_set_active_document() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(&dir, &[("a.xml", "<a/>"), ("b.xml", "<b/>")]);
    state.set_active_document(&paths[1]).unwrap();
    assert_eq!(state.tree_view().unwrap().label, "b: ");
    assert!(state.set_active_document("other.xml").is_err());
    assert_eq!(state.active_document(), Some(paths[1].as_str()));
}

// ============================================================================
// Bulk edits through the selection
// ============================================================================

#[test]
fn test_select_then_bulk_update_both_files() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(
        &dir,
        &[
            ("a.xml", "<root><item>1</item></root>"),
            ("b.xml", "<root><item>2</item></root>"),
        ],
    );

    let item = element(&state, &paths[0], &[0]);
    state.select(item).unwrap();
    let report = state.apply_value("9").unwrap();

    assert_eq!(report.matched, 2);
    for path in &paths {
        assert!(fs::read_to_string(path).unwrap().contains("<item>9</item>"));
    }
    assert_eq!(state.selection().unwrap().value, "9");
    assert_eq!(state.message().unwrap().level, MessageLevel::Info);
}

#[test]
fn test_bulk_update_without_selection_is_selection_error() {
    let dir = TempDir::new().unwrap();
    let (mut state, _) = open(&dir, &[("a.xml", "<root/>")]);
    let err = state.apply_value("9").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Selection);
    assert_eq!(state.message().unwrap().level, MessageLevel::Error);
}

#[test]
fn test_bulk_update_matches_by_name_not_origin() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(
        &dir,
        &[
            ("a.xml", r#"<root><price currency="EUR">1</price></root>"#),
            ("b.xml", "<root><deep><price>2</price></deep></root>"),
        ],
    );

    // Select the attribute's element in the second file
    let price = element(&state, &paths[1], &[0, 0]);
    state.select(price).unwrap();
    state.apply_value("0").unwrap();

    let a = state.store().get(&paths[0]).unwrap();
    assert_eq!(a.get_element(&[0]).unwrap().value(), "0");
    assert_eq!(
        a.get_element(&[0]).unwrap().attribute("currency").unwrap().value(),
        "EUR"
    );
}

#[test]
fn test_rename_updates_selection_snapshot() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(&dir, &[("a.xml", "<root><item>1</item></root>")]);

    let item = element(&state, &paths[0], &[0]);
    state.select(item).unwrap();
    state.rename("product").unwrap();

    assert_eq!(state.selection().unwrap().name, "product");
    assert!(fs::read_to_string(&paths[0]).unwrap().contains("<product>1</product>"));
}

#[test]
fn test_selection_dropped_when_selected_node_is_replaced() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(&dir, &[("a.xml", "<root><group><x>1</x></group></root>")]);

    let x = element(&state, &paths[0], &[0, 0]);
    state.select(x).unwrap();
    let group = element(&state, &paths[0], &[0]);
    state.select(group).unwrap();
    state.apply_value("flat").unwrap();

    // The group's structure changed, so the live reference is gone
    assert!(state.selected_node().is_none());
    assert_eq!(state.selection().unwrap().name, "group");
}

// ============================================================================
// Add child
// ============================================================================

#[test]
fn test_add_child_keeps_parent_selected() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(&dir, &[("a.xml", "<root><list/></root>")]);

    let list = element(&state, &paths[0], &[0]);
    state.select(list).unwrap();
    let first = state.add_child("item", "1").unwrap();
    let second = state.add_child("item", "2").unwrap();

    assert_eq!(first.child.path, vec![0, 0]);
    assert_eq!(second.child.path, vec![0, 1]);
    assert!(state.selected_node().is_some());
    assert_eq!(
        fs::read_to_string(&paths[0]).unwrap().matches("<item>").count(),
        2
    );
}

#[test]
fn test_add_child_to_attribute_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(&dir, &[("a.xml", r#"<root id="1"/>"#)]);

    let attribute = NodeRef::Attribute {
        element: ElementRef::new(state.store().get(&paths[0]).unwrap(), vec![]),
        index: 0,
    };
    state.select(attribute).unwrap();
    let err = state.add_child("item", "1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Selection);
}

// ============================================================================
// Delete state machine
// ============================================================================

#[test]
fn test_delete_without_pending_target() {
    let dir = TempDir::new().unwrap();
    let (mut state, _) = open(&dir, &[("a.xml", "<root><a/></root>")]);
    let err = state.confirm_delete(DeleteScope::ThisDocument).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Selection);
}

#[test]
fn test_later_context_menu_replaces_target() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(&dir, &[("a.xml", "<root><a/><b/></root>")]);

    let a = element(&state, &paths[0], &[0]);
    state.select(a).unwrap();
    state.open_context_menu();
    let b = element(&state, &paths[0], &[1]);
    state.select(b).unwrap();
    state.open_context_menu();

    state.confirm_delete(DeleteScope::ThisDocument).unwrap();
    let doc = state.store().get(&paths[0]).unwrap();
    assert_eq!(doc.root().child_count(), 1);
    assert_eq!(doc.get_element(&[0]).unwrap().local_name(), "a");
}

#[test]
fn test_confirmed_delete_consumes_target() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(&dir, &[("a.xml", "<root><a/><b/></root>")]);

    let a = element(&state, &paths[0], &[0]);
    state.select(a).unwrap();
    state.open_context_menu();
    state.confirm_delete(DeleteScope::ThisDocument).unwrap();

    assert!(state.pending_delete().is_none());
    assert!(state.confirm_delete(DeleteScope::ThisDocument).is_err());
    assert_eq!(state.store().get(&paths[0]).unwrap().root().child_count(), 1);
}

#[test]
fn test_cancel_discards_target() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(&dir, &[("a.xml", "<root><a/></root>")]);

    let a = element(&state, &paths[0], &[0]);
    state.select(a).unwrap();
    state.open_context_menu();
    state.cancel_delete();

    assert!(state.confirm_delete(DeleteScope::AllDocuments).is_err());
    assert_eq!(state.store().get(&paths[0]).unwrap().root().child_count(), 1);
}

#[test]
fn test_delete_all_files_reports_skips() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(
        &dir,
        &[
            ("a.xml", "<root><note/></root>"),
            ("b.xml", "<root/>"),
        ],
    );

    let note = element(&state, &paths[0], &[0]);
    state.select(note).unwrap();
    state.open_context_menu();
    let report = state.confirm_delete(DeleteScope::AllDocuments).unwrap();

    assert_eq!(report.matched, 1);
    let message = state.message().unwrap();
    assert_eq!(message.level, MessageLevel::Info);
    assert!(message.text.contains("no match in"));
    assert!(message.text.contains(&paths[1]));
}

#[test]
fn test_delete_failure_is_a_warning() {
    let dir = TempDir::new().unwrap();
    let (mut state, paths) = open(&dir, &[("a.xml", "<root><note/></root>")]);
    let unwritable = dir
        .path()
        .join("gone")
        .join("b.xml")
        .to_string_lossy()
        .into_owned();
    state
        .load_document(&unwritable, b"<root><note/></root>")
        .unwrap();

    let note = element(&state, &paths[0], &[0]);
    state.select(note).unwrap();
    state.open_context_menu();
    let report = state.confirm_delete(DeleteScope::AllDocuments).unwrap();

    assert_eq!(report.failures.len(), 1);
    let message = state.message().unwrap();
    assert_eq!(message.level, MessageLevel::Warning);
    assert!(message.text.contains(&unwritable));
}
