//! Editor state management.
//!
//! This module provides the `EditorState` struct that owns all runtime state
//! for the editor: the loaded documents, the active document, what the user
//! selected, the element a delete would remove, the configuration and the
//! last message for the user.
//!
//! The `EditorState` acts as the central state container that coordinates between
//! the document store, the presentation layer, and editing operations. Every
//! operation sets a `Message` describing its outcome, success or not, so a
//! front end only ever has to display it.
//!
//! # State Components
//!
//! - **Store**: every loaded document, keyed by path
//! - **Active document**: the document currently shown
//! - **Selection**: the name/value snapshot used for bulk edits
//! - **Selected node**: the live element or attribute used for structural edits
//! - **Pending delete**: the element captured when the context menu opened
//!
//! # Example
//!
//! ```
//! use xmlquill::config::Config;
//! use xmlquill::editor::selection::{ElementRef, NodeRef};
//! use xmlquill::editor::state::{EditorState, MessageLevel};
//!
//! let mut state = EditorState::new(Config::default());
//! state.load_document("a.xml", b"<root><item>1</item></root>").unwrap();
//! assert_eq!(state.active_document(), Some("a.xml"));
//!
//! let doc = state.store().get("a.xml").unwrap();
//! let item = NodeRef::Element(ElementRef::new(doc, vec![0]));
//! state.select(item).unwrap();
//! assert_eq!(state.selection().unwrap().name, "item");
//!
//! state.open_context_menu();
//! assert!(state.pending_delete().is_some());
//! assert_eq!(state.message().unwrap().level, MessageLevel::Info);
//! ```

use super::mutations::{AddedChild, BatchReport, MutationEngine};
use super::selection::{DeleteState, ElementRef, NodeRef, SelectionSnapshot};
use crate::config::Config;
use crate::document::parser::ParseOptions;
use crate::document::store::DocumentStore;
use crate::error::EditError;
use crate::file::loader::read_xml_bytes;
use crate::ui::tree_view::{build_tree_view, TreeViewNode};

/// Represents a message to display to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub level: MessageLevel,
}

/// Message severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// Which documents a confirmed delete applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    /// Only the document holding the pending element.
    ThisDocument,
    /// The first element with the same local name in every document.
    AllDocuments,
}

/// Main editor state container.
pub struct EditorState {
    store: DocumentStore,
    config: Config,
    active_document: Option<String>,
    selection: Option<SelectionSnapshot>,
    selected_node: Option<NodeRef>,
    pending_delete: DeleteState,
    message: Option<Message>,
}

impl EditorState {
    /// Creates an editor with no documents loaded.
    pub fn new(config: Config) -> Self {
        let store = DocumentStore::with_options(ParseOptions {
            preserve_whitespace: config.preserve_whitespace,
        });
        Self {
            store,
            config,
            active_document: None,
            selection: None,
            selected_node: None,
            pending_delete: DeleteState::default(),
            message: None,
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads and loads a file from disk (gzipped files included).
    ///
    /// Returns false if the path was already loaded.
    pub fn open_file(&mut self, path: &str) -> Result<bool, EditError> {
        let result = read_xml_bytes(path)
            .map_err(|e| EditError::io(path, &e))
            .and_then(|bytes| self.load_bytes(path, &bytes));
        self.report_load(path, result)
    }

    /// Loads a document from bytes already read by the caller.
    pub fn load_document(&mut self, path: &str, bytes: &[u8]) -> Result<bool, EditError> {
        let result = self.load_bytes(path, bytes);
        self.report_load(path, result)
    }

    fn load_bytes(&mut self, path: &str, bytes: &[u8]) -> Result<bool, EditError> {
        let inserted = self.store.load(path, bytes)?;
        if self.active_document.is_none() {
            self.active_document = Some(path.to_string());
        }
        Ok(inserted)
    }

    fn report_load(
        &mut self,
        path: &str,
        result: Result<bool, EditError>,
    ) -> Result<bool, EditError> {
        match &result {
            Ok(true) => self.set_message(format!("Loaded {}", path), MessageLevel::Info),
            Ok(false) => {
                self.set_message(format!("{} is already open", path), MessageLevel::Info)
            }
            Err(e) => self.set_message(e.to_string(), MessageLevel::Error),
        }
        result
    }

    /// Returns the path of the document being shown, if any.
    pub fn active_document(&self) -> Option<&str> {
        self.active_document.as_deref()
    }

    /// Switches the shown document. The selection is kept: bulk edits match
    /// by name in every document anyway.
    pub fn set_active_document(&mut self, path: &str) -> Result<(), EditError> {
        if !self.store.contains(path) {
            let err = EditError::selection(format!("No document loaded from {}", path));
            self.set_message(err.to_string(), MessageLevel::Error);
            return Err(err);
        }
        self.active_document = Some(path.to_string());
        Ok(())
    }

    /// Records `node` as the selected node and takes a snapshot of its name and value.
    pub fn select(&mut self, node: NodeRef) -> Result<(), EditError> {
        match node.snapshot(&self.store) {
            Ok(snapshot) => {
                self.active_document = Some(node.document().to_string());
                self.selection = Some(snapshot);
                self.selected_node = Some(node);
                Ok(())
            }
            Err(e) => {
                self.set_message(e.to_string(), MessageLevel::Error);
                Err(e)
            }
        }
    }

    /// Returns the name/value snapshot of the last selected node.
    pub fn selection(&self) -> Option<&SelectionSnapshot> {
        self.selection.as_ref()
    }

    /// Returns the live selected node, if it is still valid.
    pub fn selected_node(&self) -> Option<&NodeRef> {
        self.selected_node.as_ref()
    }

    /// Called when the context menu opens on the selected node.
    ///
    /// An element becomes the pending delete target, replacing any earlier
    /// one. Anything else (an attribute, or no selection) clears it.
    pub fn open_context_menu(&mut self) {
        match self.selected_node.as_ref().and_then(NodeRef::as_element) {
            Some(element) => {
                let element = element.clone();
                let text = format!("Delete target: {}", self.describe(&element));
                self.set_message(text, MessageLevel::Info);
                self.pending_delete.capture(element);
            }
            None => self.pending_delete.cancel(),
        }
    }

    /// Returns the element a confirmed delete would remove.
    pub fn pending_delete(&self) -> Option<&ElementRef> {
        self.pending_delete.pending()
    }

    /// Discards the pending delete target.
    pub fn cancel_delete(&mut self) {
        self.pending_delete.cancel();
    }

    /// Sets `value` on every element and attribute sharing the selection's name.
    pub fn apply_value(&mut self, value: &str) -> Result<BatchReport, EditError> {
        let name = match self.selection_name() {
            Ok(name) => name,
            Err(e) => return Err(self.fail(e)),
        };
        let result =
            MutationEngine::new(&mut self.store, &self.config).apply_bulk_value(&name, value);

        match result {
            Ok(report) if report.matched == 0 => {
                self.set_message(
                    format!("No nodes named '{}' found; nothing saved", name),
                    MessageLevel::Warning,
                );
                Ok(report)
            }
            Ok(report) => {
                let summary = format!(
                    "Updated {} node(s) named '{}', saved {} document(s)",
                    report.matched,
                    name,
                    report.saved.len()
                );
                Ok(self.finish_batch(summary, report))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Renames every element sharing the selection's name.
    pub fn rename(&mut self, new_name: &str) -> Result<BatchReport, EditError> {
        let name = match self.selection_name() {
            Ok(name) => name,
            Err(e) => return Err(self.fail(e)),
        };
        let result =
            MutationEngine::new(&mut self.store, &self.config).apply_bulk_rename(&name, new_name);

        match result {
            Ok(report) => {
                let summary = format!(
                    "Renamed {} element(s) from '{}', saved {} document(s)",
                    report.matched,
                    name,
                    report.saved.len()
                );
                Ok(self.finish_batch(summary, report))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Appends a child to the selected element. The parent stays selected.
    pub fn add_child(&mut self, name: &str, value: &str) -> Result<AddedChild, EditError> {
        let parent = match self.selected_node.clone() {
            Some(node) => node,
            None => return Err(self.fail(EditError::selection("Select an element first"))),
        };
        let result =
            MutationEngine::new(&mut self.store, &self.config).add_child(&parent, name, value);

        match result {
            Ok(added) => {
                self.selected_node = Some(NodeRef::Element(added.parent.clone()));
                let summary = format!("Added {}", self.describe(&added.child));
                self.finish_batch(summary, added.report.clone());
                Ok(added)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Deletes the pending target, consuming it.
    pub fn confirm_delete(&mut self, scope: DeleteScope) -> Result<BatchReport, EditError> {
        let target = match self.pending_delete.take() {
            Some(target) => target,
            None => {
                return Err(self.fail(EditError::selection("No element selected for deletion")))
            }
        };
        let label = self.describe(&target);

        let mut engine = MutationEngine::new(&mut self.store, &self.config);
        let result = match scope {
            DeleteScope::ThisDocument => engine.delete_in_document(&target),
            DeleteScope::AllDocuments => engine.delete_in_all_documents(&target),
        };

        match result {
            Ok(report) => {
                let mut summary = format!("Deleted {} from {} document(s)", label, report.matched);
                if !report.skipped.is_empty() {
                    summary.push_str(&format!("; no match in {}", report.skipped.join(", ")));
                }
                Ok(self.finish_batch(summary, report))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Builds the projection of the active document.
    pub fn tree_view(&self) -> Option<TreeViewNode> {
        let path = self.active_document.as_deref()?;
        self.store.get(path).map(build_tree_view)
    }

    /// Returns the current message, if any.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Sets a message to display to the user.
    pub fn set_message(&mut self, text: String, level: MessageLevel) {
        self.message = Some(Message { text, level });
    }

    /// Clears the current message.
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    fn selection_name(&self) -> Result<String, EditError> {
        self.selection
            .as_ref()
            .map(|s| s.name.clone())
            .ok_or_else(|| EditError::selection("Select a node first"))
    }

    fn fail(&mut self, error: EditError) -> EditError {
        self.set_message(error.to_string(), MessageLevel::Error);
        error
    }

    /// Sets the outcome message for a completed batch and refreshes the
    /// selection, which may point at a node that just changed or vanished.
    fn finish_batch(&mut self, summary: String, report: BatchReport) -> BatchReport {
        self.refresh_selection();

        if report.is_success() {
            self.set_message(summary, MessageLevel::Info);
        } else {
            let failures: Vec<String> = report
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.path, f.error))
                .collect();
            self.set_message(
                format!("{}; {} failed: {}", summary, failures.len(), failures.join("; ")),
                MessageLevel::Warning,
            );
        }
        report
    }

    fn refresh_selection(&mut self) {
        let Some(node) = &self.selected_node else {
            return;
        };
        match node.snapshot(&self.store) {
            Ok(snapshot) => self.selection = Some(snapshot),
            Err(_) => self.selected_node = None,
        }
    }

    fn describe(&self, element: &ElementRef) -> String {
        match element.resolve(&self.store) {
            Ok(e) => format!("<{}> in {}", e.name(), element.document),
            Err(_) => format!("element in {}", element.document),
        }
    }
}
