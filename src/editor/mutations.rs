//! Edits that change loaded documents and write them back.
//!
//! `MutationEngine` borrows the document store and the config and runs one
//! operation to completion. Bulk operations match by local name in every
//! loaded document. Each returns a `BatchReport`; a document that cannot be
//! saved is recorded as a failure and the remaining documents still complete.

use crate::config::{Config, SavePolicy};
use crate::document::matcher::{
    find_attributes_by_name, find_elements_by_name, find_first_element_by_name,
};
use crate::document::node::XmlElement;
use crate::document::store::DocumentStore;
use crate::editor::selection::{ElementRef, NodeRef};
use crate::error::EditError;

/// One document that could not be processed during a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    pub path: String,
    pub error: EditError,
}

/// The outcome of one mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Nodes changed, or elements removed for deletes.
    pub matched: usize,
    /// Documents written back, in load order.
    pub saved: Vec<String>,
    /// Documents with nothing to do.
    pub skipped: Vec<String>,
    pub failures: Vec<DocumentFailure>,
}

impl BatchReport {
    /// Returns true if no document failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, path: &str, error: EditError) {
        log::warn!("{}: {}", path, error);
        self.failures.push(DocumentFailure {
            path: path.to_string(),
            error,
        });
    }
}

/// The result of adding a child element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedChild {
    /// The parent, re-referenced at the document's new revision.
    pub parent: ElementRef,
    pub child: ElementRef,
    pub report: BatchReport,
}

/// Checks that `raw` (once trimmed) can be used as an element's local name.
///
/// ```
/// use xmlquill::editor::mutations::validate_local_name;
///
/// assert_eq!(validate_local_name("  product ").unwrap(), "product");
/// assert!(validate_local_name("").is_err());
/// assert!(validate_local_name("two words").is_err());
/// assert!(validate_local_name("x:item").is_err());
/// assert!(validate_local_name("1st").is_err());
/// ```
pub fn validate_local_name(raw: &str) -> Result<String, EditError> {
    let name = raw.trim();
    let mut chars = name.chars();
    let first = chars
        .next()
        .ok_or_else(|| EditError::validation("Node name cannot be empty"))?;

    if !(first.is_alphabetic() || first == '_') {
        return Err(EditError::validation(format!(
            "'{}' is not a valid XML name: it must start with a letter or '_'",
            name
        )));
    }
    if let Some(bad) = chars.find(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))) {
        return Err(EditError::validation(format!(
            "'{}' is not a valid XML name: '{}' is not allowed",
            name, bad
        )));
    }
    Ok(name.to_string())
}

/// Applies mutations to the documents in a store.
///
/// # Example
///
/// ```
/// use xmlquill::config::Config;
/// use xmlquill::document::store::DocumentStore;
/// use xmlquill::editor::mutations::MutationEngine;
///
/// let mut store = DocumentStore::new();
/// store.load("a.xml", b"<root><item>1</item></root>").unwrap();
/// store.load("b.xml", b"<root><other/></root>").unwrap();
///
/// let config = Config::default();
/// let mut engine = MutationEngine::new(&mut store, &config);
///
/// // Nothing named "missing" anywhere: no document is touched
/// let report = engine.apply_bulk_value("missing", "x").unwrap();
/// assert_eq!(report.matched, 0);
/// assert!(report.saved.is_empty());
/// ```
pub struct MutationEngine<'a> {
    store: &'a mut DocumentStore,
    config: &'a Config,
}

impl<'a> MutationEngine<'a> {
    pub fn new(store: &'a mut DocumentStore, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Sets the value of every element and every attribute named `name`, in
    /// every document.
    ///
    /// An element's value replaces its whole content. A match nested inside
    /// an element that was already replaced no longer exists and is skipped.
    /// If nothing matches anywhere, no document is written.
    pub fn apply_bulk_value(&mut self, name: &str, value: &str) -> Result<BatchReport, EditError> {
        if name.is_empty() {
            return Err(EditError::validation("Node name cannot be empty"));
        }
        if value.is_empty() {
            return Err(EditError::validation("Value cannot be empty"));
        }

        let mut report = BatchReport::default();
        let mut touched = Vec::new();

        for (path, doc) in self.store.iter_mut() {
            let mut matched = 0;

            let mut dropped_children = false;
            for element_path in find_elements_by_name(doc, name) {
                if let Some(element) = doc.get_element_mut(&element_path) {
                    dropped_children |= element.set_value(value);
                    matched += 1;
                }
            }
            if dropped_children {
                doc.bump_revision();
            }

            for found in find_attributes_by_name(doc, name) {
                let attr = doc
                    .get_element_mut(&found.element)
                    .and_then(|element| element.attributes_mut().get_mut(found.index));
                if let Some(attr) = attr {
                    attr.set_value(value);
                    matched += 1;
                }
            }

            log::debug!("{}: {} match(es) for '{}'", path, matched, name);
            if matched > 0 {
                touched.push(path.to_string());
            } else {
                report.skipped.push(path.to_string());
            }
            report.matched += matched;
        }

        if report.matched == 0 {
            log::info!("No node named '{}' in any document", name);
            return Ok(report);
        }

        self.save_per_policy(touched, &mut report);
        log::info!(
            "Set {} node(s) named '{}' across {} document(s)",
            report.matched,
            name,
            report.saved.len()
        );
        Ok(report)
    }

    /// Renames every element (attributes are left alone) whose local name is
    /// `old_name` to `new_name`, keeping each element's prefix and namespace.
    pub fn apply_bulk_rename(
        &mut self,
        old_name: &str,
        new_name: &str,
    ) -> Result<BatchReport, EditError> {
        if old_name.is_empty() {
            return Err(EditError::validation("Node name cannot be empty"));
        }
        let new_name = validate_local_name(new_name)?;

        let mut report = BatchReport::default();
        let mut touched = Vec::new();

        for (path, doc) in self.store.iter_mut() {
            let matches = find_elements_by_name(doc, old_name);
            for element_path in &matches {
                if let Some(element) = doc.get_element_mut(element_path) {
                    element.rename(&new_name);
                }
            }

            log::debug!("{}: renamed {} element(s)", path, matches.len());
            if matches.is_empty() {
                report.skipped.push(path.to_string());
            } else {
                touched.push(path.to_string());
            }
            report.matched += matches.len();
        }

        self.save_per_policy(touched, &mut report);
        log::info!(
            "Renamed {} element(s) from '{}' to '{}'",
            report.matched,
            old_name,
            new_name
        );
        Ok(report)
    }

    /// Appends a new element as the last child of `parent`.
    ///
    /// The child takes the parent's prefix and namespace. Name and value are
    /// trimmed; an empty value creates an empty element.
    pub fn add_child(
        &mut self,
        parent: &NodeRef,
        name: &str,
        value: &str,
    ) -> Result<AddedChild, EditError> {
        let parent = parent
            .as_element()
            .ok_or_else(|| EditError::selection("Select an element to add a child to"))?;
        let name = validate_local_name(name)?;

        let child_name = parent.resolve(self.store)?.name().with_local(name);
        let label = child_name.to_string();
        let child = XmlElement::with_text(child_name, value.trim());

        let doc = self
            .store
            .get_mut(&parent.document)
            .ok_or_else(|| EditError::selection("The selected document is no longer loaded"))?;
        let child_path = doc
            .append_child(&parent.path, child)
            .map_err(|e| EditError::selection(e.to_string()))?;

        let added_parent = ElementRef::new(doc, parent.path.clone());
        let added_child = ElementRef::new(doc, child_path);
        log::info!("Added <{}> in {}", label, parent.document);

        let mut report = BatchReport {
            matched: 1,
            ..BatchReport::default()
        };
        self.save_per_policy(vec![parent.document.clone()], &mut report);

        Ok(AddedChild {
            parent: added_parent,
            child: added_child,
            report,
        })
    }

    /// Removes the referenced element from its own document and saves only
    /// that document.
    pub fn delete_in_document(&mut self, target: &ElementRef) -> Result<BatchReport, EditError> {
        target.resolve(self.store)?;
        if target.is_root() {
            return Err(EditError::selection("Cannot delete the root element"));
        }

        let doc = self
            .store
            .get_mut(&target.document)
            .ok_or_else(|| EditError::selection("The selected document is no longer loaded"))?;
        let removed = doc
            .detach(&target.path)
            .map_err(|e| EditError::selection(e.to_string()))?;
        log::info!("Deleted <{}> from {}", removed.name(), target.document);

        let mut report = BatchReport {
            matched: 1,
            ..BatchReport::default()
        };
        self.save_one(&target.document, &mut report);
        Ok(report)
    }

    /// Removes the first element (in document order) sharing the target's
    /// local name from every document.
    ///
    /// At most one element per document is removed. Documents with no match
    /// are skipped. A document whose first match is its root, or that cannot
    /// be saved, is reported as a failure and the batch moves on.
    pub fn delete_in_all_documents(
        &mut self,
        target: &ElementRef,
    ) -> Result<BatchReport, EditError> {
        let name = target.resolve(self.store)?.local_name().to_string();
        let mut report = BatchReport::default();

        for path in self.store.paths() {
            let Some(doc) = self.store.get_mut(&path) else {
                continue;
            };

            let found = match find_first_element_by_name(doc, &name) {
                Some(found) => found,
                None => {
                    log::info!("{}: no <{}> to delete", path, name);
                    report.skipped.push(path);
                    continue;
                }
            };
            if found.is_empty() {
                report.fail(&path, EditError::selection("Cannot delete the root element"));
                continue;
            }

            if let Err(e) = doc.detach(&found) {
                report.fail(&path, EditError::selection(e.to_string()));
                continue;
            }
            report.matched += 1;
            self.save_one(&path, &mut report);
        }

        log::info!(
            "Deleted {} <{}> element(s); {} document(s) skipped, {} failed",
            report.matched,
            name,
            report.skipped.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Saves every document, or only `touched`, depending on the save policy.
    fn save_per_policy(&self, touched: Vec<String>, report: &mut BatchReport) {
        let targets = match self.config.save_policy {
            SavePolicy::AllDocuments => self.store.paths(),
            SavePolicy::TouchedDocuments => touched,
        };
        for path in targets {
            self.save_one(&path, report);
        }
    }

    fn save_one(&self, path: &str, report: &mut BatchReport) {
        match self.store.save(path, self.config) {
            Ok(()) => report.saved.push(path.to_string()),
            Err(e) => report.fail(path, e),
        }
    }
}
