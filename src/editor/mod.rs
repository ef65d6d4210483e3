//! Editor state and mutation handling.
//!
//! This module provides the core editing functionality: the selection model,
//! the mutation engine that applies edits across loaded documents, and the
//! `EditorState` that ties them together for a front end.
//!
//! # Modules
//!
//! - `selection`: the selection snapshot, live node references and the delete target
//! - `mutations`: bulk value/rename, add child and delete, with per-document reporting
//! - `state`: Editor state management (documents, selection, messages)
//!
//! # Example
//!
//! ```
//! use xmlquill::editor::selection::DeleteState;
//!
//! // Nothing is pending for deletion until the context menu opens on an element
//! let pending = DeleteState::default();
//! assert!(pending.is_idle());
//! ```

pub mod mutations;
pub mod selection;
pub mod state;
