//! Error types reported at the editing boundary.
//!
//! File and XML plumbing below this boundary uses `anyhow`; the document store
//! and the mutation engine convert those failures into an `EditError` so the
//! caller always gets a kind plus a message it can show to the user.

use std::fmt;

/// The four failure categories an editing operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed XML at load time.
    Parse,
    /// A path could not be read or written.
    Io,
    /// A required name or value was empty or not a valid XML name.
    Validation,
    /// The operation needs a node selection that is absent, stale, or of the wrong kind.
    Selection,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Parse => "parse error",
            ErrorKind::Io => "I/O error",
            ErrorKind::Validation => "validation error",
            ErrorKind::Selection => "selection error",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while loading, mutating or saving documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The bytes loaded for `path` are not well-formed XML.
    Parse { path: String, message: String },
    /// Reading or writing `path` failed.
    Io { path: String, message: String },
    /// User input was rejected before anything was mutated.
    Validation { message: String },
    /// No usable node selection for the requested operation.
    Selection { message: String },
}

impl EditError {
    pub fn parse(path: impl Into<String>, err: &anyhow::Error) -> Self {
        EditError::Parse {
            path: path.into(),
            message: format!("{:#}", err),
        }
    }

    pub fn io(path: impl Into<String>, err: &anyhow::Error) -> Self {
        EditError::Io {
            path: path.into(),
            message: format!("{:#}", err),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        EditError::Validation {
            message: message.into(),
        }
    }

    pub fn selection(message: impl Into<String>) -> Self {
        EditError::Selection {
            message: message.into(),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditError::Parse { .. } => ErrorKind::Parse,
            EditError::Io { .. } => ErrorKind::Io,
            EditError::Validation { .. } => ErrorKind::Validation,
            EditError::Selection { .. } => ErrorKind::Selection,
        }
    }

    /// Returns the document path this error is about, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            EditError::Parse { path, .. } | EditError::Io { path, .. } => Some(path),
            EditError::Validation { .. } | EditError::Selection { .. } => None,
        }
    }
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::Parse { path, message } => {
                write!(f, "Failed to parse {}: {}", path, message)
            }
            EditError::Io { path, message } => write!(f, "Failed to access {}: {}", path, message),
            EditError::Validation { message } | EditError::Selection { message } => {
                f.write_str(message)
            }
        }
    }
}

impl std::error::Error for EditError {}
