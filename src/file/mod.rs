//! File I/O operations for XML documents.
//!
//! This module loads XML files from disk (optionally gzipped) and saves
//! document trees back with atomic write operations and optional backups.

pub mod loader;
pub mod saver;
