//! Configuration system for xmlquill.
//!
//! This module provides the configuration structure for xmlquill with sensible defaults
//! and support for serialization/deserialization via serde. Configuration is loaded
//! from `~/.config/xmlquill/config.toml`.
//!
//! # Example
//!
//! ```
//! use xmlquill::config::{Config, SavePolicy};
//!
//! // Use default configuration
//! let config = Config::default();
//! assert_eq!(config.indent_size, 2);
//! assert_eq!(config.save_policy, SavePolicy::AllDocuments);
//!
//! // Create custom configuration
//! let custom = Config {
//!     indent_size: 4,
//!     create_backup: true,
//!     ..Config::default()
//! };
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which documents a mutation writes back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SavePolicy {
    /// Every loaded document is saved after a bulk update, a rename, or an add.
    AllDocuments,
    /// Only documents that had a match, or that contain the edited node, are saved.
    TouchedDocuments,
}

/// Configuration for the xmlquill application.
///
/// # Fields
///
/// * `indent_size` - Spaces per indentation level when writing (default: 2)
/// * `preserve_whitespace` - Keep whitespace-only text and write without indentation (default: false)
/// * `write_declaration` - Write an XML declaration for documents that had none (default: true)
/// * `create_backup` - Create .bak files before saving (default: false)
/// * `save_policy` - Which documents a mutation saves (default: all-documents)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of spaces per indentation level
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    /// Keep whitespace-only text nodes; output is then written without indentation
    #[serde(default)]
    pub preserve_whitespace: bool,

    /// Write `<?xml version="1.0" encoding="utf-8"?>` when the source had no declaration
    #[serde(default = "default_write_declaration")]
    pub write_declaration: bool,

    /// Create .bak files before saving
    #[serde(default)]
    pub create_backup: bool,

    /// Which documents a mutation writes back
    #[serde(default = "default_save_policy")]
    pub save_policy: SavePolicy,
}

/// Returns the default indentation size.
fn default_indent_size() -> usize {
    2
}

fn default_write_declaration() -> bool {
    true
}

fn default_save_policy() -> SavePolicy {
    SavePolicy::AllDocuments
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            preserve_whitespace: false,
            write_declaration: default_write_declaration(),
            create_backup: false,
            save_policy: default_save_policy(),
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/xmlquill/config.toml` on all platforms.
    pub fn config_path() -> Option<std::path::PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("xmlquill");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        let config_path = match Self::config_path() {
            Some(path) => path,
            None => return Self::default(),
        };

        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config file: {:#}", e);
                Self::default()
            }
        }
    }

    /// Loads configuration from a specific file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }
}
