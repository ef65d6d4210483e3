use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use std::path::PathBuf;

use xmlquill::config::Config;
use xmlquill::document::matcher::{find_attributes_by_name, find_first_element_by_name};
use xmlquill::editor::mutations::BatchReport;
use xmlquill::editor::selection::{ElementRef, NodeRef};
use xmlquill::editor::state::{DeleteScope, EditorState, MessageLevel};
use xmlquill::ui::tree_view::build_tree_view;

/// XMLQuill - Edit many XML files at once by element and attribute name
#[derive(Parser)]
#[command(name = "xmlquill")]
#[command(version)]
#[command(about = "Edit many XML files at once by element and attribute name", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.config/xmlquill/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print each document as a tree
    Tree {
        files: Vec<String>,
        /// Print the trees as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the value of every element and attribute with a given name
    SetValue {
        #[arg(long)]
        name: String,
        #[arg(long)]
        value: String,
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Rename every element with a given name
    Rename {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Append a child to the first element named PARENT in the first file
    AddChild {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        value: String,
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Delete the first element named NAME in the first file (or in every file)
    Delete {
        #[arg(long)]
        name: String,
        /// Delete the first match from every file instead of just the first file
        #[arg(long)]
        all_files: bool,
        #[arg(required = true)]
        files: Vec<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let mut state = EditorState::new(config);

    match cli.command {
        Command::Tree { files, json } => {
            open_all(&mut state, &files)?;
            print_trees(&state, json)
        }
        Command::SetValue { name, value, files } => {
            open_all(&mut state, &files)?;
            if !select_by_name(&mut state, &name, true) {
                println!("No nodes named '{}' found; nothing saved", name);
                return Ok(());
            }
            let report = state.apply_value(&value)?;
            finish(&state, &report)
        }
        Command::Rename { from, to, files } => {
            open_all(&mut state, &files)?;
            if !select_by_name(&mut state, &from, false) {
                println!("No elements named '{}' found", from);
                return Ok(());
            }
            let report = state.rename(&to)?;
            finish(&state, &report)
        }
        Command::AddChild {
            parent,
            name,
            value,
            files,
        } => {
            open_all(&mut state, &files)?;
            select_first_element(&mut state, &files[0], &parent)?;
            let added = state.add_child(&name, &value)?;
            finish(&state, &added.report)
        }
        Command::Delete {
            name,
            all_files,
            files,
        } => {
            open_all(&mut state, &files)?;
            select_first_element(&mut state, &files[0], &name)?;
            state.open_context_menu();
            let scope = if all_files {
                DeleteScope::AllDocuments
            } else {
                DeleteScope::ThisDocument
            };
            let report = state.confirm_delete(scope)?;
            finish(&state, &report)
        }
    }
}

fn open_all(state: &mut EditorState, files: &[String]) -> Result<()> {
    for file in files {
        state.open_file(file)?;
    }
    Ok(())
}

/// Selects the first node named `name`, trying elements before attributes.
/// Selects the first element named `name`, falling back to the first such
/// attribute when `attributes` is set. Returns false if nothing matched.
fn select_by_name(state: &mut EditorState, name: &str, attributes: bool) -> bool {
    let mut found = None;
    for (_, doc) in state.store().all() {
        if let Some(path) = find_first_element_by_name(doc, name) {
            found = Some(NodeRef::Element(ElementRef::new(doc, path)));
            break;
        }
        if !attributes {
            continue;
        }
        if let Some(attr) = find_attributes_by_name(doc, name).into_iter().next() {
            found = Some(NodeRef::Attribute {
                element: ElementRef::new(doc, attr.element),
                index: attr.index,
            });
            break;
        }
    }

    match found {
        Some(node) => state.select(node).is_ok(),
        None => false,
    }
}

fn select_first_element(state: &mut EditorState, file: &str, name: &str) -> Result<()> {
    let doc = state
        .store()
        .get(file)
        .ok_or_else(|| anyhow!("{} is not loaded", file))?;
    let path = find_first_element_by_name(doc, name)
        .ok_or_else(|| anyhow!("No element named '{}' in {}", name, file))?;
    let node = NodeRef::Element(ElementRef::new(doc, path));
    state.select(node)?;
    Ok(())
}

fn print_trees(state: &EditorState, json: bool) -> Result<()> {
    if json {
        let trees: IndexMap<&str, _> = state
            .store()
            .all()
            .map(|(path, doc)| (path, build_tree_view(doc)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&trees)?);
        return Ok(());
    }

    for (path, doc) in state.store().all() {
        println!("{}", path);
        for line in build_tree_view(doc).lines() {
            println!("{}{}", "  ".repeat(line.depth + 1), line.label);
        }
    }
    Ok(())
}

fn finish(state: &EditorState, report: &BatchReport) -> Result<()> {
    if let Some(message) = state.message() {
        match message.level {
            MessageLevel::Info => println!("{}", message.text),
            MessageLevel::Warning | MessageLevel::Error => eprintln!("{}", message.text),
        }
    }
    if !report.is_success() {
        bail!("{} document(s) failed", report.failures.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(xml: &[u8]) -> EditorState {
        let mut state = EditorState::new(Config::default());
        state.load_document("a.xml", xml).unwrap();
        state
    }

    #[test]
    fn test_select_by_name_prefers_elements() {
        let mut state = state_with(br#"<root id="1"><id>2</id></root>"#);
        assert!(select_by_name(&mut state, "id", true));
        assert!(matches!(state.selected_node(), Some(NodeRef::Element(_))));
    }

    #[test]
    fn test_select_by_name_falls_back_to_attributes() {
        let mut state = state_with(br#"<root id="1"/>"#);
        assert!(select_by_name(&mut state, "id", true));
        assert!(matches!(state.selected_node(), Some(NodeRef::Attribute { .. })));
    }

    #[test]
    fn test_rename_selection_ignores_attributes() {
        let mut state = state_with(br#"<root id="1"/>"#);
        assert!(!select_by_name(&mut state, "id", false));
        assert!(state.selected_node().is_none());
    }
}
