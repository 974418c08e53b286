//! Command registry: slash-command shortcuts defined one per file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::registry::frontmatter::{extract_frontmatter, strip_frontmatter};

/// One slash-command definition.
#[derive(Debug, Clone, Serialize)]
pub struct CommandDescriptor {
    /// Command name without the leading `/`.
    pub name: String,
    pub description: String,
    /// Whether the model may invoke this command on its own.
    pub disable_model_invocation: bool,
    /// Raw body (frontmatter stripped).
    pub body: String,
    pub file_path: PathBuf,
}

/// Registry over a flat directory of `*.md` command definitions.
#[derive(Debug)]
pub struct CommandRegistry {
    commands_dir: PathBuf,
    commands: BTreeMap<String, CommandDescriptor>,
    loaded: bool,
}

impl CommandRegistry {
    #[must_use]
    pub fn new(commands_dir: PathBuf) -> Self {
        Self {
            commands_dir,
            commands: BTreeMap::new(),
            loaded: false,
        }
    }

    /// Rescan the commands directory, fully replacing prior contents.
    pub fn load(&mut self) -> &mut Self {
        self.commands.clear();

        let entries = match std::fs::read_dir(&self.commands_dir) {
            Ok(entries) => entries,
            Err(_) => {
                self.loaded = true;
                return self;
            }
        };

        for entry in entries.filter_map(std::result::Result::ok) {
            let path = entry.path();
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };

            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "skipping unreadable command");
                    continue;
                }
            };

            let fm = extract_frontmatter(&content);
            self.commands.insert(
                name.clone(),
                CommandDescriptor {
                    name,
                    description: fm.description.unwrap_or_default(),
                    disable_model_invocation: fm.disable_model_invocation.unwrap_or(false),
                    body: strip_frontmatter(&content),
                    file_path: path,
                },
            );
        }

        self.loaded = true;
        self
    }

    fn ensure_loaded(&mut self) {
        if !self.loaded {
            self.load();
        }
    }

    /// Get a command by name (without the leading `/`). Missing names are
    /// `None`, never an error.
    pub fn get(&mut self, name: &str) -> Option<&CommandDescriptor> {
        self.ensure_loaded();
        self.commands.get(name)
    }

    /// All loaded commands, ordered by name.
    pub fn get_all(&mut self) -> Vec<&CommandDescriptor> {
        self.ensure_loaded();
        self.commands.values().collect()
    }

    /// Check if a command exists.
    pub fn has(&mut self, name: &str) -> bool {
        self.ensure_loaded();
        self.commands.contains_key(name)
    }
}
