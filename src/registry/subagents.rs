//! Subagent registry: single-file prompt templates in a flat directory.
//!
//! Subagents are specialized prompts handed to a task-runner tool. Each
//! `agents/<slug>.md` file is one definition; rendering substitutes
//! `{KEY}` placeholders literally.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::registry::frontmatter::{extract_frontmatter, strip_frontmatter};

/// One subagent definition.
#[derive(Debug, Clone, Serialize)]
pub struct SubagentDescriptor {
    /// File stem; the canonical lookup key.
    pub slug: String,
    /// Display name from frontmatter, falling back to the slug.
    pub name: String,
    pub description: String,
    /// Model override; "inherit" means use the caller's model.
    pub model: String,
    /// Raw template body (frontmatter stripped).
    pub prompt_template: String,
    pub file_path: PathBuf,
}

/// Registry over a flat directory of `*.md` subagent definitions.
#[derive(Debug)]
pub struct SubagentRegistry {
    agents_dir: PathBuf,
    subagents: BTreeMap<String, SubagentDescriptor>,
    loaded: bool,
}

impl SubagentRegistry {
    #[must_use]
    pub fn new(agents_dir: PathBuf) -> Self {
        Self {
            agents_dir,
            subagents: BTreeMap::new(),
            loaded: false,
        }
    }

    /// Rescan the agents directory, fully replacing prior contents. A
    /// missing directory loads empty; unreadable files are logged and
    /// skipped.
    pub fn load(&mut self) -> &mut Self {
        self.subagents.clear();

        let entries = match std::fs::read_dir(&self.agents_dir) {
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
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };

            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "skipping unreadable subagent");
                    continue;
                }
            };

            let fm = extract_frontmatter(&content);
            self.subagents.insert(
                slug.clone(),
                SubagentDescriptor {
                    name: fm.name.unwrap_or_else(|| slug.clone()),
                    slug,
                    description: fm.description.unwrap_or_default(),
                    model: fm.model.unwrap_or_else(|| "inherit".to_string()),
                    prompt_template: strip_frontmatter(&content),
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

    /// Get a subagent by slug, falling back to display name.
    pub fn get(&mut self, name: &str) -> Option<&SubagentDescriptor> {
        self.ensure_loaded();
        if self.subagents.contains_key(name) {
            return self.subagents.get(name);
        }
        self.subagents.values().find(|s| s.name == name)
    }

    /// All loaded subagents, ordered by slug.
    pub fn get_all(&mut self) -> Vec<&SubagentDescriptor> {
        self.ensure_loaded();
        self.subagents.values().collect()
    }

    /// Render a subagent prompt with literal `{KEY}` substitution.
    ///
    /// Replacement is repeated whole-token replacement; unknown
    /// placeholders are left verbatim so a partially specified variable
    /// set still yields a usable preview.
    pub fn render(&mut self, name: &str, variables: &BTreeMap<String, String>) -> Option<String> {
        let subagent = self.get(name)?;
        let mut prompt = subagent.prompt_template.clone();
        for (key, value) in variables {
            prompt = prompt.replace(&format!("{{{key}}}"), value);
        }
        Some(prompt)
    }
}
