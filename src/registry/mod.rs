//! Registries: name-based lookup over the skill, subagent, and command
//! sources with deterministic override semantics.
//!
//! Registries are explicit objects constructed from explicit directory
//! configuration; there is no process-wide shared instance. Every registry
//! loads lazily on first access and a `load()` fully replaces prior
//! contents.

pub mod commands;
pub mod frontmatter;
pub mod skills;
pub mod subagents;

use std::path::Path;

use crate::config::Config;

pub use commands::{CommandDescriptor, CommandRegistry};
pub use frontmatter::{Frontmatter, extract_frontmatter, strip_frontmatter};
pub use skills::{SkillDescriptor, SkillRegistry, SourceType, SupportingFile};
pub use subagents::{SubagentDescriptor, SubagentRegistry};

/// Build the three registries from config, defaulting unset directories
/// against the central working copy.
#[must_use]
pub fn from_config(config: &Config, central_dir: &Path) -> Registries {
    let reg = &config.registry;
    Registries {
        skills: SkillRegistry::new(
            reg.skills_dir
                .clone()
                .unwrap_or_else(|| central_dir.join("skills")),
            reg.personal_dir.clone(),
        ),
        subagents: SubagentRegistry::new(
            reg.agents_dir
                .clone()
                .unwrap_or_else(|| central_dir.join("agents")),
        ),
        commands: CommandRegistry::new(
            reg.commands_dir
                .clone()
                .unwrap_or_else(|| central_dir.join("commands")),
        ),
    }
}

/// The three registries over one central working copy.
#[derive(Debug)]
pub struct Registries {
    pub skills: SkillRegistry,
    pub subagents: SubagentRegistry,
    pub commands: CommandRegistry,
}
