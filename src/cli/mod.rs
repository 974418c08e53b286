//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::topology::TargetKind;

pub mod commands;
pub mod output;

/// sp - Distribute versioned skill bundles into AI coding tool configurations
#[derive(Parser, Debug)]
#[command(name = "sp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable JSON output for machine consumption
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/sp/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI-facing integration target. Maps 1:1 onto [`TargetKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Codex,
    Kilocode,
    Opencode,
}

impl From<TargetArg> for TargetKind {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Codex => Self::Codex,
            TargetArg::Kilocode => Self::Kilocode,
            TargetArg::Opencode => Self::Opencode,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install skill bundles for an integration target
    Install(commands::install::InstallArgs),

    /// Update an existing installation to the latest ref
    Upgrade(commands::install::InstallArgs),

    /// Check an installation's health without changing anything
    Doctor(commands::doctor::DoctorArgs),

    /// Query the skill registry
    Skills(commands::skills::SkillsArgs),

    /// Query and render subagent definitions
    Agents(commands::agents::AgentsArgs),

    /// Query slash-command definitions
    Commands(commands::slash::SlashArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}
