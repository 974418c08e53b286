//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;
use crate::installer::Mode;

pub mod agents;
pub mod completions;
pub mod doctor;
pub mod install;
pub mod skills;
pub mod slash;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Install(args) => install::run(ctx, Mode::Install, args),
        Commands::Upgrade(args) => install::run(ctx, Mode::Upgrade, args),
        Commands::Doctor(args) => doctor::run(ctx, args),
        Commands::Skills(args) => skills::run(ctx, args),
        Commands::Agents(args) => agents::run(ctx, args),
        Commands::Commands(args) => slash::run(ctx, args),
        Commands::Completions(args) => completions::run(args),
    }
}
