//! sp commands - Query slash-command definitions.

use clap::{Args, Subcommand};
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{emit_json, robot_ok};
use crate::error::{Result, SpError};
use crate::registry;

#[derive(Args, Debug)]
pub struct SlashArgs {
    #[command(subcommand)]
    pub command: SlashCommand,
}

#[derive(Subcommand, Debug)]
pub enum SlashCommand {
    /// List every command definition
    List,

    /// Show one command's metadata and body
    Show {
        /// Command name without the leading slash
        name: String,
    },
}

pub fn run(ctx: &AppContext, args: &SlashArgs) -> Result<()> {
    let central_dir = ctx.central_dir()?;
    let mut registries = registry::from_config(&ctx.config, &central_dir);
    let commands = &mut registries.commands;

    match &args.command {
        SlashCommand::List => {
            let all: Vec<_> = commands.get_all().into_iter().cloned().collect();
            if ctx.robot_mode {
                emit_json(&robot_ok(&all))?;
            } else {
                println!("{} ({} commands)", "sp commands".bold(), all.len());
                println!();
                for command in &all {
                    let invocation = if command.disable_model_invocation {
                        "user-only".yellow()
                    } else {
                        "model-ok".normal().dimmed()
                    };
                    println!(
                        "/{:<23} {} {}",
                        command.name.bold(),
                        invocation,
                        command.description
                    );
                }
            }
            Ok(())
        }
        SlashCommand::Show { name } => {
            let Some(command) = commands.get(name) else {
                return Err(SpError::NotFound(format!("command '{name}'")));
            };
            if ctx.robot_mode {
                emit_json(&robot_ok(command))?;
            } else {
                println!("/{}", command.name.bold());
                println!("{}", command.description);
                println!();
                println!("{}", command.body);
            }
            Ok(())
        }
    }
}
