//! sp agents - Query and render subagent definitions.

use std::collections::BTreeMap;

use clap::{Args, Subcommand};
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{emit_json, robot_ok};
use crate::error::{Result, SpError};
use crate::registry;

#[derive(Args, Debug)]
pub struct AgentsArgs {
    #[command(subcommand)]
    pub command: AgentsCommand,
}

#[derive(Subcommand, Debug)]
pub enum AgentsCommand {
    /// List every subagent definition
    List,

    /// Show one subagent's metadata and raw prompt template
    Show {
        /// Slug or display name
        name: String,
    },

    /// Render a subagent's prompt with `{placeholder}` substitution
    Render {
        /// Slug or display name
        name: String,

        /// Template variable as KEY=VALUE (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },
}

fn parse_vars(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    for entry in raw {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(SpError::Config(format!(
                "invalid --var '{entry}', expected KEY=VALUE"
            )));
        };
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(vars)
}

pub fn run(ctx: &AppContext, args: &AgentsArgs) -> Result<()> {
    let central_dir = ctx.central_dir()?;
    let mut registries = registry::from_config(&ctx.config, &central_dir);
    let agents = &mut registries.subagents;

    match &args.command {
        AgentsCommand::List => {
            let all: Vec<_> = agents.get_all().into_iter().cloned().collect();
            if ctx.robot_mode {
                emit_json(&robot_ok(&all))?;
            } else {
                println!("{} ({} agents)", "sp agents".bold(), all.len());
                println!();
                for agent in &all {
                    println!(
                        "{:<24} {:<10} {}",
                        agent.slug.bold(),
                        agent.model.dimmed(),
                        agent.description
                    );
                }
            }
            Ok(())
        }
        AgentsCommand::Show { name } => {
            let Some(agent) = agents.get(name) else {
                return Err(SpError::NotFound(format!("agent '{name}'")));
            };
            if ctx.robot_mode {
                emit_json(&robot_ok(agent))?;
            } else {
                println!("{} ({})", agent.name.bold(), agent.slug);
                println!("{}", agent.description);
                println!("model: {}", agent.model);
                println!();
                println!("{}", agent.prompt_template);
            }
            Ok(())
        }
        AgentsCommand::Render { name, vars } => {
            let vars = parse_vars(vars)?;
            let Some(rendered) = agents.render(name, &vars) else {
                return Err(SpError::NotFound(format!("agent '{name}'")));
            };
            if ctx.robot_mode {
                emit_json(&robot_ok(serde_json::json!({
                    "name": name,
                    "rendered": rendered,
                })))?;
            } else {
                println!("{rendered}");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_vars_accepts_key_value_pairs() {
        let vars = parse_vars(&["a=1".to_string(), "b=x=y".to_string()]).unwrap();
        assert_eq!(vars.get("a").map(String::as_str), Some("1"));
        assert_eq!(vars.get("b").map(String::as_str), Some("x=y"));
    }

    #[test]
    fn parse_vars_rejects_missing_equals() {
        assert!(parse_vars(&["oops".to_string()]).is_err());
    }
}
