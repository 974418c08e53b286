//! sp skills - Query the skill registry.

use clap::{Args, Subcommand};
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{emit_json, robot_ok};
use crate::config::expand_home;
use crate::error::{Result, SpError};
use crate::registry::{self, SkillDescriptor, SourceType};
use crate::utils::fs::{copy_dir_all, path_exists, remove_path};

#[derive(Args, Debug)]
pub struct SkillsArgs {
    #[command(subcommand)]
    pub command: SkillsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SkillsCommand {
    /// List every skill, personal entries shadowing primary ones
    List,

    /// Show one skill's metadata, body, and supporting files
    Show {
        /// Skill name (bare or qualified, e.g. `debugging` or `hub:debugging`)
        name: String,
    },

    /// Substring search over names and descriptions
    Search { query: String },

    /// Copy a hub skill into the personal directory for local editing
    Adopt {
        /// Skill name (bare or qualified)
        name: String,

        /// Replace an existing personal copy
        #[arg(long)]
        force: bool,
    },
}

fn print_skill_line(skill: &SkillDescriptor) {
    let marker = match skill.source {
        SourceType::Personal => "personal".yellow(),
        SourceType::Primary => "primary".normal().dimmed(),
    };
    print!(
        "{:<28} {} {}",
        skill.qualified_name.bold(),
        marker,
        skill.description
    );
    if let Some(shadowed) = &skill.shadows {
        print!(" {}", format!("(shadows {shadowed})").dimmed());
    }
    println!();
}

pub fn run(ctx: &AppContext, args: &SkillsArgs) -> Result<()> {
    let central_dir = ctx.central_dir()?;
    let mut registries = registry::from_config(&ctx.config, &central_dir);
    let skills = &mut registries.skills;

    match &args.command {
        SkillsCommand::List => {
            let all: Vec<_> = skills.get_all().into_iter().cloned().collect();
            if ctx.robot_mode {
                emit_json(&robot_ok(&all))?;
            } else {
                println!("{} ({} skills)", "sp skills".bold(), all.len());
                println!();
                for skill in &all {
                    print_skill_line(skill);
                }
            }
            Ok(())
        }
        SkillsCommand::Show { name } => {
            let Some((descriptor, content)) = skills.get_with_content(name) else {
                return Err(SpError::NotFound(format!("skill '{name}'")));
            };
            let supporting = skills.supporting_files(name);

            if ctx.robot_mode {
                emit_json(&robot_ok(serde_json::json!({
                    "skill": descriptor,
                    "content": content,
                    "supporting_files": supporting,
                })))?;
            } else {
                println!("{}", descriptor.qualified_name.bold());
                println!("{}", descriptor.description);
                println!("{}", descriptor.directory.display().to_string().dimmed());
                if !supporting.is_empty() {
                    println!();
                    println!("{}", "Supporting files:".bold());
                    for file in &supporting {
                        println!("  {}", file.name);
                    }
                }
                println!();
                println!("{content}");
            }
            Ok(())
        }
        SkillsCommand::Adopt { name, force } => {
            let Some(personal_dir) = &ctx.config.registry.personal_dir else {
                return Err(SpError::Config(
                    "no personal skills directory; set registry.personal_dir or SP_PERSONAL_DIR"
                        .to_string(),
                ));
            };
            let personal_dir = expand_home(personal_dir)?;

            let Some(skill) = skills.get(name).cloned() else {
                return Err(SpError::NotFound(format!("skill '{name}'")));
            };
            if skill.source == SourceType::Personal {
                return Err(SpError::Config(format!(
                    "skill '{}' is already personal: {}",
                    skill.name,
                    skill.directory.display()
                )));
            }

            let dest = personal_dir.join(&skill.name);
            if path_exists(&dest) {
                if !*force {
                    return Err(SpError::PathConflict(dest));
                }
                remove_path(&dest)?;
            }
            copy_dir_all(&skill.directory, &dest)?;
            tracing::info!(skill = %skill.name, dest = %dest.display(), "skill adopted");

            if ctx.robot_mode {
                emit_json(&robot_ok(serde_json::json!({
                    "adopted": skill.name,
                    "from": skill.directory,
                    "to": dest,
                })))?;
            } else {
                println!(
                    "{} adopted {} into {}",
                    "✓".green(),
                    skill.qualified_name.bold(),
                    dest.display()
                );
                println!("The personal copy now shadows {}", skill.qualified_name);
            }
            Ok(())
        }
        SkillsCommand::Search { query } => {
            let hits: Vec<_> = skills.search(query).into_iter().cloned().collect();
            if ctx.robot_mode {
                emit_json(&robot_ok(&hits))?;
            } else if hits.is_empty() {
                println!("No skills matching '{query}'");
            } else {
                for skill in &hits {
                    print_skill_line(skill);
                }
            }
            Ok(())
        }
    }
}
