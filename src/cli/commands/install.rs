//! sp install / sp upgrade - Sync the central repo and wire up a target.

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::TargetArg;
use crate::cli::output::{emit_json, robot_ok};
use crate::config::InstallOptions;
use crate::error::{Result, SpError};
use crate::installer::{self, Mode};
use crate::topology::TargetKind;

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Integration target to wire up
    #[arg(value_enum)]
    pub target: TargetArg,

    /// Source repository (`owner/name` or a full git URL)
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch, tag, or commit to check out
    #[arg(long = "ref")]
    pub gitref: Option<String>,

    /// Central working copy directory (default: ~/.skillhub)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Replace colliding paths and proceed past a dirty working tree
    #[arg(long)]
    pub force: bool,

    /// Check out the ref without fetching updates first
    #[arg(long)]
    pub skip_update: bool,

    /// Do not maintain the AGENTS.md marker block (codex only)
    #[arg(long)]
    pub no_agents_block: bool,
}

pub fn run(ctx: &AppContext, mode: Mode, args: &InstallArgs) -> Result<()> {
    let target = TargetKind::from(args.target);
    let opts = InstallOptions::resolve(
        &ctx.config,
        args.repo.as_deref(),
        args.gitref.as_deref(),
        args.dir.as_deref(),
        args.force,
        args.skip_update,
        !args.no_agents_block,
    )?;

    tracing::info!(%mode, %target, repo = %opts.repo_url, gitref = %opts.gitref, "starting run");
    let report = installer::run(mode, target, &ctx.home, &opts);

    if ctx.robot_mode {
        emit_json(&robot_ok(&report))?;
    } else {
        println!("{}", format!("sp {mode} - {target}").bold());
        println!();
        for step in &report.steps {
            if step.ok {
                println!("{} {} {}", "✓".green(), step.name, step.detail.dimmed());
            } else {
                println!("{} {} {}", "✗".red(), step.name, step.detail);
            }
        }
        println!();
        if report.ok {
            println!("{} {} complete", "✓".green().bold(), mode);
        } else {
            println!(
                "{} {} failed; fix the issues above and re-run",
                "✗".red().bold(),
                mode
            );
        }
    }

    if report.ok {
        Ok(())
    } else {
        Err(SpError::RunIncomplete {
            mode: mode.to_string(),
        })
    }
}
