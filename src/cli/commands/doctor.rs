//! sp doctor - Read-only health checks for an installation.

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::TargetArg;
use crate::cli::output::{emit_json, robot_ok};
use crate::config::expand_home;
use crate::error::{Result, SpError};
use crate::topology::TargetKind;
use crate::topology::doctor::run_checks;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Integration target to check
    #[arg(value_enum)]
    pub target: TargetArg,

    /// Central working copy directory (default: ~/.skillhub)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &DoctorArgs) -> Result<()> {
    let target = TargetKind::from(args.target);
    let central_dir = match &args.dir {
        Some(dir) => expand_home(dir)?,
        None => ctx.central_dir()?,
    };

    let report = run_checks(target, &ctx.home, &central_dir);

    if ctx.robot_mode {
        emit_json(&robot_ok(&report))?;
    } else {
        println!("{}", format!("sp doctor - {target}").bold());
        println!();
        for check in &report.checks {
            if check.ok {
                println!("{} {} {}", "✓".green(), check.name, check.detail.dimmed());
            } else {
                println!("{} {} {}", "✗".red(), check.name, check.detail);
            }
        }
        println!();
        if report.ok {
            println!("{} All checks passed", "✓".green().bold());
        } else {
            println!(
                "{} Problems found; run 'sp install {target}' to repair",
                "✗".red().bold()
            );
        }
    }

    if report.ok {
        Ok(())
    } else {
        Err(SpError::RunIncomplete {
            mode: "doctor".to_string(),
        })
    }
}
