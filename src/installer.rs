//! Install/upgrade orchestration.
//!
//! One run executes a fixed total order: sync the central repo, apply the
//! target topology, patch the marker block for targets that keep one. A
//! failed phase aborts the phases after it; completed phases are not
//! rolled back — every step is idempotent and re-running the whole
//! operation is the supported recovery path.

use std::path::Path;

use serde::Serialize;

use crate::config::InstallOptions;
use crate::error::{Result, SpError};
use crate::gitsync;
use crate::marker::{MarkerBlock, ensure_marked_file};
use crate::topology::{StepResult, TargetKind, apply_plan, plan_for};

/// Sentinels for the codex AGENTS.md block.
pub const AGENTS_START: &str = "<!-- skillhub:codex-agents:start -->";
pub const AGENTS_END: &str = "<!-- skillhub:codex-agents:end -->";

/// Legacy unmarked convention from pre-marker releases.
const LEGACY_HEADER: &str = "## Skillhub System";
const LEGACY_FOOTER: &str = "</EXTREMELY_IMPORTANT>";

/// Install vs upgrade changes nothing but the reported mode name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Install,
    Upgrade,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Install => f.write_str("install"),
            Self::Upgrade => f.write_str("upgrade"),
        }
    }
}

/// Structured result of one install/upgrade run.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub mode: Mode,
    pub target: TargetKind,
    pub ok: bool,
    pub steps: Vec<StepResult>,
}

/// The marker block a codex install maintains in `~/.codex/AGENTS.md`.
#[must_use]
pub fn codex_agents_block() -> MarkerBlock {
    let body = [
        "## Skillhub System",
        "",
        "<EXTREMELY_IMPORTANT>",
        "You have skillhub skills available. Skills teach you new capabilities. RIGHT NOW run: `~/.codex/skillhub/.codex/skillhub-codex bootstrap` and follow the instructions it returns.",
        "</EXTREMELY_IMPORTANT>",
    ]
    .join("\n");

    MarkerBlock {
        start_sentinel: AGENTS_START.to_string(),
        end_sentinel: AGENTS_END.to_string(),
        body,
        legacy: Some((LEGACY_HEADER.to_string(), LEGACY_FOOTER.to_string())),
    }
}

fn sync_central_repo(opts: &InstallOptions, steps: &mut Vec<StepResult>) -> Result<()> {
    gitsync::ensure_cloned(&opts.repo_url, &opts.dir)?;
    steps.push(StepResult::ok("clone", opts.dir.display().to_string()));

    let status = gitsync::status_porcelain(&opts.dir)?;
    if !status.is_empty() && !opts.force {
        return Err(SpError::DirtyWorkTree {
            path: opts.dir.clone(),
            status,
        });
    }
    steps.push(StepResult::ok("clean-check", "working tree usable"));

    gitsync::checkout_ref(&opts.dir, &opts.gitref)?;
    steps.push(StepResult::ok("checkout", opts.gitref.clone()));

    if opts.skip_update {
        steps.push(StepResult::ok("update", "skipped"));
    } else {
        gitsync::fast_forward_update(&opts.dir)?;
        steps.push(StepResult::ok("update", "fast-forwarded"));
    }

    Ok(())
}

/// Run one install or upgrade for one integration target.
///
/// Phase failures short-circuit: a sync error aborts before any filesystem
/// change, a topology failure skips the marker patch. The report carries
/// every step attempted.
pub fn run(mode: Mode, target: TargetKind, home: &Path, opts: &InstallOptions) -> InstallReport {
    let mut steps = Vec::new();

    if let Err(err) = sync_central_repo(opts, &mut steps) {
        steps.push(StepResult::fail("sync", err.to_string()));
        return InstallReport {
            mode,
            target,
            ok: false,
            steps,
        };
    }

    let plan = plan_for(target, home, &opts.dir);
    let (link_steps, topology_ok) = apply_plan(&plan, opts.force);
    steps.extend(link_steps);

    if !topology_ok {
        return InstallReport {
            mode,
            target,
            ok: false,
            steps,
        };
    }

    if target.wants_agents_block() && opts.patch_agents {
        let agents_file = home.join(".codex").join("AGENTS.md");
        match ensure_marked_file(&agents_file, &codex_agents_block(), opts.force) {
            Ok(changed) => steps.push(StepResult::ok(
                "agents-block",
                if changed {
                    format!("{} updated", agents_file.display())
                } else {
                    format!("{} already current", agents_file.display())
                },
            )),
            Err(err) => {
                steps.push(StepResult::fail("agents-block", err.to_string()));
                return InstallReport {
                    mode,
                    target,
                    ok: false,
                    steps,
                };
            }
        }
    }

    InstallReport {
        mode,
        target,
        ok: true,
        steps,
    }
}
