//! Installation topology: per-target directory and link plans.
//!
//! The filesystem is the only persisted state. [`plan_for`] is the single
//! pure function that computes what a target's layout must look like; the
//! installer applies it and `doctor` re-checks it, so the two can never
//! drift apart.

pub mod doctor;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpError};
use crate::utils::fs::{
    ensure_dir, path_exists, remove_occupant, resolve_link_target, symlink_dir, symlink_file,
};

/// The host tools sp knows how to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Codex,
    Kilocode,
    Opencode,
}

impl TargetKind {
    pub const ALL: [Self; 3] = [Self::Codex, Self::Kilocode, Self::Opencode];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Codex => "codex",
            Self::Kilocode => "kilocode",
            Self::Opencode => "opencode",
        }
    }

    /// Whether this target keeps an installer-owned marker block in its
    /// AGENTS.md file.
    #[must_use]
    pub const fn wants_agents_block(self) -> bool {
        matches!(self, Self::Codex)
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetKind {
    type Err = SpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "codex" => Ok(Self::Codex),
            "kilocode" => Ok(Self::Kilocode),
            "opencode" => Ok(Self::Opencode),
            other => Err(SpError::UnknownTarget(other.to_string())),
        }
    }
}

/// Directory link or single-file link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Dir,
    File,
}

/// One declared filesystem correspondence: `link_path` must resolve to
/// exactly `target_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    pub kind: LinkKind,
    pub link_path: PathBuf,
    pub target_path: PathBuf,
}

/// Everything one integration target requires on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPlan {
    pub target: TargetKind,
    /// Directories that must exist (created recursively, idempotent).
    pub ensure_dirs: Vec<PathBuf>,
    /// Links that must resolve to their targets.
    pub links: Vec<LinkDescriptor>,
}

/// Compute the plan for one integration target.
///
/// Computed fresh on every install/upgrade/doctor invocation; never
/// persisted.
#[must_use]
pub fn plan_for(target: TargetKind, home: &Path, central_dir: &Path) -> TargetPlan {
    let dir_link = |link_path: PathBuf, target_path: PathBuf| LinkDescriptor {
        kind: LinkKind::Dir,
        link_path,
        target_path,
    };

    match target {
        TargetKind::Codex => TargetPlan {
            target,
            ensure_dirs: vec![home.join(".codex").join("skills")],
            links: vec![dir_link(
                home.join(".codex").join("skillhub"),
                central_dir.to_path_buf(),
            )],
        },
        TargetKind::Kilocode => TargetPlan {
            target,
            ensure_dirs: vec![home.join(".config").join("kilocode").join("skills")],
            links: vec![dir_link(
                home.join(".config").join("kilocode").join("skillhub"),
                central_dir.to_path_buf(),
            )],
        },
        TargetKind::Opencode => {
            let opencode = home.join(".config").join("opencode");
            TargetPlan {
                target,
                ensure_dirs: vec![],
                links: vec![
                    dir_link(opencode.join("skillhub"), central_dir.to_path_buf()),
                    LinkDescriptor {
                        kind: LinkKind::File,
                        link_path: opencode.join("plugins").join("skillhub.js"),
                        target_path: central_dir
                            .join(".opencode")
                            .join("plugins")
                            .join("skillhub.js"),
                    },
                    dir_link(
                        opencode.join("skills").join("hub"),
                        central_dir.join("skills"),
                    ),
                ],
            }
        }
    }
}

/// What applying one link actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    Created,
    AlreadySatisfied,
    Replaced,
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::AlreadySatisfied => "already satisfied",
            Self::Replaced => "replaced",
        })
    }
}

/// The expected real target for comparison: canonical when resolvable,
/// lexically absolute otherwise.
fn expected_target(target_path: &Path) -> PathBuf {
    target_path
        .canonicalize()
        .or_else(|_| std::path::absolute(target_path))
        .unwrap_or_else(|_| target_path.to_path_buf())
}

/// Make one link descriptor hold on disk.
///
/// Absent: create. Present and already resolving to the expected target:
/// no-op. Present with a different target: refuse without `force`; with
/// `force`, remove the occupant (containment-checked) and recreate.
pub fn ensure_link(link: &LinkDescriptor, force: bool) -> Result<LinkOutcome> {
    let mut outcome = LinkOutcome::Created;

    if path_exists(&link.link_path) {
        if let Some(resolved) = resolve_link_target(&link.link_path) {
            if resolved == expected_target(&link.target_path) {
                return Ok(LinkOutcome::AlreadySatisfied);
            }
        }

        if !force {
            return Err(SpError::PathConflict(link.link_path.clone()));
        }
        remove_occupant(&link.link_path)?;
        outcome = LinkOutcome::Replaced;
    }

    if let Some(parent) = link.link_path.parent() {
        ensure_dir(parent)?;
    }

    match link.kind {
        LinkKind::Dir => symlink_dir(&link.target_path, &link.link_path)?,
        LinkKind::File => symlink_file(&link.target_path, &link.link_path)?,
    }

    Ok(outcome)
}

/// One structured step result, reported per directory and per link.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

impl StepResult {
    pub fn ok(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ok: true,
            detail: detail.into(),
        }
    }

    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ok: false,
            detail: detail.into(),
        }
    }
}

/// Apply a target plan. Each directory and link is an independent step; a
/// failed link does not stop its siblings, but any failure marks the whole
/// phase failed. Returns the per-step results and the aggregate.
pub fn apply_plan(plan: &TargetPlan, force: bool) -> (Vec<StepResult>, bool) {
    let mut steps = Vec::with_capacity(plan.ensure_dirs.len() + plan.links.len());
    let mut all_ok = true;

    for dir in &plan.ensure_dirs {
        let existed = path_exists(dir);
        match ensure_dir(dir) {
            Ok(()) => {
                let outcome = if existed { "already present" } else { "created" };
                steps.push(StepResult::ok(
                    "dir",
                    format!("{} ({outcome})", dir.display()),
                ));
            }
            Err(err) => {
                all_ok = false;
                steps.push(StepResult::fail(
                    "dir",
                    format!("{}: {err}", dir.display()),
                ));
            }
        }
    }

    for link in &plan.links {
        let name = match link.kind {
            LinkKind::Dir => "dir-link",
            LinkKind::File => "file-link",
        };
        let detail = format!(
            "{} -> {}",
            link.link_path.display(),
            link.target_path.display()
        );
        match ensure_link(link, force) {
            Ok(outcome) => {
                tracing::debug!(link = %link.link_path.display(), ?outcome, "link applied");
                steps.push(StepResult::ok(name, format!("{detail} ({outcome})")));
            }
            Err(err) => {
                all_ok = false;
                steps.push(StepResult::fail(name, format!("{detail}: {err}")));
            }
        }
    }

    (steps, all_ok)
}
