//! Non-mutating verification that an installed topology matches its plan.
//!
//! Doctor recomputes the same plan the installer applies (shared
//! [`plan_for`]) and reports one check per expected artifact. Nothing on
//! disk is altered.

use std::path::Path;

use serde::Serialize;

use crate::gitsync;
use crate::topology::{LinkDescriptor, LinkKind, TargetKind, TargetPlan, plan_for};
use crate::utils::fs::{path_exists, resolve_link_target};

/// One diagnostic check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

/// Aggregate doctor report; `ok` is the AND over all checks.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub target: TargetKind,
    pub ok: bool,
    pub checks: Vec<CheckResult>,
}

fn check_link(link: &LinkDescriptor) -> CheckResult {
    let name = match link.kind {
        LinkKind::Dir => "dir-link",
        LinkKind::File => "file-link",
    };
    let detail = format!(
        "{} -> {}",
        link.link_path.display(),
        link.target_path.display()
    );

    if !path_exists(&link.link_path) {
        return CheckResult {
            name: name.to_string(),
            ok: false,
            detail: format!("{detail} (missing)"),
        };
    }

    let expected = link
        .target_path
        .canonicalize()
        .unwrap_or_else(|_| link.target_path.clone());
    let ok = match resolve_link_target(&link.link_path) {
        Some(resolved) => resolved == expected,
        None => false,
    };

    CheckResult {
        name: name.to_string(),
        ok,
        detail: if ok {
            detail
        } else {
            format!("{detail} (wrong target)")
        },
    }
}

/// Run all checks for one target against the central working copy.
#[must_use]
pub fn run_checks(target: TargetKind, home: &Path, central_dir: &Path) -> DoctorReport {
    let plan: TargetPlan = plan_for(target, home, central_dir);
    let mut checks = Vec::with_capacity(plan.ensure_dirs.len() + plan.links.len() + 2);

    checks.push(CheckResult {
        name: "git-binary".to_string(),
        ok: which::which("git").is_ok(),
        detail: "git available on PATH".to_string(),
    });

    checks.push(CheckResult {
        name: "central-repo".to_string(),
        ok: gitsync::is_repo(central_dir),
        detail: central_dir.display().to_string(),
    });

    for dir in &plan.ensure_dirs {
        checks.push(CheckResult {
            name: "dir".to_string(),
            ok: dir.is_dir(),
            detail: dir.display().to_string(),
        });
    }

    for link in &plan.links {
        checks.push(check_link(link));
    }

    let ok = checks.iter().all(|c| c.ok);
    DoctorReport { target, ok, checks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::apply_plan;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("home");
        let central = temp.path().join("central");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(central.join(".git")).unwrap();
        std::fs::create_dir_all(central.join("skills")).unwrap();
        (temp, home, central)
    }

    #[test]
    fn doctor_fails_on_fresh_home() {
        let (_temp, home, central) = fixture();
        let report = run_checks(TargetKind::Codex, &home, &central);

        assert!(!report.ok);
        let missing: Vec<_> = report.checks.iter().filter(|c| !c.ok).collect();
        assert!(missing.iter().any(|c| c.name == "dir"));
        assert!(missing.iter().any(|c| c.name == "dir-link"));
    }

    #[cfg(unix)]
    #[test]
    fn doctor_passes_after_apply() {
        let (_temp, home, central) = fixture();
        let plan = plan_for(TargetKind::Kilocode, &home, &central);
        let (_steps, ok) = apply_plan(&plan, false);
        assert!(ok);

        let report = run_checks(TargetKind::Kilocode, &home, &central);
        assert!(report.ok, "failed checks: {:?}", report.checks);
    }

    #[cfg(unix)]
    #[test]
    fn doctor_flags_wrong_link_target() {
        let (_temp, home, central) = fixture();
        let plan = plan_for(TargetKind::Kilocode, &home, &central);
        let (_steps, ok) = apply_plan(&plan, false);
        assert!(ok);

        // Repoint the link somewhere else.
        let link_path = &plan.links[0].link_path;
        std::fs::remove_file(link_path).unwrap();
        std::os::unix::fs::symlink(&home, link_path).unwrap();

        let report = run_checks(TargetKind::Kilocode, &home, &central);
        assert!(!report.ok);
        let bad = report
            .checks
            .iter()
            .find(|c| c.name == "dir-link")
            .unwrap();
        assert!(!bad.ok);
        assert!(bad.detail.contains("wrong target"));
    }

    #[test]
    fn doctor_does_not_mutate() {
        let (_temp, home, central) = fixture();
        run_checks(TargetKind::Codex, &home, &central);
        // Doctor must not create any of the planned paths.
        assert!(!home.join(".codex").exists());
    }
}
