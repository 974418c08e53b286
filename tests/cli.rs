use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Build a local origin repo shaped like a canonical skill source.
fn make_origin(dir: &Path) {
    let run = |args: &[&str]| {
        let out = StdCommand::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(out.status.success(), "git {args:?}: {out:?}");
    };
    std::fs::create_dir_all(dir.join("skills/debugging")).unwrap();
    std::fs::write(
        dir.join("skills/debugging/SKILL.md"),
        "---\nname: debugging\ndescription: Systematic debugging workflow\n---\n# Debugging\nBody.\n",
    )
    .unwrap();
    std::fs::create_dir_all(dir.join("agents")).unwrap();
    std::fs::write(
        dir.join("agents/reviewer.md"),
        "---\nname: Code Reviewer\ndescription: Reviews diffs\nmodel: inherit\n---\nReview {file} carefully.\n",
    )
    .unwrap();
    std::fs::create_dir_all(dir.join("commands")).unwrap();
    std::fs::write(
        dir.join("commands/ship.md"),
        "---\ndescription: Ship the change\ndisable-model-invocation: true\n---\nShip it.\n",
    )
    .unwrap();
    std::fs::create_dir_all(dir.join(".opencode/plugins")).unwrap();
    std::fs::write(dir.join(".opencode/plugins/skillhub.js"), "export {}\n").unwrap();
    run(&["init", "--initial-branch=main"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "Test"]);
    run(&["add", "."]);
    run(&["commit", "-m", "initial"]);
}

fn sp(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sp").unwrap();
    cmd.env("SP_HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("SP_REPO")
        .env_remove("SP_REF")
        .env_remove("SP_DIR")
        .env_remove("SP_PERSONAL_DIR");
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("sp").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("sp").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_robot_mode_global() {
    let mut cmd = Command::cargo_bin("sp").unwrap();
    cmd.args(["--robot", "--help"]).assert().success();
}

#[test]
fn test_completions_bash() {
    let mut cmd = Command::cargo_bin("sp").unwrap();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sp"));
}

#[test]
fn test_unknown_target_is_a_usage_error() {
    let dir = tempdir().unwrap();
    sp(dir.path())
        .args(["doctor", "emacs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("emacs"));
}

#[test]
fn test_doctor_fails_on_fresh_home() {
    let dir = tempdir().unwrap();
    let home = dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();

    sp(&home)
        .args(["doctor", "codex"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("central-repo"));
}

#[cfg(unix)]
#[test]
fn test_install_doctor_upgrade_flow() {
    if !git_available() {
        return;
    }
    let dir = tempdir().unwrap();
    let origin = dir.path().join("origin");
    std::fs::create_dir_all(&origin).unwrap();
    make_origin(&origin);
    let home = dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    let repo = origin.display().to_string();

    sp(&home)
        .args(["install", "codex", "--repo", &repo, "--skip-update"])
        .assert()
        .success()
        .stdout(predicate::str::contains("install complete"));

    assert!(home.join(".skillhub/.git").exists());
    assert!(home.join(".codex/skills").is_dir());
    let agents = std::fs::read_to_string(home.join(".codex/AGENTS.md")).unwrap();
    assert!(agents.contains("<!-- skillhub:codex-agents:start -->"));

    sp(&home).args(["doctor", "codex"]).assert().success();

    // Upgrade over an existing install is a no-op, not an error.
    sp(&home)
        .args(["upgrade", "codex", "--repo", &repo, "--skip-update"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upgrade complete"));
    assert_eq!(
        std::fs::read_to_string(home.join(".codex/AGENTS.md")).unwrap(),
        agents
    );
}

#[cfg(unix)]
#[test]
fn test_install_refuses_occupied_link_path() {
    if !git_available() {
        return;
    }
    let dir = tempdir().unwrap();
    let origin = dir.path().join("origin");
    std::fs::create_dir_all(&origin).unwrap();
    make_origin(&origin);
    let home = dir.path().join("home");
    std::fs::create_dir_all(home.join(".codex/skillhub")).unwrap();
    std::fs::write(home.join(".codex/skillhub/keep.txt"), "user data").unwrap();
    let repo = origin.display().to_string();

    sp(&home)
        .args(["install", "codex", "--repo", &repo, "--skip-update"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("--force"));

    // Occupant untouched without --force.
    assert!(home.join(".codex/skillhub/keep.txt").exists());

    sp(&home)
        .args(["install", "codex", "--repo", &repo, "--skip-update", "--force"])
        .assert()
        .success();
    assert!(home.join(".codex/skillhub/skills").is_dir());
}

#[cfg(unix)]
#[test]
fn test_skills_registry_commands() {
    if !git_available() {
        return;
    }
    let dir = tempdir().unwrap();
    let origin = dir.path().join("origin");
    std::fs::create_dir_all(&origin).unwrap();
    make_origin(&origin);
    let home = dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    let repo = origin.display().to_string();

    sp(&home)
        .args(["install", "kilocode", "--repo", &repo, "--skip-update"])
        .assert()
        .success();

    let output = sp(&home)
        .args(["--robot", "skills", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], Value::String("ok".to_string()));
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["qualified_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["hub:debugging"]);

    sp(&home)
        .args(["skills", "show", "debugging"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Debugging"));

    sp(&home)
        .args(["skills", "show", "no-such-skill"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-skill"));
}

#[cfg(unix)]
#[test]
fn test_personal_skills_shadow_primary() {
    if !git_available() {
        return;
    }
    let dir = tempdir().unwrap();
    let origin = dir.path().join("origin");
    std::fs::create_dir_all(&origin).unwrap();
    make_origin(&origin);
    let home = dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    let personal = dir.path().join("personal");
    std::fs::create_dir_all(personal.join("debugging")).unwrap();
    std::fs::write(
        personal.join("debugging/SKILL.md"),
        "---\nname: debugging\ndescription: My own take\n---\nPersonal body.\n",
    )
    .unwrap();
    let repo = origin.display().to_string();

    sp(&home)
        .args(["install", "kilocode", "--repo", &repo, "--skip-update"])
        .assert()
        .success();

    let output = sp(&home)
        .env("SP_PERSONAL_DIR", &personal)
        .args(["--robot", "skills", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["qualified_name"], "debugging");
    assert_eq!(entries[0]["source"], "personal");
    assert_eq!(entries[0]["shadows"], "hub:debugging");
}

#[cfg(unix)]
#[test]
fn test_skills_adopt_creates_shadowing_copy() {
    if !git_available() {
        return;
    }
    let dir = tempdir().unwrap();
    let origin = dir.path().join("origin");
    std::fs::create_dir_all(&origin).unwrap();
    make_origin(&origin);
    let home = dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    let personal = dir.path().join("personal");
    std::fs::create_dir_all(&personal).unwrap();
    let repo = origin.display().to_string();

    sp(&home)
        .args(["install", "kilocode", "--repo", &repo, "--skip-update"])
        .assert()
        .success();

    sp(&home)
        .env("SP_PERSONAL_DIR", &personal)
        .args(["skills", "adopt", "hub:debugging"])
        .assert()
        .success()
        .stdout(predicate::str::contains("adopted"));
    assert!(personal.join("debugging/SKILL.md").exists());

    // The personal copy now shadows; adopting again is refused.
    sp(&home)
        .env("SP_PERSONAL_DIR", &personal)
        .args(["skills", "adopt", "debugging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already personal"));

    // Without a personal directory configured, adopt is a config error.
    sp(&home)
        .args(["skills", "adopt", "debugging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("personal"));
}

#[cfg(unix)]
#[test]
fn test_agents_and_commands_registries() {
    if !git_available() {
        return;
    }
    let dir = tempdir().unwrap();
    let origin = dir.path().join("origin");
    std::fs::create_dir_all(&origin).unwrap();
    make_origin(&origin);
    let home = dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    let repo = origin.display().to_string();

    sp(&home)
        .args(["install", "kilocode", "--repo", &repo, "--skip-update"])
        .assert()
        .success();

    sp(&home)
        .args(["agents", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reviewer"));

    sp(&home)
        .args(["agents", "render", "reviewer", "--var", "file=src/lib.rs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Review src/lib.rs carefully."));

    sp(&home)
        .args(["commands", "show", "ship"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ship it."));
}

#[cfg(unix)]
#[test]
fn test_robot_error_payload_is_structured() {
    let dir = tempdir().unwrap();
    let home = dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();

    let output = sp(&home)
        .args(["--robot", "skills", "show", "missing"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    // The error envelope uses the same pretty serialization as success
    // payloads.
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.starts_with("{\n"));
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["status"]["error"]["numeric_code"], 401);
    assert_eq!(json["status"]["error"]["category"], "registry");
    assert_eq!(json["status"]["error"]["recoverable"], Value::Bool(true));
}
