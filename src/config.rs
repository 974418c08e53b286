//! Configuration for sp.
//!
//! Defaults, then an optional TOML config file, then `SP_*` environment
//! overrides, then CLI flags. The merged result feeds both the installer
//! (source repo, ref, central dir) and the registries (source directories).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpError};

/// Default canonical repository shorthand.
pub const DEFAULT_REPO: &str = "skillhub/skills";
/// Default ref to check out.
pub const DEFAULT_REF: &str = "main";
/// Central working copy directory name under the user's home.
pub const CENTRAL_DIR_NAME: &str = ".skillhub";
/// Namespace prefix for primary-source registry entries.
pub const PRIMARY_NAMESPACE: &str = "hub";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Where the canonical skill repository comes from and lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// `owner/name` shorthand or a full transport URL.
    pub repo: String,
    /// Branch, tag, or commit to check out.
    #[serde(rename = "ref")]
    pub gitref: String,
    /// Local path of the central working copy. `~` expands to home.
    pub dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            gitref: DEFAULT_REF.to_string(),
            dir: None,
        }
    }
}

/// Directories the registries scan. Unset values derive from the central
/// working copy at resolution time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub skills_dir: Option<PathBuf>,
    pub personal_dir: Option<PathBuf>,
    pub agents_dir: Option<PathBuf>,
    pub commands_dir: Option<PathBuf>,
}

/// Partial config as read from a TOML file; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    #[serde(default)]
    source: SourcePatch,
    #[serde(default)]
    registry: RegistryConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SourcePatch {
    repo: Option<String>,
    #[serde(rename = "ref")]
    gitref: Option<String>,
    dir: Option<PathBuf>,
}

impl Config {
    /// Load config: defaults, then the config file (explicit path or
    /// `~/.config/sp/config.toml`), then `SP_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let path = explicit_path.map(PathBuf::from).or_else(|| {
            dirs::config_dir().map(|d| d.join("sp/config.toml"))
        });
        if let Some(path) = path {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|err| SpError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SpError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(repo) = patch.source.repo {
            self.source.repo = repo;
        }
        if let Some(gitref) = patch.source.gitref {
            self.source.gitref = gitref;
        }
        if patch.source.dir.is_some() {
            self.source.dir = patch.source.dir;
        }
        let reg = patch.registry;
        if reg.skills_dir.is_some() {
            self.registry.skills_dir = reg.skills_dir;
        }
        if reg.personal_dir.is_some() {
            self.registry.personal_dir = reg.personal_dir;
        }
        if reg.agents_dir.is_some() {
            self.registry.agents_dir = reg.agents_dir;
        }
        if reg.commands_dir.is_some() {
            self.registry.commands_dir = reg.commands_dir;
        }
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(repo) = var("SP_REPO") {
            self.source.repo = repo;
        }
        if let Some(gitref) = var("SP_REF") {
            self.source.gitref = gitref;
        }
        if let Some(dir) = var("SP_DIR") {
            self.source.dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = var("SP_PERSONAL_DIR") {
            self.registry.personal_dir = Some(PathBuf::from(dir));
        }
    }
}

/// Resolve the user's home directory, honoring the `SP_HOME` override.
pub fn home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("SP_HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| SpError::Config("home directory not found".to_string()))
}

/// Expand a leading `~` or `~/` against the resolved home directory.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let Some(s) = path.to_str() else {
        return Ok(path.to_path_buf());
    };
    if s == "~" {
        return home_dir();
    }
    if let Some(rest) = s.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    Ok(path.to_path_buf())
}

/// Normalize a repository shorthand to a single canonical URL form.
///
/// Full URLs (anything with a scheme), scp-style `git@` remotes, and local
/// paths pass through; `owner/name` becomes the canonical GitHub HTTPS URL.
/// An empty source is a configuration error surfaced before any work
/// happens.
pub fn normalize_repo_url(repo: &str) -> Result<String> {
    let trimmed = repo.trim();
    if trimmed.is_empty() {
        return Err(SpError::SourceInvalid(
            "empty repository reference".to_string(),
        ));
    }
    if trimmed.contains("://")
        || trimmed.starts_with("git@")
        || trimmed.starts_with('/')
        || trimmed.starts_with('.')
        || trimmed.starts_with('~')
    {
        return Ok(trimmed.to_string());
    }
    Ok(format!("https://github.com/{trimmed}.git"))
}

/// Fully resolved inputs for one install/upgrade/doctor invocation.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Source shorthand as given.
    pub repo: String,
    /// Canonical clone URL.
    pub repo_url: String,
    /// Ref to check out.
    pub gitref: String,
    /// Absolute path of the central working copy.
    pub dir: PathBuf,
    /// Permit overwriting dirty trees and colliding occupants.
    pub force: bool,
    /// Checkout the ref without fetching/fast-forwarding first.
    pub skip_update: bool,
    /// Maintain the AGENTS.md marker block for targets that use one.
    pub patch_agents: bool,
}

impl InstallOptions {
    /// Resolve options from config plus per-invocation overrides.
    pub fn resolve(
        config: &Config,
        repo: Option<&str>,
        gitref: Option<&str>,
        dir: Option<&Path>,
        force: bool,
        skip_update: bool,
        patch_agents: bool,
    ) -> Result<Self> {
        let repo = repo.unwrap_or(&config.source.repo).to_string();
        let repo_url = normalize_repo_url(&repo)?;
        let gitref = gitref.unwrap_or(&config.source.gitref).to_string();

        let dir = match dir.or(config.source.dir.as_deref()) {
            Some(d) => expand_home(d)?,
            None => home_dir()?.join(CENTRAL_DIR_NAME),
        };
        let dir = std::path::absolute(&dir)?;

        Ok(Self {
            repo,
            repo_url,
            gitref,
            dir,
            force,
            skip_update,
            patch_agents,
        })
    }
}
