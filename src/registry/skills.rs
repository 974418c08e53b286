//! Skill registry: discovery, namespacing, and override resolution.
//!
//! Skills live one-per-directory with a `SKILL.md` manifest. The registry
//! scans a primary source (namespaced `hub:<name>`) and an optional
//! personal source whose same-named entries shadow primary ones.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::config::PRIMARY_NAMESPACE;
use crate::registry::frontmatter::{extract_frontmatter, strip_frontmatter};

/// Manifest file name that marks a skill directory.
pub const MANIFEST_NAME: &str = "SKILL.md";

/// How deep below a source root the scan looks for manifests.
pub const DEFAULT_SCAN_DEPTH: usize = 3;

/// Which source a registry entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Primary,
    Personal,
}

/// One discovered skill.
#[derive(Debug, Clone, Serialize)]
pub struct SkillDescriptor {
    /// Bare lookup name.
    pub name: String,
    /// Name as addressed externally (`hub:<name>` for primary entries).
    pub qualified_name: String,
    pub description: String,
    /// The skill's directory.
    pub directory: PathBuf,
    /// Path to the `SKILL.md` manifest.
    pub manifest_file: PathBuf,
    pub source: SourceType,
    /// Qualified name of the primary entry this personal entry overrides.
    pub shadows: Option<String>,
}

/// A supporting file shipped next to a skill manifest.
#[derive(Debug, Clone, Serialize)]
pub struct SupportingFile {
    pub name: String,
    pub path: PathBuf,
}

/// Scan one source directory for skill manifests.
///
/// Depth is bounded ([`DEFAULT_SCAN_DEPTH`]); entries whose manifest cannot
/// be read are logged and skipped rather than aborting the scan. The name
/// comes from frontmatter, falling back to the directory name.
fn find_skills_in_dir(root: &Path, source: SourceType) -> Vec<SkillDescriptor> {
    let mut found = Vec::new();
    if !root.is_dir() {
        return found;
    }

    for entry in WalkDir::new(root)
        .max_depth(DEFAULT_SCAN_DEPTH)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_NAME {
            continue;
        }
        let manifest_file = entry.path().to_path_buf();
        let Some(directory) = manifest_file.parent().map(Path::to_path_buf) else {
            continue;
        };

        let content = match std::fs::read_to_string(&manifest_file) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %manifest_file.display(), %err, "skipping unreadable manifest");
                continue;
            }
        };

        let fm = extract_frontmatter(&content);
        let fallback = directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        let Some(name) = fm.name.or(fallback) else {
            tracing::warn!(path = %manifest_file.display(), "skipping manifest with no derivable name");
            continue;
        };

        found.push(SkillDescriptor {
            qualified_name: name.clone(),
            name,
            description: fm.description.unwrap_or_default(),
            directory,
            manifest_file,
            source,
            shadows: None,
        });
    }

    found
}

/// Name-to-descriptor registry over a primary and optional personal source.
///
/// Constructed with explicit directories and passed by reference; a `load`
/// fully replaces prior contents, and any accessor loads lazily on first
/// use.
#[derive(Debug)]
pub struct SkillRegistry {
    primary_dir: PathBuf,
    personal_dir: Option<PathBuf>,
    skills: BTreeMap<String, SkillDescriptor>,
    loaded: bool,
}

impl SkillRegistry {
    #[must_use]
    pub fn new(primary_dir: PathBuf, personal_dir: Option<PathBuf>) -> Self {
        Self {
            primary_dir,
            personal_dir,
            skills: BTreeMap::new(),
            loaded: false,
        }
    }

    /// Rescan both sources, fully replacing prior contents.
    ///
    /// Primary entries get a `hub:` qualified name; personal entries keep
    /// their bare name and, when they collide with a primary name, take
    /// over the slot recording what they shadow.
    pub fn load(&mut self) -> &mut Self {
        self.skills.clear();

        for skill in find_skills_in_dir(&self.primary_dir, SourceType::Primary) {
            let qualified = format!("{PRIMARY_NAMESPACE}:{}", skill.name);
            self.skills.insert(
                skill.name.clone(),
                SkillDescriptor {
                    qualified_name: qualified,
                    ..skill
                },
            );
        }

        if let Some(personal_dir) = self.personal_dir.clone() {
            for skill in find_skills_in_dir(&personal_dir, SourceType::Personal) {
                let shadows = self
                    .skills
                    .get(&skill.name)
                    .filter(|existing| existing.source == SourceType::Primary)
                    .map(|existing| existing.qualified_name.clone());
                self.skills.insert(
                    skill.name.clone(),
                    SkillDescriptor { shadows, ..skill },
                );
            }
        }

        self.loaded = true;
        tracing::debug!(count = self.skills.len(), "skill registry loaded");
        self
    }

    fn ensure_loaded(&mut self) {
        if !self.loaded {
            self.load();
        }
    }

    /// Strip an optional namespace prefix down to the bare lookup name.
    fn bare_name(name: &str) -> &str {
        name.strip_prefix(PRIMARY_NAMESPACE)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(name)
    }

    /// Get a skill by name, with or without the `hub:` prefix. A missing
    /// name is a `None`, never an error.
    pub fn get(&mut self, name: &str) -> Option<&SkillDescriptor> {
        self.ensure_loaded();
        self.skills.get(Self::bare_name(name))
    }

    /// All loaded skills, ordered by name.
    pub fn get_all(&mut self) -> Vec<&SkillDescriptor> {
        self.ensure_loaded();
        self.skills.values().collect()
    }

    /// Case-insensitive substring search over names and descriptions.
    pub fn search(&mut self, query: &str) -> Vec<&SkillDescriptor> {
        self.ensure_loaded();
        let query = query.to_lowercase();
        self.skills
            .values()
            .filter(|s| {
                s.name.to_lowercase().contains(&query)
                    || s.description.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Skill body, read fresh off disk with the frontmatter stripped, so
    /// the result always reflects current file content.
    pub fn content(&mut self, name: &str) -> Option<String> {
        let skill = self.get(name)?;
        let raw = std::fs::read_to_string(&skill.manifest_file).ok()?;
        Some(strip_frontmatter(&raw))
    }

    /// Descriptor plus freshly read content.
    pub fn get_with_content(&mut self, name: &str) -> Option<(SkillDescriptor, String)> {
        let descriptor = self.get(name)?.clone();
        let content = self.content(name)?;
        Some((descriptor, content))
    }

    /// Non-manifest files in the skill's directory.
    pub fn supporting_files(&mut self, name: &str) -> Vec<SupportingFile> {
        let Some(skill) = self.get(name) else {
            return Vec::new();
        };
        let Ok(entries) = std::fs::read_dir(&skill.directory) else {
            return Vec::new();
        };

        let mut files: Vec<SupportingFile> = entries
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .filter(|e| e.file_name() != MANIFEST_NAME)
            .map(|e| SupportingFile {
                name: e.file_name().to_string_lossy().into_owned(),
                path: e.path(),
            })
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        files
    }
}
