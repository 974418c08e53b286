//! Filesystem primitives.
//!
//! Existence and type checks, recursive copy/remove, symlink creation with a
//! junction fallback on Windows, and the real-path containment check that
//! guards every recursive removal the installer performs.

use std::path::{Path, PathBuf};

use crate::error::{Result, SpError};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Check whether anything exists at a path, without following symlinks.
///
/// A dangling symlink still counts as existing; `Path::exists` would follow
/// it and report false, which is the wrong answer when deciding whether a
/// link location is occupied.
#[must_use]
pub fn path_exists(path: impl AsRef<Path>) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Read a file to string, returning None if it doesn't exist.
pub fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    if path.exists() {
        Ok(Some(std::fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}

/// Remove a path recursively. Missing paths are not an error.
pub fn remove_path(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let Ok(meta) = std::fs::symlink_metadata(path) else {
        return Ok(());
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

/// Read the raw target of a symlink, or None if the path is not a symlink.
#[must_use]
pub fn read_link_target(link_path: impl AsRef<Path>) -> Option<PathBuf> {
    let link_path = link_path.as_ref();
    let meta = std::fs::symlink_metadata(link_path).ok()?;
    if !meta.file_type().is_symlink() {
        return None;
    }
    std::fs::read_link(link_path).ok()
}

/// Resolve where a symlink actually points, absolutized against the link's
/// parent directory when the stored target is relative.
#[must_use]
pub fn resolve_link_target(link_path: impl AsRef<Path>) -> Option<PathBuf> {
    let link_path = link_path.as_ref();
    let raw = read_link_target(link_path)?;
    let resolved = if raw.is_absolute() {
        raw
    } else {
        link_path.parent().map(|p| p.join(&raw))?
    };
    // Canonicalize when possible so trailing dots and indirection through
    // further links compare equal; fall back to the lexical form for
    // dangling targets.
    Some(resolved.canonicalize().unwrap_or(resolved))
}

/// Check whether `candidate` resolves to a path inside `root`.
///
/// Comparison is component-bounded via canonicalized paths: `/a/X-custom`
/// is NOT inside `/a/X` even though one is a string prefix of the other.
/// Unresolvable paths are never considered contained.
#[must_use]
pub fn is_contained(candidate: impl AsRef<Path>, root: impl AsRef<Path>) -> bool {
    let Ok(candidate) = candidate.as_ref().canonicalize() else {
        return false;
    };
    let Ok(root) = root.as_ref().canonicalize() else {
        return false;
    };
    candidate.starts_with(&root)
}

/// Remove the occupant at a planned link location.
///
/// Symlinks and plain files are removed directly (the link itself, never
/// what it points at). For a real directory, verify first that its resolved
/// path is genuinely under the parent directory it occupies; an occupant
/// that escapes (e.g. a bind mount or a lexical prefix sibling reached
/// through indirection) is left untouched.
pub fn remove_occupant(link_path: &Path) -> Result<()> {
    let Ok(meta) = std::fs::symlink_metadata(link_path) else {
        return Ok(());
    };

    if meta.file_type().is_symlink() || meta.is_file() {
        std::fs::remove_file(link_path)?;
        return Ok(());
    }

    let parent = link_path
        .parent()
        .ok_or_else(|| SpError::Config(format!("no parent for {}", link_path.display())))?;
    let parent_real = parent.canonicalize()?;
    let occupant_real = link_path.canonicalize()?;
    let expected = parent_real.join(
        link_path
            .file_name()
            .ok_or_else(|| SpError::Config(format!("no file name for {}", link_path.display())))?,
    );

    if !is_contained(link_path, &expected) {
        tracing::warn!(
            occupant = %occupant_real.display(),
            expected = %expected.display(),
            "occupant resolves outside the path it occupies; leaving it alone"
        );
        return Err(SpError::ContainmentViolation {
            occupant: occupant_real,
            root: expected,
        });
    }

    std::fs::remove_dir_all(link_path)?;
    Ok(())
}

/// Recursively copy a directory tree. Symlinks are copied as links.
pub fn copy_dir_all(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();
    std::fs::create_dir_all(dst)?;

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            copy_dir_all(&from, &to)?;
        } else if file_type.is_symlink() {
            let target = std::fs::read_link(&from)?;
            symlink_any(&target, &to)?;
        } else {
            std::fs::copy(&from, &to)?;
        }
    }
    Ok(())
}

/// Create a symlink to a directory.
///
/// On Windows, unprivileged processes usually cannot create symlinks; fall
/// back to an NTFS directory junction, which needs no privilege.
#[cfg(unix)]
pub fn symlink_dir(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(windows)]
pub fn symlink_dir(target: &Path, link: &Path) -> Result<()> {
    match std::os::windows::fs::symlink_dir(target, link) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
            junction::create(target, link)?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Create a symlink to a file. File links have no junction fallback; a
/// privilege failure on Windows propagates to the caller.
#[cfg(unix)]
pub fn symlink_file(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(windows)]
pub fn symlink_file(target: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_file(target, link)?;
    Ok(())
}

#[cfg(unix)]
fn symlink_any(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(windows)]
fn symlink_any(target: &Path, link: &Path) -> Result<()> {
    if target.is_dir() {
        symlink_dir(target, link)
    } else {
        symlink_file(target, link)
    }
}
