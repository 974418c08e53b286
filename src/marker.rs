//! Marker-block text patcher.
//!
//! The installer owns one sentinel-delimited region inside otherwise
//! user-owned text files (e.g. `~/.codex/AGENTS.md`). [`upsert_block`] and
//! [`strip_legacy_outside`] are pure string transforms; [`ensure_marked_file`]
//! handles the read/write around them and refuses to edit a symlinked file
//! unless forced.

use std::path::Path;

use crate::error::{Result, SpError};
use crate::utils::fs::{ensure_dir, path_exists, read_optional};

/// Locate the span of a sentinel pair: byte offsets of the start sentinel
/// and the end of the end sentinel. Requires the end sentinel to come after
/// the start; a lone or inverted pair counts as no block.
fn find_block(content: &str, start_sentinel: &str, end_sentinel: &str) -> Option<(usize, usize)> {
    let start = content.find(start_sentinel)?;
    let end = content.find(end_sentinel)?;
    if end <= start {
        return None;
    }
    Some((start, end + end_sentinel.len()))
}

/// Insert or replace the installer-owned block.
///
/// If a sentinel pair exists, everything between the sentinels (inclusive)
/// is replaced with a freshly rendered block; otherwise the block is
/// appended with blank-line normalization. Content strictly outside the
/// sentinels is never altered. Applying the same body twice is a fixpoint.
#[must_use]
pub fn upsert_block(
    content: &str,
    start_sentinel: &str,
    end_sentinel: &str,
    body: &str,
) -> String {
    let block = format!(
        "{start_sentinel}\n{}\n{end_sentinel}",
        body.trim_end()
    );

    if let Some((start, end)) = find_block(content, start_sentinel, end_sentinel) {
        let before = content[..start].trim_end();
        let after = content[end..].trim();
        let mut out = String::with_capacity(content.len() + block.len());
        if !before.is_empty() {
            out.push_str(before);
            out.push_str("\n\n");
        }
        out.push_str(&block);
        if !after.is_empty() {
            out.push_str("\n\n");
            out.push_str(after);
        }
        out.push('\n');
        return out;
    }

    let base = content.trim_end();
    if base.is_empty() {
        return format!("{block}\n");
    }
    format!("{base}\n\n{block}\n")
}

/// Remove one legacy (unmarked) block from the text outside the current
/// sentinel pair.
///
/// The marked span is sliced out first and the legacy removal runs against
/// the "before" and "after" slices independently, so legacy-pattern text
/// that happens to sit between the current sentinels is never stripped.
/// At most one legacy block is removed per slice; a second occurrence in
/// the same slice is left in place (unsupported layout, not guessed at).
#[must_use]
pub fn strip_legacy_outside(
    content: &str,
    start_sentinel: &str,
    end_sentinel: &str,
    legacy_header: &str,
    legacy_footer: &str,
) -> String {
    let (before, marked, after) =
        if let Some((start, end)) = find_block(content, start_sentinel, end_sentinel) {
            (&content[..start], &content[start..end], &content[end..])
        } else {
            (content, "", "")
        };

    let strip_one = |s: &str| -> String {
        let Some(h) = s.find(legacy_header) else {
            return s.to_string();
        };
        let Some(rel) = s[h..].find(legacy_footer) else {
            return s.to_string();
        };
        let footer_end = h + rel + legacy_footer.len();

        let head = s[..h].trim_end();
        let tail = s[footer_end..].trim_start();
        if head.is_empty() {
            return tail.to_string();
        }
        if tail.is_empty() {
            return format!("{head}\n");
        }
        format!("{head}\n\n{tail}")
    };

    let cleaned_before = strip_one(before);
    let cleaned_after = strip_one(after);

    if marked.is_empty() {
        return cleaned_before;
    }
    format!("{cleaned_before}{marked}{cleaned_after}")
}

/// Sentinels plus body for one installer-owned region.
#[derive(Debug, Clone)]
pub struct MarkerBlock {
    pub start_sentinel: String,
    pub end_sentinel: String,
    pub body: String,
    /// Legacy unmarked convention to migrate away, as (header, footer).
    pub legacy: Option<(String, String)>,
}

/// Upsert the block into a file on disk, migrating any legacy block found
/// outside the marked region. Returns whether the file was rewritten.
///
/// Editing a file that is itself a symlink is refused without `force`; the
/// link may lead to a shared file.
pub fn ensure_marked_file(path: &Path, block: &MarkerBlock, force: bool) -> Result<bool> {
    if path_exists(path) && !force {
        let meta = std::fs::symlink_metadata(path)?;
        if meta.file_type().is_symlink() {
            return Err(SpError::SymlinkedFile(path.to_path_buf()));
        }
    }

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let existing = read_optional(path)?.unwrap_or_default();
    let upserted = upsert_block(
        &existing,
        &block.start_sentinel,
        &block.end_sentinel,
        &block.body,
    );
    let next = match &block.legacy {
        Some((header, footer)) => strip_legacy_outside(
            &upserted,
            &block.start_sentinel,
            &block.end_sentinel,
            header,
            footer,
        ),
        None => upserted,
    };

    if next == existing {
        return Ok(false);
    }
    std::fs::write(path, next)?;
    Ok(true)
}
