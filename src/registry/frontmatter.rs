//! Frontmatter extraction for markdown manifests.
//!
//! Manifests open with a `---` delimited YAML block. Parsing is a typed,
//! explicitly tolerant extraction: a fixed set of optional keys, unknown
//! keys ignored, missing keys left as `None`.

use serde::Deserialize;

/// The keys sp reads from a manifest's leading metadata block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Frontmatter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Subagent model override; absent means "inherit".
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, rename = "disable-model-invocation")]
    pub disable_model_invocation: Option<bool>,
}

/// Split content into (frontmatter source, body). The frontmatter block
/// must start on the first line; otherwise the whole content is body.
fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content.strip_prefix("---\n").or_else(|| {
        content.strip_prefix("---\r\n")
    }) else {
        return (None, content);
    };

    for close in ["\n---\n", "\n---\r\n", "\r\n---\n", "\r\n---\r\n"] {
        if let Some(end) = rest.find(close) {
            return (Some(&rest[..end]), &rest[end + close.len()..]);
        }
    }
    // Closing delimiter at EOF without trailing newline.
    if let Some(stripped) = rest.strip_suffix("\n---") {
        return (Some(stripped), "");
    }
    (None, content)
}

/// Extract the typed frontmatter record. Content without a frontmatter
/// block, or with one that fails to parse, yields the default record —
/// a malformed entry is the caller's log-and-skip decision, not a panic.
#[must_use]
pub fn extract_frontmatter(content: &str) -> Frontmatter {
    let (Some(raw), _) = split_frontmatter(content) else {
        return Frontmatter::default();
    };
    match serde_yaml::from_str(raw) {
        Ok(fm) => fm,
        Err(err) => {
            tracing::warn!(%err, "malformed frontmatter; treating as empty");
            Frontmatter::default()
        }
    }
}

/// Return the body with the leading frontmatter block removed.
#[must_use]
pub fn strip_frontmatter(content: &str) -> String {
    let (_, body) = split_frontmatter(content);
    body.trim_start_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "---\nname: test-driven-repair\ndescription: Fix bugs with a failing test first\n---\n\n# Test-driven repair\n\nBody text.\n";

    #[test]
    fn extracts_name_and_description() {
        let fm = extract_frontmatter(MANIFEST);
        assert_eq!(fm.name.as_deref(), Some("test-driven-repair"));
        assert_eq!(
            fm.description.as_deref(),
            Some("Fix bugs with a failing test first")
        );
        assert!(fm.model.is_none());
    }

    #[test]
    fn tolerates_missing_keys_and_unknown_keys() {
        let fm = extract_frontmatter("---\nauthor: someone\nmodel: haiku\n---\nbody\n");
        assert!(fm.name.is_none());
        assert_eq!(fm.model.as_deref(), Some("haiku"));
    }

    #[test]
    fn reads_disable_model_invocation() {
        let fm =
            extract_frontmatter("---\ndescription: d\ndisable-model-invocation: true\n---\n");
        assert_eq!(fm.disable_model_invocation, Some(true));
    }

    #[test]
    fn no_frontmatter_yields_default() {
        let fm = extract_frontmatter("# Just a markdown file\n");
        assert!(fm.name.is_none());
        assert!(fm.description.is_none());
    }

    #[test]
    fn malformed_frontmatter_yields_default() {
        let fm = extract_frontmatter("---\n: [not yaml\n---\nbody\n");
        assert!(fm.name.is_none());
    }

    #[test]
    fn strip_removes_block_and_keeps_body() {
        let body = strip_frontmatter(MANIFEST);
        assert!(body.starts_with("# Test-driven repair"));
        assert!(!body.contains("description:"));
    }

    #[test]
    fn strip_without_frontmatter_is_identity() {
        let content = "# Heading\n\ntext\n";
        assert_eq!(strip_frontmatter(content), content);
    }

    #[test]
    fn delimiter_not_on_first_line_is_body() {
        let content = "intro\n---\nname: x\n---\n";
        let fm = extract_frontmatter(content);
        assert!(fm.name.is_none());
        assert_eq!(strip_frontmatter(content), content);
    }
}
