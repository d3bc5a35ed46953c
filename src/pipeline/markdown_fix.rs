//! `markdown-fix` task: content hygiene fixes.
//!
//! Fixes applied per file:
//! - trailing whitespace stripped from every line
//! - missing space after ATX heading markers (`#Title` => `# Title`)
//! - runs of two or more blank lines collapsed to one
//! - missing space after bold `**Q:**`/`**A:**` markers
//! - exactly one trailing newline
//!
//! Fenced code blocks are left verbatim.
//!
//! With `write: false` (the default) this is a dry run. `failOnChanges`
//! fails the step when any file would change, before or after writing.

use super::{TaskError, TaskOutcome, reports};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::{fs, path::Path, path::PathBuf, sync::LazyLock};
use walkdir::WalkDir;

static HEADING_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})([^#\s])").unwrap());
static QA_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([QA]):\*\*(\S)").unwrap());

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkdownFixOptions {
    /// Directory scanned for `*.md` files; defaults to `<root>/content`.
    #[serde(alias = "content-root")]
    pub content_root: Option<PathBuf>,

    /// Apply fixes in place instead of dry-running.
    pub write: bool,

    /// Fail the step when any file requires changes.
    #[serde(alias = "fail-on-changes")]
    pub fail_on_changes: bool,

    /// Write `_reports/markdown-fix.{json,md}` under the site root.
    pub report: bool,
}

pub fn run(root: &Path, opts: &MarkdownFixOptions) -> Result<TaskOutcome, TaskError> {
    let content_root = opts
        .content_root
        .as_ref()
        .map_or_else(|| root.join("content"), |c| root.join(c));

    let mut scanned = 0usize;
    let mut changed: Vec<(String, Vec<&'static str>)> = Vec::new();

    for entry in WalkDir::new(&content_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
    {
        scanned += 1;
        let raw = fs::read_to_string(entry.path())
            .map_err(|e| TaskError::Failed(format!("read `{}`: {e}", entry.path().display())))?;
        let (fixed, fixes) = fix_markdown(&raw);
        if fixes.is_empty() {
            continue;
        }
        if opts.write {
            fs::write(entry.path(), &fixed).map_err(|e| {
                TaskError::Failed(format!("write `{}`: {e}", entry.path().display()))
            })?;
        }
        let rel = entry
            .path()
            .strip_prefix(&content_root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        changed.push((rel, fixes));
    }

    let payload = json!({
        "scanned": scanned,
        "changed": changed.len(),
        "written": opts.write,
        "files": changed.iter().map(|(rel, fixes)| json!({
            "file": rel,
            "fixes": fixes,
        })).collect::<Vec<_>>(),
    });

    if opts.report {
        reports::write_json(root, "markdown-fix", &payload)?;
        reports::write_markdown(root, "markdown-fix", &markdown_summary(&changed, scanned))?;
    }

    if opts.fail_on_changes && !changed.is_empty() {
        return Err(TaskError::Failed(format!(
            "failOnChanges: {} file(s) require changes",
            changed.len()
        )));
    }

    let message = if changed.is_empty() {
        format!("{scanned} file(s) clean")
    } else if opts.write {
        format!("fixed {} of {scanned} file(s)", changed.len())
    } else {
        format!("{} of {scanned} file(s) would change", changed.len())
    };
    Ok(TaskOutcome { message, payload })
}

/// Apply all hygiene fixes; returns the fixed text and the fix names hit.
///
/// Fenced code blocks pass through verbatim: `#include` lines are not
/// heading candidates and blank runs inside a fence are significant.
pub fn fix_markdown(text: &str) -> (String, Vec<&'static str>) {
    let mut stripped_any = false;
    let mut heading_any = false;
    let mut qa_any = false;
    let mut blank_any = false;
    let mut in_fence = false;
    let mut pending_blanks = 0usize;
    let mut lines: Vec<String> = Vec::new();

    for raw in text.split('\n') {
        if in_fence {
            if raw.trim_start().starts_with("```") {
                in_fence = false;
            }
            lines.push(raw.to_string());
            continue;
        }

        let line = raw.trim_end();
        if line.len() != raw.len() {
            stripped_any = true;
        }

        if line.is_empty() {
            pending_blanks += 1;
            continue;
        }
        if pending_blanks > 0 {
            lines.push(String::new());
            if pending_blanks > 1 {
                blank_any = true;
            }
            pending_blanks = 0;
        }

        if line.trim_start().starts_with("```") {
            in_fence = true;
            lines.push(line.to_string());
            continue;
        }

        let mut line = line.to_string();
        if HEADING_SPACE_RE.is_match(&line) {
            line = HEADING_SPACE_RE.replace_all(&line, "$1 $2").into_owned();
            heading_any = true;
        }
        if QA_SPACE_RE.is_match(&line) {
            line = QA_SPACE_RE.replace_all(&line, "**$1:** $2").into_owned();
            qa_any = true;
        }
        lines.push(line);
    }
    if pending_blanks > 0 {
        lines.push(String::new());
        if pending_blanks > 2 {
            blank_any = true;
        }
    }

    let mut fixes = Vec::new();
    if stripped_any {
        fixes.push("trailing-whitespace");
    }
    if heading_any {
        fixes.push("heading-space");
    }
    if qa_any {
        fixes.push("qa-space");
    }
    if blank_any {
        fixes.push("blank-run");
    }

    let mut out = lines.join("\n");
    let normalized = format!("{}\n", out.trim_end_matches('\n'));
    if normalized != out {
        out = normalized;
        fixes.push("final-newline");
    }

    (out, fixes)
}

fn markdown_summary(changed: &[(String, Vec<&'static str>)], scanned: usize) -> String {
    let mut md = String::from("# markdown-fix report\n\n");
    md.push_str(&format!("- scanned: {scanned}\n- changed: {}\n\n", changed.len()));
    for (rel, fixes) in changed {
        md.push_str(&format!("- `{rel}`: {}\n", fixes.join(", ")));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_heading_and_qa_spacing() {
        let (fixed, fixes) = fix_markdown("#Title\n\n**Q:**What?\n");
        assert_eq!(fixed, "# Title\n\n**Q:** What?\n");
        assert!(fixes.contains(&"heading-space"));
        assert!(fixes.contains(&"qa-space"));
    }

    #[test]
    fn test_clean_file_untouched() {
        let input = "# Title\n\nBody text.\n";
        let (fixed, fixes) = fix_markdown(input);
        assert_eq!(fixed, input);
        assert!(fixes.is_empty());
    }

    #[test]
    fn test_blank_runs_and_final_newline() {
        let (fixed, fixes) = fix_markdown("a\n\n\n\nb");
        assert_eq!(fixed, "a\n\nb\n");
        assert!(fixes.contains(&"blank-run"));
        assert!(fixes.contains(&"final-newline"));
    }

    #[test]
    fn test_fenced_code_left_verbatim() {
        let input = "# Title\n\n```c\n#include <stdio.h>\n\n\n\nint main() {}\n```\n";
        let (fixed, fixes) = fix_markdown(input);
        assert_eq!(fixed, input);
        assert!(fixes.is_empty());
    }

    #[test]
    fn test_fixes_resume_after_fence() {
        let (fixed, fixes) = fix_markdown("```\n#not a heading\n```\n#Real heading\n");
        assert_eq!(fixed, "```\n#not a heading\n```\n# Real heading\n");
        assert_eq!(fixes, vec!["heading-space"]);
    }

    #[test]
    fn test_fail_on_changes_message() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        fs::write(dir.path().join("content/dirty.md"), "#Nope").unwrap();

        let opts = MarkdownFixOptions { fail_on_changes: true, ..Default::default() };
        let err = run(dir.path(), &opts).unwrap_err();
        assert!(format!("{err}").contains("failOnChanges"));
        // Dry run: the file is untouched.
        assert_eq!(fs::read_to_string(dir.path().join("content/dirty.md")).unwrap(), "#Nope");
    }

    #[test]
    fn test_write_applies_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        fs::write(dir.path().join("content/dirty.md"), "#Nope").unwrap();

        let opts = MarkdownFixOptions { write: true, report: true, ..Default::default() };
        let outcome = run(dir.path(), &opts).unwrap();
        assert!(outcome.message.contains("fixed 1"));
        assert_eq!(
            fs::read_to_string(dir.path().join("content/dirty.md")).unwrap(),
            "# Nope\n"
        );
        assert!(dir.path().join("_reports/markdown-fix.json").is_file());
        assert!(dir.path().join("_reports/markdown-fix.md").is_file());
    }
}
