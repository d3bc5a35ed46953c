//! `xref-merge` task: merge cross-reference map files.
//!
//! Reference maps are JSON documents of the form
//! `{ "references": [ { "uid": "...", "href": "..." } ] }` (a bare array is
//! also accepted). Merging keeps the first occurrence of each UID; later
//! occurrences count as duplicates and surface as one warning with the
//! count.

use super::{TaskError, TaskOutcome};
use serde_json::{Value, json};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XrefMergeOptions {
    /// Input map-file globs, relative to the site root.
    pub inputs: Vec<String>,

    /// Merged output file, relative to the site root.
    pub output: Option<PathBuf>,

    /// Duplicate-UID ceiling; only enforced with `failOnWarnings`.
    #[serde(alias = "max-duplicates")]
    pub max_duplicates: Option<usize>,

    /// Turn the duplicate warning into a step failure when the ceiling is
    /// exceeded.
    #[serde(alias = "fail-on-warnings")]
    pub fail_on_warnings: bool,
}

pub fn run(root: &Path, opts: &XrefMergeOptions) -> Result<TaskOutcome, TaskError> {
    if opts.inputs.is_empty() {
        return Err(TaskError::Options(
            "xref-merge requires at least one input glob".to_string(),
        ));
    }

    let mut files = Vec::new();
    for pattern in &opts.inputs {
        let absolute = root.join(pattern);
        let matches = glob::glob(&absolute.to_string_lossy())
            .map_err(|e| TaskError::Options(format!("invalid input glob `{pattern}`: {e}")))?;
        for path in matches.filter_map(Result::ok) {
            files.push(path);
        }
    }
    files.sort();

    let mut merged: BTreeMap<String, Value> = BTreeMap::new();
    let mut duplicates = 0usize;
    for path in &files {
        for reference in load_references(path)? {
            let Some(uid) = reference.get("uid").and_then(Value::as_str) else {
                continue;
            };
            if merged.contains_key(uid) {
                duplicates += 1;
            } else {
                merged.insert(uid.to_string(), reference);
            }
        }
    }

    if let Some(output) = &opts.output {
        let target = root.join(output);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| TaskError::Failed(format!("create `{}`: {e}", parent.display())))?;
        }
        let doc = json!({ "references": merged.values().collect::<Vec<_>>() });
        fs::write(&target, format!("{doc:#}"))
            .map_err(|e| TaskError::Failed(format!("write `{}`: {e}", target.display())))?;
    }

    if opts.fail_on_warnings
        && let Some(max) = opts.max_duplicates
        && duplicates > max
    {
        return Err(TaskError::Failed(format!(
            "maxDuplicates exceeded: {duplicates} duplicate UID(s), allowed {max}"
        )));
    }

    let message = if duplicates > 0 {
        format!(
            "merged {} reference(s) from {} file(s), {duplicates} duplicate UID(s)",
            merged.len(),
            files.len()
        )
    } else {
        format!("merged {} reference(s) from {} file(s)", merged.len(), files.len())
    };

    Ok(TaskOutcome {
        message,
        payload: json!({
            "files": files.len(),
            "references": merged.len(),
            "duplicates": duplicates,
        }),
    })
}

/// Read one map file into its reference list.
fn load_references(path: &Path) -> Result<Vec<Value>, TaskError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| TaskError::Failed(format!("read `{}`: {e}", path.display())))?;
    let doc: Value = serde_json::from_str(&raw)
        .map_err(|e| TaskError::Failed(format!("parse `{}`: {e}", path.display())))?;
    let references = match doc {
        Value::Array(list) => list,
        Value::Object(mut map) => match map.remove("references") {
            Some(Value::Array(list)) => list,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_map(root: &Path, name: &str, uids: &[&str]) {
        let references: Vec<_> = uids
            .iter()
            .map(|uid| json!({ "uid": uid, "href": format!("/{uid}/") }))
            .collect();
        fs::write(root.join(name), json!({ "references": references }).to_string()).unwrap();
    }

    #[test]
    fn test_merge_dedupes_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        write_map(dir.path(), "a.xrefmap.json", &["alpha", "beta"]);
        write_map(dir.path(), "b.xrefmap.json", &["beta", "gamma"]);

        let opts = XrefMergeOptions {
            inputs: vec!["*.xrefmap.json".into()],
            output: Some(PathBuf::from("merged.json")),
            ..Default::default()
        };
        let outcome = run(dir.path(), &opts).unwrap();
        assert_eq!(outcome.payload["references"], 3);
        assert_eq!(outcome.payload["duplicates"], 1);
        assert!(outcome.message.contains("1 duplicate UID(s)"));

        let merged: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("merged.json")).unwrap())
                .unwrap();
        assert_eq!(merged["references"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_max_duplicates_gate() {
        let dir = tempfile::tempdir().unwrap();
        write_map(dir.path(), "a.xrefmap.json", &["x", "y"]);
        write_map(dir.path(), "b.xrefmap.json", &["x", "y"]);

        let mut opts = XrefMergeOptions {
            inputs: vec!["*.xrefmap.json".into()],
            max_duplicates: Some(1),
            fail_on_warnings: true,
            ..Default::default()
        };
        let err = run(dir.path(), &opts).unwrap_err();
        assert!(format!("{err}").contains("maxDuplicates"));

        // Without failOnWarnings the same input merely warns.
        opts.fail_on_warnings = false;
        assert!(run(dir.path(), &opts).is_ok());
    }

    #[test]
    fn test_missing_inputs_is_option_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path(), &XrefMergeOptions::default()).unwrap_err();
        assert!(matches!(err, TaskError::Options(_)));
    }
}
