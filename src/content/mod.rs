//! Content model: collections of front-matter + body records.
//!
//! Enumerates files under each collection's input glob, parses front matter,
//! and derives slugs. A file with malformed front matter is excluded and
//! reported as a warning, never aborting the enumeration; only a `required`
//! collection resolving zero files is fatal (the planner raises that).

pub mod data;
pub mod front_matter;

use crate::{config::CollectionSpec, utils::globs, utils::slug::slugify};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Content-level errors that escalate to the planner.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid input glob `{glob}` in collection `{collection}`")]
    BadGlob { collection: String, glob: String },

    #[error("required collection `{0}` resolved no content files")]
    EmptyCollection(String),
}

/// A per-file, recoverable problem.
#[derive(Debug, Clone)]
pub struct ContentWarning {
    pub path: PathBuf,
    pub message: String,
}

/// One parsed content file.
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Absolute source path.
    pub source: PathBuf,
    /// Source path relative to the content root, `/`-separated.
    pub rel_source: String,
    /// Route slug: front matter `slug` wins over the filename-derived slug.
    pub slug: String,
    /// Display title: front matter `title` or the file stem.
    pub title: String,
    /// Front matter `layout` override.
    pub layout: Option<String>,
    /// Front matter `schema` structured-data override.
    pub schema: Option<String>,
    /// Draft pages are enumerated but excluded from plans.
    pub draft: bool,
    /// Full front matter object.
    pub front: Map<String, Value>,
    /// Markdown body.
    pub body: String,
}

/// Enumeration result for one collection.
#[derive(Debug, Default)]
pub struct CollectionContent {
    pub items: Vec<ContentItem>,
    pub warnings: Vec<ContentWarning>,
}

/// Enumerate and parse a collection's content files.
///
/// Files are visited in sorted order so two runs over the same tree yield
/// identical item order.
pub fn enumerate_collection(
    content_dir: &Path,
    spec: &CollectionSpec,
) -> Result<CollectionContent, ContentError> {
    let input = globs::compile(&spec.input).map_err(|_| ContentError::BadGlob {
        collection: spec.name.clone(),
        glob: spec.input.clone(),
    })?;
    let includes: Vec<_> = spec
        .include
        .iter()
        .filter_map(|p| globs::compile(p).ok())
        .collect();

    let mut result = CollectionContent::default();
    if !content_dir.is_dir() {
        return Ok(result);
    }

    let walker = WalkDir::new(content_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file());

    for entry in walker {
        let rel = match entry.path().strip_prefix(content_dir) {
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };
        if !globs::matches(&input, &rel) {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if !includes.is_empty() && !includes.iter().any(|p| globs::matches(p, &file_name)) {
            continue;
        }

        match load_item(entry.path(), &rel) {
            Ok(item) => result.items.push(item),
            Err(message) => result.warnings.push(ContentWarning {
                path: entry.path().to_path_buf(),
                message,
            }),
        }
    }

    Ok(result)
}

/// Parse one content file into an item.
fn load_item(path: &Path, rel: &str) -> Result<ContentItem, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
    let (front, body) = front_matter::parse(&raw).map_err(|e| e.message)?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let slug = front
        .get("slug")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| slugify(&stem));
    let title = front
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| stem.clone());

    Ok(ContentItem {
        source: path.to_path_buf(),
        rel_source: rel.to_string(),
        layout: front.get("layout").and_then(Value::as_str).map(str::to_string),
        schema: front.get("schema").and_then(Value::as_str).map(str::to_string),
        draft: front.get("draft").and_then(Value::as_bool).unwrap_or(false),
        slug,
        title,
        front,
        body,
    })
}
